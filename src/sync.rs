//! Post-success balance refresh
//!
//! After a transfer is accepted by the network the wallet's published
//! balance is re-read once. A refresh failure is reported to the caller but
//! never demotes a successful transfer; the orchestrator logs it and keeps
//! the stale snapshot.

use std::sync::Arc;

use tracing::debug;

use crate::chain::{BalanceProvider, ChainError};
use crate::session::{Network, WalletSnapshot};

pub struct BalanceSync {
    balances: Arc<dyn BalanceProvider>,
}

impl BalanceSync {
    pub fn new(balances: Arc<dyn BalanceProvider>) -> Self {
        Self { balances }
    }

    /// Re-read the native balance and produce a fresh snapshot.
    pub async fn refresh(
        &self,
        address: &str,
        network: Network,
    ) -> Result<WalletSnapshot, ChainError> {
        let native_balance = self.balances.balance_of(address, network).await?;
        debug!(address, balance = %native_balance, "wallet balance refreshed");
        Ok(WalletSnapshot::new(address, native_balance))
    }
}
