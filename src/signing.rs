//! Transaction assembly and submission
//!
//! Builds the unsigned transaction for a confirmed transfer and submits it
//! through one of two signing paths: a provider-held local key (single
//! round trip) or a hardware device (sign locally, then broadcast the raw
//! bytes). Which path runs is decided by the session credential, never by
//! the token.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::amount::FixedAmount;
use crate::chain::{ChainError, NetworkAdapter};
use crate::fee::FeeQuote;
use crate::session::{Credential, SessionContext};
use crate::token::{TokenDescriptor, TokenKind};
use crate::workflow::WorkflowError;

// ============================================================================
// Transaction Shapes
// ============================================================================

/// On-chain effect of a transfer. Native transfers move value directly;
/// token transfers call the token contract with the recipient and amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxAction {
    NativeTransfer {
        recipient: String,
        amount: FixedAmount,
    },
    TokenTransfer {
        contract: String,
        recipient: String,
        amount: FixedAmount,
    },
}

/// Fully assembled transaction, ready for either signing path.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsignedTransaction {
    pub from: String,
    pub action: TxAction,
    /// Optional sender note, attached by the adapter where the chain
    /// supports it.
    pub memo: Option<String>,
    pub gas: u64,
    pub gas_price: FixedAmount,
    pub chain_id: u64,
}

/// A confirmed transfer, frozen at confirmation time. The engine submits
/// exactly these values; nothing is re-read from the form afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub token: TokenDescriptor,
    /// Reconciled amount (already reduced by the fee for send-max).
    pub amount: FixedAmount,
    pub fee: FeeQuote,
    pub message: String,
}

/// Successful submission outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub hash: String,
}

// ============================================================================
// Signing Adapter
// ============================================================================

/// Routes a confirmed transfer to the signing path the session credential
/// calls for.
pub struct SigningAdapter {
    chain: Arc<dyn NetworkAdapter>,
}

impl SigningAdapter {
    pub fn new(chain: Arc<dyn NetworkAdapter>) -> Self {
        Self { chain }
    }

    fn build_unsigned(request: &TransferRequest, session: &SessionContext) -> UnsignedTransaction {
        let action = match request.token.kind {
            TokenKind::Currency => TxAction::NativeTransfer {
                recipient: request.to.clone(),
                amount: request.amount.clone(),
            },
            TokenKind::SeparateFeeToken | TokenKind::SelfFeeToken => TxAction::TokenTransfer {
                contract: request.token.contract_address.clone(),
                recipient: request.to.clone(),
                amount: request.amount.clone(),
            },
        };
        let memo = if request.message.is_empty() {
            None
        } else {
            Some(request.message.clone())
        };
        UnsignedTransaction {
            from: request.from.clone(),
            action,
            memo,
            gas: request.fee.gas,
            gas_price: request.fee.gas_price.clone(),
            chain_id: session.chain_id,
        }
    }

    /// Submit the transfer and return the transaction hash.
    ///
    /// # Errors
    /// - [`WorkflowError::DeviceRejected`] when the user declines on the
    ///   hardware device.
    /// - [`WorkflowError::DeviceUnavailable`] when the device cannot be
    ///   reached or fails mid-signing.
    /// - [`WorkflowError::BroadcastFailed`] when the network refuses or
    ///   drops the transaction on either path.
    pub async fn submit(
        &self,
        request: &TransferRequest,
        session: &SessionContext,
    ) -> Result<TransactionResult, WorkflowError> {
        let tx = Self::build_unsigned(request, session);
        debug!(
            token = %request.token.symbol,
            amount = %request.amount,
            credential = session.credential.as_str(),
            chain_id = tx.chain_id,
            "submitting transfer"
        );

        let hash = match &session.credential {
            Credential::LocalKey => self
                .chain
                .send_with_local_key(tx)
                .await
                .map_err(|e| WorkflowError::BroadcastFailed(e.message()))?,
            Credential::HardwareDevice { derivation_path } => {
                let raw = self
                    .chain
                    .sign_with_device(tx, derivation_path)
                    .await
                    .map_err(|e| match e {
                        ChainError::DeviceRejected => WorkflowError::DeviceRejected,
                        ChainError::DeviceUnavailable(msg) => WorkflowError::DeviceUnavailable(msg),
                        other => WorkflowError::DeviceUnavailable(other.message()),
                    })?;
                self.chain
                    .broadcast_signed(raw)
                    .await
                    .map_err(|e| WorkflowError::BroadcastFailed(e.message()))?
            }
        };

        info!(hash = %hash, token = %request.token.symbol, "transfer submitted");
        Ok(TransactionResult { hash })
    }
}

// ============================================================================
// Tests
// ============================================================================
