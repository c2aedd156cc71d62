//! Session Context
//!
//! The wallet/session state a workflow needs: active address, network,
//! credential source. Passed explicitly to the orchestrator at construction
//! so the engine never reads ambient globals and stays testable in
//! isolation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::amount::FixedAmount;
use crate::config::NetworkProfile;

/// Target chain of the active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the signing key lives.
///
/// Selection of the signing path is a pure function of this value and never
/// depends on the token being sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Key held by the network provider; construct, sign, and broadcast in
    /// one round trip.
    LocalKey,
    /// External signing device holding the key; carries the derivation path
    /// the device is currently unlocked for.
    HardwareDevice { derivation_path: String },
}

impl Credential {
    /// Human-readable name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Credential::LocalKey => "LOCAL_KEY",
            Credential::HardwareDevice { .. } => "HARDWARE_DEVICE",
        }
    }
}

/// Published wallet state: the active address and its native-currency
/// balance. Re-read after every successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSnapshot {
    pub address: String,
    pub native_balance: FixedAmount,
}

impl WalletSnapshot {
    pub fn new(address: impl Into<String>, native_balance: FixedAmount) -> Self {
        Self {
            address: address.into(),
            native_balance,
        }
    }
}

/// Explicit session state threaded through one workflow instance.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Active account address; the `from` of every transfer.
    pub address: String,
    pub network: Network,
    /// Chain identifier resolved from the network profile at construction,
    /// so signing never consults configuration or globals.
    pub chain_id: u64,
    pub credential: Credential,
}

impl SessionContext {
    pub fn new(
        address: impl Into<String>,
        network: Network,
        credential: Credential,
        profile: &NetworkProfile,
    ) -> Self {
        Self {
            address: address.into(),
            network,
            chain_id: profile.chain_id,
            credential,
        }
    }
}
