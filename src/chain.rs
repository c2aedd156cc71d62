//! Collaborator contracts: the narrow interfaces the engine calls instead of
//! owning wallet RPC, key handling, or balance fetching itself.

use async_trait::async_trait;
use thiserror::Error;

use crate::amount::FixedAmount;
use crate::fee::FeeQuote;
use crate::session::Network;
use crate::signing::UnsignedTransaction;
use crate::token::TokenDescriptor;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("network error: {0}")]
    Network(String),
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("signing device rejected the transaction")]
    DeviceRejected,
    #[error("signing device unavailable: {0}")]
    DeviceUnavailable(String),
}

impl From<anyhow::Error> for ChainError {
    fn from(err: anyhow::Error) -> Self {
        ChainError::Network(err.to_string())
    }
}

impl ChainError {
    /// Flatten to the message shown to the user.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Draft of a transfer, as handed to fee estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferDraft {
    pub from: String,
    pub to: String,
    pub amount: FixedAmount,
}

/// A signed transaction as returned by an external signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction(pub Vec<u8>);

impl RawTransaction {
    /// Hex rendering for logs and RPC payloads.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

/// Network-facing operations. Implemented by the embedding application over
/// its RPC client of choice; the engine never opens a socket itself.
#[async_trait]
pub trait NetworkAdapter: Send + Sync {
    /// Quote the fee for a draft transfer. One round trip; the quote must be
    /// scaled to the fee currency implied by the token kind.
    async fn estimate_fee(
        &self,
        token: &TokenDescriptor,
        draft: &TransferDraft,
        network: Network,
    ) -> Result<FeeQuote, ChainError>;

    /// Construct, sign with the provider-held local key, and broadcast in
    /// one round trip. Returns the transaction hash.
    async fn send_with_local_key(&self, tx: UnsignedTransaction) -> Result<String, ChainError>;

    /// Ask the hardware device to sign. Must distinguish an on-device
    /// rejection ([`ChainError::DeviceRejected`]) from the device being
    /// unreachable ([`ChainError::DeviceUnavailable`]).
    async fn sign_with_device(
        &self,
        tx: UnsignedTransaction,
        derivation_path: &str,
    ) -> Result<RawTransaction, ChainError>;

    /// Broadcast an externally signed transaction. Returns the transaction
    /// hash.
    async fn broadcast_signed(&self, raw: RawTransaction) -> Result<String, ChainError>;
}

/// Balance reads, used by the post-success refresh.
#[async_trait]
pub trait BalanceProvider: Send + Sync {
    /// Native-currency balance of `address`, scaled to the native decimals.
    async fn balance_of(&self, address: &str, network: Network) -> Result<FixedAmount, ChainError>;
}

/// Syntactic address validation. Pure; no network access.
pub trait AddressValidator: Send + Sync {
    fn is_valid(&self, address: &str, network: Network) -> bool;
}

/// Format-only validator for hex account addresses: `0x` followed by 40 hex
/// digits, any case. Checksum policy is left to embedders with their own
/// [`AddressValidator`].
#[derive(Debug, Default)]
pub struct HexAddressValidator;

impl AddressValidator for HexAddressValidator {
    fn is_valid(&self, address: &str, _network: Network) -> bool {
        match address.strip_prefix("0x") {
            Some(body) => body.len() == 40 && body.bytes().all(|b| b.is_ascii_hexdigit()),
            None => false,
        }
    }
}


#[cfg(test)]
pub use mock::{MockBalances, MockChain};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_address_validator() {
        let validator = HexAddressValidator;
        let ok = "0x687422eea2cb73b5d3e242ba5456b782919afc85";
        assert!(validator.is_valid(ok, Network::Mainnet));
        assert!(validator.is_valid(&ok.to_uppercase().replace("0X", "0x"), Network::Testnet));

        let bad = [
            "",
            "0x",
            "687422eea2cb73b5d3e242ba5456b782919afc85",     // no prefix
            "0x687422eea2cb73b5d3e242ba5456b782919afc8",    // 39 digits
            "0x687422eea2cb73b5d3e242ba5456b782919afc855",  // 41 digits
            "0x687422eea2cb73b5d3e242ba5456b782919afcg5",   // non-hex
            "1M1CHFBDpHtJeEDDRZ7XTn3xBmVNvosNpj",           // different chain format
        ];
        for case in bad {
            assert!(
                !validator.is_valid(case, Network::Mainnet),
                "should reject {case:?}"
            );
        }
    }

    #[test]
    fn test_raw_transaction_hex() {
        let raw = RawTransaction(vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(raw.to_hex(), "0xdeadbeef");
    }

    #[test]
    fn test_chain_error_from_anyhow() {
        let err: ChainError = anyhow::anyhow!("node unreachable").into();
        assert!(matches!(err, ChainError::Network(_)));
        assert!(err.message().contains("node unreachable"));
    }
}
