//! Token Descriptors
//!
//! Type definitions for the assets a transfer can move. Descriptors are
//! immutable snapshots fetched by the embedding application; the engine only
//! reads them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::amount::FixedAmount;

/// Decimal count of the chain's native currency.
pub const NATIVE_DECIMALS: u8 = 18;

/// Fee-payment class of a transferable asset.
///
/// Closed on purpose: fee reconciliation and transaction construction match
/// on this exhaustively, so a new asset class is a compile-time event, not a
/// forgotten `else` branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// The chain's base asset. The network fee is drawn from the same
    /// balance as the transfer amount.
    Currency,
    /// Standard token whose transfers are fee-paid in native currency,
    /// decoupled from the token balance.
    SeparateFeeToken,
    /// Standard token whose transfers are fee-paid from the token's own
    /// balance, alongside the transfer amount.
    SelfFeeToken,
}

impl TokenKind {
    /// Human-readable name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Currency => "CURRENCY",
            TokenKind::SeparateFeeToken => "SEPARATE_FEE_TOKEN",
            TokenKind::SelfFeeToken => "SELF_FEE_TOKEN",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable snapshot of a transferable asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    /// Display symbol, e.g. "ETH".
    pub symbol: String,
    /// Token contract address; empty for the native currency.
    pub contract_address: String,
    /// Decimal count. Every amount of this token, including `balance`,
    /// carries this as its scale.
    pub decimals: u8,
    /// Fee-payment class.
    pub kind: TokenKind,
    /// Available balance at snapshot time.
    pub balance: FixedAmount,
}

impl TokenDescriptor {
    /// Descriptor for the native currency.
    ///
    /// # Panics
    /// Panics if `balance` is not scaled to [`NATIVE_DECIMALS`].
    pub fn native(symbol: impl Into<String>, balance: FixedAmount) -> Self {
        assert_eq!(
            balance.scale(),
            NATIVE_DECIMALS,
            "native balance must be scaled to {NATIVE_DECIMALS} decimals"
        );
        Self {
            symbol: symbol.into(),
            contract_address: String::new(),
            decimals: NATIVE_DECIMALS,
            kind: TokenKind::Currency,
            balance,
        }
    }

    /// Descriptor for a standard token at a contract address.
    ///
    /// # Panics
    /// Panics if `balance.scale()` differs from `decimals`, or if `kind` is
    /// [`TokenKind::Currency`] (the native currency has no contract).
    pub fn standard(
        symbol: impl Into<String>,
        contract_address: impl Into<String>,
        decimals: u8,
        kind: TokenKind,
        balance: FixedAmount,
    ) -> Self {
        assert_ne!(
            kind,
            TokenKind::Currency,
            "standard tokens must be a token kind"
        );
        assert_eq!(
            balance.scale(),
            decimals,
            "token balance scale must equal the token decimals"
        );
        Self {
            symbol: symbol.into(),
            contract_address: contract_address.into(),
            decimals,
            kind,
            balance,
        }
    }

    #[inline]
    pub fn is_native(&self) -> bool {
        matches!(self.kind, TokenKind::Currency)
    }

    /// Replace the balance snapshot, keeping everything else.
    pub fn with_balance(mut self, balance: FixedAmount) -> Self {
        assert_eq!(
            balance.scale(),
            self.decimals,
            "token balance scale must equal the token decimals"
        );
        self.balance = balance;
        self
    }
}

impl fmt::Display for TokenDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) balance={}",
            self.symbol,
            self.kind,
            self.balance.to_decimal_string()
        )
    }
}
