//! Fee Quotes and Reconciliation
//!
//! A transfer's fee is funded differently per token kind: the native
//! currency pays its fee out of the transfer balance itself, separate-fee
//! tokens pay in native currency from an untouched balance, and self-fee
//! tokens pay out of the token balance being sent. This module owns the
//! funding taxonomy, the one-round-trip estimate call, and the
//! reconciliation of entered amount vs balance vs fee.
//!
//! ## Reconciliation rules
//! - Send-max (entered amount equals the full balance, by exact
//!   smallest-unit equality): silently reduce the amount to `balance - fee`.
//!   This is the only place the engine mutates user input.
//! - Partial amount where `amount + fee > balance`: fail; never adjust a
//!   partial request.
//! - Detached fee (separate-fee tokens): the token amount is never touched,
//!   but the native balance must cover the fee.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::amount::FixedAmount;
use crate::chain::{NetworkAdapter, TransferDraft};
use crate::session::Network;
use crate::token::{NATIVE_DECIMALS, TokenDescriptor, TokenKind};
use crate::workflow::WorkflowError;

/// How a quoted fee is funded relative to the transfer amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeFunding {
    /// Fee and transfer amount are drawn from the same native-currency
    /// balance.
    SharedNative,
    /// Fee is drawn from the native balance; the token balance is untouched.
    DetachedNative,
    /// Fee is drawn from the transferred token's own balance.
    TokenBalance,
}

impl FeeFunding {
    /// Funding kind implied by a token kind. Total; every token kind has
    /// exactly one funding rule.
    pub fn for_kind(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Currency => FeeFunding::SharedNative,
            TokenKind::SeparateFeeToken => FeeFunding::DetachedNative,
            TokenKind::SelfFeeToken => FeeFunding::TokenBalance,
        }
    }

    /// Scale a quote of this funding kind must carry.
    pub fn fee_scale(&self, token: &TokenDescriptor) -> u8 {
        match self {
            FeeFunding::TokenBalance => token.decimals,
            FeeFunding::SharedNative | FeeFunding::DetachedNative => NATIVE_DECIMALS,
        }
    }

    /// Whether the fee competes with the transfer amount for one balance.
    #[inline]
    pub fn shares_transfer_balance(&self) -> bool {
        matches!(self, FeeFunding::SharedNative | FeeFunding::TokenBalance)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeeFunding::SharedNative => "SHARED_NATIVE",
            FeeFunding::DetachedNative => "DETACHED_NATIVE",
            FeeFunding::TokenBalance => "TOKEN_BALANCE",
        }
    }
}

/// A fee quote for one confirmation attempt. Recomputed every attempt and
/// never cached across token or amount changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeQuote {
    pub funding: FeeFunding,
    /// Fee in the fee currency, scaled per `funding`.
    pub amount: FixedAmount,
    /// Gas limit carried into the submitted transaction.
    pub gas: u64,
    /// Gas price, scaled to the native decimals.
    pub gas_price: FixedAmount,
}

// ============================================================================
// Estimation
// ============================================================================

/// One estimate round trip plus contract checks on what comes back.
pub struct FeeEstimator {
    chain: Arc<dyn NetworkAdapter>,
}

impl FeeEstimator {
    pub fn new(chain: Arc<dyn NetworkAdapter>) -> Self {
        Self { chain }
    }

    /// Obtain a [`FeeQuote`] for the draft.
    ///
    /// # Errors
    /// [`WorkflowError::FeeEstimationFailed`] for any network error, and for
    /// a quote whose funding kind or scale contradicts the token. The
    /// adapter is external, so a bad quote is reported, not asserted.
    pub async fn estimate(
        &self,
        token: &TokenDescriptor,
        draft: &TransferDraft,
        network: Network,
    ) -> Result<FeeQuote, WorkflowError> {
        let quote = self
            .chain
            .estimate_fee(token, draft, network)
            .await
            .map_err(|e| WorkflowError::FeeEstimationFailed(e.message()))?;

        let expected = FeeFunding::for_kind(token.kind);
        if quote.funding != expected {
            return Err(WorkflowError::FeeEstimationFailed(format!(
                "adapter quoted {} fee for a {} token",
                quote.funding.as_str(),
                token.kind
            )));
        }
        let expected_scale = expected.fee_scale(token);
        if quote.amount.scale() != expected_scale {
            return Err(WorkflowError::FeeEstimationFailed(format!(
                "fee quoted at scale {}, expected {}",
                quote.amount.scale(),
                expected_scale
            )));
        }

        debug!(
            funding = quote.funding.as_str(),
            fee = %quote.amount,
            gas = quote.gas,
            "fee quote accepted"
        );
        Ok(quote)
    }
}

// ============================================================================
// Reconciliation
// ============================================================================

/// Outcome of reconciling an entered amount against balance and fee.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    /// Amount to transfer.
    pub amount: FixedAmount,
    /// True when a send-max request was reduced by the fee.
    pub adjusted: bool,
}

/// Apply the reconciliation policy for one quote.
///
/// `entered` must be scaled to the token's decimals and already validated
/// against the balance; `native_balance` is the wallet's native-currency
/// balance, consulted only for detached fees.
///
/// # Errors
/// [`WorkflowError::InsufficientFeeFromBalance`] when the balance cannot
/// cover fee plus amount (shared funding), or the native balance cannot
/// cover a detached fee.
pub fn reconcile(
    entered: &FixedAmount,
    quote: &FeeQuote,
    token: &TokenDescriptor,
    native_balance: &FixedAmount,
) -> Result<Reconciled, WorkflowError> {
    match quote.funding {
        FeeFunding::DetachedNative => {
            if quote.amount.exceeds(native_balance) {
                return Err(WorkflowError::InsufficientFeeFromBalance);
            }
            // The token amount is independent of the fee; never adjusted.
            Ok(Reconciled {
                amount: entered.clone(),
                adjusted: false,
            })
        }
        FeeFunding::SharedNative | FeeFunding::TokenBalance => {
            let balance = &token.balance;
            if entered == balance {
                // Send-max: reduce by the fee instead of failing. A fee
                // equal to the whole balance still succeeds with amount 0;
                // only fee > balance fails.
                return match balance.sub(&quote.amount) {
                    Ok(amount) => Ok(Reconciled {
                        amount,
                        adjusted: true,
                    }),
                    Err(_) => Err(WorkflowError::InsufficientFeeFromBalance),
                };
            }
            let total = entered.add(&quote.amount);
            if total.exceeds(balance) {
                return Err(WorkflowError::InsufficientFeeFromBalance);
            }
            Ok(Reconciled {
                amount: entered.clone(),
                adjusted: false,
            })
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
