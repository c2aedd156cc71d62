//! Transfer Orchestrator
//!
//! Drives one send workflow: field edits, validation, fee estimation and
//! reconciliation, confirmation, submission, and the post-success balance
//! refresh. All reads go through [`WorkflowSnapshot`]; failures are data in
//! the snapshot, not return errors.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::chain::{
    AddressValidator, BalanceProvider, HexAddressValidator, NetworkAdapter, TransferDraft,
};
use crate::fee::{self, FeeEstimator, FeeQuote};
use crate::session::{SessionContext, WalletSnapshot};
use crate::signing::{SigningAdapter, TransactionResult, TransferRequest};
use crate::sync::BalanceSync;
use crate::token::TokenDescriptor;
use crate::validation::{self, TransferForm, ValidationError};

use super::{TransferStage, WorkflowError};

// ============================================================================
// Observable State
// ============================================================================

/// Everything the presentation layer needs to render one workflow: current
/// stage, form contents, per-field validation errors, the last workflow
/// failure (if any), the accepted fee quote and submission result (once
/// known), and the published wallet snapshot.
#[derive(Debug, Clone)]
pub struct WorkflowSnapshot {
    pub stage: TransferStage,
    pub form: TransferForm,
    pub validation_errors: Vec<ValidationError>,
    pub failure: Option<WorkflowError>,
    pub fee: Option<FeeQuote>,
    pub result: Option<TransactionResult>,
    pub wallet: WalletSnapshot,
}

/// Mutable workflow state, owned by the orchestrator behind a mutex. The
/// lock is held only across non-suspending sections.
struct WorkflowState {
    stage: TransferStage,
    form: TransferForm,
    validation_errors: Vec<ValidationError>,
    failure: Option<WorkflowError>,
    fee: Option<FeeQuote>,
    /// Frozen request awaiting the user's confirm. Present exactly while
    /// the stage is `Confirmation`.
    pending: Option<TransferRequest>,
    result: Option<TransactionResult>,
    wallet: WalletSnapshot,
}

impl WorkflowState {
    fn new(wallet: WalletSnapshot) -> Self {
        Self {
            stage: TransferStage::Input,
            form: TransferForm::default(),
            validation_errors: Vec::new(),
            failure: None,
            fee: None,
            pending: None,
            result: None,
            wallet,
        }
    }

    fn observable(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            stage: self.stage,
            form: self.form.clone(),
            validation_errors: self.validation_errors.clone(),
            failure: self.failure.clone(),
            fee: self.fee.clone(),
            result: self.result.clone(),
            wallet: self.wallet.clone(),
        }
    }

    /// Back to a pristine form. The wallet snapshot survives; it belongs to
    /// the wallet, not to one popup.
    fn reset(&mut self) {
        self.stage = TransferStage::Input;
        self.form.reset();
        self.validation_errors.clear();
        self.failure = None;
        self.fee = None;
        self.pending = None;
        self.result = None;
    }

    /// Leave `Confirmation` without submitting. Typed values survive; the
    /// quote does not (it is recomputed on the next attempt).
    fn drop_quote(&mut self) {
        self.stage = TransferStage::Input;
        self.fee = None;
        self.pending = None;
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// One send workflow instance. Create when the send popup opens; every
/// method takes `&self`, so the orchestrator can live in an `Arc` shared
/// with spawned tasks.
pub struct TransferOrchestrator {
    session: SessionContext,
    /// Correlates every log line of this workflow.
    flow_id: String,
    estimator: FeeEstimator,
    signer: SigningAdapter,
    sync: BalanceSync,
    validator: Arc<dyn AddressValidator>,
    /// Bumped by `close()`; in-flight operations compare their snapshot of
    /// this counter before applying results.
    generation: AtomicU64,
    state: Mutex<WorkflowState>,
}

impl TransferOrchestrator {
    /// Create an orchestrator with the stock hex address validator.
    pub fn new(
        session: SessionContext,
        wallet: WalletSnapshot,
        chain: Arc<dyn NetworkAdapter>,
        balances: Arc<dyn BalanceProvider>,
    ) -> Self {
        Self::with_validator(session, wallet, chain, balances, Arc::new(HexAddressValidator))
    }

    /// Create an orchestrator with a custom address validator (checksummed
    /// formats, ENS-style resolution done upstream, and so on).
    pub fn with_validator(
        session: SessionContext,
        wallet: WalletSnapshot,
        chain: Arc<dyn NetworkAdapter>,
        balances: Arc<dyn BalanceProvider>,
        validator: Arc<dyn AddressValidator>,
    ) -> Self {
        assert_eq!(
            wallet.address, session.address,
            "wallet snapshot must belong to the session address"
        );
        let flow_id = Ulid::new().to_string();
        debug!(
            flow_id = %flow_id,
            address = %session.address,
            network = session.network.as_str(),
            credential = session.credential.as_str(),
            "send workflow opened"
        );
        Self {
            estimator: FeeEstimator::new(chain.clone()),
            signer: SigningAdapter::new(chain),
            sync: BalanceSync::new(balances),
            validator,
            generation: AtomicU64::new(0),
            state: Mutex::new(WorkflowState::new(wallet)),
            session,
            flow_id,
        }
    }

    /// Current observable state.
    pub fn snapshot(&self) -> WorkflowSnapshot {
        self.state.lock().unwrap().observable()
    }

    // ------------------------------------------------------------------
    // Field editing (Input stage only)
    // ------------------------------------------------------------------

    pub fn select_token(&self, token: TokenDescriptor) -> WorkflowSnapshot {
        self.edit(|form| form.token = Some(token))
    }

    pub fn set_recipient(&self, recipient: impl Into<String>) -> WorkflowSnapshot {
        let recipient = recipient.into();
        self.edit(|form| form.recipient = recipient)
    }

    pub fn set_amount(&self, amount: impl Into<String>) -> WorkflowSnapshot {
        let amount = amount.into();
        self.edit(|form| form.amount = amount)
    }

    pub fn set_message(&self, message: impl Into<String>) -> WorkflowSnapshot {
        let message = message.into();
        self.edit(|form| form.message = message)
    }

    /// Send-max shortcut: copy the selected token's full balance into the
    /// amount field as a trimmed decimal string. No-op without a token.
    pub fn use_full_balance(&self) -> WorkflowSnapshot {
        self.edit(|form| {
            if let Some(token) = &form.token {
                form.amount = token.balance.to_decimal_string();
            }
        })
    }

    /// Apply one form edit. Edits are accepted only while the form is
    /// editable and clear previously surfaced errors, so the next attempt
    /// re-validates from scratch.
    fn edit(&self, apply: impl FnOnce(&mut TransferForm)) -> WorkflowSnapshot {
        let mut state = self.state.lock().unwrap();
        if state.stage != TransferStage::Input {
            debug!(flow_id = %self.flow_id, stage = %state.stage, "field edit ignored");
            return state.observable();
        }
        apply(&mut state.form);
        state.validation_errors.clear();
        state.failure = None;
        state.observable()
    }

    // ------------------------------------------------------------------
    // Input -> Estimating -> Confirmation
    // ------------------------------------------------------------------

    /// Validate the form and, if clean, fetch and reconcile a fee quote.
    ///
    /// Ends in `Confirmation` with the accepted quote, or back in `Input`
    /// with either validation errors (no network call made) or the workflow
    /// failure. For a send-max request the reconciled amount replaces the
    /// amount field content. Calls outside `Input` are ignored.
    pub async fn request_confirmation(&self) -> WorkflowSnapshot {
        let (generation, prepared) = {
            let mut state = self.state.lock().unwrap();
            if state.stage != TransferStage::Input {
                debug!(
                    flow_id = %self.flow_id,
                    stage = %state.stage,
                    "confirmation request ignored"
                );
                return state.observable();
            }
            state.failure = None;
            let prepared =
                match validation::prepare(&state.form, self.session.network, self.validator.as_ref())
                {
                    Ok(prepared) => prepared,
                    Err(errors) => {
                        info!(
                            flow_id = %self.flow_id,
                            errors = errors.len(),
                            "form rejected, staying in input"
                        );
                        state.validation_errors = errors;
                        return state.observable();
                    }
                };
            state.validation_errors.clear();
            state.fee = None;
            state.pending = None;
            state.stage = TransferStage::Estimating;
            (self.generation.load(Ordering::SeqCst), prepared)
        };

        info!(
            flow_id = %self.flow_id,
            token = %prepared.token.symbol,
            amount = %prepared.amount,
            "estimating fee"
        );
        let draft = TransferDraft {
            from: self.session.address.clone(),
            to: prepared.recipient.clone(),
            amount: prepared.amount.clone(),
        };
        let outcome = self
            .estimator
            .estimate(&prepared.token, &draft, self.session.network)
            .await;

        let mut state = self.state.lock().unwrap();
        if let Err(stale) = self.guard_generation(generation) {
            debug!(flow_id = %self.flow_id, code = stale.code(), "late fee quote discarded");
            return state.observable();
        }

        let quote = match outcome {
            Ok(quote) => quote,
            Err(err) => {
                warn!(flow_id = %self.flow_id, code = err.code(), error = %err, "fee estimation failed");
                state.stage = TransferStage::Input;
                state.failure = Some(err);
                return state.observable();
            }
        };

        match fee::reconcile(
            &prepared.amount,
            &quote,
            &prepared.token,
            &state.wallet.native_balance,
        ) {
            Ok(reconciled) => {
                if reconciled.adjusted {
                    // Surface the reduced send-max amount in the form.
                    state.form.amount = reconciled.amount.to_decimal_string();
                    info!(
                        flow_id = %self.flow_id,
                        amount = %reconciled.amount,
                        fee = %quote.amount,
                        "send-max amount reduced by fee"
                    );
                }
                info!(
                    flow_id = %self.flow_id,
                    fee = %quote.amount,
                    funding = quote.funding.as_str(),
                    "awaiting confirmation"
                );
                state.pending = Some(TransferRequest {
                    from: self.session.address.clone(),
                    to: prepared.recipient,
                    token: prepared.token,
                    amount: reconciled.amount,
                    fee: quote.clone(),
                    message: prepared.message,
                });
                state.fee = Some(quote);
                state.stage = TransferStage::Confirmation;
            }
            Err(err) => {
                warn!(flow_id = %self.flow_id, code = err.code(), "fee reconciliation failed");
                state.stage = TransferStage::Input;
                state.failure = Some(err);
            }
        }
        state.observable()
    }

    // ------------------------------------------------------------------
    // Confirmation -> Submitting -> Success
    // ------------------------------------------------------------------

    /// Submit the confirmed transfer.
    ///
    /// Ends in `Success` with the transaction hash (then refreshes the
    /// wallet balance once), or back in `Input` with the failure surfaced.
    ///
    /// # Panics
    /// Calling this outside `Confirmation` is a contract violation: there
    /// is no confirmed request to submit.
    pub async fn confirm(&self) -> WorkflowSnapshot {
        let (generation, request) = {
            let mut state = self.state.lock().unwrap();
            let request = match (state.stage, state.pending.clone()) {
                (TransferStage::Confirmation, Some(request)) => request,
                (stage, _) => panic!("confirm() called in {stage} stage"),
            };
            state.stage = TransferStage::Submitting;
            state.failure = None;
            (self.generation.load(Ordering::SeqCst), request)
        };

        info!(
            flow_id = %self.flow_id,
            token = %request.token.symbol,
            amount = %request.amount,
            credential = self.session.credential.as_str(),
            "submitting transfer"
        );
        let outcome = self.signer.submit(&request, &self.session).await;

        let submitted = {
            let mut state = self.state.lock().unwrap();
            if let Err(stale) = self.guard_generation(generation) {
                debug!(flow_id = %self.flow_id, code = stale.code(), "late submission result discarded");
                return state.observable();
            }
            match outcome {
                Ok(result) => {
                    info!(flow_id = %self.flow_id, hash = %result.hash, "transfer succeeded");
                    state.stage = TransferStage::Success;
                    state.result = Some(result);
                    state.pending = None;
                    true
                }
                Err(err) => {
                    warn!(flow_id = %self.flow_id, code = err.code(), error = %err, "submission failed");
                    state.failure = Some(err);
                    state.drop_quote();
                    false
                }
            }
        };

        if submitted {
            self.refresh_wallet(generation).await;
        }
        self.snapshot()
    }

    /// One post-success balance refresh. A failure here never demotes the
    /// succeeded transfer; the stale snapshot is kept and the error logged.
    async fn refresh_wallet(&self, generation: u64) {
        match self
            .sync
            .refresh(&self.session.address, self.session.network)
            .await
        {
            Ok(snapshot) => {
                let mut state = self.state.lock().unwrap();
                if let Err(stale) = self.guard_generation(generation) {
                    debug!(flow_id = %self.flow_id, code = stale.code(), "late balance refresh discarded");
                    return;
                }
                state.wallet = snapshot;
            }
            Err(err) => {
                warn!(
                    flow_id = %self.flow_id,
                    error = %err.message(),
                    "balance refresh failed after successful transfer"
                );
            }
        }
    }

    // ------------------------------------------------------------------
    // Cancel / close
    // ------------------------------------------------------------------

    /// Back out of the workflow. From `Confirmation` the typed values are
    /// kept and only the quote is dropped; from a terminal stage the form is
    /// reset for the next transfer. Ignored while a round trip is in flight.
    pub fn cancel(&self) -> WorkflowSnapshot {
        let mut state = self.state.lock().unwrap();
        match state.stage {
            TransferStage::Confirmation => {
                info!(flow_id = %self.flow_id, "confirmation cancelled");
                state.drop_quote();
            }
            TransferStage::Success | TransferStage::Failed => {
                info!(flow_id = %self.flow_id, stage = %state.stage, "workflow reset");
                state.reset();
            }
            stage => {
                debug!(flow_id = %self.flow_id, stage = %stage, "cancel ignored");
            }
        }
        state.observable()
    }

    /// Popup closed: reset the form and supersede in-flight work, so a late
    /// response cannot apply state to the fresh form.
    pub fn close(&self) -> WorkflowSnapshot {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        info!(flow_id = %self.flow_id, stage = %state.stage, "workflow closed");
        state.reset();
        state.observable()
    }

    fn guard_generation(&self, generation: u64) -> Result<(), WorkflowError> {
        if self.generation.load(Ordering::SeqCst) == generation {
            Ok(())
        } else {
            Err(WorkflowError::StaleResponse)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::FixedAmount;
    use crate::chain::{MockBalances, MockChain};
    use crate::config::EngineConfig;
    use crate::session::{Credential, Network};
    use crate::token::NATIVE_DECIMALS;

    const SENDER: &str = "0x25b9fa2b62f56a0bb9c5bac2b5bea8cbd41f90cc";

    fn orchestrator() -> TransferOrchestrator {
        let config = EngineConfig::default();
        let session = SessionContext::new(
            SENDER,
            Network::Testnet,
            Credential::LocalKey,
            config.profile(Network::Testnet),
        );
        let wallet = WalletSnapshot::new(
            SENDER,
            FixedAmount::parse("10", NATIVE_DECIMALS).unwrap(),
        );
        let chain = Arc::new(MockChain::new(
            FixedAmount::parse("0.01", NATIVE_DECIMALS).unwrap(),
        ));
        let balances = Arc::new(MockBalances::new(
            FixedAmount::parse("10", NATIVE_DECIMALS).unwrap(),
        ));
        TransferOrchestrator::new(session, wallet, chain, balances)
    }

    #[test]
    fn test_fresh_workflow_snapshot() {
        let orch = orchestrator();
        let snapshot = orch.snapshot();
        assert_eq!(snapshot.stage, TransferStage::Input);
        assert_eq!(snapshot.form, TransferForm::default());
        assert!(snapshot.validation_errors.is_empty());
        assert!(snapshot.failure.is_none());
        assert!(snapshot.fee.is_none());
        assert!(snapshot.result.is_none());
        assert_eq!(snapshot.wallet.address, SENDER);
    }

    #[tokio::test]
    #[should_panic(expected = "confirm() called in INPUT stage")]
    async fn test_confirm_outside_confirmation_panics() {
        let orch = orchestrator();
        orch.confirm().await;
    }

    #[test]
    #[should_panic(expected = "wallet snapshot must belong to the session address")]
    fn test_wallet_session_address_mismatch_panics() {
        let config = EngineConfig::default();
        let session = SessionContext::new(
            SENDER,
            Network::Testnet,
            Credential::LocalKey,
            config.profile(Network::Testnet),
        );
        let wallet = WalletSnapshot::new(
            "0x0000000000000000000000000000000000000bad",
            FixedAmount::zero(NATIVE_DECIMALS),
        );
        let chain = Arc::new(MockChain::new(FixedAmount::zero(NATIVE_DECIMALS)));
        let balances = Arc::new(MockBalances::new(FixedAmount::zero(NATIVE_DECIMALS)));
        let _ = TransferOrchestrator::new(session, wallet, chain, balances);
    }
}
