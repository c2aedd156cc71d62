//! sendflow - Token Transfer Preparation & Fee Reconciliation Engine
//!
//! Turns a user's transfer intent (recipient, token, amount) into a
//! validated, fee-aware, signable transaction, and manages the workflow from
//! input through confirmation to submission. Rendering, key storage, and RPC
//! transport stay outside; the engine talks to them through the narrow
//! contracts in [`chain`].
//!
//! # Modules
//!
//! - [`amount`] - Fixed-point decimal amounts over `BigUint`
//! - [`token`] - Token descriptors and the fee-payment kinds
//! - [`session`] - Network, credential, and per-workflow session context
//! - [`chain`] - Collaborator contracts (network adapter, balance provider, address validation)
//! - [`validation`] - Form validation with accumulated per-field errors
//! - [`fee`] - Fee quotes, estimation, and amount/fee reconciliation
//! - [`signing`] - Transaction assembly and credential-dispatched submission
//! - [`sync`] - Post-success balance refresh
//! - [`workflow`] - The send workflow state machine
//! - [`config`] - Engine configuration and network profiles
//! - [`logging`] - tracing subscriber setup

// Pure leaves - no I/O anywhere below
pub mod amount;
pub mod session;
pub mod token;

// Collaborator contracts
pub mod chain;

// Engine components
pub mod fee;
pub mod signing;
pub mod sync;
pub mod validation;
pub mod workflow;

// Ambient concerns
pub mod config;
pub mod logging;

// Convenient re-exports at crate root
pub use amount::{AmountError, FixedAmount};
pub use chain::{
    AddressValidator, BalanceProvider, ChainError, HexAddressValidator, NetworkAdapter,
    RawTransaction, TransferDraft,
};
pub use config::{EngineConfig, NetworkProfile, NetworkProfiles};
pub use fee::{FeeEstimator, FeeFunding, FeeQuote, Reconciled, reconcile};
pub use logging::init_logging;
pub use session::{Credential, Network, SessionContext, WalletSnapshot};
pub use signing::{
    SigningAdapter, TransactionResult, TransferRequest, TxAction, UnsignedTransaction,
};
pub use sync::BalanceSync;
pub use token::{NATIVE_DECIMALS, TokenDescriptor, TokenKind};
pub use validation::{
    Field, MESSAGE_MAX_UNITS, PreparedTransfer, TransferForm, ValidationError, prepare, validate,
};
pub use workflow::{TransferOrchestrator, TransferStage, WorkflowError, WorkflowSnapshot};
