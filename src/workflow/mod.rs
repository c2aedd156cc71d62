//! Send Workflow State Machine
//!
//! Coordinates one token transfer from form input through confirmation to
//! submission: validation → fee estimation → fee reconciliation → user
//! confirmation → signing/broadcast → post-success balance refresh.
//!
//! # Stage Machine
//!
//! ```text
//! INPUT → ESTIMATING → CONFIRMATION → SUBMITTING → SUCCESS
//!   ↑         │              │             │
//!   └─────────┴──────────────┴─────────────┘
//!   (validation errors, fee problems, network/device
//!    failures, and cancel all route back to INPUT)
//! ```
//!
//! # Safety Invariants
//!
//! 1. **Validate-Before-Estimate**: no network call is made for a
//!    structurally invalid form.
//! 2. **Estimate-Before-Confirm**: `CONFIRMATION` is enterable only with an
//!    accepted, reconciled fee quote; quotes are never reused across
//!    attempts.
//! 3. **Send-Max Only**: the engine mutates the entered amount in exactly
//!    one case, a full-balance request reduced by the fee.
//! 4. **Generation Guard**: `close()` supersedes in-flight work; late
//!    responses are discarded instead of applied to the reset form.

pub mod error;
pub mod orchestrator;
pub mod stage;


// Re-exports for convenience
pub use error::WorkflowError;
pub use orchestrator::{TransferOrchestrator, WorkflowSnapshot};
pub use stage::TransferStage;
