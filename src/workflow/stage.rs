//! Workflow Stage Definitions

use std::fmt;

/// Stages of one send workflow, exactly one active per open popup.
///
/// Transitions are driven by [`TransferOrchestrator`] and documented on the
/// module; everything that goes wrong routes back to `Input` with the
/// failure surfaced, so the presentation layer is never stuck in a loading
/// state.
///
/// [`TransferOrchestrator`]: super::TransferOrchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferStage {
    /// Form is editable; validation errors and failures are shown here.
    Input,

    /// Fee estimation round trip in flight.
    Estimating,

    /// Quote accepted and reconciled; awaiting the user's confirm or cancel.
    Confirmation,

    /// Signing/broadcast round trip in flight.
    Submitting,

    /// Terminal: transaction accepted by the network, hash available.
    Success,

    /// Terminal failure view. The orchestrator reverts to `Input` and
    /// surfaces the failure instead of entering this stage; it exists for
    /// embedders that keep a dedicated failed view open.
    Failed,
}

impl TransferStage {
    /// Terminal stages: the workflow is over until the form is reset.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStage::Success | TransferStage::Failed)
    }

    /// A network round trip is in flight; the form must not be edited.
    #[inline]
    pub fn is_in_flight(&self) -> bool {
        matches!(self, TransferStage::Estimating | TransferStage::Submitting)
    }

    /// Get human-readable stage name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStage::Input => "INPUT",
            TransferStage::Estimating => "ESTIMATING",
            TransferStage::Confirmation => "CONFIRMATION",
            TransferStage::Submitting => "SUBMITTING",
            TransferStage::Success => "SUCCESS",
            TransferStage::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TransferStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_stages() {
        assert!(TransferStage::Success.is_terminal());
        assert!(TransferStage::Failed.is_terminal());

        assert!(!TransferStage::Input.is_terminal());
        assert!(!TransferStage::Estimating.is_terminal());
        assert!(!TransferStage::Confirmation.is_terminal());
        assert!(!TransferStage::Submitting.is_terminal());
    }

    #[test]
    fn test_in_flight_stages() {
        assert!(TransferStage::Estimating.is_in_flight());
        assert!(TransferStage::Submitting.is_in_flight());

        assert!(!TransferStage::Input.is_in_flight());
        assert!(!TransferStage::Confirmation.is_in_flight());
        assert!(!TransferStage::Success.is_in_flight());
        assert!(!TransferStage::Failed.is_in_flight());
    }

    #[test]
    fn test_display() {
        assert_eq!(TransferStage::Input.to_string(), "INPUT");
        assert_eq!(TransferStage::Confirmation.to_string(), "CONFIRMATION");
        assert_eq!(TransferStage::Success.to_string(), "SUCCESS");
    }
}
