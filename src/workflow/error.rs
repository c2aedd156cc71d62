//! Workflow Error Types

use thiserror::Error;

/// Failures surfaced by the send workflow.
///
/// All of these are reported as data in the workflow snapshot (stage reverts
/// to `Input`); none abort the process. `StaleResponse` is internal: it marks
/// a network result that arrived after `close()` superseded the request, and
/// is silently discarded instead of stored.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("fee exceeds the available balance")]
    InsufficientFeeFromBalance,

    #[error("fee estimation failed: {0}")]
    FeeEstimationFailed(String),

    #[error("transaction broadcast failed: {0}")]
    BroadcastFailed(String),

    #[error("signing device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("signing device rejected the transaction")]
    DeviceRejected,

    #[error("response from a superseded request")]
    StaleResponse,
}

impl WorkflowError {
    /// Stable identifier for presentation-layer mapping.
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::InsufficientFeeFromBalance => "INSUFFICIENT_FEE_FROM_BALANCE",
            WorkflowError::FeeEstimationFailed(_) => "FEE_ESTIMATION_FAILED",
            WorkflowError::BroadcastFailed(_) => "BROADCAST_FAILED",
            WorkflowError::DeviceUnavailable(_) => "DEVICE_UNAVAILABLE",
            WorkflowError::DeviceRejected => "DEVICE_REJECTED",
            WorkflowError::StaleResponse => "STALE_RESPONSE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            WorkflowError::InsufficientFeeFromBalance.code(),
            "INSUFFICIENT_FEE_FROM_BALANCE"
        );
        assert_eq!(WorkflowError::DeviceRejected.code(), "DEVICE_REJECTED");
        assert_eq!(
            WorkflowError::FeeEstimationFailed("timeout".into()).code(),
            "FEE_ESTIMATION_FAILED"
        );
    }

    #[test]
    fn test_display() {
        let err = WorkflowError::BroadcastFailed("nonce too low".into());
        assert_eq!(err.to_string(), "transaction broadcast failed: nonce too low");
        assert_eq!(
            WorkflowError::InsufficientFeeFromBalance.to_string(),
            "fee exceeds the available balance"
        );
    }
}
