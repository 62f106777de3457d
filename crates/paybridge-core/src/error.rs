//! Error types for the reader session bridge.
//!
//! Two layers of errors exist: [`SdkError`] wraps whatever the vendor SDK
//! reported, verbatim, so consumers see the original code and message.
//! [`SessionError`] is the full taxonomy surfaced by the command layer,
//! covering local precondition failures (detected synchronously, before the
//! SDK is ever contacted) as well as asynchronous SDK failures.

use crate::types::OperationKind;
use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// An error reported by the vendor SDK, surfaced verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{code}] {message}")]
pub struct SdkError {
    /// Vendor error code, e.g. `"CANCELED"` or `"BLUETOOTH_ERROR"`.
    pub code: String,

    /// Human-readable vendor error message.
    pub message: String,
}

impl SdkError {
    /// Create a new SDK error from a vendor code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The error the bridge synthesizes when an operation was canceled
    /// before its natural completion could be reported.
    pub fn canceled() -> Self {
        Self::new("CANCELED", "The operation was canceled")
    }
}

/// Errors surfaced by session commands.
///
/// Parameter and precondition variants are detected locally and resolve the
/// command synchronously; the SDK is not contacted. Everything else resolves
/// asynchronously, exactly once, when the corresponding callback arrives.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A required command parameter was absent or empty.
    #[error("Missing required parameter: {field}")]
    MissingParameter { field: &'static str },

    /// A payment command was issued with no active payment intent.
    #[error("There is no active payment intent; retrieve one first")]
    NoActivePaymentIntent,

    /// A second cancelable operation of the same kind was started before the
    /// first one resolved.
    #[error("An operation of kind {kind} is already pending")]
    OperationAlreadyPending { kind: OperationKind },

    /// The supplied serial number matched no reader in the current
    /// discovery snapshot.
    #[error("No reader found with serial number {serial}")]
    ReaderNotFound { serial: String },

    /// The vendor SDK reported a failure for a command it accepted.
    #[error(transparent)]
    Sdk(#[from] SdkError),

    /// A cancel request was delivered but the underlying cancel handle
    /// reported failure.
    #[error("Cancellation failed: {message}")]
    CancellationFailed { message: String },

    /// The session dispatcher has shut down; no further commands can run.
    #[error("Session is closed")]
    SessionClosed,
}

impl SessionError {
    /// Create a missing-parameter error.
    pub fn missing(field: &'static str) -> Self {
        Self::MissingParameter { field }
    }

    /// Create a reader-not-found error.
    pub fn reader_not_found(serial: impl Into<String>) -> Self {
        Self::ReaderNotFound {
            serial: serial.into(),
        }
    }

    /// Create an already-pending error for the given operation kind.
    pub fn already_pending(kind: OperationKind) -> Self {
        Self::OperationAlreadyPending { kind }
    }

    /// Create a cancellation-failed error from the cancel handle's report.
    pub fn cancellation_failed(message: impl Into<String>) -> Self {
        Self::CancellationFailed {
            message: message.into(),
        }
    }

    /// Returns `true` if this error was detected locally, without an SDK
    /// round trip.
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Sdk(_) | Self::CancellationFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sdk_error_display_carries_code_and_message() {
        let err = SdkError::new("BLUETOOTH_ERROR", "radio unavailable");
        assert_eq!(err.to_string(), "[BLUETOOTH_ERROR] radio unavailable");
    }

    #[test]
    fn sdk_error_is_transparent_in_session_error() {
        let err: SessionError = SdkError::canceled().into();
        assert_eq!(err.to_string(), "[CANCELED] The operation was canceled");
        assert!(!err.is_local());
    }

    #[test]
    fn local_errors_are_flagged_local() {
        assert!(SessionError::missing("clientSecret").is_local());
        assert!(SessionError::NoActivePaymentIntent.is_local());
        assert!(SessionError::already_pending(OperationKind::Discovery).is_local());
        assert!(SessionError::reader_not_found("sn-1").is_local());
        assert!(!SessionError::cancellation_failed("busy").is_local());
    }

    #[test]
    fn already_pending_names_the_kind() {
        let err = SessionError::already_pending(OperationKind::CollectPaymentMethod);
        assert_eq!(
            err.to_string(),
            "An operation of kind collectPaymentMethod is already pending"
        );
    }
}
