//! Wallet error types.
//!
//! Failures in the wallet flows are state, not exceptions: reducers map every
//! error into the `Error` variant of the owning flow state. `WalletError` is
//! what the SDK boundary and effect futures return before that mapping
//! happens.

use thiserror::Error;

/// Result type alias for wallet operations
pub type Result<T> = std::result::Result<T, WalletError>;

/// Errors surfaced by the identity SDK boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// A request was attempted without an established counterpart link.
    #[error("Not connected to a counterpart")]
    NotConnected,

    /// Establishing the counterpart link failed.
    #[error("Connection failed: {0}")]
    ConnectionFailure(String),

    /// Handing a message to the SDK for delivery failed.
    #[error("Send failed: {0}")]
    SendFailure(String),

    /// No counterpart response arrived before the timeout elapsed.
    #[error("Request timed out")]
    RequestTimeout,

    /// Sending the response to a received request failed.
    #[error("Response failed: {0}")]
    ResponseFailure(String),

    /// Account registration failed.
    #[error("Registration failed: {0}")]
    RegistrationFailure(String),

    /// Creating the account backup failed.
    #[error("Backup failed: {0}")]
    BackupFailure(String),

    /// Restore rejected: liveness verification did not match the backup.
    #[error("Restore verification failed")]
    RestoreVerificationFailed,

    /// Restore accepted the identity but account data could not be recovered.
    #[error("Restore data recovery failed")]
    RestoreDataRecoveryFailed,

    /// Any other failure reported by the SDK.
    #[error("SDK error: {0}")]
    Sdk(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_user_presentable() {
        assert_eq!(
            WalletError::NotConnected.to_string(),
            "Not connected to a counterpart"
        );
        assert_eq!(WalletError::RequestTimeout.to_string(), "Request timed out");
        assert_eq!(
            WalletError::SendFailure("inbox unreachable".into()).to_string(),
            "Send failed: inbox unreachable"
        );
    }
}
