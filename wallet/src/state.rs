//! Wallet state types.
//!
//! This module defines the UI-relevant state mirrored out of the identity
//! SDK. All types are `Clone` to support the functional architecture pattern.
//!
//! Each flow owns exactly one tagged state value at a time; screens subscribe
//! to a [`WalletSnapshot`] and render from it.

use crate::providers::{
    CredentialBundle, CredentialRequest, GroupAddress, InboxAddress, ResponseStatus,
    VerificationRequest,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// Request tokens
// ═══════════════════════════════════════════════════════════════════════

/// Generation counter for outstanding counterpart requests.
///
/// Every `NotifyCounterpart` allocates a fresh token; the timeout timer for
/// that request carries it. A timer expiry whose token does not match the
/// current `Sent` state is stale (a response arrived, or the request was
/// superseded by a retry) and is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestToken(pub u64);

impl std::fmt::Display for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Request kinds
// ═══════════════════════════════════════════════════════════════════════

/// The action the wallet asks the counterpart to initiate.
///
/// Sent to the counterpart as the text of a chat message; the counterpart
/// inspects the tag and replies with the matching request message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    /// Ask the counterpart to send a credential-based authentication request.
    CredentialAuth,
    /// Offer the counterpart an email credential.
    CredentialEmail,
    /// Offer the counterpart a document credential.
    CredentialDocument,
    /// Offer the counterpart a custom credential.
    CredentialCustom,
    /// Ask the counterpart to send a document-signing agreement.
    DocumentSigning,
    /// Ask the counterpart to hand back a stored custom credential.
    GetCustomCredential,
}

impl RequestKind {
    /// Wire tag understood by the counterpart.
    #[must_use]
    pub const fn as_tag(self) -> &'static str {
        match self {
            Self::CredentialAuth => "REQUEST_CREDENTIAL_AUTH",
            Self::CredentialEmail => "PROVIDE_CREDENTIAL_EMAIL",
            Self::CredentialDocument => "PROVIDE_CREDENTIAL_DOCUMENT",
            Self::CredentialCustom => "PROVIDE_CREDENTIAL_CUSTOM",
            Self::DocumentSigning => "REQUEST_DOCUMENT_SIGNING",
            Self::GetCustomCredential => "REQUEST_GET_CUSTOM_CREDENTIAL",
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Flow states
// ═══════════════════════════════════════════════════════════════════════

/// SDK readiness, set from the SDK connectivity callback.
///
/// Independent life-cycle from [`ConnectionState`]: this tracks the SDK's own
/// transport coming up, not the link to a specific counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InitializationState {
    /// SDK is still starting up.
    #[default]
    Loading,
    /// SDK reported its transport connected.
    Ready,
    /// SDK failed to start.
    Error {
        /// Human-readable failure description.
        message: String,
    },
}

impl InitializationState {
    /// Whether the SDK transport is up.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Progress of establishing a link to a counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ConnectionState {
    /// No counterpart link established.
    #[default]
    NotConnected,
    /// A connect call is in flight.
    Connecting,
    /// Counterpart link established.
    Connected {
        /// When the link came up.
        since: DateTime<Utc>,
    },
    /// The connect call failed. Surfaced, never retried automatically.
    Error {
        /// Human-readable failure description.
        message: String,
    },
}

impl ConnectionState {
    /// Whether a counterpart link is established.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

/// Progress of a request/response exchange with the counterpart.
///
/// Exactly one value is current. Transitions into `Received` or `Error`
/// always cancel the pending timeout; a new `Sent` re-registers the single
/// timeout timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum RequestState {
    /// No outstanding request.
    #[default]
    Idle,
    /// The notification was handed to the SDK; a timeout timer is running
    /// (or about to start, once delivery is confirmed).
    Sent {
        /// Token identifying this request generation.
        token: RequestToken,
    },
    /// The counterpart responded with a request payload.
    Received {
        /// The payload the counterpart sent.
        request: IncomingRequest,
    },
    /// Terminal failure: timeout, send failure, or missing counterpart link.
    Error {
        /// Human-readable failure description.
        message: String,
    },
    /// The local side replied with an acceptance/rejection status.
    ResponseSent {
        /// Status sent back to the counterpart.
        status: ResponseStatus,
    },
}

impl RequestState {
    /// Whether a request notification is outstanding.
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }
}

/// Progress of an account backup or restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BackupRestoreState {
    /// No backup or restore running.
    #[default]
    Idle,
    /// A backup or restore call is in flight.
    Processing,
    /// The operation completed.
    Success,
    /// The operation failed.
    Error {
        /// Human-readable failure description.
        message: String,
    },
    /// Restore rejected: the liveness verification did not match the backup.
    VerificationFailed,
    /// Restore accepted the identity but could not recover account data.
    DataRecoveryFailed,
}

// ═══════════════════════════════════════════════════════════════════════
// Pending request payloads
// ═══════════════════════════════════════════════════════════════════════

/// A recognized request payload received from the counterpart.
///
/// Unrecognized payloads (plain chat, non-agreement verification requests)
/// never become an `IncomingRequest`; they are dropped with a diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IncomingRequest {
    /// Credentials delivered by the counterpart (e.g. a stored custom credential).
    Credentials(CredentialBundle),
    /// The counterpart asks the wallet to supply identity claims.
    Credential(CredentialRequest),
    /// The counterpart asks the wallet to verify an agreement (document signing).
    Verification(VerificationRequest),
}

// ═══════════════════════════════════════════════════════════════════════
// Root state
// ═══════════════════════════════════════════════════════════════════════

/// Root wallet state.
///
/// Created once per account session; lives for the process lifetime of the
/// UI and is reset explicitly between flows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletState {
    /// Whether the local account has completed registration.
    pub registered: bool,

    /// SDK readiness.
    pub initialization: InitializationState,

    /// Counterpart link progress.
    pub connection: ConnectionState,

    /// Request/response exchange progress.
    pub request: RequestState,

    /// Backup/restore progress.
    pub backup_restore: BackupRestoreState,

    /// Inbox address of the connected counterpart, once known.
    pub counterpart: Option<InboxAddress>,

    /// Group address returned by the SDK connect call.
    pub group: Option<GroupAddress>,

    /// The most recent request received from the counterpart, held until the
    /// flow resets or a response is recorded.
    pub pending_request: Option<IncomingRequest>,

    /// Next value handed out by [`WalletState::allocate_request_token`].
    /// Crate-visible so tests can build states with struct-update syntax.
    pub(crate) next_request_token: u64,
}

impl Default for WalletState {
    fn default() -> Self {
        Self {
            registered: false,
            initialization: InitializationState::Loading,
            connection: ConnectionState::NotConnected,
            request: RequestState::Idle,
            backup_restore: BackupRestoreState::Idle,
            counterpart: None,
            group: None,
            pending_request: None,
            next_request_token: 0,
        }
    }
}

impl WalletState {
    /// Allocate the token for a new outgoing request generation.
    pub const fn allocate_request_token(&mut self) -> RequestToken {
        let token = RequestToken(self.next_request_token);
        self.next_request_token += 1;
        token
    }

    /// Read-only snapshot for the UI layer.
    #[must_use]
    pub fn snapshot(&self) -> WalletSnapshot {
        WalletSnapshot {
            registered: self.registered,
            initialization: self.initialization.clone(),
            connection: self.connection.clone(),
            request: self.request.clone(),
            backup_restore: self.backup_restore.clone(),
        }
    }
}

/// Read-only view of the wallet state published to screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletSnapshot {
    /// Whether the local account has completed registration.
    pub registered: bool,
    /// SDK readiness.
    pub initialization: InitializationState,
    /// Counterpart link progress.
    pub connection: ConnectionState,
    /// Request/response exchange progress.
    pub request: RequestState,
    /// Backup/restore progress.
    pub backup_restore: BackupRestoreState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_monotonic() {
        let mut state = WalletState::default();
        let a = state.allocate_request_token();
        let b = state.allocate_request_token();
        assert!(b.0 > a.0);
    }

    #[test]
    fn states_can_be_built_with_struct_update_syntax() {
        let mut state = WalletState {
            counterpart: Some(InboxAddress::new("inbox-1")),
            ..WalletState::default()
        };
        assert_eq!(state.allocate_request_token(), RequestToken(0));
    }

    #[test]
    fn default_state_is_idle_everywhere() {
        let state = WalletState::default();
        assert!(!state.registered);
        assert_eq!(state.initialization, InitializationState::Loading);
        assert_eq!(state.connection, ConnectionState::NotConnected);
        assert_eq!(state.request, RequestState::Idle);
        assert_eq!(state.backup_restore, BackupRestoreState::Idle);
        assert!(state.pending_request.is_none());
    }

    #[test]
    fn request_kind_tags_match_counterpart_protocol() {
        assert_eq!(RequestKind::CredentialAuth.as_tag(), "REQUEST_CREDENTIAL_AUTH");
        assert_eq!(RequestKind::CredentialEmail.as_tag(), "PROVIDE_CREDENTIAL_EMAIL");
        assert_eq!(RequestKind::DocumentSigning.as_tag(), "REQUEST_DOCUMENT_SIGNING");
    }
}
