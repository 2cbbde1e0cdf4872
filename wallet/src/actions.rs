//! Wallet actions.
//!
//! Every input to the wallet state machine is an action: user intents from
//! the UI, results of SDK calls fed back by effects, timer expiries, and SDK
//! callback events forwarded by the bridge. All of them funnel through the
//! store's single serialized `send` entry point.

use crate::providers::{BackupArchive, GroupAddress, InboxAddress, ResponseStatus, SdkEvent};
use crate::state::{RequestKind, RequestState, RequestToken};

/// Failure modes of a restore attempt, distinguished so the UI can offer the
/// right recovery path for each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreFailure {
    /// Liveness verification did not match the backup.
    Verification,
    /// Identity accepted, but account data could not be recovered.
    DataRecovery,
    /// Any other failure.
    Other {
        /// Failure description.
        message: String,
    },
}

/// All inputs to the wallet reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum WalletAction {
    // ── Initialization ────────────────────────────────────────────────
    /// Query the SDK for existing registration.
    Initialize,
    /// Registration status loaded.
    InitializationLoaded {
        /// Whether a local account already exists.
        registered: bool,
    },
    /// Querying the SDK for registration status failed.
    InitializeFailed {
        /// Failure description.
        message: String,
    },
    /// Register a new local account.
    Register,
    /// Registration succeeded.
    RegisterSucceeded,
    /// Registration failed.
    RegisterFailed {
        /// Failure description.
        message: String,
    },

    // ── Connection ────────────────────────────────────────────────────
    /// Connect to a counterpart by inbox address.
    Connect {
        /// The counterpart's inbox address.
        address: InboxAddress,
    },
    /// Connect to a counterpart with an out-of-band ticket.
    ConnectWithTicket {
        /// The counterpart's inbox address.
        address: InboxAddress,
        /// The scanned ticket payload.
        ticket: Vec<u8>,
    },
    /// The connect call succeeded.
    ConnectSucceeded {
        /// Group address the SDK returned.
        group: GroupAddress,
        /// The counterpart that was connected.
        counterpart: InboxAddress,
    },
    /// The connect call failed.
    ConnectFailed {
        /// Failure description.
        message: String,
    },

    // ── Request/response flow ─────────────────────────────────────────
    /// Notify the counterpart to initiate a request of the given kind.
    NotifyCounterpart {
        /// What to ask the counterpart for.
        kind: RequestKind,
    },
    /// The notification was handed to the SDK for delivery.
    NotifyDelivered {
        /// Token of the request generation this delivery belongs to.
        token: RequestToken,
    },
    /// Handing the notification to the SDK failed.
    NotifyFailed {
        /// Token of the request generation this failure belongs to.
        token: RequestToken,
        /// Failure description.
        message: String,
    },
    /// The response timeout elapsed without a counterpart response.
    RequestTimedOut {
        /// Token of the request generation the timer was started for.
        token: RequestToken,
    },
    /// Accept or reject the pending received request.
    RespondToRequest {
        /// The status to send back.
        status: ResponseStatus,
    },
    /// The response was delivered to the counterpart.
    ResponseRecorded {
        /// The status that was sent.
        status: ResponseStatus,
    },
    /// Delivering the response failed.
    RespondFailed {
        /// Failure description.
        message: String,
    },
    /// Reset the request flow to the given state, clearing any pending
    /// request and cancelling the timeout timer.
    Reset {
        /// The request state to reset to (usually `Idle`).
        request: RequestState,
    },

    // ── Backup / restore ──────────────────────────────────────────────
    /// Create an account backup.
    StartBackup,
    /// The backup completed. Carries the archive for the caller to persist.
    BackupCompleted {
        /// The encrypted archive the SDK produced.
        archive: BackupArchive,
    },
    /// The backup failed.
    BackupFailed {
        /// Failure description.
        message: String,
    },
    /// Restore the account from a backup archive.
    StartRestore {
        /// The archive to restore from.
        archive: BackupArchive,
    },
    /// The restore completed.
    RestoreCompleted,
    /// The restore failed.
    RestoreFailed {
        /// How the restore failed.
        failure: RestoreFailure,
    },

    // ── SDK callbacks ─────────────────────────────────────────────────
    /// An event from the SDK callback surface, forwarded by the bridge.
    Sdk(SdkEvent),
}
