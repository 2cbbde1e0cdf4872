//! Provider traits - the identity SDK boundary.
//!
//! The wallet core never talks to the identity network directly. Everything
//! it needs from the SDK is abstracted behind [`IdentitySdk`], injected via
//! the environment. The trait is deliberately narrow: the wallet treats the
//! SDK as an opaque messaging and credential service.
//!
//! SDK callbacks arrive out-of-band; the [`crate::bridge`] module turns them
//! into [`SdkEvent`] actions flowing through the store.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;

// ═══════════════════════════════════════════════════════════════════════
// Addresses and identifiers
// ═══════════════════════════════════════════════════════════════════════

/// Address of a party's inbox on the identity network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InboxAddress(pub String);

impl InboxAddress {
    /// Create an inbox address.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InboxAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Address of the conversation group a connect call established.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupAddress(pub String);

impl GroupAddress {
    /// Create a group address.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GroupAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a message handed to the SDK for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Create a message id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Credential and verification payloads
// ═══════════════════════════════════════════════════════════════════════

/// A single identity claim (name/value pair).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Claim name, e.g. `email` or `document_number`.
    pub name: String,
    /// Claim value.
    pub value: String,
}

impl Claim {
    /// Create a claim.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Credentials delivered by the counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialBundle {
    /// Claims carried by the credentials.
    pub claims: Vec<Claim>,
}

/// A counterpart's request for identity claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRequest {
    /// Identifier the response must reference.
    pub id: String,
    /// Names of the claims the counterpart wants.
    pub requested_claims: Vec<String>,
}

/// A counterpart's request to verify something.
///
/// Only the `agreement` type (document signing) is part of the wallet flows;
/// other types are dropped with a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequest {
    /// Identifier the response must reference.
    pub id: String,
    /// Verification type tag, e.g. `agreement`.
    pub verification_type: String,
    /// Text presented to the user, e.g. the agreement body.
    pub body: String,
}

impl VerificationRequest {
    /// Whether this is a document-signing agreement request.
    #[must_use]
    pub fn is_agreement(&self) -> bool {
        self.verification_type == "agreement"
    }
}

/// Accept/reject status sent back for a received request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    /// The user accepted the request.
    Accepted,
    /// The user rejected the request.
    Rejected,
}

impl ResponseStatus {
    /// Whether the status is an acceptance.
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Inbound messages and SDK events
// ═══════════════════════════════════════════════════════════════════════

/// A message delivered by the SDK from the counterpart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IncomingMessage {
    /// Credentials were delivered.
    Credentials(CredentialBundle),
    /// The counterpart asks for identity claims.
    CredentialRequest(CredentialRequest),
    /// The counterpart asks for a verification.
    VerificationRequest(VerificationRequest),
    /// Plain chat text. Not part of any wallet flow.
    Chat {
        /// Message text.
        text: String,
    },
}

/// Event emitted by the SDK callback surface.
///
/// The bridge forwards these into the store as `WalletAction::Sdk` actions,
/// so callback handling goes through the same serialized reducer entry point
/// as user intents and timer expiries.
#[derive(Debug, Clone, PartialEq)]
pub enum SdkEvent {
    /// The SDK transport came up.
    Connected,
    /// The SDK transport went down.
    Disconnected {
        /// Reason reported by the SDK, if any.
        reason: Option<String>,
    },
    /// A message arrived from the counterpart.
    Message(IncomingMessage),
    /// The network acknowledged delivery of a sent message.
    Acknowledged {
        /// Id of the acknowledged message.
        id: MessageId,
    },
    /// The SDK reported an asynchronous failure.
    Failed {
        /// Id of the affected message, if the failure is tied to one.
        id: Option<MessageId>,
        /// Failure description.
        reason: String,
    },
}

/// Opaque encrypted account backup produced by the SDK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupArchive(pub Vec<u8>);

// ═══════════════════════════════════════════════════════════════════════
// The SDK trait
// ═══════════════════════════════════════════════════════════════════════

/// The identity SDK boundary.
///
/// All methods are async and fallible; the reducers turn failures into
/// flow-state errors rather than propagating them. Implementations must be
/// cheap to clone (the store clones the environment per effect task).
pub trait IdentitySdk: Send + Sync {
    /// Whether a local account is already registered.
    fn registered(&self) -> impl Future<Output = Result<bool>> + Send;

    /// Register a new local account.
    fn register(&self) -> impl Future<Output = Result<()>> + Send;

    /// Connect to a counterpart by inbox address, returning the conversation
    /// group address.
    fn connect_with(
        &self,
        counterpart: &InboxAddress,
    ) -> impl Future<Output = Result<GroupAddress>> + Send;

    /// Connect to a counterpart using an out-of-band ticket (e.g. a scanned
    /// QR payload) in addition to the inbox address.
    fn connect_with_ticket(
        &self,
        counterpart: &InboxAddress,
        ticket: &[u8],
    ) -> impl Future<Output = Result<GroupAddress>> + Send;

    /// Send a chat message to the counterpart.
    fn send_chat(
        &self,
        counterpart: &InboxAddress,
        text: &str,
    ) -> impl Future<Output = Result<MessageId>> + Send;

    /// Answer a credential request with the given status.
    fn respond_credential(
        &self,
        request: &CredentialRequest,
        status: ResponseStatus,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Answer a verification request with the given status.
    fn respond_verification(
        &self,
        request: &VerificationRequest,
        status: ResponseStatus,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Create an encrypted backup of the local account.
    fn backup(&self) -> impl Future<Output = Result<BackupArchive>> + Send;

    /// Restore the local account from a backup archive.
    fn restore(&self, archive: &BackupArchive) -> impl Future<Output = Result<()>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agreement_detection() {
        let agreement = VerificationRequest {
            id: "v1".into(),
            verification_type: "agreement".into(),
            body: "terms".into(),
        };
        let other = VerificationRequest {
            id: "v2".into(),
            verification_type: "age_check".into(),
            body: String::new(),
        };
        assert!(agreement.is_agreement());
        assert!(!other.is_agreement());
    }

    #[test]
    fn addresses_display_transparently() {
        let inbox = InboxAddress::new("inbox-123");
        assert_eq!(inbox.to_string(), "inbox-123");
        assert_eq!(inbox.as_str(), "inbox-123");
    }
}
