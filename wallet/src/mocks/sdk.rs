//! Scriptable in-memory identity SDK.

use crate::error::{Result, WalletError};
use crate::providers::{
    BackupArchive, CredentialRequest, GroupAddress, IdentitySdk, InboxAddress, MessageId,
    ResponseStatus, VerificationRequest,
};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Default)]
struct MockSdkInner {
    registered: bool,
    connect_failure: Option<String>,
    send_failure: Option<String>,
    respond_failure: Option<String>,
    backup_failure: Option<String>,
    restore_failure: Option<WalletError>,
    sent_chats: Vec<(InboxAddress, String)>,
    responses: Vec<(String, ResponseStatus)>,
    restored_archives: Vec<BackupArchive>,
    next_message_id: u64,
}

/// Scriptable mock of the identity SDK.
///
/// By default every call succeeds. Failures are injected per operation, and
/// all sends and responses are recorded for assertions.
///
/// # Example
///
/// ```
/// use idwallet_wallet::mocks::MockSdk;
///
/// let sdk = MockSdk::new();
/// sdk.fail_send("inbox unreachable");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockSdk {
    inner: Arc<Mutex<MockSdkInner>>,
}

impl MockSdk {
    /// Create a mock where every operation succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockSdkInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark the local account as already registered.
    pub fn set_registered(&self, registered: bool) {
        self.lock().registered = registered;
    }

    /// Make connect calls fail with the given message.
    pub fn fail_connect(&self, message: impl Into<String>) {
        self.lock().connect_failure = Some(message.into());
    }

    /// Make chat sends fail with the given message.
    pub fn fail_send(&self, message: impl Into<String>) {
        self.lock().send_failure = Some(message.into());
    }

    /// Make request responses fail with the given message.
    pub fn fail_respond(&self, message: impl Into<String>) {
        self.lock().respond_failure = Some(message.into());
    }

    /// Make backups fail with the given message.
    pub fn fail_backup(&self, message: impl Into<String>) {
        self.lock().backup_failure = Some(message.into());
    }

    /// Make restores fail with the given error.
    pub fn fail_restore(&self, error: WalletError) {
        self.lock().restore_failure = Some(error);
    }

    /// Chat messages handed to the mock, in send order.
    #[must_use]
    pub fn sent_chats(&self) -> Vec<(InboxAddress, String)> {
        self.lock().sent_chats.clone()
    }

    /// Responses handed to the mock, as (request id, status) pairs.
    #[must_use]
    pub fn responses(&self) -> Vec<(String, ResponseStatus)> {
        self.lock().responses.clone()
    }

    /// Archives handed to restore, in call order.
    #[must_use]
    pub fn restored_archives(&self) -> Vec<BackupArchive> {
        self.lock().restored_archives.clone()
    }
}

impl IdentitySdk for MockSdk {
    async fn registered(&self) -> Result<bool> {
        Ok(self.lock().registered)
    }

    async fn register(&self) -> Result<()> {
        self.lock().registered = true;
        Ok(())
    }

    async fn connect_with(&self, counterpart: &InboxAddress) -> Result<GroupAddress> {
        let inner = self.lock();
        if let Some(message) = &inner.connect_failure {
            return Err(WalletError::ConnectionFailure(message.clone()));
        }
        Ok(GroupAddress::new(format!("group-{counterpart}")))
    }

    async fn connect_with_ticket(
        &self,
        counterpart: &InboxAddress,
        _ticket: &[u8],
    ) -> Result<GroupAddress> {
        self.connect_with(counterpart).await
    }

    async fn send_chat(&self, counterpart: &InboxAddress, text: &str) -> Result<MessageId> {
        let mut inner = self.lock();
        if let Some(message) = &inner.send_failure {
            return Err(WalletError::SendFailure(message.clone()));
        }
        inner.sent_chats.push((counterpart.clone(), text.to_owned()));
        inner.next_message_id += 1;
        Ok(MessageId::new(format!("msg-{}", inner.next_message_id)))
    }

    async fn respond_credential(
        &self,
        request: &CredentialRequest,
        status: ResponseStatus,
    ) -> Result<()> {
        let mut inner = self.lock();
        if let Some(message) = &inner.respond_failure {
            return Err(WalletError::ResponseFailure(message.clone()));
        }
        inner.responses.push((request.id.clone(), status));
        Ok(())
    }

    async fn respond_verification(
        &self,
        request: &VerificationRequest,
        status: ResponseStatus,
    ) -> Result<()> {
        let mut inner = self.lock();
        if let Some(message) = &inner.respond_failure {
            return Err(WalletError::ResponseFailure(message.clone()));
        }
        inner.responses.push((request.id.clone(), status));
        Ok(())
    }

    async fn backup(&self) -> Result<BackupArchive> {
        let inner = self.lock();
        if let Some(message) = &inner.backup_failure {
            return Err(WalletError::BackupFailure(message.clone()));
        }
        Ok(BackupArchive(b"mock-archive".to_vec()))
    }

    async fn restore(&self, archive: &BackupArchive) -> Result<()> {
        let mut inner = self.lock();
        if let Some(error) = &inner.restore_failure {
            return Err(error.clone());
        }
        inner.restored_archives.push(archive.clone());
        inner.registered = true;
        Ok(())
    }
}
