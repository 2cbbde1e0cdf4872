//! Walkthrough of the wallet flows against a mock identity SDK.
//!
//! Runs the full happy path (initialize, register, connect, request,
//! respond) plus a timed-out request and a backup/restore round, logging
//! each state transition.

use anyhow::Result;
use idwallet_core::environment::SystemClock;
use idwallet_runtime::Store;
use idwallet_wallet::actions::WalletAction;
use idwallet_wallet::bridge;
use idwallet_wallet::config::WalletConfig;
use idwallet_wallet::environment::WalletEnvironment;
use idwallet_wallet::mocks::MockSdk;
use idwallet_wallet::providers::{
    CredentialRequest, IncomingMessage, InboxAddress, ResponseStatus, SdkEvent,
};
use idwallet_wallet::reducers::WalletReducer;
use idwallet_wallet::state::{RequestKind, RequestState, WalletState};
use idwallet_wallet::WalletStore;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let sdk = MockSdk::new();
    let store: WalletStore<MockSdk, SystemClock> = Store::new(
        WalletState::default(),
        WalletReducer::new(
            // Short timeout so the walkthrough's timeout leg finishes quickly.
            WalletConfig::new().with_request_timeout(Duration::from_millis(300)),
        ),
        WalletEnvironment::new(sdk.clone(), SystemClock),
    );
    let (events, _pump) = bridge::spawn_event_pump(store.clone());

    // ── Initialize and register ───────────────────────────────────────
    store
        .send_and_wait_for(
            WalletAction::Initialize,
            |a| matches!(a, WalletAction::InitializationLoaded { .. }),
            Duration::from_secs(5),
        )
        .await?;
    events.emit(SdkEvent::Connected);

    store
        .send_and_wait_for(
            WalletAction::Register,
            |a| matches!(a, WalletAction::RegisterSucceeded),
            Duration::from_secs(5),
        )
        .await?;

    // ── Connect to the counterpart ────────────────────────────────────
    store
        .send_and_wait_for(
            WalletAction::Connect {
                address: InboxAddress::new("counterpart-inbox"),
            },
            |a| matches!(a, WalletAction::ConnectSucceeded { .. }),
            Duration::from_secs(5),
        )
        .await?;
    tracing::info!(snapshot = ?store.state(WalletState::snapshot).await, "Connected");

    // ── Request flow: counterpart answers in time ─────────────────────
    store
        .send_and_wait_for(
            WalletAction::NotifyCounterpart {
                kind: RequestKind::CredentialAuth,
            },
            |a| matches!(a, WalletAction::NotifyDelivered { .. }),
            Duration::from_secs(5),
        )
        .await?;

    events.emit(SdkEvent::Message(IncomingMessage::CredentialRequest(
        CredentialRequest {
            id: "auth-1".into(),
            requested_claims: vec!["email".into(), "name".into()],
        },
    )));
    tokio::time::sleep(Duration::from_millis(50)).await;
    tracing::info!(request = ?store.state(|s| s.request.clone()).await, "Request received");

    store
        .send_and_wait_for(
            WalletAction::RespondToRequest {
                status: ResponseStatus::Accepted,
            },
            |a| matches!(a, WalletAction::ResponseRecorded { .. }),
            Duration::from_secs(5),
        )
        .await?;
    tracing::info!(request = ?store.state(|s| s.request.clone()).await, "Response sent");

    // ── Request flow: counterpart stays silent ────────────────────────
    store
        .send(WalletAction::Reset {
            request: RequestState::Idle,
        })
        .await?;
    store
        .send_and_wait_for(
            WalletAction::NotifyCounterpart {
                kind: RequestKind::DocumentSigning,
            },
            |a| matches!(a, WalletAction::RequestTimedOut { .. }),
            Duration::from_secs(5),
        )
        .await?;
    tracing::info!(request = ?store.state(|s| s.request.clone()).await, "Request timed out");

    // ── Backup and restore ────────────────────────────────────────────
    let completed = store
        .send_and_wait_for(
            WalletAction::StartBackup,
            |a| matches!(a, WalletAction::BackupCompleted { .. }),
            Duration::from_secs(5),
        )
        .await?;
    if let WalletAction::BackupCompleted { archive } = completed {
        tracing::info!(bytes = archive.0.len(), "Backup created");
        store
            .send_and_wait_for(
                WalletAction::StartRestore { archive },
                |a| matches!(a, WalletAction::RestoreCompleted),
                Duration::from_secs(5),
            )
            .await?;
        tracing::info!("Restore completed");
    }

    store.shutdown(Duration::from_secs(5)).await?;
    tracing::info!("Walkthrough finished");
    Ok(())
}
