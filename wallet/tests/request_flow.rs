//! End-to-end tests of the counterpart request/response flow, driven through
//! the store with a mock SDK and short timeouts.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use idwallet_core::environment::SystemClock;
use idwallet_runtime::Store;
use idwallet_wallet::actions::WalletAction;
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

fn store_with(sdk: MockSdk, config: WalletConfig) -> WalletStore<MockSdk, SystemClock> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    Store::new(
        WalletState::default(),
        WalletReducer::new(config),
        WalletEnvironment::new(sdk, SystemClock),
    )
}

async fn connect(store: &WalletStore<MockSdk, SystemClock>) {
    store
        .send_and_wait_for(
            WalletAction::Connect {
                address: InboxAddress::new("inbox-1"),
            },
            |a| matches!(a, WalletAction::ConnectSucceeded { .. }),
            Duration::from_secs(1),
        )
        .await
        .unwrap();
}

async fn notify_and_wait_for_delivery(
    store: &WalletStore<MockSdk, SystemClock>,
    kind: RequestKind,
) {
    store
        .send_and_wait_for(
            WalletAction::NotifyCounterpart { kind },
            |a| matches!(a, WalletAction::NotifyDelivered { .. }),
            Duration::from_secs(1),
        )
        .await
        .unwrap();
}

fn credential_request() -> IncomingMessage {
    IncomingMessage::CredentialRequest(CredentialRequest {
        id: "c1".into(),
        requested_claims: vec!["email".into()],
    })
}

#[tokio::test]
async fn response_before_timeout_wins() {
    let sdk = MockSdk::new();
    let store = store_with(
        sdk.clone(),
        WalletConfig::new().with_request_timeout(Duration::from_millis(100)),
    );

    connect(&store).await;
    notify_and_wait_for_delivery(&store, RequestKind::CredentialAuth).await;
    assert!(store.state(|s| s.request.is_sent()).await);

    // Counterpart responds well before the timeout.
    store
        .send(WalletAction::Sdk(SdkEvent::Message(credential_request())))
        .await
        .unwrap();

    assert!(
        store
            .state(|s| matches!(s.request, RequestState::Received { .. }))
            .await
    );

    // The cancelled timer must not fire later and clobber the state.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(
        store
            .state(|s| matches!(s.request, RequestState::Received { .. }))
            .await
    );
    assert_eq!(store.cancellations().live_count(), 0);

    // The notification actually went out with the protocol tag.
    assert_eq!(
        sdk.sent_chats(),
        vec![(
            InboxAddress::new("inbox-1"),
            "REQUEST_CREDENTIAL_AUTH".to_owned()
        )]
    );
}

#[tokio::test]
async fn timeout_without_response_is_a_state_error() {
    let store = store_with(
        MockSdk::new(),
        WalletConfig::new().with_request_timeout(Duration::from_millis(40)),
    );

    connect(&store).await;

    let timed_out = store
        .send_and_wait_for(
            WalletAction::NotifyCounterpart {
                kind: RequestKind::DocumentSigning,
            },
            |a| matches!(a, WalletAction::RequestTimedOut { .. }),
            Duration::from_secs(1),
        )
        .await
        .unwrap();
    assert!(matches!(timed_out, WalletAction::RequestTimedOut { .. }));

    assert!(
        store
            .state(|s| matches!(s.request, RequestState::Error { .. }))
            .await
    );
    assert_eq!(store.cancellations().live_count(), 0);
}

#[tokio::test]
async fn send_failure_surfaces_immediately_without_a_timer() {
    let sdk = MockSdk::new();
    sdk.fail_send("inbox unreachable");
    let store = store_with(
        sdk,
        WalletConfig::new().with_request_timeout(Duration::from_millis(40)),
    );

    connect(&store).await;

    store
        .send_and_wait_for(
            WalletAction::NotifyCounterpart {
                kind: RequestKind::CredentialEmail,
            },
            |a| matches!(a, WalletAction::NotifyFailed { .. }),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert_eq!(
        store.state(|s| s.request.clone()).await,
        RequestState::Error {
            message: "Send failed: inbox unreachable".into()
        }
    );
    assert_eq!(store.cancellations().live_count(), 0);

    // No timeout error arrives later: the state stays the send failure.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(
        store.state(|s| s.request.clone()).await,
        RequestState::Error {
            message: "Send failed: inbox unreachable".into()
        }
    );
}

#[tokio::test]
async fn double_notify_keeps_a_single_timer() {
    let store = store_with(
        MockSdk::new(),
        WalletConfig::new().with_request_timeout(Duration::from_millis(60)),
    );

    connect(&store).await;
    notify_and_wait_for_delivery(&store, RequestKind::CredentialAuth).await;
    notify_and_wait_for_delivery(&store, RequestKind::CredentialAuth).await;

    // Re-registration under the shared id leaves at most one live timer.
    assert!(store.cancellations().live_count() <= 1);

    let current = store.state(|s| s.request.clone()).await;
    let RequestState::Sent { token } = current else {
        panic!("expected Sent, got {current:?}");
    };

    // The stale first timer never fires; the surviving timer carries the
    // second token.
    let mut actions = store.subscribe_actions();
    let fired = tokio::time::timeout(Duration::from_secs(1), async move {
        loop {
            if let Ok(WalletAction::RequestTimedOut { token }) = actions.recv().await {
                return token;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(fired, token);

    assert!(
        store
            .state(|s| matches!(s.request, RequestState::Error { .. }))
            .await
    );
}

#[tokio::test]
async fn stale_timer_cannot_fail_a_newer_request() {
    let store = store_with(
        MockSdk::new(),
        WalletConfig::new().with_request_timeout(Duration::from_millis(50)),
    );

    connect(&store).await;
    notify_and_wait_for_delivery(&store, RequestKind::CredentialAuth).await;

    // A response resolves the first exchange.
    store
        .send(WalletAction::Sdk(SdkEvent::Message(credential_request())))
        .await
        .unwrap();
    store
        .send(WalletAction::Reset {
            request: RequestState::Idle,
        })
        .await
        .unwrap();

    // A second exchange starts; the first exchange's timer is long dead.
    notify_and_wait_for_delivery(&store, RequestKind::GetCustomCredential).await;
    assert!(store.state(|s| s.request.is_sent()).await);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(store.state(|s| s.request.is_sent()).await);
}

#[tokio::test]
async fn reset_clears_pending_request_and_timer() {
    let store = store_with(
        MockSdk::new(),
        WalletConfig::new().with_request_timeout(Duration::from_millis(50)),
    );

    connect(&store).await;
    notify_and_wait_for_delivery(&store, RequestKind::DocumentSigning).await;

    store
        .send(WalletAction::Reset {
            request: RequestState::Idle,
        })
        .await
        .unwrap();

    assert_eq!(store.state(|s| s.request.clone()).await, RequestState::Idle);
    assert!(store.state(|s| s.pending_request.is_none()).await);
    assert_eq!(store.cancellations().live_count(), 0);

    // The cancelled timer never produces an error in the fresh flow.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(store.state(|s| s.request.clone()).await, RequestState::Idle);
}

#[tokio::test]
async fn accept_flow_records_the_response() {
    let sdk = MockSdk::new();
    let store = store_with(
        sdk.clone(),
        WalletConfig::new().with_request_timeout(Duration::from_millis(200)),
    );

    connect(&store).await;
    notify_and_wait_for_delivery(&store, RequestKind::CredentialAuth).await;

    store
        .send(WalletAction::Sdk(SdkEvent::Message(credential_request())))
        .await
        .unwrap();

    store
        .send_and_wait_for(
            WalletAction::RespondToRequest {
                status: ResponseStatus::Accepted,
            },
            |a| matches!(a, WalletAction::ResponseRecorded { .. }),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert_eq!(
        store.state(|s| s.request.clone()).await,
        RequestState::ResponseSent {
            status: ResponseStatus::Accepted
        }
    );
    assert_eq!(
        sdk.responses(),
        vec![("c1".to_owned(), ResponseStatus::Accepted)]
    );
}
