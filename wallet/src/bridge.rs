//! Bridge from the SDK callback surface into the store.
//!
//! Identity SDK callbacks (message arrival, connectivity, acknowledgements)
//! fire on SDK-owned threads. The bridge funnels them through a channel into
//! [`Store::send`], so callback handling goes through the same serialized
//! reducer entry point as user intents and timer expiries. Nothing outside a
//! reducer ever touches wallet state.

use crate::WalletStore;
use crate::actions::WalletAction;
use crate::providers::{IdentitySdk, SdkEvent};
use idwallet_core::environment::Clock;
use idwallet_runtime::StoreError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Handle given to the SDK callback surface for emitting events.
///
/// Cheap to clone; safe to call from any thread.
#[derive(Debug, Clone)]
pub struct SdkEventSender {
    tx: mpsc::UnboundedSender<SdkEvent>,
}

impl SdkEventSender {
    /// Emit an SDK event towards the store.
    ///
    /// Returns `false` if the pump has shut down and the event was dropped.
    pub fn emit(&self, event: SdkEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Spawn the event pump for a store.
///
/// Returns the sender to wire into the SDK callbacks and the pump task
/// handle. The pump exits when all senders are dropped or the store starts
/// shutting down.
#[must_use]
pub fn spawn_event_pump<S, C>(
    store: WalletStore<S, C>,
) -> (SdkEventSender, JoinHandle<()>)
where
    S: IdentitySdk + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<SdkEvent>();

    let pump = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match store.send(WalletAction::Sdk(event)).await {
                Ok(_) => {},
                Err(StoreError::ShutdownInProgress) => {
                    tracing::info!("Store shutting down, stopping SDK event pump");
                    break;
                },
                Err(e) => {
                    tracing::error!(error = %e, "Failed to deliver SDK event");
                },
            }
        }
        tracing::debug!("SDK event pump stopped");
    });

    (SdkEventSender { tx }, pump)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::WalletConfig;
    use crate::environment::WalletEnvironment;
    use crate::mocks::MockSdk;
    use crate::reducers::WalletReducer;
    use crate::state::WalletState;
    use idwallet_core::environment::SystemClock;
    use idwallet_runtime::Store;
    use std::time::Duration;

    #[tokio::test]
    async fn events_reach_the_reducer() {
        let store = Store::new(
            WalletState::default(),
            WalletReducer::new(WalletConfig::default()),
            WalletEnvironment::new(MockSdk::new(), SystemClock),
        );

        let (sender, pump) = spawn_event_pump(store.clone());

        assert!(sender.emit(SdkEvent::Connected));
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(store.state(|s| s.initialization.is_ready()).await);

        drop(sender);
        tokio::time::timeout(Duration::from_secs(1), pump)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn emit_after_pump_stops_reports_drop() {
        let store = Store::new(
            WalletState::default(),
            WalletReducer::new(WalletConfig::default()),
            WalletEnvironment::new(MockSdk::new(), SystemClock),
        );

        let (sender, pump) = spawn_event_pump(store);
        pump.abort();
        let _ = pump.await;

        // The channel itself stays open while the sender lives; dropping the
        // pump's receiver closes it.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!sender.emit(SdkEvent::Connected));
    }
}
