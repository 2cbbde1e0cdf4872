//! Wallet reducers.
//!
//! The root [`WalletReducer`] routes actions to the flow-specific
//! sub-reducers. All sub-reducers share the root state and action types so
//! cross-flow transitions (an SDK failure landing on the request flow, say)
//! stay in one place.

use crate::actions::WalletAction;
use crate::environment::WalletEnvironment;
use crate::providers::{IdentitySdk, SdkEvent};
use crate::state::WalletState;
use idwallet_core::effect::{Effect, EffectId};
use idwallet_core::environment::Clock;
use idwallet_core::reducer::Reducer;
use idwallet_core::{SmallVec, smallvec};
use std::marker::PhantomData;

pub mod backup;
pub mod connection;
pub mod request;

pub use backup::BackupReducer;
pub use connection::ConnectionReducer;
pub use request::RequestReducer;

/// Cancellation id of the single counterpart-response timeout timer.
///
/// Registering a new timer under this id cancels the previous one, so double
/// notification never leaves two timers running.
pub const REQUEST_TIMEOUT_ID: &str = "wallet.request_timeout";

/// The timeout timer's [`EffectId`].
#[must_use]
pub const fn request_timeout_id() -> EffectId {
    EffectId::from_static(REQUEST_TIMEOUT_ID)
}

/// Root reducer composing the wallet flows.
pub struct WalletReducer<S, C>
where
    S: IdentitySdk + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    connection: ConnectionReducer<S, C>,
    request: RequestReducer<S, C>,
    backup: BackupReducer<S, C>,
    _marker: PhantomData<fn() -> (S, C)>,
}

impl<S, C> WalletReducer<S, C>
where
    S: IdentitySdk + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    /// Create the root reducer from configuration.
    #[must_use]
    pub fn new(config: crate::config::WalletConfig) -> Self {
        Self {
            connection: ConnectionReducer::new(),
            request: RequestReducer::new(config),
            backup: BackupReducer::new(),
            _marker: PhantomData,
        }
    }
}

impl<S, C> Clone for WalletReducer<S, C>
where
    S: IdentitySdk + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            connection: self.connection.clone(),
            request: self.request.clone(),
            backup: self.backup.clone(),
            _marker: PhantomData,
        }
    }
}

impl<S, C> Reducer for WalletReducer<S, C>
where
    S: IdentitySdk + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    type State = WalletState;
    type Action = WalletAction;
    type Environment = WalletEnvironment<S, C>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            WalletAction::Initialize
            | WalletAction::InitializationLoaded { .. }
            | WalletAction::InitializeFailed { .. }
            | WalletAction::Register
            | WalletAction::RegisterSucceeded
            | WalletAction::RegisterFailed { .. }
            | WalletAction::Connect { .. }
            | WalletAction::ConnectWithTicket { .. }
            | WalletAction::ConnectSucceeded { .. }
            | WalletAction::ConnectFailed { .. }
            | WalletAction::Sdk(
                SdkEvent::Connected
                | SdkEvent::Disconnected { .. }
                | SdkEvent::Acknowledged { .. },
            ) => self.connection.reduce(state, action, env),

            WalletAction::NotifyCounterpart { .. }
            | WalletAction::NotifyDelivered { .. }
            | WalletAction::NotifyFailed { .. }
            | WalletAction::RequestTimedOut { .. }
            | WalletAction::RespondToRequest { .. }
            | WalletAction::ResponseRecorded { .. }
            | WalletAction::RespondFailed { .. }
            | WalletAction::Reset { .. }
            | WalletAction::Sdk(SdkEvent::Message(_) | SdkEvent::Failed { .. }) => {
                self.request.reduce(state, action, env)
            },

            WalletAction::StartBackup
            | WalletAction::BackupCompleted { .. }
            | WalletAction::BackupFailed { .. }
            | WalletAction::StartRestore { .. }
            | WalletAction::RestoreCompleted
            | WalletAction::RestoreFailed { .. } => self.backup.reduce(state, action, env),
        }
    }
}

/// Shorthand for the effect vector reducers return.
pub(crate) type Effects = SmallVec<[Effect<WalletAction>; 4]>;

/// A single no-op effect vector.
pub(crate) fn no_effects() -> Effects {
    smallvec![Effect::None]
}
