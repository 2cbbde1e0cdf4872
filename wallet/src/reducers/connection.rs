//! Initialization, registration, and counterpart connection flows.

use super::{Effects, no_effects};
use crate::actions::WalletAction;
use crate::environment::WalletEnvironment;
use crate::providers::{IdentitySdk, SdkEvent};
use crate::state::{ConnectionState, InitializationState, WalletState};
use idwallet_core::effect::Effect;
use idwallet_core::environment::Clock;
use idwallet_core::reducer::Reducer;
use idwallet_core::smallvec;
use std::marker::PhantomData;

/// Reducer for SDK startup, account registration, and connecting to a
/// counterpart.
pub struct ConnectionReducer<S, C>
where
    S: IdentitySdk + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    _marker: PhantomData<fn() -> (S, C)>,
}

impl<S, C> ConnectionReducer<S, C>
where
    S: IdentitySdk + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    /// Create the reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<S, C> Default for ConnectionReducer<S, C>
where
    S: IdentitySdk + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, C> Clone for ConnectionReducer<S, C>
where
    S: IdentitySdk + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<S, C> Reducer for ConnectionReducer<S, C>
where
    S: IdentitySdk + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    type State = WalletState;
    type Action = WalletAction;
    type Environment = WalletEnvironment<S, C>;

    #[allow(clippy::too_many_lines)]
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects {
        match action {
            WalletAction::Initialize => {
                tracing::info!("Loading registration status");
                let sdk = env.sdk.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    match sdk.registered().await {
                        Ok(registered) => {
                            Some(WalletAction::InitializationLoaded { registered })
                        },
                        Err(e) => Some(WalletAction::InitializeFailed {
                            message: e.to_string(),
                        }),
                    }
                }))]
            },

            WalletAction::InitializationLoaded { registered } => {
                tracing::info!(registered, "Registration status loaded");
                state.registered = registered;
                state.initialization = InitializationState::Ready;
                no_effects()
            },

            WalletAction::InitializeFailed { message } => {
                tracing::error!(%message, "Initialization failed");
                state.initialization = InitializationState::Error { message };
                no_effects()
            },

            WalletAction::Register => {
                tracing::info!("Registering new account");
                let sdk = env.sdk.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    match sdk.register().await {
                        Ok(()) => Some(WalletAction::RegisterSucceeded),
                        Err(e) => Some(WalletAction::RegisterFailed {
                            message: e.to_string(),
                        }),
                    }
                }))]
            },

            WalletAction::RegisterSucceeded => {
                tracing::info!("Account registered");
                state.registered = true;
                no_effects()
            },

            WalletAction::RegisterFailed { message } => {
                tracing::error!(%message, "Registration failed");
                state.initialization = InitializationState::Error { message };
                no_effects()
            },

            WalletAction::Connect { address } => {
                tracing::info!(counterpart = %address, "Connecting to counterpart");
                state.connection = ConnectionState::Connecting;

                let sdk = env.sdk.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    match sdk.connect_with(&address).await {
                        Ok(group) => Some(WalletAction::ConnectSucceeded {
                            group,
                            counterpart: address,
                        }),
                        Err(e) => Some(WalletAction::ConnectFailed {
                            message: e.to_string(),
                        }),
                    }
                }))]
            },

            WalletAction::ConnectWithTicket { address, ticket } => {
                tracing::info!(counterpart = %address, "Connecting to counterpart with ticket");
                state.connection = ConnectionState::Connecting;

                let sdk = env.sdk.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    match sdk.connect_with_ticket(&address, &ticket).await {
                        Ok(group) => Some(WalletAction::ConnectSucceeded {
                            group,
                            counterpart: address,
                        }),
                        Err(e) => Some(WalletAction::ConnectFailed {
                            message: e.to_string(),
                        }),
                    }
                }))]
            },

            WalletAction::ConnectSucceeded { group, counterpart } => {
                tracing::info!(counterpart = %counterpart, group = %group, "Connected");
                state.connection = ConnectionState::Connected {
                    since: env.clock.now(),
                };
                state.counterpart = Some(counterpart);
                state.group = Some(group);
                no_effects()
            },

            WalletAction::ConnectFailed { message } => {
                tracing::warn!(%message, "Connection failed");
                state.connection = ConnectionState::Error { message };
                no_effects()
            },

            WalletAction::Sdk(SdkEvent::Connected) => {
                tracing::info!("SDK transport connected");
                state.initialization = InitializationState::Ready;
                no_effects()
            },

            WalletAction::Sdk(SdkEvent::Disconnected { reason }) => {
                tracing::warn!(?reason, "SDK transport disconnected");
                if state.connection.is_connected() {
                    state.connection = ConnectionState::NotConnected;
                }
                no_effects()
            },

            WalletAction::Sdk(SdkEvent::Acknowledged { id }) => {
                tracing::trace!(message_id = %id, "Delivery acknowledged");
                no_effects()
            },

            other => {
                tracing::debug!(action = ?other, "Action not handled by connection reducer");
                no_effects()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mocks::MockSdk;
    use idwallet_testing::{ReducerTest, test_clock};
    use idwallet_testing::reducer_test::assertions::{assert_has_future_effect, assert_no_effects};

    fn env() -> WalletEnvironment<MockSdk, idwallet_testing::FixedClock> {
        WalletEnvironment::new(MockSdk::new(), test_clock())
    }

    #[test]
    fn connect_enters_connecting_and_calls_sdk() {
        ReducerTest::new(ConnectionReducer::new())
            .with_env(env())
            .given_state(WalletState::default())
            .when_action(WalletAction::Connect {
                address: crate::providers::InboxAddress::new("inbox-1"),
            })
            .then_state(|state| {
                assert_eq!(state.connection, ConnectionState::Connecting);
            })
            .then_effects(|effects| {
                assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn connect_succeeded_records_counterpart_and_time() {
        let environment = env();
        let connected_at = environment.clock.now();

        ReducerTest::new(ConnectionReducer::new())
            .with_env(environment)
            .given_state(WalletState::default())
            .when_action(WalletAction::ConnectSucceeded {
                group: crate::providers::GroupAddress::new("group-1"),
                counterpart: crate::providers::InboxAddress::new("inbox-1"),
            })
            .then_state(move |state| {
                assert_eq!(
                    state.connection,
                    ConnectionState::Connected { since: connected_at }
                );
                assert_eq!(
                    state.counterpart,
                    Some(crate::providers::InboxAddress::new("inbox-1"))
                );
            })
            .then_effects(|effects| {
                assert_no_effects(effects);
            })
            .run();
    }

    #[test]
    fn connect_failed_is_state_not_panic() {
        ReducerTest::new(ConnectionReducer::new())
            .with_env(env())
            .given_state(WalletState::default())
            .when_action(WalletAction::ConnectFailed {
                message: "inbox unreachable".into(),
            })
            .then_state(|state| {
                assert_eq!(
                    state.connection,
                    ConnectionState::Error {
                        message: "inbox unreachable".into()
                    }
                );
            })
            .run();
    }

    #[test]
    fn sdk_connected_marks_initialization_ready() {
        ReducerTest::new(ConnectionReducer::new())
            .with_env(env())
            .given_state(WalletState::default())
            .when_action(WalletAction::Sdk(SdkEvent::Connected))
            .then_state(|state| {
                assert!(state.initialization.is_ready());
            })
            .run();
    }
}
