//! The request/response exchange with the counterpart.
//!
//! This is the core flow of the wallet: notify the counterpart to initiate a
//! request, arm a single timeout timer, and resolve the exchange when the
//! counterpart's request arrives, the user responds, or the timer fires.
//!
//! The reducer runs under the store's state write lock, so checking the
//! current request state, transitioning it, and cancelling the timer is one
//! indivisible step. Two further guards keep late events from corrupting a
//! newer exchange:
//!
//! - each `NotifyCounterpart` allocates a fresh [`RequestToken`]; expiries
//!   and delivery results carrying a stale token are ignored, and
//! - the timer is registered under a single cancellation id, so arming a new
//!   timer cancels whatever timer was live before it.

use super::{Effects, no_effects, request_timeout_id};
use crate::actions::WalletAction;
use crate::config::WalletConfig;
use crate::environment::WalletEnvironment;
use crate::error::WalletError;
use crate::providers::{
    IdentitySdk, IncomingMessage, ResponseStatus, SdkEvent, VerificationRequest,
};
use crate::state::{IncomingRequest, RequestState, WalletState};
use idwallet_core::effect::Effect;
use idwallet_core::environment::Clock;
use idwallet_core::reducer::Reducer;
use idwallet_core::smallvec;
use std::marker::PhantomData;

/// Reducer for the counterpart request/response flow.
pub struct RequestReducer<S, C>
where
    S: IdentitySdk + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    config: WalletConfig,
    _marker: PhantomData<fn() -> (S, C)>,
}

impl<S, C> RequestReducer<S, C>
where
    S: IdentitySdk + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    /// Create the reducer from configuration.
    #[must_use]
    pub const fn new(config: WalletConfig) -> Self {
        Self {
            config,
            _marker: PhantomData,
        }
    }

    /// Map an inbound SDK message to a request the wallet flows recognize.
    ///
    /// Plain chat and non-agreement verification requests are not part of
    /// any flow and map to `None`.
    fn classify(message: IncomingMessage) -> Option<IncomingRequest> {
        match message {
            IncomingMessage::Credentials(bundle) => Some(IncomingRequest::Credentials(bundle)),
            IncomingMessage::CredentialRequest(request) => {
                Some(IncomingRequest::Credential(request))
            },
            IncomingMessage::VerificationRequest(request) => {
                if request.is_agreement() {
                    Some(IncomingRequest::Verification(request))
                } else {
                    tracing::debug!(
                        verification_type = %request.verification_type,
                        "Ignoring non-agreement verification request"
                    );
                    None
                }
            },
            IncomingMessage::Chat { text } => {
                tracing::debug!(len = text.len(), "Ignoring chat message");
                None
            },
        }
    }

    /// Effect that answers a verification request.
    fn respond_verification_effect(
        sdk: S,
        request: VerificationRequest,
        status: ResponseStatus,
    ) -> Effect<WalletAction> {
        Effect::Future(Box::pin(async move {
            match sdk.respond_verification(&request, status).await {
                Ok(()) => Some(WalletAction::ResponseRecorded { status }),
                Err(e) => Some(WalletAction::RespondFailed {
                    message: e.to_string(),
                }),
            }
        }))
    }
}

impl<S, C> Clone for RequestReducer<S, C>
where
    S: IdentitySdk + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            _marker: PhantomData,
        }
    }
}

impl<S, C> Reducer for RequestReducer<S, C>
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
            WalletAction::NotifyCounterpart { kind } => {
                let Some(counterpart) = state.counterpart.clone() else {
                    tracing::warn!(%kind, "Cannot notify counterpart: not connected");
                    state.request = RequestState::Error {
                        message: WalletError::NotConnected.to_string(),
                    };
                    return no_effects();
                };

                let token = state.allocate_request_token();
                tracing::info!(%kind, %token, "Notifying counterpart");
                state.request = RequestState::Sent { token };

                // Registered under the timer id so a reset cancels an
                // in-flight send the same way it cancels the timer.
                let sdk = env.sdk.clone();
                smallvec![Effect::cancellable(
                    request_timeout_id(),
                    Effect::Future(Box::pin(async move {
                        match sdk.send_chat(&counterpart, kind.as_tag()).await {
                            Ok(id) => {
                                tracing::debug!(message_id = %id, "Notification handed to SDK");
                                Some(WalletAction::NotifyDelivered { token })
                            },
                            Err(e) => Some(WalletAction::NotifyFailed {
                                token,
                                message: e.to_string(),
                            }),
                        }
                    })),
                )]
            },

            WalletAction::NotifyDelivered { token } => {
                if state.request != (RequestState::Sent { token }) {
                    tracing::debug!(%token, "Stale delivery confirmation, ignoring");
                    return no_effects();
                }

                tracing::debug!(%token, timeout = ?self.config.request_timeout, "Arming response timeout");
                smallvec![Effect::cancellable(
                    request_timeout_id(),
                    Effect::Delay {
                        duration: self.config.request_timeout,
                        action: Box::new(WalletAction::RequestTimedOut { token }),
                    },
                )]
            },

            WalletAction::NotifyFailed { token, message } => {
                if state.request != (RequestState::Sent { token }) {
                    tracing::debug!(%token, "Stale send failure, ignoring");
                    return no_effects();
                }

                tracing::warn!(%token, %message, "Notification send failed");
                state.request = RequestState::Error { message };
                no_effects()
            },

            WalletAction::RequestTimedOut { token } => {
                if state.request != (RequestState::Sent { token }) {
                    tracing::debug!(%token, "Stale timeout expiry, ignoring");
                    return no_effects();
                }

                tracing::warn!(%token, "No counterpart response before timeout");
                state.request = RequestState::Error {
                    message: WalletError::RequestTimeout.to_string(),
                };
                no_effects()
            },

            WalletAction::Sdk(SdkEvent::Message(message)) => {
                let Some(request) = Self::classify(message) else {
                    return no_effects();
                };

                tracing::info!("Counterpart request received");
                state.pending_request = Some(request.clone());
                state.request = RequestState::Received {
                    request: request.clone(),
                };

                let mut effects: Effects = smallvec![Effect::cancel(request_timeout_id())];

                if self.config.auto_accept_agreements {
                    if let IncomingRequest::Verification(verification) = request {
                        tracing::info!(id = %verification.id, "Auto-accepting agreement");
                        effects.push(Self::respond_verification_effect(
                            env.sdk.clone(),
                            verification,
                            ResponseStatus::Accepted,
                        ));
                    }
                }

                effects
            },

            WalletAction::Sdk(SdkEvent::Failed { id, reason }) => {
                if state.request.is_sent() {
                    tracing::warn!(?id, %reason, "SDK failure while request outstanding");
                    state.request = RequestState::Error { message: reason };
                    smallvec![Effect::cancel(request_timeout_id())]
                } else {
                    tracing::warn!(?id, %reason, "SDK failure");
                    no_effects()
                }
            },

            WalletAction::RespondToRequest { status } => match state.pending_request.clone() {
                Some(IncomingRequest::Credential(request)) => {
                    tracing::info!(id = %request.id, ?status, "Responding to credential request");
                    let sdk = env.sdk.clone();
                    smallvec![Effect::Future(Box::pin(async move {
                        match sdk.respond_credential(&request, status).await {
                            Ok(()) => Some(WalletAction::ResponseRecorded { status }),
                            Err(e) => Some(WalletAction::RespondFailed {
                                message: e.to_string(),
                            }),
                        }
                    }))]
                },
                Some(IncomingRequest::Verification(request)) => {
                    tracing::info!(id = %request.id, ?status, "Responding to verification request");
                    smallvec![Self::respond_verification_effect(
                        env.sdk.clone(),
                        request,
                        status
                    )]
                },
                Some(IncomingRequest::Credentials(_)) => {
                    tracing::warn!("Received credentials carry no response path");
                    no_effects()
                },
                None => {
                    tracing::warn!("No pending request to respond to");
                    no_effects()
                },
            },

            WalletAction::ResponseRecorded { status } => {
                tracing::info!(?status, "Response delivered");
                state.request = RequestState::ResponseSent { status };
                state.pending_request = None;
                no_effects()
            },

            WalletAction::RespondFailed { message } => {
                tracing::warn!(%message, "Response delivery failed");
                state.request = RequestState::Error { message };
                no_effects()
            },

            WalletAction::Reset { request } => {
                tracing::debug!("Resetting request flow");
                state.request = request;
                state.pending_request = None;
                smallvec![Effect::cancel(request_timeout_id())]
            },

            other => {
                tracing::debug!(action = ?other, "Action not handled by request reducer");
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
    use crate::providers::{CredentialRequest, InboxAddress};
    use crate::state::{RequestKind, RequestToken};
    use idwallet_testing::reducer_test::assertions::{
        assert_cancels, assert_has_cancellable_effect, assert_no_effects,
    };
    use idwallet_testing::{ReducerTest, test_clock};

    fn env() -> WalletEnvironment<MockSdk, idwallet_testing::FixedClock> {
        WalletEnvironment::new(MockSdk::new(), test_clock())
    }

    fn reducer() -> RequestReducer<MockSdk, idwallet_testing::FixedClock> {
        RequestReducer::new(WalletConfig::default())
    }

    fn connected_state() -> WalletState {
        WalletState {
            counterpart: Some(InboxAddress::new("inbox-1")),
            ..WalletState::default()
        }
    }

    fn verification(verification_type: &str) -> VerificationRequest {
        VerificationRequest {
            id: "v1".into(),
            verification_type: verification_type.into(),
            body: "terms".into(),
        }
    }

    #[test]
    fn notify_without_counterpart_is_an_error_without_effects() {
        ReducerTest::new(reducer())
            .with_env(env())
            .given_state(WalletState::default())
            .when_action(WalletAction::NotifyCounterpart {
                kind: RequestKind::CredentialAuth,
            })
            .then_state(|state| {
                assert!(matches!(state.request, RequestState::Error { .. }));
            })
            .then_effects(|effects| {
                assert_no_effects(effects);
            })
            .run();
    }

    #[test]
    fn notify_enters_sent_with_cancellable_send() {
        ReducerTest::new(reducer())
            .with_env(env())
            .given_state(connected_state())
            .when_action(WalletAction::NotifyCounterpart {
                kind: RequestKind::DocumentSigning,
            })
            .then_state(|state| {
                assert!(state.request.is_sent());
            })
            .then_effects(|effects| {
                assert_has_cancellable_effect(effects, &request_timeout_id());
            })
            .run();
    }

    #[test]
    fn delivery_confirmation_arms_the_timeout_timer() {
        let mut state = connected_state();
        let token = state.allocate_request_token();
        state.request = RequestState::Sent { token };

        ReducerTest::new(reducer())
            .with_env(env())
            .given_state(state)
            .when_action(WalletAction::NotifyDelivered { token })
            .then_effects(|effects| {
                assert_has_cancellable_effect(effects, &request_timeout_id());
            })
            .run();
    }

    #[test]
    fn stale_delivery_confirmation_is_ignored() {
        let mut state = connected_state();
        let token = state.allocate_request_token();
        let newer = state.allocate_request_token();
        state.request = RequestState::Sent { token: newer };

        ReducerTest::new(reducer())
            .with_env(env())
            .given_state(state)
            .when_action(WalletAction::NotifyDelivered { token })
            .then_state(move |state| {
                assert_eq!(state.request, RequestState::Sent { token: newer });
            })
            .then_effects(|effects| {
                assert_no_effects(effects);
            })
            .run();
    }

    #[test]
    fn timeout_with_matching_token_is_a_state_error() {
        let mut state = connected_state();
        let token = state.allocate_request_token();
        state.request = RequestState::Sent { token };

        ReducerTest::new(reducer())
            .with_env(env())
            .given_state(state)
            .when_action(WalletAction::RequestTimedOut { token })
            .then_state(|state| {
                assert_eq!(
                    state.request,
                    RequestState::Error {
                        message: WalletError::RequestTimeout.to_string()
                    }
                );
            })
            .run();
    }

    #[test]
    fn stale_timeout_does_not_fail_a_newer_request() {
        let mut state = connected_state();
        let stale = state.allocate_request_token();
        let current = state.allocate_request_token();
        state.request = RequestState::Sent { token: current };

        ReducerTest::new(reducer())
            .with_env(env())
            .given_state(state)
            .when_action(WalletAction::RequestTimedOut { token: stale })
            .then_state(move |state| {
                assert_eq!(state.request, RequestState::Sent { token: current });
            })
            .run();
    }

    #[test]
    fn send_failure_is_state_data_not_an_exception() {
        let mut state = connected_state();
        let token = state.allocate_request_token();
        state.request = RequestState::Sent { token };

        ReducerTest::new(reducer())
            .with_env(env())
            .given_state(state)
            .when_action(WalletAction::NotifyFailed {
                token,
                message: "inbox unreachable".into(),
            })
            .then_state(|state| {
                assert_eq!(
                    state.request,
                    RequestState::Error {
                        message: "inbox unreachable".into()
                    }
                );
            })
            .run();
    }

    #[test]
    fn incoming_request_cancels_the_timer_and_records_the_payload() {
        let mut state = connected_state();
        let token = state.allocate_request_token();
        state.request = RequestState::Sent { token };

        let request = CredentialRequest {
            id: "c1".into(),
            requested_claims: vec!["email".into()],
        };

        ReducerTest::new(reducer())
            .with_env(env())
            .given_state(state)
            .when_action(WalletAction::Sdk(SdkEvent::Message(
                IncomingMessage::CredentialRequest(request.clone()),
            )))
            .then_state(move |state| {
                assert_eq!(
                    state.request,
                    RequestState::Received {
                        request: IncomingRequest::Credential(request.clone())
                    }
                );
                assert!(state.pending_request.is_some());
            })
            .then_effects(|effects| {
                assert_cancels(effects, &request_timeout_id());
            })
            .run();
    }

    #[test]
    fn chat_and_non_agreement_messages_are_ignored() {
        let mut state = connected_state();
        let token = state.allocate_request_token();
        state.request = RequestState::Sent { token };

        let after_chat = ReducerTest::new(reducer())
            .with_env(env())
            .given_state(state)
            .when_action(WalletAction::Sdk(SdkEvent::Message(
                IncomingMessage::Chat {
                    text: "hello".into(),
                },
            )))
            .then_state(move |state| {
                assert_eq!(state.request, RequestState::Sent { token });
            })
            .run();

        ReducerTest::new(reducer())
            .with_env(env())
            .given_state(after_chat)
            .when_action(WalletAction::Sdk(SdkEvent::Message(
                IncomingMessage::VerificationRequest(verification("age_check")),
            )))
            .then_state(move |state| {
                assert_eq!(state.request, RequestState::Sent { token });
                assert!(state.pending_request.is_none());
            })
            .run();
    }

    #[test]
    fn auto_accept_emits_a_response_for_agreements() {
        let config = WalletConfig::new().with_auto_accept_agreements(true);

        ReducerTest::new(RequestReducer::<MockSdk, idwallet_testing::FixedClock>::new(config))
            .with_env(env())
            .given_state(connected_state())
            .when_action(WalletAction::Sdk(SdkEvent::Message(
                IncomingMessage::VerificationRequest(verification("agreement")),
            )))
            .then_effects(|effects| {
                assert_cancels(effects, &request_timeout_id());
                assert!(effects.len() >= 2, "expected cancel plus respond future");
            })
            .run();
    }

    #[test]
    fn response_recorded_clears_the_pending_request() {
        let mut state = connected_state();
        state.pending_request = Some(IncomingRequest::Verification(verification("agreement")));
        state.request = RequestState::Received {
            request: IncomingRequest::Verification(verification("agreement")),
        };

        ReducerTest::new(reducer())
            .with_env(env())
            .given_state(state)
            .when_action(WalletAction::ResponseRecorded {
                status: ResponseStatus::Accepted,
            })
            .then_state(|state| {
                assert_eq!(
                    state.request,
                    RequestState::ResponseSent {
                        status: ResponseStatus::Accepted
                    }
                );
                assert!(state.pending_request.is_none());
            })
            .run();
    }

    #[test]
    fn reset_clears_pending_request_and_cancels_the_timer() {
        let mut state = connected_state();
        let token = state.allocate_request_token();
        state.request = RequestState::Sent { token };
        state.pending_request = Some(IncomingRequest::Verification(verification("agreement")));

        ReducerTest::new(reducer())
            .with_env(env())
            .given_state(state)
            .when_action(WalletAction::Reset {
                request: RequestState::Idle,
            })
            .then_state(|state| {
                assert_eq!(state.request, RequestState::Idle);
                assert!(state.pending_request.is_none());
            })
            .then_effects(|effects| {
                assert_cancels(effects, &request_timeout_id());
            })
            .run();
    }

    #[test]
    fn tokens_differ_across_notifications() {
        let first = ReducerTest::new(reducer())
            .with_env(env())
            .given_state(connected_state())
            .when_action(WalletAction::NotifyCounterpart {
                kind: RequestKind::CredentialAuth,
            })
            .run();

        let first_token = match first.request {
            RequestState::Sent { token } => token,
            ref other => panic!("expected Sent, got {other:?}"),
        };

        let second = ReducerTest::new(reducer())
            .with_env(env())
            .given_state(first)
            .when_action(WalletAction::NotifyCounterpart {
                kind: RequestKind::CredentialAuth,
            })
            .run();

        match second.request {
            RequestState::Sent { token } => assert_ne!(token, first_token),
            ref other => panic!("expected Sent, got {other:?}"),
        }
        let _: RequestToken = first_token;
    }
}
