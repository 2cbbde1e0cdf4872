//! # idwallet Wallet
//!
//! State, actions, and reducers for an identity wallet app built over an
//! opaque identity SDK.
//!
//! The wallet core is a state machine driven through a
//! [`Store`](idwallet_runtime::Store):
//!
//! - screens dispatch [`actions::WalletAction`] user intents,
//! - SDK callbacks arrive as [`providers::SdkEvent`] through the
//!   [`bridge`] event pump,
//! - reducers transition [`state::WalletState`] and describe side effects
//!   (SDK calls, the counterpart-response timeout timer) as effect values,
//! - the runtime executes the effects and feeds their results back as
//!   actions.
//!
//! Failures are flow state, not exceptions: a timed-out or failed request
//! lands in `RequestState::Error` for the UI to render.
//!
//! ## Example
//!
//! ```ignore
//! use idwallet_runtime::Store;
//! use idwallet_wallet::{
//!     WalletStore, actions::WalletAction, bridge, config::WalletConfig,
//!     environment::WalletEnvironment, reducers::WalletReducer, state::WalletState,
//! };
//!
//! let store = Store::new(
//!     WalletState::default(),
//!     WalletReducer::new(WalletConfig::default()),
//!     WalletEnvironment::new(sdk, idwallet_core::environment::SystemClock),
//! );
//! let (events, _pump) = bridge::spawn_event_pump(store.clone());
//!
//! store.send(WalletAction::Initialize).await?;
//! ```

pub mod actions;
pub mod bridge;
pub mod config;
pub mod environment;
pub mod error;
pub mod providers;
pub mod reducers;
pub mod state;

#[cfg(feature = "test-utils")]
pub mod mocks;

pub use actions::WalletAction;
pub use config::WalletConfig;
pub use error::{Result, WalletError};
pub use state::{WalletSnapshot, WalletState};

/// Store type driving the wallet reducers.
pub type WalletStore<S, C> = idwallet_runtime::Store<
    state::WalletState,
    actions::WalletAction,
    environment::WalletEnvironment<S, C>,
    reducers::WalletReducer<S, C>,
>;
