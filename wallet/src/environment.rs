//! Wallet environment - injected dependencies.

use crate::providers::IdentitySdk;
use idwallet_core::environment::Clock;

/// Dependencies injected into the wallet reducers.
///
/// Generic over the SDK and clock implementations so tests can swap in
/// mocks without touching reducer code.
#[derive(Debug, Clone)]
pub struct WalletEnvironment<S, C>
where
    S: IdentitySdk + Clone,
    C: Clock + Clone,
{
    /// The identity SDK boundary.
    pub sdk: S,
    /// Time source.
    pub clock: C,
}

impl<S, C> WalletEnvironment<S, C>
where
    S: IdentitySdk + Clone,
    C: Clock + Clone,
{
    /// Create an environment from its parts.
    pub const fn new(sdk: S, clock: C) -> Self {
        Self { sdk, clock }
    }
}
