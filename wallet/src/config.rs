//! Wallet configuration.

use std::time::Duration;

/// Configuration for the wallet reducers.
///
/// # Example
///
/// ```
/// use idwallet_wallet::config::WalletConfig;
/// use std::time::Duration;
///
/// let config = WalletConfig::new()
///     .with_request_timeout(Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct WalletConfig {
    /// How long to wait for a counterpart response after a request
    /// notification is delivered. Default: 20 seconds.
    pub request_timeout: Duration,

    /// Automatically accept agreement verification requests as soon as they
    /// arrive, without waiting for a `RespondToRequest` from the UI.
    /// Default: false.
    pub auto_accept_agreements: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(20),
            auto_accept_agreements: false,
        }
    }
}

impl WalletConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the counterpart response timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Enable or disable automatic acceptance of agreement requests.
    #[must_use]
    pub const fn with_auto_accept_agreements(mut self, enabled: bool) -> Self {
        self.auto_accept_agreements = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_twenty_seconds() {
        let config = WalletConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(20));
        assert!(!config.auto_accept_agreements);
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = WalletConfig::new()
            .with_request_timeout(Duration::from_millis(50))
            .with_auto_accept_agreements(true);
        assert_eq!(config.request_timeout, Duration::from_millis(50));
        assert!(config.auto_accept_agreements);
    }
}
