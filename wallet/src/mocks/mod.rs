//! Mock providers for testing.
//!
//! Gated behind the `test-utils` feature so integration tests and demos can
//! drive the wallet flows without a real identity SDK.

mod sdk;

pub use sdk::MockSdk;
