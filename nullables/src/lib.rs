//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies (clock, storage) are swapped for test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically, including injected write failures
//! - Never touch the filesystem
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod store;

pub use clock::NullClock;
pub use store::NullStore;
