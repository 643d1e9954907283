//! Station trust score.
//!
//! `trust(s) = clamp(5 + verified + undisputed + competitive + coverage − stale, 1, 10)`
//!
//! The score is a pure function of the station and the current time: nothing
//! here reads a clock or touches storage, and computing it twice on the same
//! state gives the same value.

pub mod score;

pub use score::{compute_trust_score, refresh_trust, TrustBreakdown};
