//! The bounded trust score carried by every station.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A reliability indicator in `[1.0, 10.0]`.
///
/// Always derived from station state; constructing one clamps the input.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct TrustScore(f64);

impl TrustScore {
    pub const MIN: f64 = 1.0;
    pub const MAX: f64 = 10.0;
    /// Score assigned to a freshly registered station.
    pub const DEFAULT: Self = Self(5.0);

    /// Clamp `raw` into `[MIN, MAX]`. NaN collapses to `MIN`.
    pub fn clamped(raw: f64) -> Self {
        if raw.is_nan() {
            return Self(Self::MIN);
        }
        Self(raw.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for TrustScore {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<f64> for TrustScore {
    fn from(raw: f64) -> Self {
        Self::clamped(raw)
    }
}

impl From<TrustScore> for f64 {
    fn from(score: TrustScore) -> Self {
        score.0
    }
}

impl fmt::Display for TrustScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}
