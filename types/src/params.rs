//! Engine parameters — every tunable threshold of the trust and consensus rules.

use crate::error::ValidationError;
use crate::time::SECS_PER_DAY;
use serde::{Deserialize, Serialize};

/// Thresholds shared by the trust calculator, the pending-change ledger and
/// the best-value selector.
///
/// Every field has a serde default so a partial `[params]` TOML table works.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineParams {
    /// Votes needed to finalize a pending price.
    #[serde(default = "default_confirmation_threshold")]
    pub confirmation_threshold: u32,

    /// Age (days) after which an unresolved pending change penalizes trust.
    #[serde(default = "default_stale_dispute_days")]
    pub stale_dispute_days: u64,

    /// Gasoline price below which the competitive-price bonus applies.
    #[serde(default = "default_competitive_price_threshold")]
    pub competitive_price_threshold: f64,

    /// Trust floor for best-value eligibility.
    #[serde(default = "default_min_trust_for_best_value")]
    pub min_trust_for_best_value: f64,

    /// Default radius (km) for proximity queries.
    #[serde(default = "default_search_radius_km")]
    pub search_radius_km: f64,
}

fn default_confirmation_threshold() -> u32 {
    3
}

fn default_stale_dispute_days() -> u64 {
    7
}

fn default_competitive_price_threshold() -> f64 {
    6.0
}

fn default_min_trust_for_best_value() -> f64 {
    6.0
}

fn default_search_radius_km() -> f64 {
    2.0
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            confirmation_threshold: default_confirmation_threshold(),
            stale_dispute_days: default_stale_dispute_days(),
            competitive_price_threshold: default_competitive_price_threshold(),
            min_trust_for_best_value: default_min_trust_for_best_value(),
            search_radius_km: default_search_radius_km(),
        }
    }
}

impl EngineParams {
    /// Staleness window in seconds.
    pub fn stale_dispute_secs(&self) -> u64 {
        self.stale_dispute_days.saturating_mul(SECS_PER_DAY)
    }

    /// Reject parameter sets the rules cannot work with.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.confirmation_threshold == 0 {
            return Err(ValidationError::InvalidParam {
                name: "confirmation_threshold",
                reason: "must be at least 1".into(),
            });
        }
        if !(self.competitive_price_threshold.is_finite() && self.competitive_price_threshold > 0.0)
        {
            return Err(ValidationError::InvalidParam {
                name: "competitive_price_threshold",
                reason: format!("must be positive, got {}", self.competitive_price_threshold),
            });
        }
        if !(1.0..=10.0).contains(&self.min_trust_for_best_value) {
            return Err(ValidationError::InvalidParam {
                name: "min_trust_for_best_value",
                reason: format!("must lie in [1, 10], got {}", self.min_trust_for_best_value),
            });
        }
        if !(self.search_radius_km.is_finite() && self.search_radius_km > 0.0) {
            return Err(ValidationError::InvalidParam {
                name: "search_radius_km",
                reason: format!("must be positive, got {}", self.search_radius_km),
            });
        }
        Ok(())
    }
}
