//! Additive trust model.

use fuelmap_types::{EngineParams, FuelType, Station, Timestamp, TrustScore};
use serde::{Deserialize, Serialize};

pub const BASE_SCORE: f64 = 5.0;
pub const VERIFIED_BONUS: f64 = 3.0;
pub const UNDISPUTED_BONUS: f64 = 1.0;
pub const COMPETITIVE_PRICE_BONUS: f64 = 0.5;
pub const COVERAGE_BONUS: f64 = 0.5;
/// Confirmed fuel types needed for the coverage bonus.
pub const COVERAGE_MIN_FUELS: usize = 2;
pub const STALE_DISPUTE_PENALTY: f64 = 0.5;

/// Each component of a station's trust score, before clamping.
///
/// Useful for explaining a score to a user; [`TrustBreakdown::score`] is the
/// value every other part of the engine sees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrustBreakdown {
    pub base: f64,
    pub verified: f64,
    pub undisputed: f64,
    pub competitive_price: f64,
    pub coverage: f64,
    /// Number of pending changes past the staleness window.
    pub stale_disputes: u32,
    pub stale_penalty: f64,
}

impl TrustBreakdown {
    pub fn for_station(station: &Station, params: &EngineParams, now: Timestamp) -> Self {
        let verified = if station.is_verified {
            VERIFIED_BONUS
        } else {
            0.0
        };

        let undisputed = if station.pending_changes.is_empty() {
            UNDISPUTED_BONUS
        } else {
            0.0
        };

        let competitive_price = match station.prices.get(FuelType::Gasoline) {
            Some(price) if price.value() < params.competitive_price_threshold => {
                COMPETITIVE_PRICE_BONUS
            }
            _ => 0.0,
        };

        let coverage = if station.prices.confirmed_count() >= COVERAGE_MIN_FUELS {
            COVERAGE_BONUS
        } else {
            0.0
        };

        let stale_after = params.stale_dispute_secs();
        let stale_disputes = station
            .pending_changes
            .iter()
            .filter(|change| change.is_stale(stale_after, now))
            .count() as u32;

        Self {
            base: BASE_SCORE,
            verified,
            undisputed,
            competitive_price,
            coverage,
            stale_disputes,
            stale_penalty: f64::from(stale_disputes) * STALE_DISPUTE_PENALTY,
        }
    }

    /// Sum of all components, unclamped.
    pub fn raw_total(&self) -> f64 {
        self.base + self.verified + self.undisputed + self.competitive_price + self.coverage
            - self.stale_penalty
    }

    pub fn score(&self) -> TrustScore {
        TrustScore::clamped(self.raw_total())
    }
}

/// Compute the trust score of `station` at time `now`.
pub fn compute_trust_score(station: &Station, params: &EngineParams, now: Timestamp) -> TrustScore {
    TrustBreakdown::for_station(station, params, now).score()
}

/// Recompute and store the trust score on `station`, returning it.
pub fn refresh_trust(station: &mut Station, params: &EngineParams, now: Timestamp) -> TrustScore {
    let score = compute_trust_score(station, params, now);
    station.trust_score = score;
    score
}
