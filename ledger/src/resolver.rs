//! Consensus resolver — turns a pending change that reached the threshold
//! into the station's confirmed price.

use crate::error::LedgerError;
use fuelmap_trust::refresh_trust;
use fuelmap_types::{
    EngineParams, FuelType, PendingChange, PriceRecord, PriceSource, Station, Timestamp,
};
use serde::{Deserialize, Serialize};

/// What a successful resolution changed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// The pending change that was applied (already removed from the station).
    pub change: PendingChange,
    /// History entry to persist together with the station.
    pub record: PriceRecord,
}

/// Applies pending changes once enough voters agree.
#[derive(Clone, Debug)]
pub struct ConsensusResolver {
    params: EngineParams,
}

impl ConsensusResolver {
    pub fn new(params: EngineParams) -> Self {
        Self { params }
    }

    /// Apply the pending change for `fuel` to `station`.
    ///
    /// Preconditions are checked before anything is touched: on error the
    /// station is unchanged. On success the price is confirmed, the entry is
    /// removed, the station is verified and its trust recomputed.
    pub fn resolve(
        &self,
        station: &mut Station,
        fuel: FuelType,
        now: Timestamp,
    ) -> Result<Resolution, LedgerError> {
        let need = self.params.confirmation_threshold;
        let have = station
            .pending_for(fuel)
            .map(|change| change.votes)
            .ok_or(LedgerError::NoPendingChange(fuel))?;
        if have < need {
            return Err(LedgerError::BelowThreshold { fuel, have, need });
        }

        let change = station
            .take_pending(fuel)
            .ok_or(LedgerError::NoPendingChange(fuel))?;
        station.prices.set(fuel, change.proposed_price);
        station.is_verified = true;
        station.touch(now);
        let trust = refresh_trust(station, &self.params, now);

        tracing::info!(
            station = %station.id,
            fuel = %fuel,
            price = %change.proposed_price,
            votes = change.votes,
            trust = %trust,
            "community consensus reached"
        );

        let record = PriceRecord {
            station_id: station.id.clone(),
            fuel_type: fuel,
            price: change.proposed_price,
            recorded_at: now,
            source: PriceSource::Consensus,
        };
        Ok(Resolution { change, record })
    }
}
