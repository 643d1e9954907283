//! Owner path — direct price edits by the verified station owner.

use fuelmap_trust::refresh_trust;
use fuelmap_types::{
    EngineParams, FuelType, PendingChange, Price, PriceRecord, PriceSource, Station, Timestamp,
};
use serde::{Deserialize, Serialize};

/// Result of an owner's direct price update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirectUpdate {
    pub fuel_type: FuelType,
    pub price: Price,
    pub previous: Option<Price>,
    /// Community proposal for the same fuel that this update discarded.
    pub superseded: Option<PendingChange>,
    pub record: PriceRecord,
}

/// Set the confirmed price for `fuel` immediately.
///
/// The caller must already have established that the acting identity owns
/// `station`. Any pending community change for the same fuel is dropped and
/// the station becomes verified.
pub fn owner_set_price(
    station: &mut Station,
    fuel: FuelType,
    price: Price,
    params: &EngineParams,
    now: Timestamp,
) -> DirectUpdate {
    let superseded = station.take_pending(fuel);
    let previous = station.prices.set(fuel, price);
    station.is_verified = true;
    station.touch(now);
    let trust = refresh_trust(station, params, now);

    tracing::info!(
        station = %station.id,
        fuel = %fuel,
        price = %price,
        superseded = superseded.is_some(),
        trust = %trust,
        "owner price update"
    );

    DirectUpdate {
        fuel_type: fuel,
        price,
        previous,
        superseded,
        record: PriceRecord {
            station_id: station.id.clone(),
            fuel_type: fuel,
            price,
            recorded_at: now,
            source: PriceSource::Owner,
        },
    }
}
