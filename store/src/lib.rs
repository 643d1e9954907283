//! Abstract storage traits for the FuelMap engine.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The engine depends only on the traits.

pub mod error;
pub mod history;
pub mod station;

pub use error::StoreError;
pub use history::PriceHistoryStore;
pub use station::StationStore;

use fuelmap_types::{PriceRecord, Station, StationId};

/// Everything the engine needs from persistence.
pub trait StationRepository: StationStore + PriceHistoryStore {
    /// Save `station` and append `record` to its price history as one unit.
    ///
    /// Implementations must make this atomic: either both writes are visible
    /// afterwards or neither is.
    fn commit_price_change(
        &self,
        station: &Station,
        record: &PriceRecord,
    ) -> Result<(), StoreError>;

    /// Insert or replace every station in `stations` as one unit.
    ///
    /// Implementations must make this atomic: if any write fails, none of
    /// them is visible afterwards.
    fn save_stations(&self, stations: &[Station]) -> Result<(), StoreError>;

    /// Delete a station together with its price history, atomically.
    /// Returns the number of history records removed.
    fn purge_station(&self, id: &StationId) -> Result<u64, StoreError>;
}
