//! Price-history storage trait.

use crate::StoreError;
use fuelmap_types::{PriceRecord, StationId};

/// Append-only log of confirmed price changes per station.
pub trait PriceHistoryStore {
    fn append_price_history(&self, record: &PriceRecord) -> Result<(), StoreError>;

    /// All records for `station`, oldest first.
    fn price_history(&self, station: &StationId) -> Result<Vec<PriceRecord>, StoreError>;

    /// Drop every record for `station`. Returns how many were removed.
    fn delete_price_history(&self, station: &StationId) -> Result<u64, StoreError>;
}
