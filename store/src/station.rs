//! Station storage trait.

use crate::StoreError;
use fuelmap_types::{Station, StationId};

/// Trait for storing station records.
pub trait StationStore {
    /// Load every station, in a stable order.
    fn load_all_stations(&self) -> Result<Vec<Station>, StoreError>;

    /// Get a single station. Returns `StoreError::NotFound` if absent.
    fn get_station(&self, id: &StationId) -> Result<Station, StoreError>;

    /// Insert or replace a station.
    fn save_station(&self, station: &Station) -> Result<(), StoreError>;

    /// Insert a station that must not exist yet. Returns `StoreError::Duplicate`
    /// if the id is taken.
    fn insert_station(&self, station: &Station) -> Result<(), StoreError>;

    /// Delete a station. Returns `StoreError::NotFound` if absent.
    fn delete_station(&self, id: &StationId) -> Result<(), StoreError>;

    /// Number of stored stations.
    fn station_count(&self) -> Result<u64, StoreError>;
}
