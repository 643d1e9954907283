//! Atomic multi-database operations.
//!
//! Each operation runs in a single LMDB write transaction. If any step
//! fails the transaction is dropped without commit, which aborts it, and
//! neither database changes.

use fuelmap_store::{StationRepository, StoreError};
use fuelmap_types::{PriceRecord, Station, StationId};

use crate::station::LmdbStationStore;
use crate::LmdbError;

impl StationRepository for LmdbStationStore {
    fn commit_price_change(
        &self,
        station: &Station,
        record: &PriceRecord,
    ) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.put_station_in(&mut wtxn, station)?;
        self.append_history_in(&mut wtxn, record)?;
        wtxn.commit().map_err(LmdbError::from)?;
        tracing::trace!(station = %station.id, fuel = %record.fuel_type, "committed price change");
        Ok(())
    }

    fn save_stations(&self, stations: &[Station]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        for station in stations {
            self.put_station_in(&mut wtxn, station)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        tracing::trace!(count = stations.len(), "saved station batch");
        Ok(())
    }

    fn purge_station(&self, id: &StationId) -> Result<u64, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let existed = self
            .stations_db
            .delete(&mut wtxn, id.as_str())
            .map_err(LmdbError::from)?;
        if !existed {
            return Err(StoreError::NotFound(format!("station '{id}'")));
        }
        let removed = self.delete_history_in(&mut wtxn, id)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(removed)
    }
}
