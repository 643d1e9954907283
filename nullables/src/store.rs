//! Nullable store — thread-safe in-memory storage for testing.
//!
//! Writes can be made to fail on demand so callers can exercise their
//! persistence-failure paths. A failing write changes nothing.

use fuelmap_store::{PriceHistoryStore, StationRepository, StationStore, StoreError};
use fuelmap_types::{PriceRecord, Station, StationId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Tables {
    stations: BTreeMap<StationId, Station>,
    history: BTreeMap<StationId, Vec<PriceRecord>>,
    failing: BTreeSet<StationId>,
}

impl Tables {
    fn check(&self, id: &StationId) -> Result<(), StoreError> {
        if self.failing.contains(id) {
            return Err(StoreError::Backend(format!("injected write failure for '{id}'")));
        }
        Ok(())
    }
}

/// An in-memory station + history store for testing.
#[derive(Default)]
pub struct NullStore {
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with `StoreError::Backend` until
    /// turned off again. Reads keep working.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write touching `id` fail, including batches
    /// that contain it.
    pub fn fail_writes_for(&self, id: &StationId) -> Result<(), StoreError> {
        self.read()?.failing.insert(id.clone());
        Ok(())
    }

    fn read(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend("null store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected write failure".to_string()));
        }
        self.read()
    }
}

impl StationStore for NullStore {
    fn load_all_stations(&self) -> Result<Vec<Station>, StoreError> {
        Ok(self.read()?.stations.values().cloned().collect())
    }

    fn get_station(&self, id: &StationId) -> Result<Station, StoreError> {
        self.read()?
            .stations
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("station '{id}'")))
    }

    fn save_station(&self, station: &Station) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        tables.check(&station.id)?;
        tables.stations.insert(station.id.clone(), station.clone());
        Ok(())
    }

    fn insert_station(&self, station: &Station) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        tables.check(&station.id)?;
        if tables.stations.contains_key(&station.id) {
            return Err(StoreError::Duplicate(format!("station '{}'", station.id)));
        }
        tables.stations.insert(station.id.clone(), station.clone());
        Ok(())
    }

    fn delete_station(&self, id: &StationId) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        tables.check(id)?;
        tables
            .stations
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("station '{id}'")))
    }

    fn station_count(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.stations.len() as u64)
    }
}

impl PriceHistoryStore for NullStore {
    fn append_price_history(&self, record: &PriceRecord) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        tables.check(&record.station_id)?;
        tables
            .history
            .entry(record.station_id.clone())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    fn price_history(&self, station: &StationId) -> Result<Vec<PriceRecord>, StoreError> {
        let mut records = self
            .read()?
            .history
            .get(station)
            .cloned()
            .unwrap_or_default();
        records.sort_by_key(|r| r.recorded_at);
        Ok(records)
    }

    fn delete_price_history(&self, station: &StationId) -> Result<u64, StoreError> {
        let mut tables = self.write()?;
        tables.check(station)?;
        let removed = tables.history.remove(station).unwrap_or_default();
        Ok(removed.len() as u64)
    }
}

impl StationRepository for NullStore {
    fn commit_price_change(
        &self,
        station: &Station,
        record: &PriceRecord,
    ) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        tables.check(&station.id)?;
        tables.stations.insert(station.id.clone(), station.clone());
        tables
            .history
            .entry(record.station_id.clone())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    fn save_stations(&self, stations: &[Station]) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        for station in stations {
            tables.check(&station.id)?;
        }
        for station in stations {
            tables.stations.insert(station.id.clone(), station.clone());
        }
        Ok(())
    }

    fn purge_station(&self, id: &StationId) -> Result<u64, StoreError> {
        let mut tables = self.write()?;
        tables.check(id)?;
        if tables.stations.remove(id).is_none() {
            return Err(StoreError::NotFound(format!("station '{id}'")));
        }
        let removed = tables.history.remove(id).unwrap_or_default();
        Ok(removed.len() as u64)
    }
}
