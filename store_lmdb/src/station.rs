//! LMDB implementation of StationStore.
//!
//! Stations are keyed by their id string and stored as bincode.

use std::sync::Arc;

use heed::types::{Bytes, Str};
use heed::{Database, Env, RwTxn};

use fuelmap_store::station::StationStore;
use fuelmap_store::StoreError;
use fuelmap_types::{Station, StationId};

use crate::LmdbError;

pub struct LmdbStationStore {
    pub(crate) env: Arc<Env>,
    pub(crate) stations_db: Database<Str, Bytes>,
    pub(crate) history_db: Database<Bytes, Bytes>,
}

impl LmdbStationStore {
    /// Serialize and write `station` inside an open write transaction.
    pub(crate) fn put_station_in(
        &self,
        wtxn: &mut RwTxn<'_>,
        station: &Station,
    ) -> Result<(), LmdbError> {
        let bytes = bincode::serialize(station)?;
        self.stations_db.put(wtxn, station.id.as_str(), &bytes)?;
        Ok(())
    }
}

impl StationStore for LmdbStationStore {
    fn load_all_stations(&self) -> Result<Vec<Station>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.stations_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut stations = Vec::new();
        for result in iter {
            let (_id, val) = result.map_err(LmdbError::from)?;
            let station: Station = bincode::deserialize(val).map_err(LmdbError::from)?;
            stations.push(station);
        }
        Ok(stations)
    }

    fn get_station(&self, id: &StationId) -> Result<Station, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .stations_db
            .get(&rtxn, id.as_str())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("station '{id}'")))?;
        let station: Station = bincode::deserialize(val).map_err(LmdbError::from)?;
        Ok(station)
    }

    fn save_station(&self, station: &Station) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.put_station_in(&mut wtxn, station)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn insert_station(&self, station: &Station) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let taken = self
            .stations_db
            .get(&wtxn, station.id.as_str())
            .map_err(LmdbError::from)?
            .is_some();
        if taken {
            return Err(StoreError::Duplicate(format!("station '{}'", station.id)));
        }
        self.put_station_in(&mut wtxn, station)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete_station(&self, id: &StationId) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let existed = self
            .stations_db
            .delete(&mut wtxn, id.as_str())
            .map_err(LmdbError::from)?;
        if !existed {
            return Err(StoreError::NotFound(format!("station '{id}'")));
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn station_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.stations_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuelmap_types::{FuelType, NewStation, Price, Timestamp};

    fn open_test_env() -> (tempfile::TempDir, crate::LmdbEnvironment) {
        let dir = tempfile::tempdir().unwrap();
        let env = crate::LmdbEnvironment::open(dir.path(), 1 << 20).unwrap();
        (dir, env)
    }

    fn station(id: &str) -> Station {
        Station::register(
            NewStation {
                id: StationId::new(id).unwrap(),
                name: format!("Posto {id}"),
                cnpj: None,
                location: None,
                owner: None,
            },
            Timestamp::new(100),
        )
        .unwrap()
    }

    #[test]
    fn save_and_get_station() {
        let (_dir, env) = open_test_env();
        let store = env.station_store();
        let mut s = station("alpha");
        s.prices.set(FuelType::Diesel, Price::new(6.19).unwrap());

        store.save_station(&s).unwrap();
        let loaded = store.get_station(&s.id).unwrap();
        assert_eq!(loaded, s);
        assert_eq!(store.station_count().unwrap(), 1);
    }

    #[test]
    fn missing_station_is_not_found() {
        let (_dir, env) = open_test_env();
        let store = env.station_store();
        let id = StationId::new("ghost").unwrap();
        assert!(matches!(store.get_station(&id), Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete_station(&id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn insert_rejects_duplicate_id() {
        let (_dir, env) = open_test_env();
        let store = env.station_store();
        store.insert_station(&station("beta")).unwrap();
        assert!(matches!(
            store.insert_station(&station("beta")),
            Err(StoreError::Duplicate(_))
        ));
    }

    #[test]
    fn load_all_is_ordered_by_id() {
        let (_dir, env) = open_test_env();
        let store = env.station_store();
        for id in ["charlie", "alpha", "bravo"] {
            store.save_station(&station(id)).unwrap();
        }
        let ids: Vec<String> = store
            .load_all_stations()
            .unwrap()
            .into_iter()
            .map(|s| s.id.to_string())
            .collect();
        assert_eq!(ids, vec!["alpha", "bravo", "charlie"]);
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let s = station("durable");
        {
            let env = crate::LmdbEnvironment::open(dir.path(), 1 << 20).unwrap();
            env.station_store().save_station(&s).unwrap();
        }
        let env = crate::LmdbEnvironment::open(dir.path(), 1 << 20).unwrap();
        assert_eq!(env.station_store().get_station(&s.id).unwrap(), s);
    }
}
