//! LMDB implementation of PriceHistoryStore.
//!
//! Key format: `station_id ++ 0x00 ++ recorded_at (u64 BE) ++ seq (u32 BE)`.
//! Station ids never contain control characters, so the NUL separator keeps
//! one station's prefix from matching another id that merely starts with the
//! same text. The big-endian suffix makes
//! LMDB's byte ordering chronological. `seq` disambiguates records written
//! in the same second.

use std::ops::Bound;

use heed::RwTxn;

use fuelmap_store::history::PriceHistoryStore;
use fuelmap_store::StoreError;
use fuelmap_types::{PriceRecord, StationId};

use crate::station::LmdbStationStore;
use crate::LmdbError;

const SEPARATOR: u8 = 0x00;

/// `station_id ++ 0x00`, the prefix shared by all of a station's records.
fn station_prefix(station: &StationId) -> Vec<u8> {
    let id = station.as_str().as_bytes();
    let mut prefix = Vec::with_capacity(id.len() + 1 + 8 + 4);
    prefix.extend_from_slice(id);
    prefix.push(SEPARATOR);
    prefix
}

fn history_key(record: &PriceRecord, seq: u32) -> Vec<u8> {
    let mut key = station_prefix(&record.station_id);
    key.extend_from_slice(&record.recorded_at.as_secs().to_be_bytes());
    key.extend_from_slice(&seq.to_be_bytes());
    key
}

/// Increment a byte string to the smallest value greater than every string
/// it prefixes. Used as the exclusive upper bound of a prefix scan.
pub(crate) fn increment_prefix(prefix: &mut Vec<u8>) {
    while let Some(last) = prefix.last_mut() {
        if *last < u8::MAX {
            *last += 1;
            return;
        }
        prefix.pop();
    }
}

fn prefix_bounds(prefix: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let lower = prefix.to_vec();
    let mut upper = prefix.to_vec();
    increment_prefix(&mut upper);
    (lower, upper)
}

impl LmdbStationStore {
    /// Append `record` inside an open write transaction.
    pub(crate) fn append_history_in(
        &self,
        wtxn: &mut RwTxn<'_>,
        record: &PriceRecord,
    ) -> Result<(), LmdbError> {
        let mut same_second = station_prefix(&record.station_id);
        same_second.extend_from_slice(&record.recorded_at.as_secs().to_be_bytes());
        let (lower, upper) = prefix_bounds(&same_second);
        let bounds = (
            Bound::Included(lower.as_slice()),
            Bound::Excluded(upper.as_slice()),
        );
        let seq = self.history_db.range(wtxn, &bounds)?.count();
        let seq = u32::try_from(seq)
            .map_err(|_| LmdbError::Serialization("history sequence overflow".to_string()))?;

        let bytes = bincode::serialize(record)?;
        self.history_db
            .put(wtxn, &history_key(record, seq), &bytes)?;
        Ok(())
    }

    /// Delete every record of `station` inside an open write transaction.
    pub(crate) fn delete_history_in(
        &self,
        wtxn: &mut RwTxn<'_>,
        station: &StationId,
    ) -> Result<u64, LmdbError> {
        let (lower, upper) = prefix_bounds(&station_prefix(station));
        let bounds = (
            Bound::Included(lower.as_slice()),
            Bound::Excluded(upper.as_slice()),
        );
        let removed = self.history_db.delete_range(wtxn, &bounds)?;
        Ok(removed as u64)
    }
}

impl PriceHistoryStore for LmdbStationStore {
    fn append_price_history(&self, record: &PriceRecord) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.append_history_in(&mut wtxn, record)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn price_history(&self, station: &StationId) -> Result<Vec<PriceRecord>, StoreError> {
        let (lower, upper) = prefix_bounds(&station_prefix(station));
        let bounds = (
            Bound::Included(lower.as_slice()),
            Bound::Excluded(upper.as_slice()),
        );
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self
            .history_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;
        let mut records = Vec::new();
        for result in iter {
            let (_key, val) = result.map_err(LmdbError::from)?;
            let record: PriceRecord = bincode::deserialize(val).map_err(LmdbError::from)?;
            records.push(record);
        }
        Ok(records)
    }

    fn delete_price_history(&self, station: &StationId) -> Result<u64, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let removed = self.delete_history_in(&mut wtxn, station)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(removed)
    }
}
