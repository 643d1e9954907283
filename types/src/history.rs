//! Price-history records appended whenever a confirmed price changes.

use crate::fuel::{FuelType, Price};
use crate::id::StationId;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// How a confirmed price came to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceSource {
    /// A pending change reached the confirmation threshold.
    Consensus,
    /// The station owner set the price directly.
    Owner,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub station_id: StationId,
    pub fuel_type: FuelType,
    pub price: Price,
    pub recorded_at: Timestamp,
    pub source: PriceSource,
}
