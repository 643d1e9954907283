//! Fundamental types for the FuelMap price-consensus engine.
//!
//! This crate defines the data shared across every other crate in the workspace:
//! station and actor identifiers, fuel types and prices, coordinates, timestamps,
//! the station record with its pending changes, price-history records, and the
//! tunable engine parameters.

pub mod error;
pub mod fuel;
pub mod geo;
pub mod history;
pub mod id;
pub mod params;
pub mod pending;
pub mod station;
pub mod time;
pub mod trust;

pub use error::ValidationError;
pub use fuel::{FuelPrices, FuelType, Price};
pub use geo::Coordinates;
pub use history::{PriceRecord, PriceSource};
pub use id::{ActorId, StationId};
pub use params::EngineParams;
pub use pending::PendingChange;
pub use station::{NewStation, Station};
pub use time::Timestamp;
pub use trust::TrustScore;
