//! LMDB storage backend for the FuelMap engine.
//!
//! Implements the storage traits from `fuelmap-store` using the `heed` LMDB
//! bindings. Stations and their price history live in two databases within a
//! single environment, so a price change and its history record can be
//! committed in one write transaction.

pub mod environment;
pub mod error;
pub mod history;
pub mod repository;
pub mod station;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use station::LmdbStationStore;
