use thiserror::Error;

use fuelmap_store::StoreError;
use fuelmap_types::{StationId, ValidationError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("ledger error: {0}")]
    Ledger(#[from] fuelmap_ledger::LedgerError),

    #[error("station not found: {0}")]
    StationNotFound(StationId),

    #[error("station already exists: {0}")]
    DuplicateStation(StationId),

    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("config error: {0}")]
    Config(String),
}
