use fuelmap_types::{FuelType, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("no pending change for {0}")]
    NoPendingChange(FuelType),

    #[error("pending {fuel} change has {have} votes, needs {need}")]
    BelowThreshold { fuel: FuelType, have: u32, need: u32 },
}
