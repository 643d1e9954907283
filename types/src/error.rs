//! Input validation errors shared across crates.

use thiserror::Error;

/// Rejected input. Raised before any state is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("price must be a positive finite number, got {0}")]
    InvalidPrice(f64),

    #[error("unknown fuel type: {0}")]
    UnknownFuelType(String),

    #[error("actor id must not be empty")]
    EmptyActorId,

    #[error("station id must not be empty")]
    EmptyStationId,

    #[error("station id must not contain control characters: {0:?}")]
    InvalidStationId(String),

    #[error("station name must not be empty")]
    EmptyName,

    #[error("coordinates out of range: lat {latitude}, lon {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParam { name: &'static str, reason: String },
}
