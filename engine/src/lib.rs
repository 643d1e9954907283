//! FuelMap engine — the facade callers drive.
//!
//! The engine holds no station state of its own. Every operation loads what
//! it needs from a [`StationRepository`](fuelmap_store::StationRepository),
//! mutates a working copy with the pure rules from the trust, ledger and
//! ranking crates, and persists the result:
//! - Community price proposals and votes, resolved by consensus
//! - Direct price updates by a station's owner
//! - Trust recomputation and best-value selection over all stations
//! - Registration, cascade deletion, proximity and text search

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::EngineConfig;
pub use engine::{recompute_all, RefreshSummary, StationDistance, StationEngine, Submission};
pub use error::EngineError;
pub use logging::{init_logging, LogFormat};
pub use metrics::EngineMetrics;
