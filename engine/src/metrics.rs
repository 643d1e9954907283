//! Prometheus metrics for the engine.
//!
//! [`EngineMetrics`] owns a dedicated [`Registry`] so several engines (or
//! tests) in one process never collide. Counters only move after the
//! corresponding change has been persisted.

use prometheus::{
    register_int_counter_with_registry, register_int_gauge_with_registry, Encoder, IntCounter,
    IntGauge, Opts, Registry, TextEncoder,
};

use crate::EngineError;

pub struct EngineMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Community price proposals accepted (new or folded into a pending change).
    pub proposals: IntCounter,
    /// Votes counted toward a pending change.
    pub votes: IntCounter,
    /// Votes ignored because the actor had already voted.
    pub duplicate_votes: IntCounter,
    /// Pending changes that reached the confirmation threshold.
    pub consensus_reached: IntCounter,
    /// Prices set directly by a station owner.
    pub owner_updates: IntCounter,
    /// Repository writes that failed.
    pub persistence_failures: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Stations seen by the last full refresh.
    pub tracked_stations: IntGauge,
}

impl EngineMetrics {
    pub fn new() -> Result<Self, EngineError> {
        let registry = Registry::new();

        let proposals = register_int_counter_with_registry!(
            Opts::new("fuelmap_proposals_total", "Community price proposals accepted"),
            registry
        )?;
        let votes = register_int_counter_with_registry!(
            Opts::new("fuelmap_votes_total", "Votes counted toward pending changes"),
            registry
        )?;
        let duplicate_votes = register_int_counter_with_registry!(
            Opts::new(
                "fuelmap_duplicate_votes_total",
                "Votes ignored because the actor already voted"
            ),
            registry
        )?;
        let consensus_reached = register_int_counter_with_registry!(
            Opts::new(
                "fuelmap_consensus_reached_total",
                "Pending changes confirmed by consensus"
            ),
            registry
        )?;
        let owner_updates = register_int_counter_with_registry!(
            Opts::new("fuelmap_owner_updates_total", "Prices set directly by owners"),
            registry
        )?;
        let persistence_failures = register_int_counter_with_registry!(
            Opts::new(
                "fuelmap_persistence_failures_total",
                "Repository writes that failed"
            ),
            registry
        )?;

        let tracked_stations = register_int_gauge_with_registry!(
            Opts::new("fuelmap_tracked_stations", "Stations seen by the last refresh"),
            registry
        )?;

        Ok(Self {
            registry,
            proposals,
            votes,
            duplicate_votes,
            consensus_reached,
            owner_updates,
            persistence_failures,
            tracked_stations,
        })
    }

    /// Render every metric in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, EngineError> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| EngineError::Config(format!("metrics encoding: {e}")))
    }
}
