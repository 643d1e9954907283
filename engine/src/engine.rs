//! The engine facade.
//!
//! Every mutating operation follows the same shape: load the station from the
//! repository, apply the rule on that working copy, then persist it with a
//! single repository call. If the write fails the error is returned and the
//! working copy is dropped, so nothing is reported as applied.

use std::fmt;

use fuelmap_ledger::{
    owner_set_price, DirectUpdate, PendingLedger, ProposalOutcome, VoteOutcome, VoteResult,
};
use fuelmap_ranking::{apply_best_value, nearby, search, select_best_value};
use fuelmap_store::{StationRepository, StoreError};
use fuelmap_trust::{compute_trust_score, refresh_trust, TrustBreakdown};
use fuelmap_types::{
    ActorId, Coordinates, EngineParams, FuelType, NewStation, Price, PriceRecord, Station,
    StationId, Timestamp, TrustScore, ValidationError,
};

use crate::{EngineError, EngineMetrics};

/// Recompute trust for every station, then flag the best-value winner.
///
/// Returns the winner's id. Pure: works entirely on the caller's slice.
pub fn recompute_all(
    stations: &mut [Station],
    params: &EngineParams,
    now: Timestamp,
) -> Option<StationId> {
    for station in stations.iter_mut() {
        refresh_trust(station, params, now);
    }
    apply_best_value(stations, params)
}

/// How a price submission was handled.
#[derive(Clone, Debug)]
pub enum Submission {
    /// Went through the pending-change ledger.
    Community(ProposalOutcome),
    /// Applied directly because the actor owns the station.
    Owner(DirectUpdate),
}

impl Submission {
    /// Whether the submission changed a confirmed price.
    pub fn price_confirmed(&self) -> bool {
        match self {
            Submission::Community(outcome) => outcome.vote.result == VoteResult::ConsensusReached,
            Submission::Owner(_) => true,
        }
    }
}

/// Result of a full [`StationEngine::refresh`] pass.
#[derive(Clone, Debug, PartialEq)]
pub struct RefreshSummary {
    pub stations: usize,
    /// Stations whose trust score or best-value flag changed and were saved.
    pub updated: usize,
    pub best_value: Option<StationId>,
}

/// A station returned by a proximity query.
#[derive(Clone, Debug)]
pub struct StationDistance {
    pub station: Station,
    pub distance_km: f64,
}

/// Facade over a [`StationRepository`].
///
/// Each mutating call loads a station, applies the rule to that copy and
/// commits it, with no version check in between. Callers must serialize
/// operations on the same station; two concurrent votes on one station can
/// otherwise lose a vote or confirm the same change twice.
pub struct StationEngine<R> {
    repo: R,
    params: EngineParams,
    ledger: PendingLedger,
    metrics: EngineMetrics,
}

impl<R: StationRepository> StationEngine<R> {
    pub fn new(repo: R, params: EngineParams) -> Result<Self, EngineError> {
        params.validate()?;
        Ok(Self {
            repo,
            ledger: PendingLedger::new(params.clone()),
            params,
            metrics: EngineMetrics::new()?,
        })
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    // ── Batch ───────────────────────────────────────────────────────────

    /// Recompute trust and best value over a caller-owned collection.
    pub fn recompute_all(&self, mut stations: Vec<Station>, now: Timestamp) -> Vec<Station> {
        recompute_all(&mut stations, &self.params, now);
        stations
    }

    /// Load every station, recompute, and save the ones whose derived
    /// fields changed.
    ///
    /// The changed stations are written in one atomic batch, so a failed
    /// write never leaves two stations flagged as best value.
    pub fn refresh(&self, now: Timestamp) -> Result<RefreshSummary, EngineError> {
        let before = self.repo.load_all_stations()?;
        let mut after = before.clone();
        let best_value = recompute_all(&mut after, &self.params, now);

        let changed: Vec<Station> = before
            .iter()
            .zip(&after)
            .filter(|(old, new)| {
                old.trust_score != new.trust_score || old.is_best_value != new.is_best_value
            })
            .map(|(_, new)| new.clone())
            .collect();
        let updated = changed.len();
        if !changed.is_empty() {
            self.write(
                format!("{updated} stations"),
                "refresh",
                self.repo.save_stations(&changed),
            )?;
        }

        self.metrics.tracked_stations.set(after.len() as i64);
        tracing::info!(
            stations = after.len(),
            updated,
            best_value = ?best_value.as_ref().map(StationId::as_str),
            "refresh complete"
        );
        Ok(RefreshSummary {
            stations: after.len(),
            updated,
            best_value,
        })
    }

    // ── Price reports ───────────────────────────────────────────────────

    /// Submit a price for `fuel` at a station.
    ///
    /// The station's owner sets the price directly; anyone else goes through
    /// the pending-change ledger.
    pub fn propose_price(
        &self,
        station_id: &StationId,
        fuel: FuelType,
        price: f64,
        actor: ActorId,
        now: Timestamp,
    ) -> Result<Submission, EngineError> {
        let price = Price::new(price)?;
        let mut station = self.load(station_id)?;

        if station.is_owned_by(&actor) {
            let update = owner_set_price(&mut station, fuel, price, &self.params, now);
            self.write(
                station_id,
                "owner update",
                self.repo.commit_price_change(&station, &update.record),
            )?;
            self.metrics.owner_updates.inc();
            return Ok(Submission::Owner(update));
        }

        let outcome = self.ledger.propose(&mut station, fuel, price, actor, now)?;
        self.persist_vote(&station, &outcome.vote)?;
        if outcome.vote.result != VoteResult::AlreadyVoted {
            self.metrics.proposals.inc();
        }
        self.count_vote(outcome.vote.result);
        Ok(Submission::Community(outcome))
    }

    /// Vote for the pending change on `fuel` at a station.
    pub fn vote_on_pending_price(
        &self,
        station_id: &StationId,
        fuel: FuelType,
        actor: ActorId,
        now: Timestamp,
    ) -> Result<VoteResult, EngineError> {
        let mut station = self.load(station_id)?;
        let outcome = self.ledger.vote(&mut station, fuel, actor, now)?;
        self.persist_vote(&station, &outcome)?;
        self.count_vote(outcome.result);
        Ok(outcome.result)
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn get_trust_score(&self, station: &Station, now: Timestamp) -> TrustScore {
        compute_trust_score(station, &self.params, now)
    }

    pub fn trust_breakdown(&self, station: &Station, now: Timestamp) -> TrustBreakdown {
        TrustBreakdown::for_station(station, &self.params, now)
    }

    pub fn get_best_value_station<'a>(&self, stations: &'a [Station]) -> Option<&'a Station> {
        select_best_value(stations, &self.params)
    }

    /// The current best-value station, recomputed from stored state without
    /// writing anything back.
    pub fn best_value_station(&self, now: Timestamp) -> Result<Option<Station>, EngineError> {
        let mut stations = self.repo.load_all_stations()?;
        let winner = recompute_all(&mut stations, &self.params, now);
        Ok(winner.and_then(|id| stations.into_iter().find(|s| s.id == id)))
    }

    pub fn station(&self, id: &StationId) -> Result<Station, EngineError> {
        self.load(id)
    }

    /// Confirmed price changes of a station, oldest first.
    pub fn price_history(&self, id: &StationId) -> Result<Vec<PriceRecord>, EngineError> {
        self.load(id)?;
        Ok(self.repo.price_history(id)?)
    }

    /// Stations within `radius_km` of `center`, nearest first. `None` uses
    /// the configured search radius.
    pub fn nearby(
        &self,
        center: &Coordinates,
        radius_km: Option<f64>,
    ) -> Result<Vec<StationDistance>, EngineError> {
        let radius_km = radius_km.unwrap_or(self.params.search_radius_km);
        if !(radius_km.is_finite() && radius_km > 0.0) {
            return Err(ValidationError::InvalidParam {
                name: "radius_km",
                reason: format!("must be a positive number, got {radius_km}"),
            }
            .into());
        }
        let stations = self.repo.load_all_stations()?;
        Ok(nearby(&stations, center, radius_km)
            .into_iter()
            .map(|found| StationDistance {
                station: found.station.clone(),
                distance_km: found.distance_km,
            })
            .collect())
    }

    pub fn search(&self, query: &str) -> Result<Vec<Station>, EngineError> {
        let stations = self.repo.load_all_stations()?;
        Ok(search(&stations, query).into_iter().cloned().collect())
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    /// Register a new station with empty prices and the default trust score.
    /// Owner-registered stations start verified.
    pub fn register_station(
        &self,
        request: NewStation,
        now: Timestamp,
    ) -> Result<Station, EngineError> {
        let station = Station::register(request, now)?;
        match self.repo.insert_station(&station) {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => {
                return Err(EngineError::DuplicateStation(station.id));
            }
            Err(e) => return Err(self.write_failed(&station.id, "register", e)),
        }
        tracing::info!(
            station = %station.id,
            name = %station.name,
            owned = station.owner.is_some(),
            "station registered"
        );
        Ok(station)
    }

    /// Delete a station and its price history. Returns the number of history
    /// records removed.
    pub fn delete_station(&self, id: &StationId) -> Result<u64, EngineError> {
        let removed = match self.repo.purge_station(id) {
            Ok(removed) => removed,
            Err(StoreError::NotFound(_)) => return Err(EngineError::StationNotFound(id.clone())),
            Err(e) => return Err(self.write_failed(id, "delete", e)),
        };
        tracing::info!(station = %id, history_removed = removed, "station deleted");
        Ok(removed)
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    fn load(&self, id: &StationId) -> Result<Station, EngineError> {
        self.repo.get_station(id).map_err(|e| match e {
            StoreError::NotFound(_) => EngineError::StationNotFound(id.clone()),
            other => EngineError::Persistence(other),
        })
    }

    fn persist_vote(&self, station: &Station, outcome: &VoteOutcome) -> Result<(), EngineError> {
        if outcome.result == VoteResult::AlreadyVoted {
            return Ok(());
        }
        let written = match &outcome.resolution {
            Some(resolution) => self.repo.commit_price_change(station, &resolution.record),
            None => self.repo.save_station(station),
        };
        self.write(&station.id, "vote", written)
    }

    fn count_vote(&self, result: VoteResult) {
        match result {
            VoteResult::AlreadyVoted => self.metrics.duplicate_votes.inc(),
            VoteResult::VoteRecorded => self.metrics.votes.inc(),
            VoteResult::ConsensusReached => {
                self.metrics.votes.inc();
                self.metrics.consensus_reached.inc();
            }
        }
    }

    fn write<T>(
        &self,
        target: impl fmt::Display,
        op: &str,
        result: Result<T, StoreError>,
    ) -> Result<T, EngineError> {
        result.map_err(|e| self.write_failed(target, op, e))
    }

    fn write_failed(&self, target: impl fmt::Display, op: &str, error: StoreError) -> EngineError {
        self.metrics.persistence_failures.inc();
        tracing::error!(station = %target, op, error = %error, "persistence failed");
        EngineError::Persistence(error)
    }
}
