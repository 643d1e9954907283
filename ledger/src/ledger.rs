//! Pending change ledger — proposals and votes on community prices.

use crate::error::LedgerError;
use crate::resolver::{ConsensusResolver, Resolution};
use fuelmap_trust::refresh_trust;
use fuelmap_types::{ActorId, EngineParams, FuelType, PendingChange, Price, Station, Timestamp};
use serde::{Deserialize, Serialize};

/// Outcome of a single vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteResult {
    /// The voter had already voted on this change. Nothing changed.
    AlreadyVoted,
    /// The vote was counted; the change is still pending.
    VoteRecorded,
    /// The vote pushed the change over the threshold and it was applied.
    ConsensusReached,
}

/// What a vote did to the ledger.
#[derive(Clone, Debug, PartialEq)]
pub struct VoteOutcome {
    pub result: VoteResult,
    /// The pending change as it stood after the vote. When consensus was
    /// reached this entry is no longer on the station.
    pub change: PendingChange,
    /// Present exactly when `result` is [`VoteResult::ConsensusReached`].
    pub resolution: Option<Resolution>,
}

/// What a proposal did to the ledger.
#[derive(Clone, Debug, PartialEq)]
pub struct ProposalOutcome {
    /// `true` when the proposal opened a new entry, `false` when it was
    /// folded into the existing entry for the same fuel as a vote.
    pub opened: bool,
    pub vote: VoteOutcome,
}

/// Records community proposals and votes for one station at a time.
#[derive(Clone, Debug)]
pub struct PendingLedger {
    params: EngineParams,
    resolver: ConsensusResolver,
}

impl PendingLedger {
    pub fn new(params: EngineParams) -> Self {
        let resolver = ConsensusResolver::new(params.clone());
        Self { params, resolver }
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Propose `price` for `fuel` on behalf of `proposer`.
    ///
    /// A station holds at most one pending change per fuel: if one already
    /// exists the proposal counts as a vote for it and its own price is
    /// dropped. Opening a change for a fuel that already has a confirmed price
    /// is a dispute and clears the station's verified flag until resolved.
    pub fn propose(
        &self,
        station: &mut Station,
        fuel: FuelType,
        price: Price,
        proposer: ActorId,
        now: Timestamp,
    ) -> Result<ProposalOutcome, LedgerError> {
        if let Some(existing) = station.pending_for(fuel) {
            if existing.proposed_price != price {
                tracing::debug!(
                    station = %station.id,
                    fuel = %fuel,
                    pending = %existing.proposed_price,
                    proposed = %price,
                    "folding proposal into existing pending change"
                );
            }
            let vote = self.vote(station, fuel, proposer, now)?;
            return Ok(ProposalOutcome {
                opened: false,
                vote,
            });
        }

        let change = PendingChange::open(fuel, price, proposer, now);
        if station.prices.get(fuel).is_some() && station.is_verified {
            tracing::info!(
                station = %station.id,
                fuel = %fuel,
                "dispute on confirmed price reopens verification"
            );
            station.is_verified = false;
        }
        station.pending_changes.push(change.clone());
        station.touch(now);

        tracing::info!(
            station = %station.id,
            fuel = %fuel,
            price = %price,
            "pending change opened"
        );

        let vote = self.settle(station, change, now)?;
        Ok(ProposalOutcome { opened: true, vote })
    }

    /// Vote for the pending change on `fuel`.
    ///
    /// A repeat voter gets [`VoteResult::AlreadyVoted`] and the station is not
    /// modified at all.
    pub fn vote(
        &self,
        station: &mut Station,
        fuel: FuelType,
        voter: ActorId,
        now: Timestamp,
    ) -> Result<VoteOutcome, LedgerError> {
        let change = station
            .pending_for_mut(fuel)
            .ok_or(LedgerError::NoPendingChange(fuel))?;

        let counted = change.add_vote(voter);
        let snapshot = change.clone();

        if !counted {
            tracing::debug!(station = %station.id, fuel = %fuel, "duplicate vote ignored");
            return Ok(VoteOutcome {
                result: VoteResult::AlreadyVoted,
                change: snapshot,
                resolution: None,
            });
        }
        station.touch(now);

        tracing::debug!(
            station = %station.id,
            fuel = %fuel,
            votes = snapshot.votes,
            "vote recorded"
        );

        self.settle(station, snapshot, now)
    }

    /// Resolve `change` if it reached the threshold, otherwise just refresh trust.
    fn settle(
        &self,
        station: &mut Station,
        change: PendingChange,
        now: Timestamp,
    ) -> Result<VoteOutcome, LedgerError> {
        if change.meets_threshold(self.params.confirmation_threshold) {
            let resolution = self.resolver.resolve(station, change.fuel_type, now)?;
            return Ok(VoteOutcome {
                result: VoteResult::ConsensusReached,
                change: resolution.change.clone(),
                resolution: Some(resolution),
            });
        }
        refresh_trust(station, &self.params, now);
        Ok(VoteOutcome {
            result: VoteResult::VoteRecorded,
            change,
            resolution: None,
        })
    }
}
