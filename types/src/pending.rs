//! Community-proposed prices awaiting confirmation.

use crate::fuel::{FuelType, Price};
use crate::id::ActorId;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A proposed price for one fuel type, collecting votes until it reaches the
/// confirmation threshold.
///
/// `votes` always equals `voters.len()`; the set is what prevents double voting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingChange {
    pub fuel_type: FuelType,
    pub proposed_price: Price,
    pub votes: u32,
    pub voters: BTreeSet<ActorId>,
    pub created_at: Timestamp,
}

impl PendingChange {
    /// Open a new pending change with the proposer's vote.
    pub fn open(
        fuel_type: FuelType,
        proposed_price: Price,
        proposer: ActorId,
        now: Timestamp,
    ) -> Self {
        let mut voters = BTreeSet::new();
        voters.insert(proposer);
        Self {
            fuel_type,
            proposed_price,
            votes: 1,
            voters,
            created_at: now,
        }
    }

    pub fn has_voted(&self, voter: &ActorId) -> bool {
        self.voters.contains(voter)
    }

    /// Add `voter`'s vote. Returns `false` (and changes nothing) when the
    /// voter already voted.
    pub fn add_vote(&mut self, voter: ActorId) -> bool {
        if !self.voters.insert(voter) {
            return false;
        }
        self.votes = self.votes.saturating_add(1);
        true
    }

    pub fn meets_threshold(&self, threshold: u32) -> bool {
        self.votes >= threshold
    }

    pub fn is_stale(&self, stale_after_secs: u64, now: Timestamp) -> bool {
        self.created_at.is_older_than(stale_after_secs, now)
    }
}
