//! The station record.

use crate::error::ValidationError;
use crate::fuel::{FuelPrices, FuelType};
use crate::geo::Coordinates;
use crate::id::{ActorId, StationId};
use crate::pending::PendingChange;
use crate::time::Timestamp;
use crate::trust::TrustScore;
use serde::{Deserialize, Serialize};

/// A fuel station with its confirmed prices and unresolved proposals.
///
/// `trust_score` and `is_best_value` are derived fields. They are stored so a
/// consumer can render a station without recomputing, but they are always
/// overwritten by the trust calculator and the best-value pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    /// Business registration number (CNPJ), when known.
    pub cnpj: Option<String>,
    pub location: Option<Coordinates>,
    pub prices: FuelPrices,
    /// Verified owner; their price edits bypass community voting.
    pub owner: Option<ActorId>,
    pub is_verified: bool,
    pub trust_score: TrustScore,
    pub is_best_value: bool,
    /// At most one entry per fuel type, in proposal order.
    pub pending_changes: Vec<PendingChange>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Registration request for a new station.
#[derive(Clone, Debug)]
pub struct NewStation {
    pub id: StationId,
    pub name: String,
    pub cnpj: Option<String>,
    pub location: Option<Coordinates>,
    /// Set for owner self-registration.
    pub owner: Option<ActorId>,
}

impl Station {
    /// Create a station with empty prices and the default trust score.
    ///
    /// Owner-registered stations start verified.
    pub fn register(request: NewStation, now: Timestamp) -> Result<Self, ValidationError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let cnpj = request
            .cnpj
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let is_verified = request.owner.is_some();
        Ok(Self {
            id: request.id,
            name,
            cnpj,
            location: request.location,
            prices: FuelPrices::default(),
            owner: request.owner,
            is_verified,
            trust_score: TrustScore::DEFAULT,
            is_best_value: false,
            pending_changes: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_owned_by(&self, actor: &ActorId) -> bool {
        self.owner.as_ref() == Some(actor)
    }

    pub fn pending_for(&self, fuel: FuelType) -> Option<&PendingChange> {
        self.pending_changes.iter().find(|c| c.fuel_type == fuel)
    }

    pub fn pending_for_mut(&mut self, fuel: FuelType) -> Option<&mut PendingChange> {
        self.pending_changes.iter_mut().find(|c| c.fuel_type == fuel)
    }

    /// Remove and return the pending change for `fuel`, if any.
    pub fn take_pending(&mut self, fuel: FuelType) -> Option<PendingChange> {
        let index = self.pending_changes.iter().position(|c| c.fuel_type == fuel)?;
        Some(self.pending_changes.remove(index))
    }

    pub fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
    }
}
