//! Pending price changes for a single station.
//!
//! Two ways a confirmed price can change:
//! 1. **Community**: anyone proposes a price; it becomes a [`PendingChange`]
//!    that collects one vote per distinct actor. Once it reaches the
//!    confirmation threshold the [`ConsensusResolver`] applies it.
//! 2. **Owner**: the verified owner sets the price directly, superseding any
//!    community dispute for that fuel.
//!
//! Every operation works on a `&mut Station` handed in by the caller and
//! recomputes that station's trust score before returning. Persistence is
//! the caller's job; resolutions and owner updates hand back the
//! [`PriceRecord`] to store alongside the station.
//!
//! [`PendingChange`]: fuelmap_types::PendingChange
//! [`PriceRecord`]: fuelmap_types::PriceRecord

pub mod error;
pub mod ledger;
pub mod owner;
pub mod resolver;

pub use error::LedgerError;
pub use ledger::{PendingLedger, ProposalOutcome, VoteOutcome, VoteResult};
pub use owner::{owner_set_price, DirectUpdate};
pub use resolver::{ConsensusResolver, Resolution};
