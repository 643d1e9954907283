//! Cross-station queries.
//!
//! Everything here is a pure function over a borrowed station collection.
//! Trust scores are read as they are; callers recompute them first.

pub mod best_value;
pub mod query;

pub use best_value::{
    apply_best_value, rank_by_value, select_best_value, value_score, RankedStation,
};
pub use query::{nearby, search, NearbyStation};
