//! Best-value selection.
//!
//! `value(s) = (10 − gasoline_price(s)) × trust(s)`, over stations that have a
//! confirmed gasoline price and a trust score at or above the configured
//! floor. Low price and high trust multiply, so a cheap station nobody
//! trusts does not beat a fairly priced, well-trusted one.

use fuelmap_types::{EngineParams, FuelType, Station, StationId};

/// Reference price the gasoline price is subtracted from.
pub const VALUE_CEILING: f64 = 10.0;

/// Value score of `station`, or `None` if it is not eligible.
pub fn value_score(station: &Station, params: &EngineParams) -> Option<f64> {
    let gasoline = station.prices.get(FuelType::Gasoline)?;
    let trust = station.trust_score.value();
    if trust < params.min_trust_for_best_value {
        return None;
    }
    Some((VALUE_CEILING - gasoline.value()) * trust)
}

/// The eligible station with the highest value score.
///
/// Ties go to the station that appears first in `stations`; the result is
/// deterministic for a fixed input order.
pub fn select_best_value<'a>(
    stations: &'a [Station],
    params: &EngineParams,
) -> Option<&'a Station> {
    best_index(stations, params).map(|i| &stations[i])
}

/// Flag the best-value station and clear the flag on every other one.
///
/// Returns the winner's id, or `None` when no station is eligible (in which
/// case no station carries the flag).
pub fn apply_best_value(stations: &mut [Station], params: &EngineParams) -> Option<StationId> {
    let winner = best_index(stations, params);
    for (i, station) in stations.iter_mut().enumerate() {
        station.is_best_value = Some(i) == winner;
    }
    let winner = winner.map(|i| &stations[i])?;
    tracing::info!(
        station = %winner.id,
        name = %winner.name,
        trust = %winner.trust_score,
        "best value selected"
    );
    Some(winner.id.clone())
}

/// An eligible station and its value score.
#[derive(Clone, Debug)]
pub struct RankedStation<'a> {
    pub station: &'a Station,
    pub value: f64,
}

/// All eligible stations, best first. Equal scores keep input order.
pub fn rank_by_value<'a>(stations: &'a [Station], params: &EngineParams) -> Vec<RankedStation<'a>> {
    let mut ranked: Vec<RankedStation<'a>> = stations
        .iter()
        .filter_map(|station| {
            value_score(station, params).map(|value| RankedStation { station, value })
        })
        .collect();
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));
    ranked
}

fn best_index(stations: &[Station], params: &EngineParams) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, station) in stations.iter().enumerate() {
        let Some(value) = value_score(station, params) else {
            continue;
        };
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((i, value)),
        }
    }
    best.map(|(i, _)| i)
}
