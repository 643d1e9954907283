//! Proximity and text search over stations.

use fuelmap_types::{Coordinates, Station};

/// A station within range and its distance from the query point.
#[derive(Clone, Debug)]
pub struct NearbyStation<'a> {
    pub station: &'a Station,
    pub distance_km: f64,
}

/// Stations with a known location within `radius_km` of `center`
/// (inclusive), nearest first.
pub fn nearby<'a>(
    stations: &'a [Station],
    center: &Coordinates,
    radius_km: f64,
) -> Vec<NearbyStation<'a>> {
    let mut found: Vec<NearbyStation<'a>> = stations
        .iter()
        .filter_map(|station| {
            let location = station.location.as_ref()?;
            let distance_km = center.distance_km(location);
            (distance_km <= radius_km).then_some(NearbyStation {
                station,
                distance_km,
            })
        })
        .collect();
    found.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    found
}

/// Stations whose name contains `query` (case-insensitive) or whose CNPJ
/// contains it verbatim. A blank query matches nothing.
pub fn search<'a>(stations: &'a [Station], query: &str) -> Vec<&'a Station> {
    let term = query.trim();
    if term.is_empty() {
        return Vec::new();
    }
    let lowered = term.to_lowercase();
    stations
        .iter()
        .filter(|station| {
            station.name.to_lowercase().contains(&lowered)
                || station
                    .cnpj
                    .as_deref()
                    .is_some_and(|cnpj| cnpj.contains(term))
        })
        .collect()
}
