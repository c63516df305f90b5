//! Finds the stops within walking distance of a query coordinate.

use std::cmp::Ordering;

use lazysort::SortedBy;

use crate::geo::{distance_km, Coordinate};
use crate::index::GtfsIndex;
use crate::model::StopIdx;

#[derive(Debug, Clone, Copy)]
pub struct NearbyStop {
    pub stop: StopIdx,
    pub distance_km: f64,
}

fn by_distance_then_stop_id<'i>(
    index: &'i GtfsIndex,
) -> impl Fn(&NearbyStop, &NearbyStop) -> Ordering + 'i {
    move |a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(Ordering::Equal)
            .then_with(|| index.stop(a.stop).stop_id.cmp(&index.stop(b.stop).stop_id))
    }
}

/// The `limit` closest stops to `origin` within `max_km`, ascending by
/// distance and tie-broken by `stop_id`. A linear scan over every stop is
/// the whole contract; a spatial index is a permitted optimization, not
/// a requirement.
pub fn find_nearby(index: &GtfsIndex, origin: Coordinate, limit: usize, max_km: f64) -> Vec<NearbyStop> {
    index
        .all_stops()
        .map(|(stop, data)| NearbyStop {
            stop,
            distance_km: distance_km(origin, data.location),
        })
        .filter(|n| n.distance_km <= max_km)
        .sorted_by(by_distance_then_stop_id(index))
        .take(limit)
        .collect()
}
