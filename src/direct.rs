//! Single-bus itineraries: a pickup stop and a drop stop that share a route,
//! in the correct sequence direction.

use std::collections::HashMap;

use crate::index::GtfsIndex;
use crate::model::{Leg, RouteIdx, StopIdx};
use crate::nearby::NearbyStop;

fn index_of(seq: &[StopIdx], stop: StopIdx) -> Option<usize> {
    seq.iter().position(|&s| s == stop)
}

/// The first trip on `route` that visits `start` and later, at a greater
/// stop_sequence, visits `end`. Scans in trip-arena order, i.e. the order
/// trips were encountered in `trips.csv` - so the "first trip wins" when
/// more than one trip could serve the pair.
pub fn find_trip_for_leg(index: &GtfsIndex, route: RouteIdx, start: StopIdx, end: StopIdx) -> Option<Leg> {
    for &(trip_idx, pos) in index.visits_to(start) {
        let trip = index.trip(trip_idx);
        if trip.route != route {
            continue;
        }
        let end_pos = trip.stop_times[pos + 1..]
            .iter()
            .position(|st| st.stop == end)
            .map(|offset| pos + 1 + offset);
        if let Some(end_pos) = end_pos {
            return Some(Leg {
                trip: trip_idx,
                route,
                start: pos,
                end: end_pos,
            });
        }
    }
    None
}

fn routes_touching<'n>(
    index: &GtfsIndex,
    stops: &'n [NearbyStop],
) -> HashMap<RouteIdx, Vec<&'n NearbyStop>> {
    let mut map: HashMap<RouteIdx, Vec<&NearbyStop>> = HashMap::new();
    for nearby in stops {
        for route in index.routes_serving(nearby.stop) {
            map.entry(route).or_insert_with(Vec::new).push(nearby);
        }
    }
    map
}

/// One finished direct itinerary: the leg itself plus the pickup/drop
/// stops chosen for it (which may differ from the nearest stop overall,
/// since not every nearby stop lies on a shared route).
pub struct DirectItinerary {
    pub leg: Leg,
    pub pickup: StopIdx,
    pub drop: StopIdx,
}

/// Finds up to `limit` direct itineraries between the candidate pickup and
/// drop stops, deduplicated by `(route display name, pickup name, drop
/// name)`. Route iteration is sorted by `route_id` so the result is
/// deterministic regardless of hash map iteration order.
pub fn find_direct(index: &GtfsIndex, pickups: &[NearbyStop], drops: &[NearbyStop], limit: usize) -> Vec<DirectItinerary> {
    let p_routes = routes_touching(index, pickups);
    let d_routes = routes_touching(index, drops);

    let mut common: Vec<RouteIdx> = p_routes
        .keys()
        .filter(|r| d_routes.contains_key(r))
        .copied()
        .collect();
    common.sort_by_key(|&r| index.route(r).route_id.clone());

    let mut results = Vec::new();
    let mut seen = std::collections::HashSet::new();

    'routes: for route in common {
        let seq = index.route_stops(route);
        for &p in &p_routes[&route] {
            for &d in &d_routes[&route] {
                let p_idx = match index_of(seq, p.stop) {
                    Some(i) => i,
                    None => continue,
                };
                let d_idx = match index_of(seq, d.stop) {
                    Some(i) => i,
                    None => continue,
                };
                if p_idx >= d_idx {
                    continue;
                }
                let leg = match find_trip_for_leg(index, route, p.stop, d.stop) {
                    Some(leg) => leg,
                    None => continue,
                };

                let key = (
                    index.route(route).display_name().to_owned(),
                    index.stop(p.stop).stop_name.clone(),
                    index.stop(d.stop).stop_name.clone(),
                );
                if !seen.insert(key) {
                    continue;
                }

                results.push(DirectItinerary {
                    leg,
                    pickup: p.stop,
                    drop: d.stop,
                });
                if results.len() >= limit {
                    break 'routes;
                }
            }
        }
    }

    results
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::index::IndexBuilder;
    use crate::time::Time;

    fn hms(h: u32, m: u32, s: u32) -> Time {
        Time::from_hms(h, m, s)
    }

    fn fixture_f1() -> crate::index::GtfsIndex {
        let mut b = IndexBuilder::new();
        b.add_stop("A".into(), "A".into(), 0.0, 0.0);
        b.add_stop("B".into(), "B".into(), 0.0, 0.01);
        b.add_stop("C".into(), "C".into(), 0.0, 0.02);
        b.add_route("R1".into(), "1".into(), "Route One".into());
        b.add_trip("T1".into(), "R1", "".into()).unwrap();
        b.add_stop_time("T1", "A", 1, hms(8, 0, 0), hms(8, 0, 30)).unwrap();
        b.add_stop_time("T1", "B", 2, hms(8, 5, 0), hms(8, 5, 30)).unwrap();
        b.add_stop_time("T1", "C", 3, hms(8, 10, 0), hms(8, 10, 30)).unwrap();
        b.build()
    }

    #[test]
    fn finds_direct_itinerary_a_to_c() {
        let index = fixture_f1();
        let a = index.find_stop("A").unwrap();
        let c = index.find_stop("C").unwrap();
        let pickups = [NearbyStop { stop: a, distance_km: 0.0 }];
        let drops = [NearbyStop { stop: c, distance_km: 0.0 }];
        let found = find_direct(&index, &pickups, &drops, 5);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pickup, a);
        assert_eq!(found[0].drop, c);
    }

    #[test]
    fn wrong_direction_yields_no_itinerary() {
        let index = fixture_f1();
        let a = index.find_stop("A").unwrap();
        let c = index.find_stop("C").unwrap();
        let pickups = [NearbyStop { stop: c, distance_km: 0.0 }];
        let drops = [NearbyStop { stop: a, distance_km: 0.0 }];
        let found = find_direct(&index, &pickups, &drops, 5);
        assert!(found.is_empty());
    }
}
