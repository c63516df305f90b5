//! Two-bus itineraries connected by a single transfer stop.

use std::collections::{HashMap, HashSet};

use crate::direct::find_trip_for_leg;
use crate::index::GtfsIndex;
use crate::model::{Leg, RouteIdx, StopIdx};
use crate::nearby::NearbyStop;

pub struct TransferItinerary {
    pub leg1: Leg,
    pub leg2: Leg,
    pub pickup: StopIdx,
    pub transfer: StopIdx,
    pub drop: StopIdx,
}

fn index_of(seq: &[StopIdx], stop: StopIdx) -> Option<usize> {
    seq.iter().position(|&s| s == stop)
}

/// First-wins: the single closest nearby stop serving each route, in the
/// order the candidate stops were presented (by ascending distance).
fn closest_stop_per_route(index: &GtfsIndex, stops: &[NearbyStop]) -> HashMap<RouteIdx, NearbyStop> {
    let mut map = HashMap::new();
    for nearby in stops {
        for route in index.routes_serving(nearby.stop) {
            map.entry(route).or_insert(*nearby);
        }
    }
    map
}

fn sorted_routes(index: &GtfsIndex, routes: &HashMap<RouteIdx, NearbyStop>) -> Vec<RouteIdx> {
    let mut keys: Vec<RouteIdx> = routes.keys().copied().collect();
    keys.sort_by_key(|&r| index.route(r).route_id.clone());
    keys
}

/// Finds up to `limit` one-transfer itineraries. `top_n` restricts the
/// candidate pickup/drop stops considered (the contract calls for the
/// top-5 closest of each).
pub fn find_transfer(
    index: &GtfsIndex,
    pickups: &[NearbyStop],
    drops: &[NearbyStop],
    top_n: usize,
    limit: usize,
) -> Vec<TransferItinerary> {
    let pickups = &pickups[..pickups.len().min(top_n)];
    let drops = &drops[..drops.len().min(top_n)];

    let p_routes = closest_stop_per_route(index, pickups);
    let d_routes = closest_stop_per_route(index, drops);
    let d_route_order = sorted_routes(index, &d_routes);

    let mut stop_to_drop_routes: HashMap<StopIdx, Vec<RouteIdx>> = HashMap::new();
    for &r2 in &d_route_order {
        for &stop in index.route_stops(r2) {
            stop_to_drop_routes.entry(stop).or_insert_with(Vec::new).push(r2);
        }
    }

    let mut results = Vec::new();
    let mut seen: HashSet<(RouteIdx, StopIdx, RouteIdx)> = HashSet::new();

    'routes: for r1 in sorted_routes(index, &p_routes) {
        let p_stop = p_routes[&r1];
        let seq1 = index.route_stops(r1);
        let i0 = match index_of(seq1, p_stop.stop) {
            Some(i) => i,
            None => continue,
        };

        for &t in &seq1[i0 + 1..] {
            let candidate_routes = match stop_to_drop_routes.get(&t) {
                Some(routes) => routes,
                None => continue,
            };
            for &r2 in candidate_routes {
                let d_stop = match d_routes.get(&r2) {
                    Some(d) => *d,
                    None => continue,
                };
                let seq2 = index.route_stops(r2);
                let (t_idx2, d_idx2) = match (index_of(seq2, t), index_of(seq2, d_stop.stop)) {
                    (Some(a), Some(b)) => (a, b),
                    _ => continue,
                };
                if t_idx2 >= d_idx2 {
                    continue;
                }

                let key = (r1, t, r2);
                if !seen.insert(key) {
                    continue;
                }

                let leg1 = match find_trip_for_leg(index, r1, p_stop.stop, t) {
                    Some(leg) => leg,
                    None => continue,
                };
                let leg2 = match find_trip_for_leg(index, r2, t, d_stop.stop) {
                    Some(leg) => leg,
                    None => continue,
                };

                let arr1 = index.trip(leg1.trip).stop_times[leg1.end].arrival_time;
                let dep2 = index.trip(leg2.trip).stop_times[leg2.start].departure_time;
                if dep2 < arr1 {
                    continue;
                }

                results.push(TransferItinerary {
                    leg1,
                    leg2,
                    pickup: p_stop.stop,
                    transfer: t,
                    drop: d_stop.stop,
                });
                if results.len() >= limit {
                    break 'routes;
                }
            }
        }
    }

    results
}
