//! In-memory construction of a [`GtfsIndex`] from already-parsed GTFS rows.
//!
//! This module never touches the filesystem - [`IndexBuilder`] is fed rows
//! one at a time and is just as testable from a handful of hand-written
//! fixture rows as from a real feed. [`crate::feed`] is what actually reads
//! CSV files and drives a builder from them.

use std::collections::{HashMap, HashSet};

use crate::arena::Arena;
use crate::error::DanglingReference;
use crate::geo::Coordinate;
use crate::model::{Route, RouteIdx, Stop, StopIdx, StopTime, Trip, TripIdx, TripStopRef};
use crate::time::Time;

/// The fully built set of indices the search components query against.
pub struct GtfsIndex {
    stops: Arena<Stop>,
    routes: Arena<Route>,
    trips: Arena<Trip>,
    stops_by_id: HashMap<String, StopIdx>,
    routes_by_id: HashMap<String, RouteIdx>,
    trips_by_id: HashMap<String, TripIdx>,
    /// Every visit of every trip to a stop, keyed by the stop visited.
    stop_times_by_stop: HashMap<StopIdx, Vec<TripStopRef>>,
    /// The routes that call at a stop, in no particular order.
    routes_by_stop: HashMap<StopIdx, HashSet<RouteIdx>>,
    /// A route's stops in travel order, sampled from one of its trips.
    stops_by_route: HashMap<RouteIdx, Vec<StopIdx>>,
}

impl GtfsIndex {
    pub fn stop(&self, idx: StopIdx) -> &Stop {
        &self.stops[idx]
    }

    pub fn route(&self, idx: RouteIdx) -> &Route {
        &self.routes[idx]
    }

    pub fn trip(&self, idx: TripIdx) -> &Trip {
        &self.trips[idx]
    }

    pub fn find_stop(&self, stop_id: &str) -> Option<StopIdx> {
        self.stops_by_id.get(stop_id).copied()
    }

    pub fn find_route(&self, route_id: &str) -> Option<RouteIdx> {
        self.routes_by_id.get(route_id).copied()
    }

    pub fn find_trip(&self, trip_id: &str) -> Option<TripIdx> {
        self.trips_by_id.get(trip_id).copied()
    }

    pub fn all_stops(&self) -> impl Iterator<Item = (StopIdx, &Stop)> {
        self.stops.indexed_iter()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    /// Every `(trip, position)` at which a trip visits this stop.
    pub fn visits_to(&self, stop: StopIdx) -> &[TripStopRef] {
        self.stop_times_by_stop
            .get(&stop)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn routes_serving(&self, stop: StopIdx) -> impl Iterator<Item = RouteIdx> + '_ {
        self.routes_by_stop
            .get(&stop)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// The canonical, in-travel-order stop sequence of a route, sampled from
    /// one representative trip. Empty if the route has no trips.
    pub fn route_stops(&self, route: RouteIdx) -> &[StopIdx] {
        self.stops_by_route
            .get(&route)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Staged, consuming construction of a [`GtfsIndex`]. Rows may be added in
/// any order within a table, but a stop_time can only resolve once its stop
/// and trip have already been added.
#[derive(Default)]
pub struct IndexBuilder {
    stops: Arena<Stop>,
    routes: Arena<Route>,
    trips: Arena<Trip>,
    stops_by_id: HashMap<String, StopIdx>,
    routes_by_id: HashMap<String, RouteIdx>,
    trips_by_id: HashMap<String, TripIdx>,
    dangling: HashMap<DanglingReference, usize>,
    /// Whether `routes.csv` was found and opened at all. When it wasn't, an
    /// unknown `route_id` on a trip is the expected shape of a minimal feed
    /// (§4.1's degrade-to-route_id case) and gets a synthesized placeholder
    /// route. When the file *was* present, an unknown `route_id` is a
    /// dangling reference (§3) and the trip is dropped instead.
    routes_file_present: bool,
}

impl IndexBuilder {
    pub fn new() -> IndexBuilder {
        IndexBuilder::default()
    }

    pub fn add_stop(&mut self, stop_id: String, stop_name: String, lat: f64, lng: f64) -> StopIdx {
        let idx = self.stops.alloc(Stop {
            stop_id: stop_id.clone(),
            stop_name,
            location: Coordinate::new(lat, lng),
        });
        self.stops_by_id.insert(stop_id, idx);
        idx
    }

    pub fn add_route(&mut self, route_id: String, short_name: String, long_name: String) -> RouteIdx {
        let idx = self.routes.alloc(Route {
            route_id: route_id.clone(),
            short_name,
            long_name,
        });
        self.routes_by_id.insert(route_id, idx);
        idx
    }

    pub fn find_route(&self, route_id: &str) -> Option<RouteIdx> {
        self.routes_by_id.get(route_id).copied()
    }

    /// Marks whether `routes.csv` was found and opened, regardless of how
    /// many rows it parsed. Must be called (if at all) before any
    /// `add_trip`, since it changes how an unresolved `route_id` is handled.
    pub fn set_routes_file_present(&mut self) {
        self.routes_file_present = true;
    }

    /// Adds a trip against an already-known route. If `route_id` has not
    /// been added and no `routes.csv` was ever found, a bare route whose
    /// display name falls back to the id is synthesized on the fly - the
    /// expected shape of a minimal feed. If `routes.csv` *was* present but
    /// simply doesn't list this `route_id`, the trip is a dangling
    /// reference and is dropped instead.
    pub fn add_trip(&mut self, trip_id: String, route_id: &str, headsign: String) -> Result<TripIdx, DanglingReference> {
        let route = match self.find_route(route_id) {
            Some(route) => route,
            None if !self.routes_file_present => {
                self.add_route(route_id.to_owned(), String::new(), String::new())
            }
            None => return Err(DanglingReference::TripMissingRoute),
        };
        let idx = self.trips.alloc(Trip {
            trip_id: trip_id.clone(),
            route,
            headsign,
            stop_times: Vec::new(),
        });
        self.trips_by_id.insert(trip_id, idx);
        Ok(idx)
    }

    /// Appends a stop visit to the named trip. Returns the dangling
    /// reference kind on failure instead of pushing anything, so the
    /// caller can count and log it without the row ever reaching the data.
    pub fn add_stop_time(
        &mut self,
        trip_id: &str,
        stop_id: &str,
        stop_sequence: u32,
        arrival_time: Time,
        departure_time: Time,
    ) -> Result<(), DanglingReference> {
        let trip_idx = self
            .trips_by_id
            .get(trip_id)
            .copied()
            .ok_or(DanglingReference::StopTimeMissingTrip)?;
        let stop_idx = self
            .stops_by_id
            .get(stop_id)
            .copied()
            .ok_or(DanglingReference::StopTimeMissingStop)?;
        self.trips[trip_idx].stop_times.push(StopTime {
            stop: stop_idx,
            stop_sequence,
            arrival_time,
            departure_time,
        });
        Ok(())
    }

    pub fn note_dangling(&mut self, kind: DanglingReference) {
        *self.dangling.entry(kind).or_insert(0) += 1;
    }

    pub fn dangling_counts(&self) -> &HashMap<DanglingReference, usize> {
        &self.dangling
    }

    /// Sorts every trip's stop visits by `stop_sequence` and materializes
    /// the derived per-stop and per-route lookup maps.
    pub fn build(mut self) -> GtfsIndex {
        for trip in self.trips.iter_mut() {
            trip.stop_times.sort_by_key(|st| st.stop_sequence);
        }

        let mut stop_times_by_stop: HashMap<StopIdx, Vec<TripStopRef>> = HashMap::new();
        let mut routes_by_stop: HashMap<StopIdx, HashSet<RouteIdx>> = HashMap::new();
        let mut stops_by_route: HashMap<RouteIdx, Vec<StopIdx>> = HashMap::new();

        for (trip_idx, trip) in self.trips.indexed_iter() {
            for (pos, stop_time) in trip.stop_times.iter().enumerate() {
                stop_times_by_stop
                    .entry(stop_time.stop)
                    .or_insert_with(Vec::new)
                    .push((trip_idx, pos));
                routes_by_stop
                    .entry(stop_time.stop)
                    .or_insert_with(HashSet::new)
                    .insert(trip.route);
            }
            stops_by_route.entry(trip.route).or_insert_with(|| {
                trip.stop_times.iter().map(|st| st.stop).collect()
            });
        }

        GtfsIndex {
            stops: self.stops,
            routes: self.routes,
            trips: self.trips,
            stops_by_id: self.stops_by_id,
            routes_by_id: self.routes_by_id,
            trips_by_id: self.trips_by_id,
            stop_times_by_stop,
            routes_by_stop,
            stops_by_route,
        }
    }
}
