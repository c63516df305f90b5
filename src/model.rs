//! The four GTFS entity kinds the engine ingests, plus the typed arena
//! handles that cross-reference them (see the module docs on [`crate::arena`]
//! for why handles rather than borrowed references).

use crate::arena::ArenaIndex;
use crate::geo::Coordinate;
use crate::time::Time;

pub type StopIdx = ArenaIndex<Stop>;
pub type RouteIdx = ArenaIndex<Route>;
pub type TripIdx = ArenaIndex<Trip>;

/// Refers to a specific stop visit of a specific trip: the trip and the
/// position of that visit within `Trip::stop_times`. Not the same thing as
/// `StopTime::stop_sequence` - this is an index into the ordered vec, the
/// sequence is the GTFS-supplied (possibly non-contiguous) ordering key.
pub type TripStopRef = (TripIdx, usize);

#[derive(Debug, Clone)]
pub struct Stop {
    pub stop_id: String,
    pub stop_name: String,
    pub location: Coordinate,
}

#[derive(Debug, Clone)]
pub struct Route {
    pub route_id: String,
    pub short_name: String,
    pub long_name: String,
}

impl Route {
    /// `short_name` if present, falling back to `long_name`, and finally to
    /// the bare `route_id` when a feed has no routes.csv at all (see the
    /// Feed Loader's degraded-route handling).
    pub fn display_name(&self) -> &str {
        if !self.short_name.is_empty() {
            &self.short_name
        } else if !self.long_name.is_empty() {
            &self.long_name
        } else {
            &self.route_id
        }
    }
}

#[derive(Debug, Clone)]
pub struct Trip {
    pub trip_id: String,
    pub route: RouteIdx,
    pub headsign: String,
    /// Ordered ascending by `stop_sequence`.
    pub stop_times: Vec<StopTime>,
}

/// One continuous bus ride: a single trip between two of its stop visits.
/// `start`/`end` are positions into `Trip::stop_times`, not raw
/// `stop_sequence` values.
#[derive(Debug, Clone, Copy)]
pub struct Leg {
    pub trip: TripIdx,
    pub route: RouteIdx,
    pub start: usize,
    pub end: usize,
}

impl Leg {
    pub fn stop_times<'t>(&self, trip: &'t Trip) -> &'t [StopTime] {
        &trip.stop_times[self.start..=self.end]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StopTime {
    pub stop: StopIdx,
    /// The GTFS stop_sequence value. Not guaranteed contiguous - only that
    /// it is distinct and increases in the direction of travel, so it must
    /// always be compared, never used as an array offset.
    pub stop_sequence: u32,
    pub arrival_time: Time,
    pub departure_time: Time,
}
