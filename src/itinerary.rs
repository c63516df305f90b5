//! Shapes raw legs and nearby-stop choices into the public result record.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::direct::DirectItinerary;
use crate::geo::{distance_km, walk_minutes, Coordinate};
use crate::index::GtfsIndex;
use crate::model::{Leg, StopTime};
use crate::transfer::TransferItinerary;

const WALK_COLOR: &str = "#94a3b8";
const BUS_COLOR_1: &str = "#f97316";
const BUS_COLOR_2: &str = "#ea580c";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    Walk,
    Bus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntermediateStop {
    pub name: String,
    pub location: Coordinate,
    pub sequence: u32,
    pub time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub start: Coordinate,
    pub end: Coordinate,
    pub distance: String,
    pub duration: String,
    pub duration_minutes: u32,
    pub instruction: String,
    pub polyline: Option<Vec<Coordinate>>,
    pub intermediate_stops: Option<Vec<IntermediateStop>>,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Itinerary {
    pub route_name: String,
    pub start_stop: String,
    pub end_stop: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub total_duration_minutes: u32,
    pub stop_count: usize,
    pub fare: u32,
    pub polyline: Vec<Coordinate>,
    pub segments: Vec<Segment>,
    pub total_distance_km: f64,
}

fn duration_string(minutes: u32) -> String {
    format!("{} mins", minutes)
}

fn walk_segment(from: Coordinate, to: Coordinate, instruction: String, config: &Config) -> Segment {
    let d = distance_km(from, to);
    let minutes = walk_minutes(d, config.walk_speed_m_per_min);
    Segment {
        kind: SegmentKind::Walk,
        start: from,
        end: to,
        distance: format!("{:.2} km", d),
        duration: duration_string(minutes),
        duration_minutes: minutes,
        instruction,
        polyline: None,
        intermediate_stops: None,
        color: WALK_COLOR.to_owned(),
    }
}

fn transfer_segment(at: Coordinate, wait_minutes: u32, stop_name: &str) -> Segment {
    Segment {
        kind: SegmentKind::Walk,
        start: at,
        end: at,
        distance: "0.00 km".to_owned(),
        duration: duration_string(wait_minutes),
        duration_minutes: wait_minutes,
        instruction: format!("Wait at {}", stop_name),
        polyline: None,
        intermediate_stops: None,
        color: WALK_COLOR.to_owned(),
    }
}

struct BusLegShape {
    segment: Segment,
    stops_in_leg: usize,
    polyline: Vec<Coordinate>,
}

fn bus_segment(index: &GtfsIndex, leg: &Leg, color: &str, config: &Config) -> BusLegShape {
    let trip = index.trip(leg.trip);
    let route = index.route(leg.route);
    let stop_times = leg.stop_times(trip);

    let stops_in_leg = stop_times.len();
    let duration_minutes = (stop_times[stop_times.len() - 1].arrival_time - stop_times[0].departure_time).ceil_minutes() as u32;
    let distance_km = config.km_per_stop_estimate * stops_in_leg as f64;

    let intermediate_stops: Vec<IntermediateStop> = stop_times
        .iter()
        .map(|st| project_stop_time(index, st))
        .collect();
    let polyline: Vec<Coordinate> = intermediate_stops.iter().map(|s| s.location).collect();

    let start_location = index.stop(stop_times[0].stop).location;
    let end_location = index.stop(stop_times[stop_times.len() - 1].stop).location;
    let end_name = &index.stop(stop_times[stop_times.len() - 1].stop).stop_name;

    let segment = Segment {
        kind: SegmentKind::Bus,
        start: start_location,
        end: end_location,
        distance: format!("{:.2} km", distance_km),
        duration: duration_string(duration_minutes),
        duration_minutes,
        instruction: format!("Take {} to {}", route.display_name(), end_name),
        polyline: Some(polyline.clone()),
        intermediate_stops: Some(intermediate_stops),
        color: color.to_owned(),
    };

    BusLegShape {
        segment,
        stops_in_leg,
        polyline,
    }
}

fn project_stop_time(index: &GtfsIndex, stop_time: &StopTime) -> IntermediateStop {
    let stop = index.stop(stop_time.stop);
    IntermediateStop {
        name: stop.stop_name.clone(),
        location: stop.location,
        sequence: stop_time.stop_sequence,
        time: stop_time.arrival_time.to_string(),
    }
}

fn leg_fare(config: &Config, stops_in_leg: usize) -> f64 {
    config.fare_base_per_leg + config.fare_per_stop * stops_in_leg as f64
}

pub fn assemble_direct(
    index: &GtfsIndex,
    config: &Config,
    pickup: Coordinate,
    drop: Coordinate,
    item: &DirectItinerary,
) -> Itinerary {
    let pickup_stop = index.stop(item.pickup);
    let drop_stop = index.stop(item.drop);

    let walk1 = walk_segment(pickup, pickup_stop.location, format!("Walk to {}", pickup_stop.stop_name), config);
    let bus = bus_segment(index, &item.leg, BUS_COLOR_1, config);
    let walk2 = walk_segment(drop_stop.location, drop, "Walk to destination".to_owned(), config);

    let trip = index.trip(item.leg.trip);
    let stop_times = item.leg.stop_times(trip);
    let departure_time = stop_times[0].departure_time.to_string();
    let arrival_time = stop_times[stop_times.len() - 1].arrival_time.to_string();

    let fare = leg_fare(config, bus.stops_in_leg).ceil() as u32;
    let total_duration_minutes = walk1.duration_minutes + bus.segment.duration_minutes + walk2.duration_minutes;
    let total_distance_km = distance_km(pickup, pickup_stop.location)
        + config.km_per_stop_estimate * bus.stops_in_leg as f64
        + distance_km(drop_stop.location, drop);

    Itinerary {
        route_name: index.route(item.leg.route).display_name().to_owned(),
        start_stop: pickup_stop.stop_name.clone(),
        end_stop: drop_stop.stop_name.clone(),
        departure_time,
        arrival_time,
        total_duration_minutes,
        stop_count: bus.stops_in_leg,
        fare,
        polyline: bus.polyline,
        segments: vec![walk1, bus.segment, walk2],
        total_distance_km,
    }
}

pub fn assemble_transfer(
    index: &GtfsIndex,
    config: &Config,
    pickup: Coordinate,
    drop: Coordinate,
    item: &TransferItinerary,
) -> Itinerary {
    let pickup_stop = index.stop(item.pickup);
    let transfer_stop = index.stop(item.transfer);
    let drop_stop = index.stop(item.drop);

    let walk1 = walk_segment(pickup, pickup_stop.location, format!("Walk to {}", pickup_stop.stop_name), config);
    let bus1 = bus_segment(index, &item.leg1, BUS_COLOR_1, config);
    let bus2 = bus_segment(index, &item.leg2, BUS_COLOR_2, config);
    let walk2 = walk_segment(drop_stop.location, drop, "Walk to destination".to_owned(), config);

    let trip1 = index.trip(item.leg1.trip);
    let trip2 = index.trip(item.leg2.trip);
    let leg1_stop_times = item.leg1.stop_times(trip1);
    let leg2_stop_times = item.leg2.stop_times(trip2);

    let arr1 = leg1_stop_times[leg1_stop_times.len() - 1].arrival_time;
    let dep2 = leg2_stop_times[0].departure_time;
    let transfer_wait_minutes = (dep2 - arr1).ceil_minutes() as u32;
    let transfer = transfer_segment(transfer_stop.location, transfer_wait_minutes, &transfer_stop.stop_name);

    let departure_time = leg1_stop_times[0].departure_time.to_string();
    let arrival_time = leg2_stop_times[leg2_stop_times.len() - 1].arrival_time.to_string();

    let fare = (leg_fare(config, bus1.stops_in_leg) + leg_fare(config, bus2.stops_in_leg)).ceil() as u32;
    let total_duration_minutes = walk1.duration_minutes
        + bus1.segment.duration_minutes
        + transfer.duration_minutes
        + bus2.segment.duration_minutes
        + walk2.duration_minutes;
    let total_distance_km = distance_km(pickup, pickup_stop.location)
        + config.km_per_stop_estimate * bus1.stops_in_leg as f64
        + config.km_per_stop_estimate * bus2.stops_in_leg as f64
        + distance_km(drop_stop.location, drop);

    let mut polyline = bus1.polyline.clone();
    polyline.extend(bus2.polyline.clone());

    let route_name = format!(
        "{} + {}",
        index.route(item.leg1.route).display_name(),
        index.route(item.leg2.route).display_name()
    );

    Itinerary {
        route_name,
        start_stop: pickup_stop.stop_name.clone(),
        end_stop: drop_stop.stop_name.clone(),
        departure_time,
        arrival_time,
        total_duration_minutes,
        stop_count: bus1.stops_in_leg + bus2.stops_in_leg,
        fare,
        polyline,
        segments: vec![walk1, bus1.segment, transfer, bus2.segment, walk2],
        total_distance_km,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::index::IndexBuilder;
    use crate::time::Time;

    fn hms(h: u32, m: u32, s: u32) -> Time {
        Time::from_hms(h, m, s)
    }

    #[test]
    fn assembles_direct_itinerary_with_expected_fare_and_duration() {
        let mut b = IndexBuilder::new();
        b.add_stop("A".into(), "A".into(), 0.0, 0.0);
        b.add_stop("B".into(), "B".into(), 0.0, 0.01);
        b.add_stop("C".into(), "C".into(), 0.0, 0.02);
        b.add_route("R1".into(), "1".into(), "Route One".into());
        b.add_trip("T1".into(), "R1", "".into()).unwrap();
        b.add_stop_time("T1", "A", 1, hms(8, 0, 0), hms(8, 0, 0)).unwrap();
        b.add_stop_time("T1", "B", 2, hms(8, 5, 0), hms(8, 5, 0)).unwrap();
        b.add_stop_time("T1", "C", 3, hms(8, 10, 0), hms(8, 10, 0)).unwrap();
        let index = b.build();
        let config = Config::default();

        let a = index.find_stop("A").unwrap();
        let c = index.find_stop("C").unwrap();
        let leg = crate::direct::find_trip_for_leg(&index, index.find_route("R1").unwrap(), a, c).unwrap();
        let item = DirectItinerary { leg, pickup: a, drop: c };

        let pickup = index.stop(a).location;
        let drop = index.stop(c).location;
        let itinerary = assemble_direct(&index, &config, pickup, drop, &item);

        assert_eq!(itinerary.stop_count, 3);
        assert_eq!(itinerary.fare, 10);
        assert_eq!(itinerary.segments.len(), 3);
        assert_eq!(itinerary.total_duration_minutes, 10);
    }
}
