//! Orchestrates the search pipeline and ranks the merged results.
//!
//! The engine-level state machine from the design notes - `{Unloaded ->
//! Loading -> Ready}` or `{Loading -> Disabled}` - collapses at the type
//! level to an immutable construction result: [`Engine::load`] either
//! returns a `Ready` engine or a `Disabled` one, there is no observable
//! in-between state and no mutation afterwards.

use std::cmp::Ordering;

use lazysort::SortedBy;

use crate::config::Config;
use crate::direct::find_direct;
use crate::geo::Coordinate;
use crate::index::GtfsIndex;
use crate::itinerary::{assemble_direct, assemble_transfer, Itinerary};
use crate::nearby::find_nearby;
use crate::feed;
use crate::transfer::find_transfer;

/// Load-time outcome, queryable after construction.
#[derive(Debug, Clone)]
pub enum Status {
    Ready,
    Disabled { reason: String },
}

enum EngineState {
    Ready(GtfsIndex),
    Disabled { reason: String },
}

/// The engine's sole public entry point. Constructed once via [`Engine::load`]
/// and thereafter read-only: queries never mutate it and never panic,
/// degrading to an empty result list instead.
pub struct Engine {
    config: Config,
    state: EngineState,
}

fn rank(a: &Itinerary, b: &Itinerary) -> Ordering {
    a.total_duration_minutes
        .cmp(&b.total_duration_minutes)
        .then_with(|| a.stop_count.cmp(&b.stop_count))
        .then_with(|| a.route_name.cmp(&b.route_name))
}

impl Engine {
    /// Reads the feed at `config.gtfs_path` and builds the search indices.
    /// A missing or empty mandatory file disables the engine rather than
    /// returning a `Result` - this mirrors the facade's contract that no
    /// query path ever surfaces an exception to the caller.
    pub fn load(config: Config) -> Engine {
        match feed::load(&config.gtfs_path) {
            Ok(index) => Engine {
                config,
                state: EngineState::Ready(index),
            },
            Err(err) => {
                eprintln!("warning: engine disabled, could not load GTFS feed: {}", err);
                Engine {
                    config,
                    state: EngineState::Disabled {
                        reason: err.to_string(),
                    },
                }
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, EngineState::Ready(_))
    }

    pub fn status(&self) -> Status {
        match &self.state {
            EngineState::Ready(_) => Status::Ready,
            EngineState::Disabled { reason } => Status::Disabled {
                reason: reason.clone(),
            },
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Up to `config.max_results` itineraries from `pickup` to `drop`,
    /// ranked by ascending total duration, then fewer stops, then
    /// lexicographically smaller route name. Returns an empty list rather
    /// than erroring when the engine is disabled or no stop lies within
    /// `max_nearby_km` of either endpoint.
    pub fn find_routes(&self, pickup: Coordinate, drop: Coordinate) -> Vec<Itinerary> {
        let index = match &self.state {
            EngineState::Ready(index) => index,
            EngineState::Disabled { .. } => return Vec::new(),
        };

        let pickups = find_nearby(index, pickup, self.config.nearby_limit, self.config.max_nearby_km);
        let drops = find_nearby(index, drop, self.config.nearby_limit, self.config.max_nearby_km);
        if pickups.is_empty() || drops.is_empty() {
            return Vec::new();
        }

        let direct = find_direct(index, &pickups, &drops, self.config.max_results);
        let mut itineraries: Vec<Itinerary> = direct
            .iter()
            .map(|item| assemble_direct(index, &self.config, pickup, drop, item))
            .collect();

        if itineraries.len() < self.config.max_results {
            let transfers = find_transfer(
                index,
                &pickups,
                &drops,
                self.config.top_stops_for_transfer,
                self.config.max_results,
            );
            itineraries.extend(
                transfers
                    .iter()
                    .map(|item| assemble_transfer(index, &self.config, pickup, drop, item)),
            );
        }

        itineraries
            .into_iter()
            .sorted_by(rank)
            .take(self.config.max_results)
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &std::path::Path, name: &str, contents: &str) {
        let mut f = std::fs::File::create(dir.join(name)).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    fn engine_for_fixture_f1() -> Engine {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "stops.csv", "stop_id,stop_name,stop_lat,stop_lon\nA,A,0,0\nB,B,0,0.01\nC,C,0,0.02\n");
        write_file(dir.path(), "routes.csv", "route_id,route_short_name,route_long_name\nR1,1,Route One\n");
        write_file(dir.path(), "trips.csv", "trip_id,route_id,trip_headsign\nT1,R1,Outbound\n");
        write_file(
            dir.path(),
            "stop_times.csv",
            "trip_id,stop_id,stop_sequence,arrival_time,departure_time\nT1,A,1,08:00:00,08:00:00\nT1,B,2,08:05:00,08:05:00\nT1,C,3,08:10:00,08:10:00\n",
        );
        let config = Config {
            gtfs_path: dir.path().to_string_lossy().into_owned(),
            ..Config::default()
        };
        Engine::load(config)
    }

    #[test]
    fn finds_direct_itinerary_a_to_c() {
        let engine = engine_for_fixture_f1();
        assert!(engine.is_ready());
        let found = engine.find_routes(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.02));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].stop_count, 3);
        assert_eq!(found[0].fare, 10);
    }

    #[test]
    fn wrong_direction_returns_empty() {
        let engine = engine_for_fixture_f1();
        let found = engine.find_routes(Coordinate::new(0.0, 0.02), Coordinate::new(0.0, 0.0));
        assert!(found.is_empty());
    }

    #[test]
    fn finds_direct_itinerary_a_to_b() {
        let engine = engine_for_fixture_f1();
        let found = engine.find_routes(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.01));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].stop_count, 2);
        assert_eq!(found[0].total_duration_minutes, 5);
        assert_eq!(found[0].fare, 8);
    }

    fn engine_for_fixture_f2() -> Engine {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "stops.csv",
            "stop_id,stop_name,stop_lat,stop_lon\nA,A,0,0\nB,B,0,0.01\nC,C,0,0.02\nD,D,0,0.03\n",
        );
        write_file(
            dir.path(),
            "routes.csv",
            "route_id,route_short_name,route_long_name\nR1,1,Route One\nR2,2,Route Two\n",
        );
        write_file(dir.path(), "trips.csv", "trip_id,route_id,trip_headsign\nT1,R1,Outbound\nT2,R2,Outbound\n");
        write_file(
            dir.path(),
            "stop_times.csv",
            "trip_id,stop_id,stop_sequence,arrival_time,departure_time\n\
             T1,A,1,08:00:00,08:00:00\nT1,B,2,08:05:00,08:05:00\nT1,C,3,08:10:00,08:10:00\n\
             T2,C,1,08:15:00,08:15:00\nT2,D,2,08:20:00,08:20:00\n",
        );
        let config = Config {
            gtfs_path: dir.path().to_string_lossy().into_owned(),
            ..Config::default()
        };
        Engine::load(config)
    }

    #[test]
    fn finds_transfer_itinerary_a_to_d_via_c() {
        let engine = engine_for_fixture_f2();
        let found = engine.find_routes(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.03));
        assert_eq!(found.len(), 1);
        let itinerary = &found[0];
        assert_eq!(itinerary.segments.len(), 5);
        assert_eq!(itinerary.fare, 18);
        assert_eq!(itinerary.total_duration_minutes, 5 + 10 + 5);
    }

    #[test]
    fn transfer_rejects_a_leg2_departing_before_leg1_arrives() {
        // T2' departs C at 08:09:00, before T1 arrives at C at 08:10:00, and
        // must lose out to T2, which departs after - same final itinerary as
        // the plain F2 fixture.
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "stops.csv",
            "stop_id,stop_name,stop_lat,stop_lon\nA,A,0,0\nB,B,0,0.01\nC,C,0,0.02\nD,D,0,0.03\n",
        );
        write_file(
            dir.path(),
            "routes.csv",
            "route_id,route_short_name,route_long_name\nR1,1,Route One\nR2,2,Route Two\n",
        );
        write_file(
            dir.path(),
            "trips.csv",
            "trip_id,route_id,trip_headsign\nT1,R1,Outbound\nT2,R2,Outbound\nT2P,R2,Outbound\n",
        );
        write_file(
            dir.path(),
            "stop_times.csv",
            "trip_id,stop_id,stop_sequence,arrival_time,departure_time\n\
             T1,A,1,08:00:00,08:00:00\nT1,B,2,08:05:00,08:05:00\nT1,C,3,08:10:00,08:10:00\n\
             T2,C,1,08:15:00,08:15:00\nT2,D,2,08:20:00,08:20:00\n\
             T2P,C,1,08:09:00,08:09:00\nT2P,D,2,08:14:00,08:14:00\n",
        );
        let config = Config {
            gtfs_path: dir.path().to_string_lossy().into_owned(),
            ..Config::default()
        };
        let engine = Engine::load(config);
        let found = engine.find_routes(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.03));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].arrival_time, "08:20:00");
    }

    #[test]
    fn pickup_outside_radius_returns_empty() {
        let engine = engine_for_fixture_f1();
        let found = engine.find_routes(Coordinate::new(5.0, 5.0), Coordinate::new(0.0, 0.0));
        assert!(found.is_empty());
    }

    #[test]
    fn missing_feed_disables_engine_and_queries_return_empty() {
        let config = Config {
            gtfs_path: "/does/not/exist".to_owned(),
            ..Config::default()
        };
        let engine = Engine::load(config);
        assert!(!engine.is_ready());
        assert!(matches!(engine.status(), Status::Disabled { .. }));
        let found = engine.find_routes(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.02));
        assert!(found.is_empty());
    }
}
