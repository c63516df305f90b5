//! Typed row shapes for the four GTFS tables, and a small helper for
//! opening them by name out of a feed directory.
//!
//! Columns are addressed by header name, not position - `csv`'s
//! `Reader::deserialize` does this for us as long as the reader is left in
//! its default (non-flexible) header mode. Optional columns are marked
//! `#[serde(default)]` so a row missing them deserializes with an empty
//! default rather than failing the whole row.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::LoadError;
use crate::index::{GtfsIndex, IndexBuilder};
use crate::time::Time;

#[derive(Debug, Deserialize)]
pub struct RawStop {
    pub stop_id: String,
    #[serde(default)]
    pub stop_name: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
}

#[derive(Debug, Deserialize)]
pub struct RawRoute {
    pub route_id: String,
    #[serde(default, rename = "route_short_name")]
    pub short_name: String,
    #[serde(default, rename = "route_long_name")]
    pub long_name: String,
}

#[derive(Debug, Deserialize)]
pub struct RawTrip {
    pub trip_id: String,
    pub route_id: String,
    #[serde(default, rename = "trip_headsign")]
    pub headsign: String,
}

#[derive(Debug, Deserialize)]
pub struct RawStopTime {
    pub trip_id: String,
    pub stop_id: String,
    pub stop_sequence: u32,
    pub arrival_time: String,
    pub departure_time: String,
}

/// Opens the four well-known files of a GTFS directory by name.
pub struct GtfsSource {
    dir_path: PathBuf,
}

impl GtfsSource {
    pub fn new(dir_path: impl AsRef<Path>) -> GtfsSource {
        GtfsSource {
            dir_path: dir_path.as_ref().to_path_buf(),
        }
    }

    pub fn path_to(&self, filename: &str) -> PathBuf {
        self.dir_path.join(filename)
    }

    pub fn open_csv(&self, filename: &str) -> Result<csv::Reader<File>, csv::Error> {
        let path = self.path_to(filename);
        csv::Reader::from_path(path)
    }
}

fn open_mandatory(source: &GtfsSource, filename: &'static str) -> Result<csv::Reader<File>, LoadError> {
    let path = source.path_to(filename);
    source
        .open_csv(filename)
        .map_err(|source| LoadError::MissingMandatoryFile { path, source })
}

fn ingest_stop_time(builder: &mut IndexBuilder, row: RawStopTime) -> Result<(), ()> {
    let arrival = row.arrival_time.parse::<Time>().map_err(|_| ())?;
    let departure = row.departure_time.parse::<Time>().map_err(|_| ())?;
    builder
        .add_stop_time(&row.trip_id, &row.stop_id, row.stop_sequence, arrival, departure)
        .map_err(|kind| builder.note_dangling(kind))
}

/// Loads every stop, route, trip and stop_time under `gtfs_path` and
/// returns a fully built index. `routes.csv` is optional: if absent, every
/// route referenced by trips.csv is synthesized with its `route_id` as
/// display name. Any other mandatory file that fails to open, or parses to
/// zero usable rows, aborts the whole load - everything else (malformed
/// rows, dangling stop_time references) is dropped and logged, never fatal.
pub fn load(gtfs_path: impl AsRef<Path>) -> Result<GtfsIndex, LoadError> {
    let source = GtfsSource::new(gtfs_path);
    let mut builder = IndexBuilder::new();

    let mut stops_ok = 0usize;
    let mut stops_bad = 0usize;
    {
        let mut reader = open_mandatory(&source, "stops.csv")?;
        for result in reader.deserialize::<RawStop>() {
            match result {
                Ok(row) => {
                    builder.add_stop(row.stop_id, row.stop_name, row.stop_lat, row.stop_lon);
                    stops_ok += 1;
                }
                Err(_) => stops_bad += 1,
            }
        }
    }
    if stops_ok == 0 {
        return Err(LoadError::EmptyMandatoryFile { file: "stops.csv" });
    }
    if stops_bad > 0 {
        eprintln!("warning: stops.csv: {} row(s) failed to parse and were skipped", stops_bad);
    }

    match source.open_csv("routes.csv") {
        Ok(mut reader) => {
            builder.set_routes_file_present();
            let mut routes_bad = 0usize;
            for result in reader.deserialize::<RawRoute>() {
                match result {
                    Ok(row) => {
                        builder.add_route(row.route_id, row.short_name, row.long_name);
                    }
                    Err(_) => routes_bad += 1,
                }
            }
            if routes_bad > 0 {
                eprintln!("warning: routes.csv: {} row(s) failed to parse and were skipped", routes_bad);
            }
        }
        Err(_) => {
            eprintln!("warning: routes.csv not found; route display names will fall back to route_id");
        }
    }

    let mut trips_ok = 0usize;
    let mut trips_bad = 0usize;
    {
        let mut reader = open_mandatory(&source, "trips.csv")?;
        for result in reader.deserialize::<RawTrip>() {
            match result {
                Ok(row) => match builder.add_trip(row.trip_id, &row.route_id, row.headsign) {
                    Ok(_) => trips_ok += 1,
                    Err(kind) => {
                        builder.note_dangling(kind);
                        trips_bad += 1;
                    }
                },
                Err(_) => trips_bad += 1,
            }
        }
    }
    if trips_ok == 0 {
        return Err(LoadError::EmptyMandatoryFile { file: "trips.csv" });
    }
    if trips_bad > 0 {
        eprintln!(
            "warning: trips.csv: {} row(s) failed to parse or referenced an unknown route_id and were skipped",
            trips_bad
        );
    }

    let mut stop_times_ok = 0usize;
    let mut stop_times_bad = 0usize;
    {
        let mut reader = open_mandatory(&source, "stop_times.csv")?;
        for result in reader.deserialize::<RawStopTime>() {
            match result {
                Ok(row) => match ingest_stop_time(&mut builder, row) {
                    Ok(()) => stop_times_ok += 1,
                    Err(()) => stop_times_bad += 1,
                },
                Err(_) => stop_times_bad += 1,
            }
        }
    }
    if stop_times_ok == 0 {
        return Err(LoadError::EmptyMandatoryFile { file: "stop_times.csv" });
    }
    if stop_times_bad > 0 {
        eprintln!(
            "warning: stop_times.csv: {} row(s) failed to parse or referenced unknown stops/trips and were skipped",
            stop_times_bad
        );
    }
    for (kind, count) in builder.dangling_counts() {
        eprintln!("warning: {} row(s) dropped: {}", count, kind);
    }

    Ok(builder.build())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &std::path::Path, name: &str, contents: &str) {
        let mut f = File::create(dir.join(name)).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    fn minimal_feed(dir: &std::path::Path) {
        write_file(dir, "stops.csv", "stop_id,stop_name,stop_lat,stop_lon\nA,Stop A,0.0,0.0\nB,Stop B,0.0,0.01\n");
        write_file(dir, "routes.csv", "route_id,route_short_name,route_long_name\nR1,1,Route One\n");
        write_file(dir, "trips.csv", "trip_id,route_id,trip_headsign\nT1,R1,Outbound\n");
        write_file(
            dir,
            "stop_times.csv",
            "trip_id,stop_id,stop_sequence,arrival_time,departure_time\nT1,A,1,09:00:00,09:00:00\nT1,B,2,09:10:00,09:10:00\n",
        );
    }

    #[test]
    fn loads_a_valid_feed() {
        let dir = tempfile::tempdir().unwrap();
        minimal_feed(dir.path());
        let index = load(dir.path()).unwrap();
        assert_eq!(index.stop_count(), 2);
        let a = index.find_stop("A").unwrap();
        assert_eq!(index.visits_to(a).len(), 1);
    }

    #[test]
    fn missing_mandatory_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "stops.csv", "stop_id,stop_name,stop_lat,stop_lon\nA,Stop A,0.0,0.0\n");
        let result = load(dir.path());
        assert!(matches!(result, Err(LoadError::MissingMandatoryFile { .. })));
    }

    #[test]
    fn routes_file_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "stops.csv", "stop_id,stop_name,stop_lat,stop_lon\nA,Stop A,0.0,0.0\nB,Stop B,0.0,0.01\n");
        write_file(dir.path(), "trips.csv", "trip_id,route_id,trip_headsign\nT1,R1,Outbound\n");
        write_file(
            dir.path(),
            "stop_times.csv",
            "trip_id,stop_id,stop_sequence,arrival_time,departure_time\nT1,A,1,09:00:00,09:00:00\nT1,B,2,09:10:00,09:10:00\n",
        );
        let index = load(dir.path()).unwrap();
        let route = index.find_route("R1").unwrap();
        assert_eq!(index.route(route).display_name(), "R1");
    }

    #[test]
    fn trip_with_unknown_route_is_dropped_when_routes_file_present() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "stops.csv", "stop_id,stop_name,stop_lat,stop_lon\nA,Stop A,0.0,0.0\nB,Stop B,0.0,0.01\n");
        write_file(dir.path(), "routes.csv", "route_id,route_short_name,route_long_name\nR1,1,Route One\n");
        write_file(
            dir.path(),
            "trips.csv",
            "trip_id,route_id,trip_headsign\nT1,R1,Outbound\nT2,GHOST,Phantom\n",
        );
        write_file(
            dir.path(),
            "stop_times.csv",
            "trip_id,stop_id,stop_sequence,arrival_time,departure_time\nT1,A,1,09:00:00,09:00:00\nT1,B,2,09:10:00,09:10:00\nT2,A,1,09:00:00,09:00:00\nT2,B,2,09:10:00,09:10:00\n",
        );
        let index = load(dir.path()).unwrap();
        assert!(index.find_trip("T1").is_some());
        assert!(index.find_trip("T2").is_none());
        assert!(index.find_route("GHOST").is_none());
    }

    #[test]
    fn dangling_stop_reference_is_dropped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "stops.csv", "stop_id,stop_name,stop_lat,stop_lon\nA,Stop A,0.0,0.0\n");
        write_file(dir.path(), "trips.csv", "trip_id,route_id,trip_headsign\nT1,R1,Outbound\n");
        write_file(
            dir.path(),
            "stop_times.csv",
            "trip_id,stop_id,stop_sequence,arrival_time,departure_time\nT1,A,1,09:00:00,09:00:00\nT1,GHOST,2,09:10:00,09:10:00\n",
        );
        let index = load(dir.path()).unwrap();
        let a = index.find_stop("A").unwrap();
        assert_eq!(index.visits_to(a).len(), 1);
    }

    #[test]
    fn malformed_time_drops_the_row() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "stops.csv", "stop_id,stop_name,stop_lat,stop_lon\nA,Stop A,0.0,0.0\nB,Stop B,0.0,0.01\n");
        write_file(dir.path(), "trips.csv", "trip_id,route_id,trip_headsign\nT1,R1,Outbound\n");
        write_file(
            dir.path(),
            "stop_times.csv",
            "trip_id,stop_id,stop_sequence,arrival_time,departure_time\nT1,A,1,not-a-time,09:00:00\nT1,B,2,09:10:00,09:10:00\n",
        );
        let index = load(dir.path()).unwrap();
        let a = index.find_stop("A").unwrap();
        assert_eq!(index.visits_to(a).len(), 0);
        let b = index.find_stop("B").unwrap();
        assert_eq!(index.visits_to(b).len(), 1);
    }
}
