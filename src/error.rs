//! Error types for the Feed Loader's fallible entry point.
//!
//! Per-row problems (a malformed time, a dangling stop reference) never
//! reach a `Result` - they're counted and logged as the load proceeds, in
//! keeping with §4.1/§7: one bad row must not abort the rest of the file.
//! `LoadError` is only for the things that make the whole feed unusable.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum LoadError {
    /// A mandatory GTFS file could not be opened at all.
    MissingMandatoryFile { path: PathBuf, source: csv::Error },
    /// A mandatory file opened but produced zero usable records.
    EmptyMandatoryFile { file: &'static str },
    /// The configured directory itself could not be read.
    UnreadableDirectory { path: PathBuf },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::MissingMandatoryFile { path, source } => {
                write!(f, "could not open mandatory GTFS file {:?}: {}", path, source)
            }
            LoadError::EmptyMandatoryFile { file } => {
                write!(f, "mandatory GTFS file {} parsed zero records", file)
            }
            LoadError::UnreadableDirectory { path } => {
                write!(f, "GTFS directory {:?} is not readable", path)
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Per-record problems found while building the index from an already
/// loaded set of rows - eg. a stop_time referencing a trip or stop that was
/// itself dropped during loading. Logged and the record is skipped; never
/// propagated, hence no `Error` impl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DanglingReference {
    StopTimeMissingStop,
    StopTimeMissingTrip,
    TripMissingRoute,
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DanglingReference::StopTimeMissingStop => {
                write!(f, "stop_time references a stop_id absent from stops.csv")
            }
            DanglingReference::StopTimeMissingTrip => {
                write!(f, "stop_time references a trip_id absent from trips.csv")
            }
            DanglingReference::TripMissingRoute => {
                write!(f, "trip references a route_id absent from routes.csv")
            }
        }
    }
}
