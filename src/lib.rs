//! GTFS journey-planning engine: loads a static transit feed into
//! in-memory indices and answers pickup/drop coordinate queries with
//! ranked walk+bus itineraries.
//!
//! [`planner::Engine`] is the entry point; everything else is `pub` so
//! each stage (loading, indexing, nearby search, direct and transfer
//! search, itinerary assembly) can be exercised and tested on its own.

pub mod arena;
pub mod config;
pub mod direct;
pub mod error;
pub mod feed;
pub mod geo;
pub mod index;
pub mod itinerary;
pub mod model;
pub mod nearby;
pub mod planner;
pub mod time;
pub mod transfer;

pub use config::Config;
pub use geo::Coordinate;
pub use itinerary::{IntermediateStop, Itinerary, Segment, SegmentKind};
pub use planner::{Engine, Status};
