//! Tunables for the planner, all with the defaults the engine ships with.
//!
//! The engine never reads these from the environment or a file itself -
//! that wiring belongs to whatever host process embeds it - but `Config`
//! derives `Deserialize` so a host can load one out of its own config
//! layer and hand it to [`crate::planner::Engine::load`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory containing `stops.csv`, `trips.csv`, `routes.csv` and `stop_times.csv`.
    pub gtfs_path: String,
    /// Assumed walking speed, in metres per minute.
    pub walk_speed_m_per_min: f64,
    /// Radius, in kilometres, within which a stop counts as "nearby".
    pub max_nearby_km: f64,
    /// Maximum number of nearby stops considered as search candidates.
    pub nearby_limit: usize,
    /// Maximum number of itineraries returned from `find_routes`.
    pub max_results: usize,
    /// Number of closest pickup/drop stops considered when searching for a transfer.
    pub top_stops_for_transfer: usize,
    /// Flat fare contribution per bus leg, before the per-stop charge.
    pub fare_base_per_leg: f64,
    /// Fare contribution per stop travelled on a bus leg.
    pub fare_per_stop: f64,
    /// Distance, in kilometres, attributed to each stop travelled on a bus leg.
    pub km_per_stop_estimate: f64,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            gtfs_path: "./bus routing".to_owned(),
            walk_speed_m_per_min: 80.0,
            max_nearby_km: 2.0,
            nearby_limit: 20,
            max_results: 5,
            top_stops_for_transfer: 5,
            fare_base_per_leg: 5.0,
            fare_per_stop: 1.5,
            km_per_stop_estimate: 0.5,
        }
    }
}
