//! Great-circle distance and the walk-time conversion derived from it.
//!
//! Coordinates are carried as `geo::Point<f64>` (`x` = longitude, `y` =
//! latitude) so stop locations compose with the rest of the `geo`
//! ecosystem, even though this crate itself only ever needs Haversine
//! distance.

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 coordinate. A thin wrapper around `geo::Point<f64>` with a
/// `lat`/`lng` constructor, since GTFS and callers speak lat/lng while
/// `geo::Point` speaks x/y.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Coordinate {
        Coordinate { lat, lng }
    }

    pub fn as_point(self) -> geo::Point<f64> {
        geo::Point::new(self.lng, self.lat)
    }
}

impl From<geo::Point<f64>> for Coordinate {
    fn from(point: geo::Point<f64>) -> Coordinate {
        Coordinate {
            lat: point.y(),
            lng: point.x(),
        }
    }
}

/// Great-circle distance between two coordinates, in kilometres.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (d_lat / 2.0).sin();
    let sin_lng = (d_lng / 2.0).sin();
    let h = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let c = 2.0 * h.min(1.0).sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// Walking time for a distance in kilometres, rounded up to a whole minute.
pub fn walk_minutes(distance_km: f64, walk_speed_m_per_min: f64) -> u32 {
    if distance_km <= 0.0 {
        return 0;
    }
    (distance_km * 1000.0 / walk_speed_m_per_min).ceil() as u32
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zero_distance_for_identical_points() {
        let p = Coordinate::new(51.5, -0.1);
        assert_eq!(distance_km(p, p), 0.0);
    }

    #[test]
    fn one_degree_of_longitude_at_the_equator_is_about_111_km() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 1.0);
        let d = distance_km(a, b);
        assert!((d - 111.19).abs() < 0.5, "got {}", d);
    }

    #[test]
    fn walk_minutes_rounds_up() {
        // 80 m/min default walk speed: 100m takes 1.25 min -> 2 mins
        assert_eq!(walk_minutes(0.1, 80.0), 2);
        assert_eq!(walk_minutes(0.0, 80.0), 0);
        // exact minute boundary stays exact
        assert_eq!(walk_minutes(0.08, 80.0), 1);
    }
}
