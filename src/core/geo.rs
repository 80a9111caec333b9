use serde::{Deserialize, Serialize};

/// Latitude beyond which the Web Mercator projection degenerates.
pub const MAX_LATITUDE: f64 = 85.05;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are finite and within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lng >= -180.0
            && self.lng <= 180.0
    }

    /// Wraps longitude to [-180, 180] range
    pub fn wrap_lng(lng: f64) -> f64 {
        let wrapped = lng % 360.0;
        if wrapped > 180.0 {
            wrapped - 360.0
        } else if wrapped < -180.0 {
            wrapped + 360.0
        } else {
            wrapped
        }
    }

    /// Clamps latitude to the projectable range
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a point in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a tile coordinate in the slippy map tile system.
///
/// `x` and `y` are signed: the populate range can step outside the world
/// grid near the antimeridian and such requests are simply tolerated by the
/// tile server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: i32, y: i32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Checks if the tile lies inside the world grid for its zoom level
    pub fn is_valid(&self) -> bool {
        let max_coord = 1_i64 << self.z;
        (self.x as i64) >= 0
            && (self.x as i64) < max_coord
            && (self.y as i64) >= 0
            && (self.y as i64) < max_coord
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lng_creation() {
        let coord = LatLng::new(47.233, -1.583);
        assert_eq!(coord.lat, 47.233);
        assert_eq!(coord.lng, -1.583);
        assert!(coord.is_valid());
    }

    #[test]
    fn test_lat_lng_wrap_and_clamp() {
        assert_eq!(LatLng::wrap_lng(190.0), -170.0);
        assert_eq!(LatLng::wrap_lng(-190.0), 170.0);
        assert_eq!(LatLng::wrap_lng(45.0), 45.0);

        assert_eq!(LatLng::clamp_lat(89.0), MAX_LATITUDE);
        assert_eq!(LatLng::clamp_lat(-89.0), -MAX_LATITUDE);
    }

    #[test]
    fn test_point_math() {
        let a = Point::new(2.0, 3.0);
        let b = Point::new(1.0, 1.0);
        assert_eq!(a.add(&b), Point::new(3.0, 4.0));
        assert_eq!(a.subtract(&b), Point::new(1.0, 2.0));
        assert_eq!(a.multiply(2.0), Point::new(4.0, 6.0));
    }

    #[test]
    fn test_tile_coord_validity() {
        assert!(TileCoord::new(0, 0, 0).is_valid());
        assert!(TileCoord::new(1023, 1023, 10).is_valid());
        assert!(!TileCoord::new(-1, 0, 10).is_valid());
        assert!(!TileCoord::new(1024, 0, 10).is_valid());
    }
}
