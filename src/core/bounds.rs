use crate::core::geo::{LatLng, Point};
use serde::{Deserialize, Serialize};

/// Represents a bounding box in screen/pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Creates new bounds from two points
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(Point::new(min_x, min_y), Point::new(max_x, max_y))
    }

    /// Creates bounds from an origin point and a square side length
    pub fn from_origin_and_square(origin: Point, side: f64) -> Self {
        Self::new(origin, Point::new(origin.x + side, origin.y + side))
    }

    /// Gets the width of the bounds
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Gets the height of the bounds
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Checks if the bounds intersect with another bounds
    pub fn intersects(&self, other: &Bounds) -> bool {
        !(other.max.x < self.min.x
            || other.min.x > self.max.x
            || other.max.y < self.min.y
            || other.min.y > self.max.y)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(Point::new(0.0, 0.0), Point::new(0.0, 0.0))
    }
}

/// Latitude and longitude boundaries of the displayed map.
///
/// Orientation contract: `lon_left` holds the longitude at the *right* screen
/// edge and `lon_right` the longitude at the *left* screen edge, so
/// `lon_left >= lon_right` and latitude runs `lat_top >= lat_bottom`. Overlay
/// placement mirrors x against `lon_left`; both the membership test and the
/// interpolation below rely on this orientation and must change together.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewBounds {
    pub lat_top: f64,
    pub lat_bottom: f64,
    pub lon_left: f64,
    pub lon_right: f64,
}

impl ViewBounds {
    pub fn new(lat_top: f64, lat_bottom: f64, lon_left: f64, lon_right: f64) -> Self {
        Self {
            lat_top,
            lat_bottom,
            lon_left,
            lon_right,
        }
    }

    /// Checks if the bounds contain a geographic position
    pub fn contains(&self, position: &LatLng) -> bool {
        position.lat <= self.lat_top
            && position.lat >= self.lat_bottom
            && position.lng <= self.lon_left
            && position.lng >= self.lon_right
    }

    /// Signed latitude extent, top to bottom
    pub fn lat_span(&self) -> f64 {
        self.lat_bottom - self.lat_top
    }

    /// Signed longitude extent, left to right (negative, see orientation note)
    pub fn lon_span(&self) -> f64 {
        self.lon_right - self.lon_left
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_creation() {
        let bounds = Bounds::from_coords(10.0, 20.0, 30.0, 60.0);
        assert_eq!(bounds.width(), 20.0);
        assert_eq!(bounds.height(), 40.0);
        assert_eq!(bounds.center(), Point::new(20.0, 40.0));
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = Bounds::from_coords(0.0, 0.0, 10.0, 10.0);
        assert!(bounds.contains(&Point::new(5.0, 5.0)));
        assert!(!bounds.contains(&Point::new(-1.0, 5.0)));
    }

    #[test]
    fn test_bounds_from_origin_and_square() {
        let bounds = Bounds::from_origin_and_square(Point::new(3.0, 4.0), 2.0);
        assert_eq!(bounds.max, Point::new(5.0, 6.0));
    }

    #[test]
    fn test_view_bounds_mirrored_contains() {
        // lon_left is the eastern edge, lon_right the western one
        let bounds = ViewBounds::new(48.0, 46.0, -1.0, -2.0);

        assert!(bounds.contains(&LatLng::new(47.0, -1.5)));
        assert!(!bounds.contains(&LatLng::new(49.0, -1.5)));
        assert!(!bounds.contains(&LatLng::new(47.0, -0.5)));
        assert!(!bounds.contains(&LatLng::new(47.0, -2.5)));
    }

    #[test]
    fn test_view_bounds_spans_are_signed() {
        let bounds = ViewBounds::new(48.0, 46.0, -1.0, -2.0);
        assert_eq!(bounds.lat_span(), -2.0);
        assert_eq!(bounds.lon_span(), -1.0);
    }
}
