//! Overlay objects rendered at fixed geographic points atop the map.
//!
//! The engine exclusively controls attachment and screen placement; the
//! caller owns the object's identity and content. Anything implementing
//! [`OverlayObject`] can be registered with `Map::add_object`.

use crate::core::constants::{MARKER_ICON_ANCHOR, MARKER_ICON_SIZE};
use crate::core::geo::{LatLng, Point};
use crate::{MapError, Result};

/// Capability interface for objects the map places on screen
pub trait OverlayObject: Send {
    /// The fixed geographic anchor of the object
    fn lat_lng(&self) -> LatLng;

    /// Whether the object is currently inserted into the overlay layer
    fn is_attached(&self) -> bool;

    /// Insert into the overlay layer; called when the anchor enters the
    /// viewport bounds
    fn attach(&mut self);

    /// Remove from the overlay layer; called when the anchor leaves the
    /// viewport bounds
    fn detach(&mut self);

    /// Last screen position applied by the engine, if any
    fn screen_position(&self) -> Option<Point>;

    /// Apply a screen position computed by the engine
    fn set_screen_position(&mut self, position: Point);
}

/// Standard map marker: an icon anchored by its bottom-center tip
pub struct Marker {
    position: LatLng,
    icon_size: Point,
    icon_anchor: Point,
    attached: bool,
    screen_position: Option<Point>,
}

impl Marker {
    /// Create a marker at the given anchor.
    ///
    /// A marker cannot exist without a valid anchor: non-finite or
    /// out-of-range coordinates are a fatal construction error.
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        let position = LatLng::new(lat, lng);
        if !position.is_valid() {
            return Err(Box::new(MapError::InvalidCoordinates(format!(
                "marker anchor ({}, {})",
                lat, lng
            ))));
        }
        Ok(Self {
            position,
            icon_size: Point::new(MARKER_ICON_SIZE.0, MARKER_ICON_SIZE.1),
            icon_anchor: Point::new(MARKER_ICON_ANCHOR.0, MARKER_ICON_ANCHOR.1),
            attached: false,
            screen_position: None,
        })
    }

    pub fn with_icon_geometry(mut self, size: Point, anchor: Point) -> Self {
        self.icon_size = size;
        self.icon_anchor = anchor;
        self
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn icon_size(&self) -> Point {
        self.icon_size
    }

    /// Top-left corner of the icon for the current screen position
    pub fn icon_origin(&self) -> Option<Point> {
        self.screen_position
            .map(|position| position.add(&self.icon_anchor))
    }
}

impl OverlayObject for Marker {
    fn lat_lng(&self) -> LatLng {
        self.position
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn attach(&mut self) {
        self.attached = true;
    }

    fn detach(&mut self) {
        self.attached = false;
    }

    fn screen_position(&self) -> Option<Point> {
        self.screen_position
    }

    fn set_screen_position(&mut self, position: Point) {
        self.screen_position = Some(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_requires_valid_anchor() {
        assert!(Marker::new(47.233, -1.583).is_ok());
        assert!(Marker::new(f64::NAN, 0.0).is_err());
        assert!(Marker::new(0.0, f64::INFINITY).is_err());
        assert!(Marker::new(91.0, 0.0).is_err());
        assert!(Marker::new(0.0, 181.0).is_err());
    }

    #[test]
    fn test_attach_detach_lifecycle() {
        let mut marker = Marker::new(47.0, -1.5).unwrap();
        assert!(!marker.is_attached());

        marker.attach();
        assert!(marker.is_attached());

        marker.detach();
        assert!(!marker.is_attached());
    }

    #[test]
    fn test_icon_origin_follows_screen_position() {
        let mut marker = Marker::new(47.0, -1.5).unwrap();
        assert!(marker.icon_origin().is_none());

        marker.set_screen_position(Point::new(100.0, 200.0));
        assert_eq!(marker.icon_origin(), Some(Point::new(84.0, 168.0)));
    }
}
