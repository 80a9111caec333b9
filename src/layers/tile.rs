//! Screen-space tile layers.
//!
//! A [`TileLayer`] is a container tagged with one integer zoom; every tile in
//! it belongs to that zoom's grid. At most two layers are live at once
//! (current and previous) plus one retiring layer fading out after a zoom
//! transition completes.

use crate::animation::{EasingType, Lerp, Transition};
use crate::core::bounds::Bounds;
use crate::core::geo::TileCoord;
use crate::tiles::image::TileImage;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Visual style of a positioned tile: its screen rect and opacity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileStyle {
    pub bounds: Bounds,
    pub opacity: f32,
}

impl TileStyle {
    pub fn opaque(bounds: Bounds) -> Self {
        Self {
            bounds,
            opacity: 1.0,
        }
    }
}

impl Lerp for TileStyle {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            bounds: self.bounds.lerp(&other.bounds, t),
            opacity: self.opacity.lerp(&other.opacity, t),
        }
    }
}

/// A tile image placed in a layer, holding a display reference to the cached
/// image. The cache stays the owner of the image data.
pub struct PositionedTile {
    coord: TileCoord,
    image: Arc<TileImage>,
    bounds: Bounds,
    opacity: f32,
    transition: Option<Transition<TileStyle>>,
}

impl PositionedTile {
    pub(crate) fn new(coord: TileCoord, image: Arc<TileImage>, bounds: Bounds) -> Self {
        Self {
            coord,
            image,
            bounds,
            opacity: 1.0,
            transition: None,
        }
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn image(&self) -> &Arc<TileImage> {
        &self.image
    }

    /// Whether the underlying image is ready to draw; hosts render a
    /// placeholder otherwise.
    pub fn is_ready(&self) -> bool {
        self.image.is_ready()
    }

    fn style(&self) -> TileStyle {
        TileStyle {
            bounds: self.bounds,
            opacity: self.opacity,
        }
    }

    /// Apply a style immediately, dropping any in-flight transition
    pub(crate) fn apply(&mut self, style: TileStyle) {
        self.bounds = style.bounds;
        self.opacity = style.opacity;
        self.transition = None;
    }

    /// Start a transition from the current style to `style`
    pub(crate) fn animate_to(&mut self, style: TileStyle, now: Instant, duration: Duration) {
        self.transition = Some(Transition::new(
            self.style(),
            style,
            now,
            duration,
            EasingType::EaseOut,
        ));
    }

    pub(crate) fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
    }

    /// Sample the in-flight transition, if any
    pub(crate) fn advance(&mut self, now: Instant) {
        if let Some(transition) = &self.transition {
            let (style, done) = transition.sample(now);
            self.bounds = style.bounds;
            self.opacity = style.opacity;
            if done {
                self.transition = None;
            }
        }
    }

    /// Cancel the in-flight transition by jumping to its target
    pub(crate) fn settle(&mut self) {
        if let Some(transition) = self.transition.take() {
            let style = *transition.target();
            self.bounds = style.bounds;
            self.opacity = style.opacity;
        }
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }
}

/// A screen layer holding the positioned tiles of one integer zoom level
pub struct TileLayer {
    zoom: u8,
    tiles: Vec<PositionedTile>,
}

impl TileLayer {
    pub fn new(zoom: u8) -> Self {
        Self {
            zoom,
            tiles: Vec::new(),
        }
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn tiles(&self) -> &[PositionedTile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        self.tiles.iter().any(|tile| tile.coord() == coord)
    }

    pub(crate) fn tiles_mut(&mut self) -> &mut Vec<PositionedTile> {
        &mut self.tiles
    }

    pub(crate) fn clear(&mut self) {
        self.tiles.clear();
    }

    /// Sample every tile's transition at `now`
    pub(crate) fn advance_animations(&mut self, now: Instant) {
        for tile in &mut self.tiles {
            tile.advance(now);
        }
    }

    /// Cancel every in-flight transition, snapping tiles to their targets
    pub(crate) fn settle_animations(&mut self) {
        for tile in &mut self.tiles {
            tile.settle();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(coord: TileCoord) -> PositionedTile {
        let image = TileImage::new(coord, "http://example/tile".into());
        PositionedTile::new(coord, image, Bounds::from_coords(0.0, 0.0, 256.0, 256.0))
    }

    #[test]
    fn test_layer_zoom_tag() {
        let layer = TileLayer::new(12);
        assert_eq!(layer.zoom(), 12);
        assert!(layer.is_empty());
    }

    #[test]
    fn test_tile_snap_and_animate() {
        let mut t = tile(TileCoord::new(0, 0, 5));
        let target = TileStyle::opaque(Bounds::from_coords(10.0, 10.0, 266.0, 266.0));

        t.apply(target);
        assert_eq!(t.bounds(), target.bounds);
        assert!(!t.is_animating());

        let now = Instant::now();
        let next = TileStyle::opaque(Bounds::from_coords(20.0, 20.0, 276.0, 276.0));
        t.animate_to(next, now, Duration::from_millis(100));
        assert!(t.is_animating());

        t.advance(now + Duration::from_millis(200));
        assert_eq!(t.bounds(), next.bounds);
        assert!(!t.is_animating());
    }

    #[test]
    fn test_settle_jumps_to_target() {
        let mut t = tile(TileCoord::new(0, 0, 5));
        t.set_opacity(0.0);
        let now = Instant::now();
        let target = TileStyle::opaque(Bounds::from_coords(5.0, 5.0, 261.0, 261.0));
        t.animate_to(target, now, Duration::from_millis(100));

        t.settle();
        assert_eq!(t.opacity(), 1.0);
        assert_eq!(t.bounds(), target.bounds);
        assert!(!t.is_animating());
    }
}
