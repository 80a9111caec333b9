//! Construction-time configuration for the map engine.

use crate::core::constants::TILE_SIZE;
use crate::tiles::source::{OpenStreetMapSource, TileSource};
use std::sync::Arc;
use std::time::Duration;

/// Geographic position owned by the map engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPosition {
    pub lat: f64,
    pub lng: f64,
    pub zoom: f64,
}

impl MapPosition {
    pub fn new(lat: f64, lng: f64, zoom: f64) -> Self {
        Self { lat, lng, zoom }
    }
}

/// Map engine settings, all overridable at construction
#[derive(Clone)]
pub struct MapConfig {
    /// Width and height of each tile in pixels
    pub tile_size: u32,
    /// Minimum zoom level
    pub min_zoom: f64,
    /// Maximum zoom level
    pub max_zoom: f64,
    /// Initial position: latitude, longitude, zoom
    pub position: MapPosition,
    /// Width (in pixels) of the zone outside the viewport where tiles are preloaded
    pub overflow: f64,
    /// Duration of tile/overlay transitions while zooming
    pub animation_duration: Duration,
    /// Maximum number of tiles kept in cache
    pub max_cached_tiles: usize,
    /// Constructor of tile URLs. Override to use another tile API
    pub source: Arc<dyn TileSource>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            min_zoom: 2.0,
            max_zoom: 18.0,
            position: MapPosition::new(47.233, -1.583, 10.0),
            overflow: 50.0,
            animation_duration: Duration::from_millis(100),
            max_cached_tiles: 500,
            source: Arc::new(OpenStreetMapSource::new()),
        }
    }
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zoom_limits(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    pub fn with_position(mut self, position: MapPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_overflow(mut self, overflow: f64) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration = duration;
        self
    }

    pub fn with_max_cached_tiles(mut self, max_cached_tiles: usize) -> Self {
        self.max_cached_tiles = max_cached_tiles;
        self
    }

    pub fn with_source(mut self, source: Arc<dyn TileSource>) -> Self {
        self.source = source;
        self
    }
}

impl std::fmt::Debug for MapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapConfig")
            .field("tile_size", &self.tile_size)
            .field("min_zoom", &self.min_zoom)
            .field("max_zoom", &self.max_zoom)
            .field("position", &self.position)
            .field("overflow", &self.overflow)
            .field("animation_duration", &self.animation_duration)
            .field("max_cached_tiles", &self.max_cached_tiles)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MapConfig::default();
        assert_eq!(config.tile_size, 256);
        assert_eq!(config.min_zoom, 2.0);
        assert_eq!(config.max_zoom, 18.0);
        assert_eq!(config.position, MapPosition::new(47.233, -1.583, 10.0));
        assert_eq!(config.overflow, 50.0);
        assert_eq!(config.max_cached_tiles, 500);
    }

    #[test]
    fn test_builder_overrides() {
        let config = MapConfig::new()
            .with_zoom_limits(1.0, 12.0)
            .with_tile_size(512)
            .with_max_cached_tiles(64);
        assert_eq!(config.min_zoom, 1.0);
        assert_eq!(config.max_zoom, 12.0);
        assert_eq!(config.tile_size, 512);
        assert_eq!(config.max_cached_tiles, 64);
    }
}
