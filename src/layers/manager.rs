//! Per-refresh layer reconciliation.
//!
//! Given the engine's center, fractional zoom, and viewport size, the manager
//! computes which tile keys a layer must show, keeps and repositions the
//! tiles already there, discards the ones that fell out of range, and creates
//! the missing ones from the cache. The geographic center is anchored to the
//! viewport's geometric center; an overflow margin preloads tiles just
//! outside the visible edge.

use crate::core::bounds::Bounds;
use crate::core::geo::{LatLng, Point, TileCoord};
use crate::core::projection::Projection;
use crate::layers::tile::{PositionedTile, TileLayer, TileStyle};
use crate::prelude::HashSet;
use crate::tiles::cache::TileCache;
use crate::tiles::image::TileImage;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Snapshot of the engine's view used for one populate pass
#[derive(Debug, Clone, Copy)]
pub struct ViewState {
    pub center: LatLng,
    pub zoom: f64,
    pub size: Point,
}

/// Options for one populate pass
#[derive(Debug, Clone, Copy)]
pub struct PopulatePass {
    /// Serve only already-cached tiles, never trigger fetches
    pub cache_only: bool,
    /// Animate repositioning and fade in new tiles
    pub animate: bool,
    /// Transition duration when animating
    pub duration: Duration,
    /// Clock for transition start times
    pub now: Instant,
}

/// Inclusive integer range of tiles that must be visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl TileRange {
    pub fn contains(&self, coord: TileCoord) -> bool {
        coord.x >= self.min_x
            && coord.x <= self.max_x
            && coord.y >= self.min_y
            && coord.y <= self.max_y
    }

    pub fn count(&self) -> usize {
        ((self.max_x - self.min_x + 1) * (self.max_y - self.min_y + 1)).max(0) as usize
    }
}

/// Counted completion join over the tiles newly created by a populate pass.
/// Tiles that were merely repositioned do not block it.
#[derive(Default)]
pub struct LoadBarrier {
    pending: Vec<Arc<TileImage>>,
}

impl LoadBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, image: Arc<TileImage>) {
        self.pending.push(image);
    }

    /// True once every joined tile reports loaded. A barrier over zero tiles
    /// is complete immediately; a barrier containing a failed fetch never
    /// completes (the tile never becomes ready).
    pub fn is_complete(&self) -> bool {
        self.pending.iter().all(|image| image.is_ready())
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Screen-space geometry of one layer's tile grid for the current view
struct Grid {
    tile_size: f64,
    origin: Point,
    range: TileRange,
}

impl Grid {
    fn rect(&self, coord: TileCoord) -> Bounds {
        let origin = Point::new(
            self.origin.x + (coord.x - self.range.min_x) as f64 * self.tile_size,
            self.origin.y + (coord.y - self.range.min_y) as f64 * self.tile_size,
        );
        Bounds::from_origin_and_square(origin, self.tile_size)
    }
}

/// Reconciles the tiles of a layer against the current view
pub struct LayerManager {
    tile_size: f64,
    overflow: f64,
}

impl LayerManager {
    pub fn new(tile_size: u32, overflow: f64) -> Self {
        Self {
            tile_size: tile_size as f64,
            overflow,
        }
    }

    /// The inclusive tile range a populate pass would cover, or `None` for a
    /// degenerate viewport
    pub fn tile_range(&self, view: &ViewState, zoom: u8, projection: &Projection) -> Option<TileRange> {
        self.grid(view, zoom, projection).map(|grid| grid.range)
    }

    fn grid(&self, view: &ViewState, zoom: u8, projection: &Projection) -> Option<Grid> {
        if view.size.x <= 0.0 || view.size.y <= 0.0 {
            return None;
        }
        // Tiles of another zoom level are drawn scaled to the current one
        let tile_size = self.tile_size * projection.scale(view.zoom, zoom);
        if !tile_size.is_finite() || tile_size <= 0.0 {
            return None;
        }

        let center_tile_x = projection.lng_to_x(view.center.lng, zoom);
        let center_tile_y = projection.lat_to_y(view.center.lat, zoom);
        let center_floor_x = center_tile_x.floor();
        let center_floor_y = center_tile_y.floor();

        // Screen position of the center tile's top-left corner, anchored so
        // the geographic center lands mid-viewport
        let center_x = view.size.x / 2.0 - (center_tile_x - center_floor_x) * tile_size;
        let center_y = view.size.y / 2.0 - (center_tile_y - center_floor_y) * tile_size;

        let n_tiles_left = ((self.overflow + center_x) / tile_size).ceil();
        let n_tiles_top = ((self.overflow + center_y) / tile_size).ceil();

        let origin = Point::new(
            center_x - n_tiles_left * tile_size,
            center_y - n_tiles_top * tile_size,
        );
        let range = TileRange {
            min_x: center_floor_x as i32 - n_tiles_left as i32,
            max_x: center_floor_x as i32
                + ((view.size.x + self.overflow - center_x) / tile_size - 1.0).ceil() as i32,
            min_y: center_floor_y as i32 - n_tiles_top as i32,
            max_y: center_floor_y as i32
                + ((view.size.y + self.overflow - center_y) / tile_size - 1.0).ceil() as i32,
        };

        Some(Grid {
            tile_size,
            origin,
            range,
        })
    }

    /// Reconcile `layer` against the view.
    ///
    /// Existing in-range tiles are repositioned and kept; out-of-range tiles
    /// are removed immediately (only the cache retains their image data).
    /// Missing keys are requested from the cache; a key the cache cannot
    /// serve leaves a gap until a later refresh. Returns the completion
    /// barrier over the tiles created by this pass.
    pub fn populate(
        &self,
        layer: &mut TileLayer,
        view: &ViewState,
        projection: &Projection,
        cache: &mut TileCache,
        pass: PopulatePass,
    ) -> LoadBarrier {
        let zoom = layer.zoom();
        let mut barrier = LoadBarrier::new();

        let grid = match self.grid(view, zoom, projection) {
            Some(grid) => grid,
            None => {
                // Degenerate viewport: degrade to an empty layer, never fail the tick
                layer.clear();
                return barrier;
            }
        };

        let mut configured: HashSet<TileCoord> = HashSet::default();

        layer.tiles_mut().retain_mut(|tile| {
            if !grid.range.contains(tile.coord()) {
                return false;
            }
            let style = TileStyle::opaque(grid.rect(tile.coord()));
            if pass.animate {
                tile.animate_to(style, pass.now, pass.duration);
            } else {
                tile.apply(style);
            }
            configured.insert(tile.coord());
            true
        });

        for tile_x in grid.range.min_x..=grid.range.max_x {
            for tile_y in grid.range.min_y..=grid.range.max_y {
                let coord = TileCoord::new(tile_x, tile_y, zoom);
                if configured.contains(&coord) {
                    continue;
                }
                let image = match cache.get(coord, pass.cache_only) {
                    Some(image) => image,
                    None => continue,
                };
                let style = TileStyle::opaque(grid.rect(coord));
                let mut tile = PositionedTile::new(coord, image.clone(), style.bounds);
                if pass.animate {
                    // New tiles appear in place and fade in
                    tile.set_opacity(0.0);
                    tile.animate_to(style, pass.now, pass.duration);
                }
                barrier.push(image);
                layer.tiles_mut().push(tile);
            }
        }

        barrier
    }
}
