//! # Slippy
//!
//! A slippy-map tile rendering core.
//!
//! Given a geographic center and zoom level, the engine determines which
//! square tile images are needed, fetches and caches them, positions them in
//! screen space, and animates smooth transitions when zoom or pan changes.
//! During a zoom transition two layers are kept alive: the target zoom's
//! layer streams in new tiles while the previous zoom's layer keeps the
//! display populated from already-cached imagery.
//!
//! View composition, image decoding, and the host application shell are
//! external collaborators reached through narrow interfaces
//! ([`tiles::source::TileSource`], [`tiles::fetch::TileFetcher`],
//! [`layers::overlay::OverlayObject`] and the engine's layer accessors).

pub mod animation;
pub mod core;
pub mod events;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod tiles;

pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    bounds::{Bounds, ViewBounds},
    config::{MapConfig, MapPosition},
    geo::{LatLng, Point, TileCoord},
    map::Map,
    projection::Projection,
};

pub use crate::layers::{
    manager::{LayerManager, LoadBarrier, ViewState},
    overlay::{Marker, OverlayObject},
    tile::TileLayer,
};

pub use crate::tiles::{
    cache::TileCache,
    fetch::{HttpFetcher, TileFetcher},
    source::{OpenStreetMapSource, TileSource},
};

pub use crate::events::{EventManager, MapEvent};
pub use crate::input::InputEvent;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),
}

/// Error type alias for convenience
pub type Error = MapError;
