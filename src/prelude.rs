//! Prelude module for common slippy types and traits
//!
//! Re-exports the most commonly used types, traits, and functions for easy
//! importing with `use slippy::prelude::*;`

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
    tile::{PositionedTile, TileLayer},
};

pub use crate::tiles::{
    cache::TileCache,
    fetch::{HttpFetcher, TileFetcher},
    image::TileImage,
    source::{OpenStreetMapSource, TileSource},
};

pub use crate::animation::{EasingType, Lerp, Transition};
pub use crate::events::{EventManager, MapEvent};
pub use crate::input::InputEvent;

pub use crate::{Error as MapError, Result};

pub use std::{
    collections::VecDeque,
    sync::Arc,
    time::{Duration, Instant},
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
