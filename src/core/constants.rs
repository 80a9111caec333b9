//! Core constants derived from common web-map conventions.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

use std::time::Duration;

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Overlay objects are not placed at all below this zoom level.
pub const OVERLAY_MIN_ZOOM: f64 = 10.0;

/// How long a retired previous-zoom layer lingers after the current layer
/// finished loading, so queued fade/position transitions can finish.
pub const PREVIOUS_LAYER_LINGER: Duration = Duration::from_millis(500);

/// Wheel delta divisor converting a scroll notch into a fractional zoom step.
pub const WHEEL_ZOOM_DIVISOR: f64 = 10.0;

/// Marker icon default size in pixels.
pub const MARKER_ICON_SIZE: (f64, f64) = (32.0, 32.0);

/// Anchor offset inside the icon (hot-spot at the bottom-center tip).
pub const MARKER_ICON_ANCHOR: (f64, f64) = (-16.0, -32.0);
