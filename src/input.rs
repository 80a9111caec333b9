use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Input events the map engine consumes.
///
/// Both are optional depending on host platform capability: a touch-only host
/// may never produce `Scroll`, a kiosk host may never produce `Drag`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Drag in progress, pixel delta since the last event
    Drag { delta: Point },
    /// Scroll wheel notch, translated to a fractional zoom step
    Scroll { delta: f64 },
}
