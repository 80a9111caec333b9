pub mod manager;
pub mod overlay;
pub mod tile;

// Re-exports for convenience
pub use manager::{LayerManager, LoadBarrier, ViewState};
pub use overlay::{Marker, OverlayObject};
pub use tile::{PositionedTile, TileLayer};
