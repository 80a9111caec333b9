pub mod cache;
pub mod fetch;
pub mod image;
pub mod source;

// Re-exports for convenience
pub use cache::TileCache;
pub use fetch::{HttpFetcher, TileFetcher};
pub use image::TileImage;
pub use source::{OpenStreetMapSource, TileSource};
