use crate::core::geo::TileCoord;

/// Trait representing anything that can produce tile URLs for a given coordinate.
///
/// Implementations must be pure and fast: `url` is called synchronously for
/// every tile of every populate pass.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested `coord`.
    fn url(&self, coord: TileCoord) -> String;
}

/// Simple implementation that hits the default OpenStreetMap tile servers,
/// rotating between the public subdomains.
pub struct OpenStreetMapSource {
    subdomains: Vec<&'static str>,
}

impl OpenStreetMapSource {
    pub fn new() -> Self {
        Self {
            subdomains: vec!["a", "b", "c"],
        }
    }
}

impl Default for OpenStreetMapSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TileSource for OpenStreetMapSource {
    fn url(&self, coord: TileCoord) -> String {
        // Guard against empty subdomain list (should not happen, but be safe)
        if self.subdomains.is_empty() {
            return format!(
                "https://tile.openstreetmap.org/{}/{}/{}.png",
                coord.z, coord.x, coord.y
            );
        }

        // Deterministic rotation keyed by the tile, so the provider stays pure
        let idx = (coord.x + coord.y).rem_euclid(self.subdomains.len() as i32) as usize;
        let sub = self.subdomains[idx];
        format!(
            "https://{}.tile.openstreetmap.org/{}/{}/{}.png",
            sub, coord.z, coord.x, coord.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_shape() {
        let source = OpenStreetMapSource::new();
        let url = source.url(TileCoord::new(516, 364, 10));
        assert!(url.starts_with("https://"));
        assert!(url.ends_with(".tile.openstreetmap.org/10/516/364.png"));
    }

    #[test]
    fn test_rotation_is_deterministic() {
        let source = OpenStreetMapSource::new();
        let coord = TileCoord::new(3, 4, 7);
        assert_eq!(source.url(coord), source.url(coord));
    }

    #[test]
    fn test_rotation_handles_negative_coords() {
        let source = OpenStreetMapSource::new();
        // Must not panic on out-of-world coordinates
        let url = source.url(TileCoord::new(-2, -1, 3));
        assert!(url.contains("/3/-2/-1.png"));
    }
}
