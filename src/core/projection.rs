//! Spherical Web Mercator conversions between geographic coordinates and
//! fractional tile coordinates.
//!
//! The conversions are pure; the only state is a read-mostly memo of integer
//! powers of two, recomputed on every tile of every frame otherwise. The
//! cache is owned by the instance so independent map engines stay isolated.

use fxhash::FxHashMap;
use std::f64::consts::PI;
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct Projection {
    pow2_cache: RwLock<FxHashMap<i32, f64>>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    /// `2^exp`, memoized for integer exponents
    pub fn pow2(&self, exp: f64) -> f64 {
        if exp.fract() == 0.0 && exp.abs() <= 1023.0 {
            let key = exp as i32;
            if let Ok(cache) = self.pow2_cache.read() {
                if let Some(value) = cache.get(&key) {
                    return *value;
                }
            }
            let value = 2_f64.powi(key);
            if let Ok(mut cache) = self.pow2_cache.write() {
                cache.insert(key, value);
            }
            return value;
        }
        2_f64.powf(exp)
    }

    /// Converts longitude to a fractional tile x coordinate
    pub fn lng_to_x(&self, lng: f64, zoom: u8) -> f64 {
        self.pow2(zoom as f64) * (lng + 180.0) / 360.0
    }

    /// Converts latitude to a fractional tile y coordinate
    pub fn lat_to_y(&self, lat: f64, zoom: u8) -> f64 {
        let rad = lat * PI / 180.0;
        self.pow2(zoom as f64) * (1.0 - ((rad.tan() + 1.0 / rad.cos()).ln()) / PI) / 2.0
    }

    /// Converts a fractional tile x coordinate back to longitude
    pub fn x_to_lng(&self, x: f64, zoom: u8) -> f64 {
        x / self.pow2(zoom as f64) * 360.0 - 180.0
    }

    /// Converts a fractional tile y coordinate back to latitude
    pub fn y_to_lat(&self, y: f64, zoom: u8) -> f64 {
        let n = PI - 2.0 * PI * y / self.pow2(zoom as f64);
        n.sinh().atan().to_degrees()
    }

    /// Scale factor of a layer's tiles relative to the current fractional zoom:
    /// `2^current_zoom / 2^layer_zoom` (1.0 when the layer matches the zoom)
    pub fn scale(&self, current_zoom: f64, layer_zoom: u8) -> f64 {
        self.pow2(current_zoom) / self.pow2(layer_zoom as f64)
    }
}
