use crate::core::geo::TileCoord;
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Handle to a raster tile image.
///
/// The cache is the exclusive owner of the entry; layers and completion
/// barriers hold `Arc` references only for the duration of display. The
/// payload cell is write-once: a handle starts not-ready and becomes ready
/// exactly when the fetch worker delivers the bytes. A cancelled handle never
/// becomes ready, its in-flight fetch abandons the payload.
#[derive(Debug)]
pub struct TileImage {
    coord: TileCoord,
    url: String,
    data: OnceCell<Vec<u8>>,
    cancelled: AtomicBool,
}

impl TileImage {
    pub(crate) fn new(coord: TileCoord, url: String) -> Arc<Self> {
        Arc::new(Self {
            coord,
            url,
            data: OnceCell::new(),
            cancelled: AtomicBool::new(false),
        })
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether the image bytes have arrived. A failed fetch never reports ready.
    pub fn is_ready(&self) -> bool {
        self.data.get().is_some()
    }

    /// The raw image bytes, once ready. Decoding is the host's concern.
    pub fn data(&self) -> Option<&[u8]> {
        self.data.get().map(|bytes| bytes.as_slice())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Deliver fetched bytes. Returns false if the handle was cancelled or
    /// already fulfilled.
    pub(crate) fn fulfill(&self, bytes: Vec<u8>) -> bool {
        if self.is_cancelled() {
            return false;
        }
        self.data.set(bytes).is_ok()
    }

    /// Release the entry: any in-flight fetch abandons its payload.
    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}
