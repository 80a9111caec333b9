use crate::core::geo::TileCoord;
use crate::tiles::image::TileImage;
use crate::Result;
use crossbeam_channel::Sender;
use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use std::sync::Arc;
use std::thread;

/// Shared blocking HTTP client with a custom User-Agent so that public tile
/// servers (e.g. OpenStreetMap) don't reject the request. Building the client
/// once avoids the cost of TLS and connection pool setup for every tile.
pub(crate) static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("slippy/0.1 (+https://github.com/PoHsuanLai/slippy)")
        .build()
        .expect("failed to build reqwest blocking client")
});

/// The narrow seam to the host's image-loading primitive: turn a tile URL
/// into raw raster bytes. Implementations are called from worker threads.
pub trait TileFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Default fetcher hitting the tile server over HTTP.
pub struct HttpFetcher;

impl TileFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let resp = HTTP_CLIENT.get(url).send()?;
        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()).into());
        }
        let bytes = resp.bytes()?;
        Ok(bytes.to_vec())
    }
}

const MAX_ATTEMPTS: usize = 2;

/// Start downloading the tile on a detached thread so that it does not block
/// the caller. On success the image handle is fulfilled and the coordinate is
/// reported over `done`, to be drained on a later tick.
pub(crate) fn spawn_fetch(
    image: Arc<TileImage>,
    fetcher: Arc<dyn TileFetcher>,
    done: Sender<TileCoord>,
) {
    thread::spawn(move || {
        fetch_into(&image, fetcher.as_ref(), &done, MAX_ATTEMPTS);
    });
}

/// Fetch loop shared by the background worker and the synchronous test mode.
pub(crate) fn fetch_into(
    image: &TileImage,
    fetcher: &dyn TileFetcher,
    done: &Sender<TileCoord>,
    attempts: usize,
) {
    let coord = image.coord();
    for attempt in 1..=attempts {
        if image.is_cancelled() {
            log::debug!("tile {:?} cancelled before fetch", coord);
            return;
        }
        log::debug!("fetch tile {:?} attempt {}", coord, attempt);
        match fetcher.fetch(image.url()) {
            Ok(data) => {
                log::info!("downloaded tile {:?} ({} bytes)", coord, data.len());
                if image.fulfill(data) {
                    let _ = done.send(coord);
                }
                return;
            }
            Err(e) => {
                log::warn!("tile {:?} download failed on attempt {}: {}", coord, attempt, e);
                if attempt == attempts {
                    log::error!("giving up on tile {:?}", coord);
                } else {
                    thread::sleep(std::time::Duration::from_millis(100));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    struct BytesFetcher(Vec<u8>);

    impl TileFetcher for BytesFetcher {
        fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    struct FailingFetcher;

    impl TileFetcher for FailingFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            Err(format!("unreachable: {}", url).into())
        }
    }

    #[test]
    fn test_fetch_fulfills_and_notifies() {
        let (tx, rx) = unbounded();
        let coord = TileCoord::new(5, 6, 7);
        let image = TileImage::new(coord, "http://example/tile".into());

        fetch_into(&image, &BytesFetcher(vec![42]), &tx, 1);

        assert!(image.is_ready());
        assert_eq!(rx.try_recv().unwrap(), coord);
    }

    #[test]
    fn test_failed_fetch_stays_not_ready() {
        let (tx, rx) = unbounded();
        let image = TileImage::new(TileCoord::new(0, 0, 1), "http://example/x".into());

        fetch_into(&image, &FailingFetcher, &tx, 1);

        assert!(!image.is_ready());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_cancelled_fetch_is_abandoned() {
        let (tx, rx) = unbounded();
        let image = TileImage::new(TileCoord::new(0, 0, 1), "http://example/y".into());
        image.cancel();

        fetch_into(&image, &BytesFetcher(vec![1]), &tx, 1);

        assert!(!image.is_ready());
        assert!(rx.try_recv().is_err());
    }
}
