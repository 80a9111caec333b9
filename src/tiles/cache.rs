use crate::core::geo::TileCoord;
use crate::prelude::HashMap;
use crate::tiles::fetch::{self, TileFetcher};
use crate::tiles::image::TileImage;
use crate::tiles::source::TileSource;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::VecDeque;
use std::sync::Arc;

/// In the not-ready sweep, this many of the most recent insertions are left
/// alone; anything older that still has no image is a speculative fetch
/// superseded by newer requests and gets reclaimed.
const RECLAIM_KEEP: usize = 50;

/// Keyed store of in-flight and loaded tile images with bounded size.
///
/// Entries are insertion-ordered and evicted FIFO, not LRU: a tile that is
/// re-requested while old keeps its original slot. Once evicted, a key is
/// never resurrected; the next `get` issues a fresh fetch. All mutation is
/// confined to the tick thread; fetch workers only fulfill image handles and
/// signal the completion channel drained by [`TileCache::poll_completed`].
pub struct TileCache {
    entries: HashMap<TileCoord, Arc<TileImage>>,
    order: VecDeque<TileCoord>,
    capacity: usize,
    source: Arc<dyn TileSource>,
    fetcher: Arc<dyn TileFetcher>,
    done_tx: Sender<TileCoord>,
    done_rx: Receiver<TileCoord>,
    test_mode: bool,
}

impl TileCache {
    /// Create a cache with the given capacity, URL source, and fetcher
    pub fn new(capacity: usize, source: Arc<dyn TileSource>, fetcher: Arc<dyn TileFetcher>) -> Self {
        let (done_tx, done_rx) = unbounded();
        Self {
            entries: HashMap::default(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            source,
            fetcher,
            done_tx,
            done_rx,
            test_mode: false,
        }
    }

    /// Fetch synchronously on the calling thread, for deterministic tests
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Look up or create the entry for `coord`.
    ///
    /// An existing entry is returned regardless of readiness. A miss with
    /// `cache_only` returns `None` and records nothing, so layers about to be
    /// discarded never trigger new fetches. Otherwise the entry is created,
    /// its fetch started, and the not-yet-ready handle returned immediately;
    /// the caller may render a placeholder until it loads.
    pub fn get(&mut self, coord: TileCoord, cache_only: bool) -> Option<Arc<TileImage>> {
        if let Some(image) = self.entries.get(&coord) {
            return Some(image.clone());
        }
        if cache_only {
            return None;
        }

        let image = TileImage::new(coord, self.source.url(coord));
        self.entries.insert(coord, image.clone());
        self.order.push_back(coord);

        if self.test_mode {
            fetch::fetch_into(&image, self.fetcher.as_ref(), &self.done_tx, 1);
        } else {
            fetch::spawn_fetch(image.clone(), self.fetcher.clone(), self.done_tx.clone());
        }

        self.reclaim();
        Some(image)
    }

    /// Two-stage reclamation, run after every insertion.
    fn reclaim(&mut self) {
        // Stage one: drop stale entries whose image never arrived. The newest
        // RECLAIM_KEEP insertions are exempt, their fetches are still wanted.
        if self.order.len() > RECLAIM_KEEP {
            let scan = self.order.len() - RECLAIM_KEEP;
            let entries = &mut self.entries;
            let mut index = 0;
            self.order.retain(|coord| {
                let keep = if index < scan {
                    match entries.get(coord) {
                        Some(image) if !image.is_ready() => {
                            log::debug!("reclaiming stale tile {:?}", coord);
                            image.cancel();
                            entries.remove(coord);
                            false
                        }
                        _ => true,
                    }
                } else {
                    true
                };
                index += 1;
                keep
            });
        }

        // Stage two: FIFO eviction down to capacity, oldest entry first.
        while self.order.len() > self.capacity {
            if let Some(coord) = self.order.pop_front() {
                if let Some(image) = self.entries.remove(&coord) {
                    image.cancel();
                }
            }
        }
    }

    /// Drain the coordinates whose fetches completed since the last call.
    /// The engine calls this once per tick to schedule a gap-filling refresh.
    pub fn poll_completed(&self) -> Vec<TileCoord> {
        self.done_rx.try_iter().collect()
    }

    /// Check if a tile is in the cache
    pub fn contains(&self, coord: &TileCoord) -> bool {
        self.entries.contains_key(coord)
    }

    /// Get the current number of cached tiles
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::source::OpenStreetMapSource;
    use crate::Result;

    struct ReadyFetcher;

    impl TileFetcher for ReadyFetcher {
        fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
            Ok(vec![0])
        }
    }

    struct NeverFetcher;

    impl TileFetcher for NeverFetcher {
        fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
            Err("no tiles today".into())
        }
    }

    fn ready_cache(capacity: usize) -> TileCache {
        TileCache::new(
            capacity,
            Arc::new(OpenStreetMapSource::new()),
            Arc::new(ReadyFetcher),
        )
        .with_test_mode(true)
    }

    #[test]
    fn test_hit_returns_same_entry() {
        let mut cache = ready_cache(10);
        let coord = TileCoord::new(1, 2, 3);
        let first = cache.get(coord, false).unwrap();
        let second = cache.get(coord, false).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_only_miss_records_nothing() {
        let mut cache = ready_cache(10);
        assert!(cache.get(TileCoord::new(1, 1, 1), true).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_only_hit_returns_entry() {
        let mut cache = ready_cache(10);
        let coord = TileCoord::new(1, 1, 1);
        cache.get(coord, false);
        assert!(cache.get(coord, true).is_some());
    }

    #[test]
    fn test_capacity_is_bounded() {
        let capacity = 8;
        let mut cache = ready_cache(capacity);
        for x in 0..40 {
            cache.get(TileCoord::new(x, 0, 5), false);
            assert!(cache.len() <= capacity);
        }
    }

    #[test]
    fn test_fifo_eviction_order() {
        let capacity = 5;
        let k = 3;
        let mut cache = ready_cache(capacity);
        for x in 0..(capacity + k) as i32 {
            cache.get(TileCoord::new(x, 0, 9), false);
        }
        // The k oldest-inserted keys are gone, the rest survive
        for x in 0..k as i32 {
            assert!(!cache.contains(&TileCoord::new(x, 0, 9)), "tile {} evicted", x);
        }
        for x in k as i32..(capacity + k) as i32 {
            assert!(cache.contains(&TileCoord::new(x, 0, 9)), "tile {} kept", x);
        }
    }

    #[test]
    fn test_evicted_key_is_fetched_anew() {
        let mut cache = ready_cache(2);
        let first = TileCoord::new(0, 0, 4);
        let old = cache.get(first, false).unwrap();
        cache.get(TileCoord::new(1, 0, 4), false);
        cache.get(TileCoord::new(2, 0, 4), false);
        assert!(!cache.contains(&first));
        assert!(old.is_cancelled());

        let renewed = cache.get(first, false).unwrap();
        assert!(!Arc::ptr_eq(&old, &renewed));
    }

    #[test]
    fn test_not_ready_sweep_skips_newest_insertions() {
        let mut cache = TileCache::new(
            500,
            Arc::new(OpenStreetMapSource::new()),
            Arc::new(NeverFetcher),
        )
        .with_test_mode(true);

        // Every fetch fails, so every entry stays not-ready; once the window
        // of protected insertions is exceeded, older entries get swept.
        for x in 0..(RECLAIM_KEEP + 20) as i32 {
            cache.get(TileCoord::new(x, 0, 11), false);
        }
        assert_eq!(cache.len(), RECLAIM_KEEP);
        assert!(!cache.contains(&TileCoord::new(0, 0, 11)));
        assert!(cache.contains(&TileCoord::new((RECLAIM_KEEP + 19) as i32, 0, 11)));
    }

    #[test]
    fn test_ready_entries_survive_the_sweep() {
        let mut cache = ready_cache(500);
        for x in 0..(RECLAIM_KEEP + 20) as i32 {
            cache.get(TileCoord::new(x, 0, 12), false);
        }
        // Everything loaded instantly, so nothing was speculative
        assert_eq!(cache.len(), RECLAIM_KEEP + 20);
    }

    #[test]
    fn test_completions_are_reported_once() {
        let mut cache = ready_cache(10);
        let coord = TileCoord::new(7, 7, 7);
        cache.get(coord, false);

        let completed = cache.poll_completed();
        assert_eq!(completed, vec![coord]);
        assert!(cache.poll_completed().is_empty());
    }
}
