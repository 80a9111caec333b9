//! The map engine: owner of position, zoom, and viewport.
//!
//! All mutation happens either synchronously in an input call or once per
//! frame tick. Mutators only flip the refresh flag; `tick` runs at most one
//! full refresh, which recomputes bounds, reconciles the two tile layers, and
//! repositions overlay objects atomically with respect to that tick.
//!
//! While zooming, two layers are kept: the current integer zoom streams in
//! new tiles while the previously displayed zoom is re-populated from cache
//! only, stacked beneath, so there is always imagery on screen. When the
//! current layer finishes loading, the previous layer lingers briefly so its
//! outgoing transitions can finish, then is removed.

use crate::{
    animation::{EasingType, Transition},
    core::{
        bounds::ViewBounds,
        config::{MapConfig, MapPosition},
        constants::{OVERLAY_MIN_ZOOM, PREVIOUS_LAYER_LINGER, WHEEL_ZOOM_DIVISOR},
        geo::{LatLng, Point},
        projection::Projection,
    },
    events::{EventManager, MapEvent},
    input::InputEvent,
    layers::{
        manager::{LayerManager, LoadBarrier, PopulatePass, ViewState},
        overlay::OverlayObject,
        tile::TileLayer,
    },
    tiles::{
        cache::TileCache,
        fetch::{HttpFetcher, TileFetcher},
    },
};
use std::sync::Arc;
use std::time::Instant;

/// Per-refresh configuration, reset once the refresh has run
#[derive(Debug, Clone, Copy, Default)]
struct RefreshConfig {
    pending: bool,
    animate: bool,
    zoom_direction: i8,
}

pub struct Map {
    config: MapConfig,
    projection: Projection,
    layer_manager: LayerManager,
    cache: TileCache,
    events: EventManager,
    position: MapPosition,
    size: Point,
    bounds: ViewBounds,
    current: Option<TileLayer>,
    previous: Option<TileLayer>,
    retiring: Option<(TileLayer, Instant)>,
    objects: Vec<Box<dyn OverlayObject>>,
    overlay_moves: Vec<(usize, Transition<Point>)>,
    refresh: RefreshConfig,
    /// Integer zoom displayed before the last `zoom()` call; the previous
    /// layer targets it during a transition
    previous_display_zoom: u8,
    barrier: Option<LoadBarrier>,
}

impl Map {
    /// Create an engine fetching tiles over HTTP
    pub fn new(config: MapConfig, size: Point) -> Self {
        let cache = TileCache::new(
            config.max_cached_tiles,
            config.source.clone(),
            Arc::new(HttpFetcher),
        );
        Self::build(config, size, cache)
    }

    /// Create an engine with a custom fetcher (e.g. a disk-backed one)
    pub fn with_fetcher(config: MapConfig, size: Point, fetcher: Arc<dyn TileFetcher>) -> Self {
        let cache = TileCache::new(config.max_cached_tiles, config.source.clone(), fetcher);
        Self::build(config, size, cache)
    }

    /// Create an engine whose fetches run synchronously, for deterministic tests
    pub fn for_testing(config: MapConfig, size: Point, fetcher: Arc<dyn TileFetcher>) -> Self {
        let cache = TileCache::new(config.max_cached_tiles, config.source.clone(), fetcher)
            .with_test_mode(true);
        Self::build(config, size, cache)
    }

    fn build(config: MapConfig, size: Point, cache: TileCache) -> Self {
        let position = MapPosition::new(
            LatLng::clamp_lat(config.position.lat),
            LatLng::wrap_lng(config.position.lng),
            config.position.zoom.clamp(config.min_zoom, config.max_zoom),
        );
        let layer_manager = LayerManager::new(config.tile_size, config.overflow);
        let previous_display_zoom = position.zoom.ceil().clamp(0.0, u8::MAX as f64) as u8;

        Self {
            config,
            projection: Projection::new(),
            layer_manager,
            cache,
            events: EventManager::new(),
            position,
            size,
            bounds: ViewBounds::default(),
            current: None,
            previous: None,
            retiring: None,
            objects: Vec::new(),
            overlay_moves: Vec::new(),
            // First tick populates the initial view
            refresh: RefreshConfig {
                pending: true,
                animate: false,
                zoom_direction: 0,
            },
            previous_display_zoom,
            barrier: None,
        }
    }

    /// Current geographic position and fractional zoom
    pub fn position(&self) -> MapPosition {
        self.position
    }

    /// Geographic boundaries of the displayed map, from the last refresh
    pub fn bounds(&self) -> ViewBounds {
        self.bounds
    }

    pub fn size(&self) -> Point {
        self.size
    }

    /// Resize the viewport; takes effect on the next tick
    pub fn set_size(&mut self, size: Point) {
        self.size = size;
        self.refresh.pending = true;
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Integer zoom of the layer currently displayed
    fn display_zoom(&self) -> u8 {
        self.position.zoom.ceil().clamp(0.0, u8::MAX as f64) as u8
    }

    /// Set new latitude, longitude (and optionally zoom) and refresh the map.
    ///
    /// Used for direct drag-driven panning: no notification is emitted and no
    /// animations are enabled, so the move feels immediate.
    pub fn set_position(&mut self, lat: f64, lng: f64, zoom: Option<f64>) {
        self.position.lat = LatLng::clamp_lat(lat);
        self.position.lng = LatLng::wrap_lng(lng);
        if let Some(zoom) = zoom {
            self.position.zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        }
        self.refresh.pending = true;
    }

    /// Change zoom and refresh the map.
    ///
    /// Clamps to the configured limits, enables animations for this refresh,
    /// and emits a `ZoomChanged` notification with the accepted value.
    pub fn zoom(&mut self, zoom: f64) {
        let zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        let delta = self.position.zoom - zoom;
        self.previous_display_zoom = self.display_zoom();
        self.position.zoom = zoom;
        self.refresh = RefreshConfig {
            pending: true,
            animate: true,
            zoom_direction: if delta > 0.0 {
                1
            } else if delta < 0.0 {
                -1
            } else {
                0
            },
        };
        self.events.emit(MapEvent::ZoomChanged { zoom });
    }

    /// Increase or decrease zoom by a step and refresh the map
    pub fn zoom_by_step(&mut self, step: f64) {
        self.zoom(self.position.zoom + step);
    }

    /// Translate a drag delta (pixels) into a pan at the displayed zoom
    pub fn pan(&mut self, delta: Point) {
        let zoom = self.display_zoom();
        let tile_size =
            self.config.tile_size as f64 * self.projection.scale(self.position.zoom, zoom);
        if !tile_size.is_finite() || tile_size <= 0.0 {
            return;
        }
        let tile_x = self.projection.lng_to_x(self.position.lng, zoom);
        let tile_y = self.projection.lat_to_y(self.position.lat, zoom);
        let lat = self.projection.y_to_lat(tile_y - delta.y / tile_size, zoom);
        let lng = self.projection.x_to_lng(tile_x - delta.x / tile_size, zoom);
        self.set_position(lat, lng, None);
    }

    /// Feed a host input event into the engine
    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Drag { delta } => self.pan(delta),
            InputEvent::Scroll { delta } => self.zoom_by_step(delta / WHEEL_ZOOM_DIVISOR),
        }
    }

    /// Add an object on the map; its placement is recomputed every refresh
    pub fn add_object(&mut self, object: Box<dyn OverlayObject>) {
        self.objects.push(object);
        self.refresh.pending = true;
    }

    /// Remove all objects, detaching any that are on screen
    pub fn clear_objects(&mut self) {
        for object in &mut self.objects {
            if object.is_attached() {
                object.detach();
            }
        }
        self.objects.clear();
        self.overlay_moves.clear();
    }

    pub fn objects(&self) -> &[Box<dyn OverlayObject>] {
        &self.objects
    }

    /// Register a listener for engine notifications (e.g. "zoomchanged")
    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.events.on(event_type, callback);
    }

    /// Dispatch queued notifications now instead of waiting for the next tick
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        self.events.process_events()
    }

    pub fn is_refresh_pending(&self) -> bool {
        self.refresh.pending
    }

    pub fn current_layer(&self) -> Option<&TileLayer> {
        self.current.as_ref()
    }

    pub fn previous_layer(&self) -> Option<&TileLayer> {
        self.previous.as_ref()
    }

    pub fn retiring_layer(&self) -> Option<&TileLayer> {
        self.retiring.as_ref().map(|(layer, _)| layer)
    }

    /// Whether a finished previous layer is waiting out its linger delay
    pub fn previous_removal_scheduled(&self) -> bool {
        self.retiring.is_some()
    }

    /// Layers in stacking order, bottom to top
    pub fn layers(&self) -> impl Iterator<Item = &TileLayer> {
        self.retiring
            .iter()
            .map(|(layer, _)| layer)
            .chain(self.previous.iter())
            .chain(self.current.iter())
    }

    /// Advance the engine by one frame
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Advance the engine by one frame with an explicit clock.
    ///
    /// Everything time-dependent (transitions, the previous layer's linger)
    /// is sampled against `now`, which keeps tests deterministic.
    pub fn tick_at(&mut self, now: Instant) {
        // Completed fetches fill their gaps on a subsequent refresh
        if !self.cache.poll_completed().is_empty() {
            self.refresh.pending = true;
        }

        // When the current layer finished loading, retire the previous one;
        // it lingers so its queued transitions can finish without a pop
        if self
            .barrier
            .as_ref()
            .map(|barrier| barrier.is_complete())
            .unwrap_or(false)
        {
            self.barrier = None;
            if let Some(layer) = self.previous.take() {
                log::debug!("retiring previous layer z{}", layer.zoom());
                self.retiring = Some((layer, now + PREVIOUS_LAYER_LINGER));
            }
        }

        if let Some((_, expires)) = &self.retiring {
            if now >= *expires {
                self.retiring = None;
            }
        }

        if self.refresh.pending {
            self.refresh_now(now);
        } else {
            self.advance_animations(now);
        }

        self.events.process_events();
    }

    /// Run a full refresh: bounds, both tile layers, overlays
    fn refresh_now(&mut self, now: Instant) {
        let z = self.display_zoom();
        let z2 = if self.refresh.zoom_direction != 0 {
            self.previous_display_zoom
        } else {
            z
        };
        log::debug!("refresh at z{} (previous z{})", z, z2);

        // Abort transitions from the previous refresh before restyling
        self.settle_animations();

        self.bounds = self.compute_bounds();

        // Re-tag the named layer slots against the new zoom pair; anything
        // matching neither is no longer useful
        let candidates = [self.current.take(), self.previous.take()];
        let mut current: Option<TileLayer> = None;
        let mut previous: Option<TileLayer> = None;
        for candidate in candidates {
            match candidate {
                Some(layer) if layer.zoom() == z && current.is_none() => current = Some(layer),
                Some(layer) if z2 != z && layer.zoom() == z2 && previous.is_none() => {
                    previous = Some(layer)
                }
                _ => {}
            }
        }
        let mut current = current.unwrap_or_else(|| TileLayer::new(z));

        let view = ViewState {
            center: LatLng::new(self.position.lat, self.position.lng),
            zoom: self.position.zoom,
            size: self.size,
        };
        let animate = self.refresh.animate;
        let duration = self.config.animation_duration;

        // The outgoing zoom only reuses what is already cached; it is about
        // to be discarded and must not trigger fetches
        if z2 != z {
            let mut layer = previous.unwrap_or_else(|| TileLayer::new(z2));
            let _ = self.layer_manager.populate(
                &mut layer,
                &view,
                &self.projection,
                &mut self.cache,
                PopulatePass {
                    cache_only: true,
                    animate,
                    duration,
                    now,
                },
            );
            self.previous = Some(layer);
        }

        let barrier = self.layer_manager.populate(
            &mut current,
            &view,
            &self.projection,
            &mut self.cache,
            PopulatePass {
                cache_only: false,
                animate,
                duration,
                now,
            },
        );
        self.current = Some(current);
        self.barrier = Some(barrier);

        self.place_objects(now);

        self.refresh = RefreshConfig::default();
    }

    /// Compute latitude and longitude boundaries of the displayed map.
    ///
    /// `lon_left` takes the longitude at the right screen edge (see
    /// [`ViewBounds`] for the orientation contract).
    fn compute_bounds(&self) -> ViewBounds {
        let zoom = self.display_zoom();
        let tile_size =
            self.config.tile_size as f64 * self.projection.scale(self.position.zoom, zoom);
        if !tile_size.is_finite() || tile_size <= 0.0 {
            return ViewBounds::default();
        }
        let center_x = self.projection.lng_to_x(self.position.lng, zoom);
        let center_y = self.projection.lat_to_y(self.position.lat, zoom);
        let half_w = self.size.x / 2.0 / tile_size;
        let half_h = self.size.y / 2.0 / tile_size;
        ViewBounds::new(
            self.projection.y_to_lat(center_y - half_h, zoom),
            self.projection.y_to_lat(center_y + half_h, zoom),
            self.projection.x_to_lng(center_x + half_w, zoom),
            self.projection.x_to_lng(center_x - half_w, zoom),
        )
    }

    /// Place every registered overlay object against the fresh bounds
    fn place_objects(&mut self, now: Instant) {
        let bounds = self.bounds;
        let size = self.size;
        let animate = self.refresh.animate;
        let duration = self.config.animation_duration;
        let visible_zoom = self.position.zoom >= OVERLAY_MIN_ZOOM;
        let lat_span = bounds.lat_span();
        let lon_span = bounds.lon_span();

        for (index, object) in self.objects.iter_mut().enumerate() {
            let anchor = object.lat_lng();
            let inside =
                visible_zoom && lat_span != 0.0 && lon_span != 0.0 && bounds.contains(&anchor);
            if inside {
                // x mirrors against lon_left, the eastern edge
                let target = Point::new(
                    size.x * (1.0 - (anchor.lng - bounds.lon_left) / lon_span),
                    size.y * (anchor.lat - bounds.lat_top) / lat_span,
                );
                if object.is_attached() && animate {
                    let from = object.screen_position().unwrap_or(target);
                    self.overlay_moves.push((
                        index,
                        Transition::new(from, target, now, duration, EasingType::EaseOut),
                    ));
                } else {
                    object.set_screen_position(target);
                }
                if !object.is_attached() {
                    object.attach();
                }
            } else if object.is_attached() {
                object.detach();
            }
        }
    }

    /// Sample every in-flight transition at `now`
    fn advance_animations(&mut self, now: Instant) {
        if let Some(layer) = &mut self.current {
            layer.advance_animations(now);
        }
        if let Some(layer) = &mut self.previous {
            layer.advance_animations(now);
        }
        if let Some((layer, _)) = &mut self.retiring {
            layer.advance_animations(now);
        }
        let objects = &mut self.objects;
        self.overlay_moves.retain_mut(|(index, transition)| {
            let (position, done) = transition.sample(now);
            if let Some(object) = objects.get_mut(*index) {
                object.set_screen_position(position);
            }
            !done
        });
    }

    /// Cancel every in-flight transition, snapping to targets
    fn settle_animations(&mut self) {
        if let Some(layer) = &mut self.current {
            layer.settle_animations();
        }
        if let Some(layer) = &mut self.previous {
            layer.settle_animations();
        }
        if let Some((layer, _)) = &mut self.retiring {
            layer.settle_animations();
        }
        for (index, transition) in self.overlay_moves.drain(..) {
            if let Some(object) = self.objects.get_mut(index) {
                object.set_screen_position(*transition.target());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct ReadyFetcher;

    impl TileFetcher for ReadyFetcher {
        fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
            Ok(vec![0])
        }
    }

    fn test_map(config: MapConfig) -> Map {
        Map::for_testing(config, Point::new(800.0, 600.0), Arc::new(ReadyFetcher))
    }

    #[test]
    fn test_zoom_clamps_to_limits() {
        let mut map = test_map(MapConfig::default());
        map.zoom(25.0);
        assert_eq!(map.position().zoom, 18.0);
        map.zoom(0.0);
        assert_eq!(map.position().zoom, 2.0);
        map.zoom(11.5);
        assert_eq!(map.position().zoom, 11.5);
    }

    #[test]
    fn test_initial_tick_builds_current_layer() {
        let mut map = test_map(MapConfig::default());
        assert!(map.is_refresh_pending());
        map.tick();
        assert!(!map.is_refresh_pending());

        let layer = map.current_layer().expect("current layer");
        assert_eq!(layer.zoom(), 10);
        assert!(!layer.is_empty());
        assert!(map.previous_layer().is_none());
    }

    #[test]
    fn test_zoom_emits_notification_and_set_position_does_not() {
        let mut map = test_map(MapConfig::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        map.on("zoomchanged", move |event| {
            if let MapEvent::ZoomChanged { zoom } = event {
                sink.lock().unwrap().push(*zoom);
            }
        });

        map.set_position(48.0, -1.0, Some(11.0));
        map.tick();
        assert!(seen.lock().unwrap().is_empty());

        map.zoom(12.0);
        map.tick();
        assert_eq!(*seen.lock().unwrap(), vec![12.0]);
    }

    #[test]
    fn test_pan_moves_position() {
        let mut map = test_map(MapConfig::default());
        map.tick();
        let before = map.position();

        map.handle_input(InputEvent::Drag {
            delta: Point::new(120.0, -80.0),
        });
        let after = map.position();
        assert!(after.lng < before.lng); // dragged content right, center moved west
        assert!(after.lat < before.lat);
        assert_eq!(after.zoom, before.zoom);
        assert!(map.is_refresh_pending());
    }

    #[test]
    fn test_scroll_zooms_by_fractional_step() {
        let mut map = test_map(MapConfig::default());
        map.handle_input(InputEvent::Scroll { delta: 3.0 });
        assert!((map.position().zoom - 10.3).abs() < 1e-9);
    }

    #[test]
    fn test_zero_size_viewport_degrades_gracefully() {
        let config = MapConfig::default();
        let mut map = Map::for_testing(config, Point::new(0.0, 0.0), Arc::new(ReadyFetcher));
        map.tick();
        let layer = map.current_layer().expect("current layer");
        assert!(layer.is_empty());
    }

    #[test]
    fn test_overlays_suppressed_below_min_zoom() {
        let config = MapConfig::default().with_position(MapPosition::new(47.233, -1.583, 9.0));
        let mut map = test_map(config);
        let marker = crate::layers::overlay::Marker::new(47.233, -1.583).unwrap();
        map.add_object(Box::new(marker));
        map.tick();
        assert!(!map.objects()[0].is_attached());

        map.zoom(10.0);
        map.tick();
        assert!(map.objects()[0].is_attached());
    }

    #[test]
    fn test_drag_during_transition_drops_previous_layer() {
        struct SlowFetcher(AtomicUsize);
        impl TileFetcher for SlowFetcher {
            fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
                // Never completes: keeps the current layer's barrier pending
                self.0.fetch_add(1, Ordering::Relaxed);
                Err("pending".into())
            }
        }

        let mut map = Map::for_testing(
            MapConfig::default(),
            Point::new(800.0, 600.0),
            Arc::new(SlowFetcher(AtomicUsize::new(0))),
        );
        map.tick();
        map.zoom(11.0);
        map.tick();
        assert!(map.previous_layer().is_some());

        // A drag refresh resets the zoom direction; the outgoing layer is no
        // longer useful and is dropped rather than retired
        map.set_position(47.0, -1.5, None);
        map.tick();
        assert!(map.previous_layer().is_none());
        assert!(!map.previous_removal_scheduled());
    }
}
