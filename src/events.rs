//! Notification dispatch for external controls.
//!
//! The engine queues events as it mutates and dispatches them once per tick;
//! listeners must not re-trigger the mutation they observe (a zoom slider
//! reacting to `ZoomChanged` has to guard against feeding the value back).

use crate::prelude::{HashMap, VecDeque};

/// Notifications emitted by the map engine
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Fired on every accepted `zoom()` call, including programmatic ones
    ZoomChanged { zoom: f64 },
}

impl MapEvent {
    fn event_type(&self) -> &'static str {
        match self {
            MapEvent::ZoomChanged { .. } => "zoomchanged",
        }
    }
}

/// Event listener callback type
pub type EventCallback = Box<dyn Fn(&MapEvent) + Send + Sync>;

/// Event management system for the map
#[derive(Default)]
pub struct EventManager {
    /// Event listeners by event type
    listeners: HashMap<String, Vec<EventCallback>>,
    /// Event queue for processing
    event_queue: VecDeque<MapEvent>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event listener
    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.listeners
            .entry(event_type.to_string())
            .or_default()
            .push(Box::new(callback));
    }

    /// Emit an event to the queue
    pub fn emit(&mut self, event: MapEvent) {
        self.event_queue.push_back(event);
    }

    /// Process all queued events
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        let events: Vec<_> = self.event_queue.drain(..).collect();

        for event in &events {
            if let Some(callbacks) = self.listeners.get(event.event_type()) {
                for callback in callbacks {
                    callback(event);
                }
            }
        }

        events
    }

    /// Get number of pending events
    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }
}
