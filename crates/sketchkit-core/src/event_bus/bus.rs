//! Event Bus implementation.
//!
//! Each design controller owns one [`EventBus`]; hosts subscribe to it for
//! model, selection and diagnostic notifications. There is no process-wide
//! instance.

use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{DesignerEvent, EventCategory};

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

/// Filter to receive only specific event types
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    /// Receive all events.
    #[default]
    All,
    /// Receive events matching any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    /// Check if an event matches this filter
    pub fn matches(&self, event: &DesignerEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type EventHandler = Arc<dyn Fn(&DesignerEvent) + Send + Sync>;

/// Configuration for the event bus
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Channel capacity for broadcast.
    pub channel_capacity: usize,
    /// Whether to keep event history.
    pub enable_history: bool,
    /// Maximum number of events to retain in history.
    pub max_history_size: usize,
    /// How long to retain events in history.
    pub history_retention: Duration,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            enable_history: false,
            max_history_size: 500,
            history_retention: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone)]
struct TimestampedEvent {
    event: DesignerEvent,
    timestamp: Instant,
}

/// Synchronous fan-out of designer notifications
///
/// Subscribers are kept in registration order. Publishing iterates over a
/// snapshot of the subscriber list, so a handler may subscribe or unsubscribe
/// while an event is being delivered; the change applies from the next event.
pub struct EventBus {
    sender: broadcast::Sender<DesignerEvent>,
    handlers: RwLock<Vec<(SubscriptionId, EventFilter, EventHandler)>>,
    history: RwLock<VecDeque<TimestampedEvent>>,
    config: EventBusConfig,
}

impl EventBus {
    /// Create a new event bus with default configuration
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    /// Create a new event bus with custom configuration
    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            handlers: RwLock::new(Vec::new()),
            history: RwLock::new(VecDeque::new()),
            config,
        }
    }

    /// Publish an event to all matching subscribers
    ///
    /// Returns the number of handlers and channel receivers that saw the event.
    pub fn publish(&self, event: DesignerEvent) -> usize {
        if self.config.enable_history {
            self.add_to_history(&event);
        }
        tracing::trace!("publish: {}", event.description());

        let snapshot: Vec<EventHandler> = self
            .handlers
            .read()
            .iter()
            .filter(|(_, filter, _)| filter.matches(&event))
            .map(|(_, _, handler)| Arc::clone(handler))
            .collect();

        for handler in &snapshot {
            handler(&event);
        }

        let receivers = self.sender.send(event).unwrap_or(0);
        snapshot.len() + receivers
    }

    /// Subscribe to events with a synchronous handler
    ///
    /// The handler runs on the publishing thread, inside the controller's
    /// event callback.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(&DesignerEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers.write().push((id, filter, Arc::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Get a receiver for manual event polling
    pub fn receiver(&self) -> broadcast::Receiver<DesignerEvent> {
        self.sender.subscribe()
    }

    /// Unsubscribe from events
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(sub, _, _)| *sub != id);
        let removed = handlers.len() != before;
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    /// Get the number of active subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Get recent event history (if enabled)
    pub fn history(&self, since: Option<Instant>) -> Vec<DesignerEvent> {
        if !self.config.enable_history {
            return Vec::new();
        }

        let history = self.history.read();
        match since {
            Some(since) => history
                .iter()
                .filter(|e| e.timestamp >= since)
                .map(|e| e.event.clone())
                .collect(),
            None => history.iter().map(|e| e.event.clone()).collect(),
        }
    }

    /// Clear event history
    pub fn clear_history(&self) {
        self.history.write().clear();
    }

    /// Get the current configuration
    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    fn add_to_history(&self, event: &DesignerEvent) {
        let mut history = self.history.write();
        let now = Instant::now();

        history.push_back(TimestampedEvent {
            event: event.clone(),
            timestamp: now,
        });

        let retention = self.config.history_retention;
        while history
            .front()
            .is_some_and(|e| now.duration_since(e.timestamp) > retention)
        {
            history.pop_front();
        }

        while history.len() > self.config.max_history_size {
            history.pop_front();
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::events::{ModelEvent, SelectionEvent};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_event_bus_creation() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let bus = EventBus::new();

        let id = bus.subscribe(EventFilter::All, |_| {});
        assert_eq!(bus.subscriber_count(), 1);

        assert!(bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(), 0);

        // Double unsubscribe should return false
        assert!(!bus.unsubscribe(id));
    }

    #[test]
    fn test_event_delivery() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        bus.subscribe(EventFilter::All, move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(bus.publish(DesignerEvent::Model(ModelEvent::Updated)), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_event_filtering() {
        let bus = EventBus::new();
        let model_count = Arc::new(AtomicUsize::new(0));
        let selection_count = Arc::new(AtomicUsize::new(0));

        let mc = model_count.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Model]),
            move |_| {
                mc.fetch_add(1, Ordering::SeqCst);
            },
        );

        let sc = selection_count.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Selection]),
            move |_| {
                sc.fetch_add(1, Ordering::SeqCst);
            },
        );

        bus.publish(DesignerEvent::Model(ModelEvent::Updated));
        bus.publish(DesignerEvent::Model(ModelEvent::IsDirtyChanged { dirty: true }));
        bus.publish(DesignerEvent::Selection(SelectionEvent::Changed {
            selected: Vec::new(),
        }));

        assert_eq!(model_count.load(Ordering::SeqCst), 2);
        assert_eq!(selection_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_during_dispatch() {
        let bus = Arc::new(EventBus::new());
        let counter = Arc::new(AtomicUsize::new(0));
        let slot: Arc<parking_lot::Mutex<Option<SubscriptionId>>> =
            Arc::new(parking_lot::Mutex::new(None));

        let bus_for_handler = Arc::downgrade(&bus);
        let slot_for_handler = slot.clone();
        let c = counter.clone();
        let id = bus.subscribe(EventFilter::All, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            if let (Some(bus), Some(id)) = (bus_for_handler.upgrade(), *slot_for_handler.lock()) {
                bus.unsubscribe(id);
            }
        });
        *slot.lock() = Some(id);

        bus.publish(DesignerEvent::Model(ModelEvent::Updated));
        bus.publish(DesignerEvent::Model(ModelEvent::Updated));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_subscribe_during_dispatch_applies_next_event() {
        let bus = Arc::new(EventBus::new());
        let late = Arc::new(AtomicUsize::new(0));

        let weak = Arc::downgrade(&bus);
        let late_clone = late.clone();
        let added = Arc::new(AtomicUsize::new(0));
        let added_clone = added.clone();
        bus.subscribe(EventFilter::All, move |_| {
            if added_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                if let Some(bus) = weak.upgrade() {
                    let l = late_clone.clone();
                    bus.subscribe(EventFilter::All, move |_| {
                        l.fetch_add(1, Ordering::SeqCst);
                    });
                }
            }
        });

        bus.publish(DesignerEvent::Model(ModelEvent::Updated));
        assert_eq!(late.load(Ordering::SeqCst), 0);
        bus.publish(DesignerEvent::Model(ModelEvent::Updated));
        assert_eq!(late.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_history_max_size() {
        let config = EventBusConfig {
            enable_history: true,
            max_history_size: 5,
            ..Default::default()
        };
        let bus = EventBus::with_config(config);

        for i in 0..10 {
            bus.publish(DesignerEvent::Model(ModelEvent::IsDirtyChanged {
                dirty: i % 2 == 0,
            }));
        }

        assert_eq!(bus.history(None).len(), 5);
        bus.clear_history();
        assert!(bus.history(None).is_empty());
    }

    #[tokio::test]
    async fn test_async_receiver() {
        let bus = EventBus::new();
        let mut receiver = bus.receiver();

        bus.publish(DesignerEvent::Model(ModelEvent::Updated));

        let received = receiver.try_recv();
        assert!(matches!(received, Ok(DesignerEvent::Model(ModelEvent::Updated))));
    }
}
