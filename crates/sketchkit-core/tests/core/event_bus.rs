use parking_lot::Mutex;
use sketchkit_core::{
    DesignerEvent, ElementEvent, ElementKey, EventBus, EventBusConfig, EventCategory, EventFilter,
    ModelEvent, Point,
};
use std::sync::Arc;

#[test]
fn test_delivery_order_follows_subscription_order() {
    let bus = EventBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    for tag in ["first", "second", "third"] {
        let log = log.clone();
        bus.subscribe(EventFilter::All, move |_| log.lock().push(tag));
    }

    bus.publish(DesignerEvent::Model(ModelEvent::Updated));
    assert_eq!(*log.lock(), vec!["first", "second", "third"]);
}

#[test]
fn test_history_keeps_publication_order() {
    let bus = EventBus::with_config(EventBusConfig {
        enable_history: true,
        ..Default::default()
    });
    let key = ElementKey::new();

    bus.publish(DesignerEvent::Element(ElementEvent::Moved {
        key,
        location: Point::new(1.0, 2.0),
    }));
    bus.publish(DesignerEvent::Model(ModelEvent::Updated));

    let history = bus.history(None);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].category(), EventCategory::Element);
    assert_eq!(history[1].category(), EventCategory::Model);
}

#[test]
fn test_history_disabled_by_default() {
    let bus = EventBus::new();
    bus.publish(DesignerEvent::Model(ModelEvent::Updated));
    assert!(bus.history(None).is_empty());
}
