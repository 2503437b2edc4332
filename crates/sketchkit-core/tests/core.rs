#[path = "core/event_bus.rs"]
mod event_bus;
#[path = "core/geometry.rs"]
mod geometry;
