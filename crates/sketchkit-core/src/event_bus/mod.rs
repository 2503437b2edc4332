//! # Event Bus Module
//!
//! Publish/subscribe notifications from the design controller to its host.
//!
//! ```rust,ignore
//! use sketchkit_core::event_bus::{DesignerEvent, EventBus, EventCategory, EventFilter};
//!
//! let bus = EventBus::new();
//! let sub = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Selection]),
//!     |event| tracing::info!("{}", event.description()),
//! );
//! bus.unsubscribe(sub);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
