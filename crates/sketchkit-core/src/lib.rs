//! # SketchKit Core
//!
//! Core types shared by every SketchKit crate: the geometry value types,
//! element/model/controller identifiers, the error taxonomy and the
//! notification bus used to report model and selection changes to a host.

pub mod constants;
pub mod error;
pub mod event_bus;
pub mod geometry;
pub mod types;

pub use error::{Error, GeometryError, ModelError, ResourceError, Result};

pub use event_bus::{
    DesignerEvent, DiagnosticEvent, DragEvent, DragPayload, ElementEvent, EventBus,
    EventBusConfig, EventCategory, EventFilter, ModelEvent, SelectionEvent, SubscriptionId,
};

pub use geometry::{Point, Region, Size};

pub use types::{shared, ControllerId, ElementKey, ModelId, Shared};
