//! Event type definitions for the designer notification bus.
//!
//! Events are organised by category and are cloneable and serializable so a
//! host can log or replay them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::geometry::{Point, Region};
use crate::types::ElementKey;

/// Root event enum for all designer notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DesignerEvent {
    /// Model content and dirty state
    Model(ModelEvent),
    /// Selection changes
    Selection(SelectionEvent),
    /// Element geometry changes
    Element(ElementEvent),
    /// Drag and drop over the view or an element
    Drag(DragEvent),
    /// Degraded renders and failed operations
    Diagnostic(DiagnosticEvent),
}

impl DesignerEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            DesignerEvent::Model(_) => EventCategory::Model,
            DesignerEvent::Selection(_) => EventCategory::Selection,
            DesignerEvent::Element(_) => EventCategory::Element,
            DesignerEvent::Drag(_) => EventCategory::Drag,
            DesignerEvent::Diagnostic(_) => EventCategory::Diagnostic,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            DesignerEvent::Model(e) => e.description(),
            DesignerEvent::Selection(e) => e.description(),
            DesignerEvent::Element(e) => e.description(),
            DesignerEvent::Drag(e) => e.description(),
            DesignerEvent::Diagnostic(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Model content and dirty state.
    Model,
    /// Selection changes.
    Selection,
    /// Element geometry changes.
    Element,
    /// Drag and drop.
    Drag,
    /// Diagnostics.
    Diagnostic,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Model => write!(f, "Model"),
            EventCategory::Selection => write!(f, "Selection"),
            EventCategory::Element => write!(f, "Element"),
            EventCategory::Drag => write!(f, "Drag"),
            EventCategory::Diagnostic => write!(f, "Diagnostic"),
        }
    }
}

/// Model-level events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelEvent {
    /// The model's elements changed in a way the host should redraw or save.
    Updated,
    /// The dirty flag flipped.
    IsDirtyChanged {
        /// The new dirty state.
        dirty: bool,
    },
    /// An element was added to the model.
    ElementAdded {
        /// The added element.
        key: ElementKey,
    },
    /// An element was removed from the model.
    ElementRemoved {
        /// The removed element.
        key: ElementKey,
    },
}

impl ModelEvent {
    fn description(&self) -> String {
        match self {
            ModelEvent::Updated => "Model updated".to_string(),
            ModelEvent::IsDirtyChanged { dirty } => format!("Dirty state: {}", dirty),
            ModelEvent::ElementAdded { key } => format!("Element added: {}", key),
            ModelEvent::ElementRemoved { key } => format!("Element removed: {}", key),
        }
    }
}

/// Selection events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectionEvent {
    /// The set of selected elements changed.
    Changed {
        /// Selected elements in selection order.
        selected: Vec<ElementKey>,
    },
}

impl SelectionEvent {
    fn description(&self) -> String {
        match self {
            SelectionEvent::Changed { selected } => {
                format!("Selection changed ({} selected)", selected.len())
            }
        }
    }
}

/// Element geometry events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementEvent {
    /// Tentative move in progress.
    Moving {
        /// The element being moved.
        key: ElementKey,
        /// Tentative location.
        location: Point,
    },
    /// Move committed.
    Moved {
        /// The moved element.
        key: ElementKey,
        /// New location.
        location: Point,
    },
    /// Tentative resize in progress.
    Sizing {
        /// The element being resized.
        key: ElementKey,
        /// Tentative bounds.
        bounds: Region,
    },
    /// Resize committed.
    Sized {
        /// The resized element.
        key: ElementKey,
        /// New bounds.
        bounds: Region,
    },
}

impl ElementEvent {
    fn description(&self) -> String {
        match self {
            ElementEvent::Moving { key, location } => format!("{} moving to {}", key, location),
            ElementEvent::Moved { key, location } => format!("{} moved to {}", key, location),
            ElementEvent::Sizing { key, bounds } => format!("{} sizing to {}", key, bounds),
            ElementEvent::Sized { key, bounds } => format!("{} sized to {}", key, bounds),
        }
    }

    /// The element this event concerns
    pub fn key(&self) -> ElementKey {
        match self {
            ElementEvent::Moving { key, .. }
            | ElementEvent::Moved { key, .. }
            | ElementEvent::Sizing { key, .. }
            | ElementEvent::Sized { key, .. } => *key,
        }
    }
}

/// Content carried by a drag gesture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DragPayload {
    /// Files dropped from the host file manager.
    Files(Vec<PathBuf>),
    /// Plain text.
    Text(String),
    /// A resource key already known to the model.
    Resource(String),
}

/// Drag-and-drop events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DragEvent {
    /// A drag entered the view.
    ViewEnter {
        /// Dragged content.
        payload: DragPayload,
        /// Pointer position in model space.
        location: Point,
    },
    /// A drag moved over the view.
    ViewOver {
        /// Pointer position in model space.
        location: Point,
    },
    /// A drag left the view.
    ViewLeave,
    /// Content was dropped on the view.
    ViewDrop {
        /// Dropped content.
        payload: DragPayload,
        /// Pointer position in model space.
        location: Point,
    },
    /// A drag entered an element.
    ElementEnter {
        /// The element under the pointer.
        key: ElementKey,
    },
    /// A drag left an element.
    ElementLeave {
        /// The element the pointer left.
        key: ElementKey,
    },
    /// Content was dropped on an element.
    ElementDrop {
        /// The target element.
        key: ElementKey,
        /// Dropped content.
        payload: DragPayload,
    },
}

impl DragEvent {
    fn description(&self) -> String {
        match self {
            DragEvent::ViewEnter { location, .. } => format!("Drag entered view at {}", location),
            DragEvent::ViewOver { location } => format!("Drag over view at {}", location),
            DragEvent::ViewLeave => "Drag left view".to_string(),
            DragEvent::ViewDrop { location, .. } => format!("Dropped on view at {}", location),
            DragEvent::ElementEnter { key } => format!("Drag entered {}", key),
            DragEvent::ElementLeave { key } => format!("Drag left {}", key),
            DragEvent::ElementDrop { key, .. } => format!("Dropped on {}", key),
        }
    }
}

/// Diagnostic events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DiagnosticEvent {
    /// A fill referenced a resource that is not available; a placeholder was drawn.
    ResourceMissing {
        /// The referenced key.
        key: String,
    },
    /// A resource failed to load.
    ResourceLoadFailed {
        /// The resource key.
        key: String,
        /// The loader's reason.
        reason: String,
    },
    /// Interactive element creation was aborted.
    CreationFailed {
        /// The element type being created.
        element_type: String,
        /// Why creation failed.
        reason: String,
    },
}

impl DiagnosticEvent {
    fn description(&self) -> String {
        match self {
            DiagnosticEvent::ResourceMissing { key } => format!("Missing resource: {}", key),
            DiagnosticEvent::ResourceLoadFailed { key, reason } => {
                format!("Resource {} failed to load: {}", key, reason)
            }
            DiagnosticEvent::CreationFailed {
                element_type,
                reason,
            } => format!("Creating {} failed: {}", element_type, reason),
        }
    }
}
