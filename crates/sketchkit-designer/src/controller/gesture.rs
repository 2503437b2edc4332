use sketchkit_core::{DragPayload, ElementKey, Point, Region};

use crate::element::Depth;
use crate::handles::HandleSet;
use crate::serialization::ElementRecord;

/// What a press on an already selected element does if it ends as a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    None,
    /// Reduce the selection to this element.
    Exclusive(ElementKey),
    /// Remove this element from the selection.
    Deselect(ElementKey),
    /// Flip point-edit mode on this element.
    ToggleEditPoints(ElementKey),
}

/// Where the controller is within a pointer gesture.
#[derive(Debug, Clone, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Pressed on an element; not yet moved past the drag threshold.
    Selecting {
        start: Point,
        start_pixel: Point,
        click: ClickAction,
    },
    /// Dragging out a region on empty space, to select or to create.
    RubberBanding {
        start: Point,
        current: Point,
        create: Option<ElementRecord>,
    },
    Moving {
        start: Point,
    },
    Resizing {
        handles: HandleSet,
        handle: usize,
        start: Point,
        original: Region,
    },
    MovingPoint {
        handles: HandleSet,
        handle: usize,
        index: usize,
        depth: Depth,
    },
    /// External content is being dragged over the view.
    Dragging {
        payload: DragPayload,
    },
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            GestureState::Idle => "idle",
            GestureState::Selecting { .. } => "selecting",
            GestureState::RubberBanding { .. } => "rubber-banding",
            GestureState::Moving { .. } => "moving",
            GestureState::Resizing { .. } => "resizing",
            GestureState::MovingPoint { .. } => "moving-point",
            GestureState::Dragging { .. } => "dragging",
        }
    }

    /// The rubber band region, while one is being dragged.
    pub fn rubber_band(&self) -> Option<Region> {
        match self {
            GestureState::RubberBanding { start, current, .. } => {
                Some(Region::from_corners(*start, *current))
            }
            _ => None,
        }
    }
}
