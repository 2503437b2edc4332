//! Interaction constants shared by the designer and its settings defaults.

/// Squared pointer displacement a press must exceed before it becomes a move.
pub const DRAG_THRESHOLD_SQUARED: f64 = 8.0;

/// Default spacing between grid lines, in model units.
pub const DEFAULT_GRID_SPACING: f64 = 8.0;

/// Smallest width or height a resize gesture may produce.
pub const MIN_ELEMENT_SIZE: f64 = 2.0;

/// Keyboard nudge distance.
pub const NUDGE_SMALL: f64 = 1.0;

/// Keyboard nudge distance with Shift held.
pub const NUDGE_LARGE: f64 = 10.0;

/// Side length of a square handle, in host pixels.
pub const DEFAULT_HANDLE_SIZE: f64 = 8.0;

/// Offset applied to duplicated elements.
pub const DUPLICATE_OFFSET: f64 = 10.0;

/// Hit tolerance used for thin geometry such as lines and open polylines.
pub const HIT_TOLERANCE: f64 = 3.0;

/// Default animation tick interval in milliseconds.
pub const DEFAULT_TIMER_INTERVAL_MS: u64 = 50;

/// Flattening tolerance for bezier curves during hit testing.
pub const CURVE_TOLERANCE: f64 = 0.25;

/// Deepest chain of sub-models that is loaded or drawn.
pub const MAX_MODEL_NESTING: usize = 8;
