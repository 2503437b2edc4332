//! Interactive design controller.
//!
//! The host feeds pointer, keyboard and drag events in pixel coordinates;
//! the controller maps them through its [`Viewport`], consults the model and
//! the handle factory, and keeps move, resize and point edits as tentative
//! state until the gesture commits on pointer-up. Notifications go out on the
//! [`EventBus`] after the model borrow is released, so subscribers may read
//! the model from inside their handlers.

mod capture;
mod editing;
mod gesture;
mod input;
mod rendering;

pub use capture::PointerCapture;
pub use gesture::{ClickAction, GestureState};
pub use input::{Key, KeyEvent, Modifiers, MouseButton, PointerEvent};

use sketchkit_core::{
    ControllerId, DesignerEvent, ElementKey, EventBus, ModelError, ModelEvent, Point, Region,
    SelectionEvent, Shared,
};
use sketchkit_settings::DesignerSettings;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::commands::CommandRouter;
use crate::element::Depth;
use crate::factory::ElementFactory;
use crate::handles::{HandleFactory, HandleSet, ResizeDirection};
use crate::model::Model;
use crate::serialization::ElementRecord;
use crate::timer::AnimationTimer;
use crate::viewport::Viewport;

/// Pointer shapes a host may show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Default,
    Pointer,
    Move,
    Resize(ResizeDirection),
    Crosshair,
    Copy,
}

/// The drawing surface a controller is bound to.
pub trait HostSurface {
    /// Requests a redraw.
    fn invalidate(&self);

    fn set_cursor(&self, _cursor: Cursor) {}
}

/// A point edit that has not been committed yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TentativePoint {
    pub element: ElementKey,
    pub index: usize,
    pub depth: Depth,
    /// In the element's untransformed space.
    pub location: Point,
}

pub struct DesignController {
    id: ControllerId,
    model: Option<Shared<Model>>,
    settings: DesignerSettings,
    bus: Arc<EventBus>,
    factory: Rc<ElementFactory>,
    router: Rc<CommandRouter>,
    viewport: Viewport,
    target: Option<Box<dyn HostSurface>>,
    capture: PointerCapture,
    enabled: bool,
    disabled_fill: Option<String>,

    selection: Vec<ElementKey>,
    mouse_over: Option<ElementKey>,
    drag_over: Option<ElementKey>,
    pressed: Option<ElementKey>,
    gesture: GestureState,
    tentative_moves: HashMap<ElementKey, Point>,
    tentative_bounds: HashMap<ElementKey, Region>,
    tentative_point: Option<TentativePoint>,

    point_depth: Depth,
    creation_tool: Option<ElementRecord>,
    timer: AnimationTimer,
}

impl std::fmt::Debug for DesignController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesignController")
            .field("id", &self.id)
            .field("enabled", &self.enabled)
            .field("gesture", &self.gesture.name())
            .field("selection", &self.selection)
            .finish()
    }
}

impl DesignController {
    /// A controller with the built-in element types and commands.
    pub fn new(settings: DesignerSettings, bus: Arc<EventBus>) -> Self {
        let interval = Duration::from_millis(settings.animation.timer_interval_ms);
        Self {
            id: ControllerId::new(),
            model: None,
            settings,
            bus,
            factory: Rc::new(ElementFactory::with_builtins()),
            router: Rc::new(CommandRouter::with_builtins()),
            viewport: Viewport::default(),
            target: None,
            capture: PointerCapture::new(),
            enabled: true,
            disabled_fill: None,
            selection: Vec::new(),
            mouse_over: None,
            drag_over: None,
            pressed: None,
            gesture: GestureState::Idle,
            tentative_moves: HashMap::new(),
            tentative_bounds: HashMap::new(),
            tentative_point: None,
            point_depth: Depth::Simple,
            creation_tool: None,
            timer: AnimationTimer::new(interval),
        }
    }

    pub fn with_factory(mut self, factory: Rc<ElementFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_router(mut self, router: Rc<CommandRouter>) -> Self {
        self.router = router;
        self
    }

    /// Shares a capture slot with other controllers of the same host.
    pub fn with_capture(mut self, capture: PointerCapture) -> Self {
        self.capture = capture;
        self
    }

    // Accessors

    pub fn id(&self) -> ControllerId {
        self.id
    }

    pub fn model(&self) -> Option<&Shared<Model>> {
        self.model.as_ref()
    }

    pub fn settings(&self) -> &DesignerSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut DesignerSettings {
        &mut self.settings
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn factory(&self) -> &Rc<ElementFactory> {
        &self.factory
    }

    pub fn router(&self) -> &Rc<CommandRouter> {
        &self.router
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn capture(&self) -> &PointerCapture {
        &self.capture
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn selection(&self) -> &[ElementKey] {
        &self.selection
    }

    pub fn is_selected(&self, key: ElementKey) -> bool {
        self.selection.contains(&key)
    }

    pub fn mouse_over(&self) -> Option<ElementKey> {
        self.mouse_over
    }

    pub fn drag_target(&self) -> Option<ElementKey> {
        self.drag_over
    }

    pub fn pressed(&self) -> Option<ElementKey> {
        self.pressed
    }

    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    pub fn tentative_location(&self, key: ElementKey) -> Option<Point> {
        self.tentative_moves.get(&key).copied()
    }

    pub fn tentative_bounds(&self, key: ElementKey) -> Option<Region> {
        self.tentative_bounds.get(&key).copied()
    }

    pub fn tentative_point(&self) -> Option<TentativePoint> {
        self.tentative_point
    }

    pub fn point_depth(&self) -> Depth {
        self.point_depth
    }

    /// The depth point handles use: Full only applies to a single selection.
    pub fn effective_depth(&self) -> Depth {
        if self.selection.len() == 1 {
            self.point_depth
        } else {
            Depth::Simple
        }
    }

    // Host binding

    pub fn bind_target(&mut self, target: Box<dyn HostSurface>) {
        self.target = Some(target);
        self.invalidate();
    }

    pub fn unbind_target(&mut self) -> Option<Box<dyn HostSurface>> {
        self.timer.stop();
        self.target.take()
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    pub(crate) fn invalidate(&self) {
        if let Some(target) = &self.target {
            target.invalidate();
        }
    }

    pub(crate) fn set_cursor(&self, cursor: Cursor) {
        if let Some(target) = &self.target {
            target.set_cursor(cursor);
        }
    }

    // Internals shared by the input and editing halves

    pub(crate) fn require_model(&self) -> Result<Shared<Model>, ModelError> {
        self.model.clone().ok_or_else(|| ModelError::MissingTarget {
            what: "model".to_string(),
        })
    }

    pub(crate) fn publish_all(&self, events: Vec<DesignerEvent>) {
        for event in events {
            self.bus.publish(event);
        }
    }

    /// Handle factory sized so handles keep their pixel size at any zoom.
    pub(crate) fn handle_factory(&self) -> HandleFactory {
        HandleFactory::new(
            self.viewport
                .pixels_to_model(self.settings.editing.handle_size),
        )
    }

    /// Handle sets of the selected elements, in selection order.
    pub fn selected_handles(&self, model: &Model) -> Vec<HandleSet> {
        let factory = self.handle_factory();
        let depth = self.effective_depth();
        self.selection
            .iter()
            .filter_map(|key| model.get(*key))
            .map(|el| factory.handles_for(el, depth))
            .collect()
    }

    /// Replaces the selection, queueing a change notification if it differs.
    pub(crate) fn replace_selection(
        &mut self,
        selection: Vec<ElementKey>,
        events: &mut Vec<DesignerEvent>,
    ) {
        if selection == self.selection {
            return;
        }
        self.selection = selection;
        debug!("Selection now {} element(s)", self.selection.len());
        events.push(DesignerEvent::Selection(SelectionEvent::Changed {
            selected: self.selection.clone(),
        }));
    }

    /// Queues the aggregate notifications that follow a committed edit:
    /// model-updated, then dirty-changed if the flag flipped.
    pub(crate) fn mark_updated(&self, model: &mut Model, events: &mut Vec<DesignerEvent>) {
        events.push(DesignerEvent::Model(ModelEvent::Updated));
        if model.set_dirty(true) {
            events.push(DesignerEvent::Model(ModelEvent::IsDirtyChanged { dirty: true }));
        }
    }

    /// Drops every reference the controller holds to `key`.
    pub(crate) fn forget_element(&mut self, key: ElementKey, events: &mut Vec<DesignerEvent>) {
        if self.selection.contains(&key) {
            let remaining = self.selection.iter().copied().filter(|k| *k != key).collect();
            self.replace_selection(remaining, events);
        }
        if self.mouse_over == Some(key) {
            self.mouse_over = None;
        }
        if self.drag_over == Some(key) {
            self.drag_over = None;
        }
        if self.pressed == Some(key) {
            self.pressed = None;
        }
        self.tentative_moves.remove(&key);
        self.tentative_bounds.remove(&key);
        if self.tentative_point.is_some_and(|t| t.element == key) {
            self.tentative_point = None;
        }
        let gesture_targets_key = match &self.gesture {
            GestureState::Resizing { handles, .. } | GestureState::MovingPoint { handles, .. } => {
                handles.element == key
            }
            _ => false,
        };
        if gesture_targets_key {
            self.gesture = GestureState::Idle;
            self.capture.release(self.id);
        }
    }

    /// Discards any in-progress gesture without touching the model.
    pub fn cancel_gesture(&mut self) -> bool {
        let gesture = std::mem::take(&mut self.gesture);
        if gesture.is_idle() {
            return false;
        }
        if let GestureState::MovingPoint { handles, .. } = &gesture {
            if let Some(model) = &self.model {
                if let Some(el) = model.borrow().get(handles.element) {
                    el.invalidate_bounds();
                }
            }
        }
        debug!("Cancelled {} gesture", gesture.name());
        self.tentative_moves.clear();
        self.tentative_bounds.clear();
        self.tentative_point = None;
        self.pressed = None;
        self.capture.release(self.id);
        self.invalidate();
        true
    }
}

/// Shifts `(dx, dy)` so `group` moved by it stays inside `limits`.
pub(crate) fn clamp_delta(group: Region, limits: Region, dx: f64, dy: f64) -> (f64, f64) {
    fn axis(d: f64, lo: f64, hi: f64) -> f64 {
        if lo > hi {
            lo
        } else {
            d.clamp(lo, hi)
        }
    }
    (
        axis(dx, limits.x - group.x, limits.right() - group.right()),
        axis(dy, limits.y - group.y, limits.bottom() - group.bottom()),
    )
}

/// Clips `region` to `limits` without shrinking below `min` on either axis.
pub(crate) fn clip_region(region: Region, limits: Region, min: f64) -> Region {
    let left = region.x.max(limits.x);
    let top = region.y.max(limits.y);
    let right = region.right().min(limits.right()).max(left + min);
    let bottom = region.bottom().min(limits.bottom()).max(top + min);
    Region::new(left, top, right - left, bottom - top)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_delta() {
        let limits = Region::new(0.0, 0.0, 100.0, 100.0);
        let group = Region::new(10.0, 10.0, 20.0, 20.0);
        assert_eq!(clamp_delta(group, limits, -50.0, 5.0), (-10.0, 5.0));
        assert_eq!(clamp_delta(group, limits, 200.0, 200.0), (70.0, 70.0));
    }

    #[test]
    fn test_clip_region() {
        let limits = Region::new(0.0, 0.0, 100.0, 100.0);
        let clipped = clip_region(Region::new(-5.0, 90.0, 20.0, 20.0), limits, 2.0);
        assert_eq!(clipped, Region::new(0.0, 90.0, 15.0, 10.0));
    }
}
