//! Pointer, keyboard and drag-and-drop handling.

use sketchkit_core::{
    DesignerEvent, DiagnosticEvent, DragEvent, DragPayload, ElementEvent, ElementKey, ModelEvent,
    Point, Region,
};
use tracing::{debug, warn};

use super::{
    clamp_delta, clip_region, ClickAction, Cursor, DesignController, GestureState, TentativePoint,
};
use crate::commands::CommandScope;
use crate::element::Hook;
use crate::grid::{snap, snap_point};
use crate::handles::{HandleKind, HandleSet, ResizeConstraints};
use crate::model::Model;
use crate::serialization::ElementRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    /// Ctrl, or Cmd on macOS hosts.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    /// Whether a click should toggle rather than replace the selection.
    pub fn toggles(&self) -> bool {
        self.shift || self.command()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// A pointer event in host pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: Point,
    pub button: MouseButton,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            button: MouseButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Delete,
    Backspace,
    Escape,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

impl DesignController {
    // Pointer

    /// Starts a gesture. Returns whether the event was handled.
    pub fn pointer_down(&mut self, event: &PointerEvent) -> bool {
        if !self.enabled || event.button != MouseButton::Primary {
            return false;
        }
        let Some(model_rc) = self.model.clone() else {
            return false;
        };
        if !self.capture.acquire(self.id) {
            debug!("Pointer captured by another controller");
            return false;
        }
        if !self.gesture.is_idle() {
            self.cancel_gesture();
            self.capture.acquire(self.id);
        }

        let p = self.viewport.pixel_to_model(event.position);
        let mut events = Vec::new();
        {
            let mut model = model_rc.borrow_mut();
            if let Some(gesture) = self.handle_gesture_at(&model, p) {
                if let GestureState::Resizing { handles, handle, .. } = &gesture {
                    if let Some(HandleKind::Resize(dir)) = handles.get(*handle).map(|h| h.kind) {
                        self.set_cursor(Cursor::Resize(dir));
                    }
                }
                self.gesture = gesture;
                drop(model);
                self.invalidate();
                return true;
            }

            match model.hit_test(p) {
                Some(key) => {
                    self.pressed = Some(key);
                    if let Some(el) = model.get_mut(key) {
                        if el.flags.interactive {
                            let mut scope = CommandScope::new(&self.bus);
                            self.router.dispatch_hook_in(el, Hook::MouseDown, &mut scope);
                        }
                    }
                    let click = self.press_selection(&model, key, event.modifiers, &mut events);
                    self.gesture = GestureState::Selecting {
                        start: p,
                        start_pixel: event.position,
                        click,
                    };
                }
                None => {
                    if !event.modifiers.toggles() {
                        self.replace_selection(Vec::new(), &mut events);
                    }
                    self.gesture = GestureState::RubberBanding {
                        start: p,
                        current: p,
                        create: self.creation_tool.clone(),
                    };
                }
            }
        }
        self.publish_all(events);
        self.invalidate();
        true
    }

    /// Advances the current gesture, or tracks hover when idle.
    pub fn pointer_move(&mut self, event: &PointerEvent) -> bool {
        if !self.enabled || self.capture.is_held_by_other(self.id) {
            return false;
        }
        let Some(model_rc) = self.model.clone() else {
            return false;
        };
        let p = self.viewport.pixel_to_model(event.position);
        let mut events = Vec::new();
        let gesture = std::mem::take(&mut self.gesture);
        let mut redraw = true;
        let next = {
            let mut model = model_rc.borrow_mut();
            match gesture {
                GestureState::Idle => {
                    redraw = self.track_hover(&mut model, p);
                    GestureState::Idle
                }
                GestureState::Selecting {
                    start,
                    start_pixel,
                    click,
                } => {
                    let travelled = start_pixel.squared_distance_to(&event.position);
                    if travelled > self.settings.editing.drag_threshold_sq {
                        self.set_cursor(Cursor::Move);
                        self.update_move(&model, start, p, &mut events);
                        GestureState::Moving { start }
                    } else {
                        GestureState::Selecting {
                            start,
                            start_pixel,
                            click,
                        }
                    }
                }
                GestureState::Moving { start } => {
                    self.update_move(&model, start, p, &mut events);
                    GestureState::Moving { start }
                }
                GestureState::Resizing {
                    handles,
                    handle,
                    start,
                    original,
                } => {
                    self.update_resize(&model, &handles, handle, start, original, p, &mut events);
                    GestureState::Resizing {
                        handles,
                        handle,
                        start,
                        original,
                    }
                }
                GestureState::MovingPoint {
                    handles,
                    handle,
                    index,
                    depth,
                } => {
                    let mut target = p;
                    if self.settings.grid.snap_to_grid {
                        target = snap_point(target, self.settings.grid.spacing);
                    }
                    if self.settings.editing.constrain_to_bounds {
                        let limits = model.bounds();
                        target = Point::new(
                            target.x.clamp(limits.x, limits.right()),
                            target.y.clamp(limits.y, limits.bottom()),
                        );
                    }
                    if let Some(local) = handles.to_local(target) {
                        self.tentative_point = Some(TentativePoint {
                            element: handles.element,
                            index,
                            depth,
                            location: local,
                        });
                    }
                    GestureState::MovingPoint {
                        handles,
                        handle,
                        index,
                        depth,
                    }
                }
                GestureState::RubberBanding { start, create, .. } => {
                    GestureState::RubberBanding {
                        start,
                        current: p,
                        create,
                    }
                }
                dragging @ GestureState::Dragging { .. } => dragging,
            }
        };
        self.gesture = next;
        self.publish_all(events);
        if redraw {
            self.invalidate();
        }
        true
    }

    /// Commits or resolves the current gesture and releases the capture.
    pub fn pointer_up(&mut self, event: &PointerEvent) -> bool {
        if !self.enabled || self.capture.is_held_by_other(self.id) {
            return false;
        }
        let Some(model_rc) = self.model.clone() else {
            return false;
        };
        let p = self.viewport.pixel_to_model(event.position);
        let mut events = Vec::new();
        let gesture = std::mem::take(&mut self.gesture);
        {
            let mut model = model_rc.borrow_mut();
            let was_click = matches!(gesture, GestureState::Selecting { .. });
            match gesture {
                GestureState::Selecting { click, .. } => {
                    self.apply_click(&mut model, click, &mut events);
                }
                GestureState::Moving { .. } => self.commit_moves(&mut model, &mut events),
                GestureState::Resizing { .. } => self.commit_bounds(&mut model, &mut events),
                GestureState::MovingPoint { .. } => self.commit_point(&mut model, &mut events),
                GestureState::RubberBanding { start, create, .. } => {
                    let region = Region::from_corners(start, p);
                    match create {
                        Some(template) => {
                            self.create_in_region(&mut model, &template, region, &mut events)
                        }
                        None => {
                            let mut selection = if event.modifiers.toggles() {
                                self.selection.clone()
                            } else {
                                Vec::new()
                            };
                            for key in model.elements_in(region) {
                                if !selection.contains(&key) {
                                    selection.push(key);
                                }
                            }
                            self.replace_selection(selection, &mut events);
                        }
                    }
                }
                GestureState::Idle | GestureState::Dragging { .. } => {}
            }

            if let Some(key) = self.pressed.take() {
                if let Some(el) = model.get_mut(key) {
                    if el.flags.interactive {
                        let mut scope = CommandScope::new(&self.bus);
                        self.router.dispatch_hook_in(el, Hook::MouseUp, &mut scope);
                        if was_click && el.hit_test(p) {
                            self.router.dispatch_hook_in(el, Hook::Click, &mut scope);
                        }
                    }
                }
            }
        }
        self.tentative_moves.clear();
        self.tentative_bounds.clear();
        self.tentative_point = None;
        self.capture.release(self.id);
        self.set_cursor(Cursor::Default);
        self.publish_all(events);
        self.invalidate();
        true
    }

    fn handle_gesture_at(&self, model: &Model, p: Point) -> Option<GestureState> {
        let factory = self.handle_factory();
        let depth = self.effective_depth();
        for key in self.selection.iter().rev() {
            let Some(el) = model.get(*key) else {
                continue;
            };
            let handles = factory.handles_for(el, depth);
            let Some(handle) = handles.hit_test(p) else {
                continue;
            };
            match handles.handles[handle].kind {
                HandleKind::Resize(_) if el.can_resize() => {
                    let original = handles.bounds;
                    return Some(GestureState::Resizing {
                        handles,
                        handle,
                        start: p,
                        original,
                    });
                }
                HandleKind::Point { index, .. }
                    if self.selection.len() == 1 && el.can_move_point(index, depth) =>
                {
                    return Some(GestureState::MovingPoint {
                        handles,
                        handle,
                        index,
                        depth,
                    });
                }
                _ => {}
            }
        }
        None
    }

    /// Applies the selection change of a press on `key` and returns what a
    /// click should do on release.
    fn press_selection(
        &mut self,
        model: &Model,
        key: ElementKey,
        modifiers: Modifiers,
        events: &mut Vec<DesignerEvent>,
    ) -> ClickAction {
        if !self.selection.contains(&key) {
            let selection = if modifiers.toggles() {
                let mut s = self.selection.clone();
                s.push(key);
                s
            } else {
                vec![key]
            };
            self.replace_selection(selection, events);
            return ClickAction::None;
        }
        if modifiers.toggles() {
            ClickAction::Deselect(key)
        } else if self.selection.len() > 1 {
            ClickAction::Exclusive(key)
        } else if model.get(key).is_some_and(|el| el.can_edit_points()) {
            ClickAction::ToggleEditPoints(key)
        } else {
            ClickAction::None
        }
    }

    fn apply_click(&mut self, model: &mut Model, click: ClickAction, events: &mut Vec<DesignerEvent>) {
        match click {
            ClickAction::None => {}
            ClickAction::Exclusive(key) => self.replace_selection(vec![key], events),
            ClickAction::Deselect(key) => {
                let remaining = self.selection.iter().copied().filter(|k| *k != key).collect();
                self.replace_selection(remaining, events);
            }
            ClickAction::ToggleEditPoints(key) => {
                if let Some(el) = model.get_mut(key) {
                    el.flags.edit_points = !el.flags.edit_points;
                    debug!("Point editing {} for {}", el.flags.edit_points, key);
                }
            }
        }
    }

    /// Updates the hovered element; true when its hooks need a redraw.
    fn track_hover(&mut self, model: &mut Model, p: Point) -> bool {
        let over = model.hit_test(p);
        if over == self.mouse_over {
            return false;
        }
        let mut scope = CommandScope::new(&self.bus);
        if let Some(el) = self.mouse_over.and_then(|key| model.get_mut(key)) {
            if el.flags.interactive {
                self.router.dispatch_hook_in(el, Hook::MouseLeave, &mut scope);
            }
        }
        if let Some(el) = over.and_then(|key| model.get_mut(key)) {
            if el.flags.interactive {
                self.router.dispatch_hook_in(el, Hook::MouseEnter, &mut scope);
            }
        }
        let redraw = scope.redraw;
        self.mouse_over = over;
        self.set_cursor(if over.is_some() {
            Cursor::Pointer
        } else {
            Cursor::Default
        });
        redraw
    }

    fn movable(&self, model: &Model) -> Vec<(ElementKey, Region, Region)> {
        self.selection
            .iter()
            .filter_map(|key| model.get(*key))
            .filter(|el| el.can_move())
            .map(|el| (el.key(), el.bounds(), el.transformed_bounds()))
            .collect()
    }

    fn update_move(&mut self, model: &Model, start: Point, p: Point, events: &mut Vec<DesignerEvent>) {
        let movable = self.movable(model);
        let Some((_, primary, _)) = movable.first() else {
            return;
        };
        let (mut dx, mut dy) = (p.x - start.x, p.y - start.y);
        if self.settings.grid.snap_to_grid {
            let target = snap_point(primary.location().offset(dx, dy), self.settings.grid.spacing);
            dx = target.x - primary.x;
            dy = target.y - primary.y;
        }
        if self.settings.editing.constrain_to_bounds {
            let group = movable
                .iter()
                .map(|(_, _, visual)| *visual)
                .reduce(|a, b| a.union(&b))
                .unwrap_or_default();
            (dx, dy) = clamp_delta(group, model.bounds(), dx, dy);
        }
        self.tentative_moves.clear();
        for (key, bounds, _) in movable {
            let location = bounds.location().offset(dx, dy);
            self.tentative_moves.insert(key, location);
            events.push(DesignerEvent::Element(ElementEvent::Moving { key, location }));
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn update_resize(
        &mut self,
        model: &Model,
        handles: &HandleSet,
        handle: usize,
        start: Point,
        original: Region,
        p: Point,
        events: &mut Vec<DesignerEvent>,
    ) {
        let Some(HandleKind::Resize(dir)) = handles.get(handle).map(|h| h.kind) else {
            return;
        };
        let Some(el) = model.get(handles.element) else {
            return;
        };
        let (Some(from), Some(to)) = (handles.to_local(start), handles.to_local(p)) else {
            return;
        };
        let editing = &self.settings.editing;
        let constraints = ResizeConstraints {
            min_size: editing.min_element_size,
            aspect: (el.flags.aspect_locked || editing.lock_aspect)
                .then(|| original.size().aspect_ratio())
                .flatten(),
            snap: self
                .settings
                .grid
                .snap_to_grid
                .then_some(self.settings.grid.spacing),
        };
        let mut bounds = dir.apply(original, to.x - from.x, to.y - from.y, &constraints);
        if editing.constrain_to_bounds && handles.transform.is_none() {
            bounds = clip_region(bounds, model.bounds(), editing.min_element_size);
        }
        self.tentative_bounds.insert(handles.element, bounds);
        events.push(DesignerEvent::Element(ElementEvent::Sizing {
            key: handles.element,
            bounds,
        }));
    }

    fn commit_moves(&mut self, model: &mut Model, events: &mut Vec<DesignerEvent>) {
        let mut changed = false;
        for key in self.selection.clone() {
            let Some(location) = self.tentative_moves.remove(&key) else {
                continue;
            };
            if let Some(el) = model.get_mut(key) {
                if el.location() != location {
                    el.set_location(location);
                    changed = true;
                }
                events.push(DesignerEvent::Element(ElementEvent::Moved { key, location }));
            }
        }
        if changed {
            self.mark_updated(model, events);
        }
    }

    fn commit_bounds(&mut self, model: &mut Model, events: &mut Vec<DesignerEvent>) {
        let pending: Vec<_> = self.tentative_bounds.drain().collect();
        let mut changed = false;
        for (key, bounds) in pending {
            if let Some(el) = model.get_mut(key) {
                if el.bounds() != bounds {
                    el.set_bounds(bounds);
                    changed = true;
                }
                events.push(DesignerEvent::Element(ElementEvent::Sized {
                    key,
                    bounds: el.bounds(),
                }));
            }
        }
        if changed {
            self.mark_updated(model, events);
        }
    }

    fn commit_point(&mut self, model: &mut Model, events: &mut Vec<DesignerEvent>) {
        let Some(edit) = self.tentative_point.take() else {
            return;
        };
        let Some(el) = model.get_mut(edit.element) else {
            return;
        };
        if let Err(e) = el.set_point_at(edit.index, edit.location, edit.depth) {
            warn!("Point edit on {} failed: {}", edit.element, e);
            return;
        }
        events.push(DesignerEvent::Element(ElementEvent::Sized {
            key: edit.element,
            bounds: el.bounds(),
        }));
        self.mark_updated(model, events);
    }

    fn create_in_region(
        &mut self,
        model: &mut Model,
        template: &ElementRecord,
        region: Region,
        events: &mut Vec<DesignerEvent>,
    ) {
        let min = self.settings.editing.min_element_size;
        let mut region = Region::new(
            region.x,
            region.y,
            region.width.max(min),
            region.height.max(min),
        );
        if self.settings.grid.snap_to_grid {
            let spacing = self.settings.grid.spacing;
            let corner = snap_point(region.location(), spacing);
            region = Region::new(
                corner.x,
                corner.y,
                snap(region.width, spacing).max(min),
                snap(region.height, spacing).max(min),
            );
        }
        let failed = |reason: String| {
            DesignerEvent::Diagnostic(DiagnosticEvent::CreationFailed {
                element_type: template.element_type.clone(),
                reason,
            })
        };
        let element = match self.factory.create_in_region(template, region) {
            Ok(element) => element,
            Err(e) => {
                warn!("Cannot create {}: {}", template.element_type, e);
                events.push(failed(e.to_string()));
                return;
            }
        };
        let missing: Vec<String> = element
            .resource_keys()
            .into_iter()
            .filter(|r| {
                !model
                    .resources()
                    .get(&r.key)
                    .is_some_and(|res| res.is_available())
            })
            .map(|r| r.key)
            .collect();
        if !missing.is_empty() {
            warn!(
                "Cannot create {}: resources not loaded: {}",
                template.element_type,
                missing.join(", ")
            );
            events.push(failed(format!("resources not loaded: {}", missing.join(", "))));
            return;
        }
        let key = model.add(element);
        events.push(DesignerEvent::Model(ModelEvent::ElementAdded { key }));
        self.mark_updated(model, events);
        self.replace_selection(vec![key], events);
    }

    // Keyboard

    /// Handles a key press. Returns whether it changed anything.
    pub fn key_down(&mut self, event: &KeyEvent) -> bool {
        if !self.enabled {
            return false;
        }
        if event.key == Key::Escape {
            return self.cancel_gesture() || self.clear_selections();
        }
        if !self.gesture.is_idle() {
            return false;
        }
        let m = event.modifiers;
        let step = if m.shift {
            self.settings.editing.nudge_large
        } else {
            self.settings.editing.nudge_small
        };
        let arrow = match event.key {
            Key::Left => Some((-step, 0.0)),
            Key::Right => Some((step, 0.0)),
            Key::Up => Some((0.0, -step)),
            Key::Down => Some((0.0, step)),
            _ => None,
        };
        if let Some((dx, dy)) = arrow {
            return if m.command() {
                self.resize_selected(dx, dy)
            } else {
                self.nudge_selected(dx, dy)
            };
        }
        match event.key {
            Key::Delete | Key::Backspace => self.remove_selected() > 0,
            Key::Char(c) if m.command() && c.eq_ignore_ascii_case(&'a') => self.select_all(),
            Key::Char(c) if m.command() && c.eq_ignore_ascii_case(&'d') => {
                self.duplicate_selected().is_ok_and(|keys| !keys.is_empty())
            }
            _ => false,
        }
    }

    /// Moves every nudgeable selected element by `(dx, dy)`. The nudge is
    /// rejected as a whole if it would take the group outside the model.
    pub fn nudge_selected(&mut self, dx: f64, dy: f64) -> bool {
        let Some(model_rc) = self.model.clone() else {
            return false;
        };
        let mut events = Vec::new();
        {
            let mut model = model_rc.borrow_mut();
            let keys: Vec<ElementKey> = self
                .selection
                .iter()
                .copied()
                .filter(|k| model.get(*k).is_some_and(|el| el.can_nudge()))
                .collect();
            if keys.is_empty() {
                return false;
            }
            if self.settings.editing.constrain_to_bounds {
                let limits = model.bounds();
                let escapes = keys
                    .iter()
                    .filter_map(|k| model.get(*k))
                    .any(|el| !limits.contains_region(&el.transformed_bounds().translate(dx, dy)));
                if escapes {
                    debug!("Nudge ({}, {}) rejected: selection would leave the model", dx, dy);
                    return false;
                }
            }
            for key in keys {
                if let Some(el) = model.get_mut(key) {
                    el.translate(dx, dy);
                    events.push(DesignerEvent::Element(ElementEvent::Moved {
                        key,
                        location: el.location(),
                    }));
                }
            }
            self.mark_updated(&mut model, &mut events);
        }
        self.publish_all(events);
        self.invalidate();
        true
    }

    /// Grows or shrinks every resizable selected element by `(dw, dh)`,
    /// rejected as a whole like a nudge.
    pub fn resize_selected(&mut self, dw: f64, dh: f64) -> bool {
        let Some(model_rc) = self.model.clone() else {
            return false;
        };
        let min = self.settings.editing.min_element_size;
        let mut events = Vec::new();
        {
            let mut model = model_rc.borrow_mut();
            let targets: Vec<(ElementKey, Region)> = self
                .selection
                .iter()
                .filter_map(|k| model.get(*k))
                .filter(|el| el.can_resize())
                .map(|el| {
                    let b = el.bounds();
                    let size = ((b.width + dw).max(min), (b.height + dh).max(min));
                    (el.key(), Region::new(b.x, b.y, size.0, size.1))
                })
                .collect();
            if targets.is_empty() {
                return false;
            }
            if self.settings.editing.constrain_to_bounds {
                let limits = model.bounds();
                if targets.iter().any(|(_, r)| !limits.contains_region(r)) {
                    debug!("Resize ({}, {}) rejected: selection would leave the model", dw, dh);
                    return false;
                }
            }
            for (key, bounds) in targets {
                if let Some(el) = model.get_mut(key) {
                    el.set_bounds(bounds);
                    events.push(DesignerEvent::Element(ElementEvent::Sized {
                        key,
                        bounds: el.bounds(),
                    }));
                }
            }
            self.mark_updated(&mut model, &mut events);
        }
        self.publish_all(events);
        self.invalidate();
        true
    }

    // Drag and drop

    pub fn drag_enter(&mut self, payload: DragPayload, position: Point) -> bool {
        if !self.enabled || !self.gesture.is_idle() {
            return false;
        }
        let location = self.viewport.pixel_to_model(position);
        self.bus.publish(DesignerEvent::Drag(DragEvent::ViewEnter {
            payload: payload.clone(),
            location,
        }));
        self.gesture = GestureState::Dragging { payload };
        self.set_cursor(Cursor::Copy);
        self.track_drag_target(location);
        true
    }

    pub fn drag_over(&mut self, position: Point) -> bool {
        if !matches!(self.gesture, GestureState::Dragging { .. }) {
            return false;
        }
        let location = self.viewport.pixel_to_model(position);
        self.bus
            .publish(DesignerEvent::Drag(DragEvent::ViewOver { location }));
        self.track_drag_target(location);
        true
    }

    pub fn drag_leave(&mut self) -> bool {
        if !matches!(self.gesture, GestureState::Dragging { .. }) {
            return false;
        }
        self.gesture = GestureState::Idle;
        if let Some(key) = self.drag_over.take() {
            self.bus
                .publish(DesignerEvent::Drag(DragEvent::ElementLeave { key }));
        }
        self.bus.publish(DesignerEvent::Drag(DragEvent::ViewLeave));
        self.set_cursor(Cursor::Default);
        true
    }

    pub fn drag_drop(&mut self, position: Point) -> bool {
        let GestureState::Dragging { payload } = std::mem::take(&mut self.gesture) else {
            return false;
        };
        let location = self.viewport.pixel_to_model(position);
        self.track_drag_target(location);
        match self.drag_over.take() {
            Some(key) => self.bus.publish(DesignerEvent::Drag(DragEvent::ElementDrop {
                key,
                payload,
            })),
            None => self.bus.publish(DesignerEvent::Drag(DragEvent::ViewDrop {
                payload,
                location,
            })),
        };
        self.set_cursor(Cursor::Default);
        self.invalidate();
        true
    }

    fn track_drag_target(&mut self, location: Point) {
        let over = self
            .model
            .as_ref()
            .and_then(|m| m.borrow().hit_test(location));
        if over == self.drag_over {
            return;
        }
        if let Some(key) = self.drag_over {
            self.bus
                .publish(DesignerEvent::Drag(DragEvent::ElementLeave { key }));
        }
        if let Some(key) = over {
            self.bus
                .publish(DesignerEvent::Drag(DragEvent::ElementEnter { key }));
        }
        self.drag_over = over;
    }
}
