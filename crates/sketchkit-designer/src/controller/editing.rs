//! Host-facing editing operations: model binding, element management,
//! selection, z-order, grid settings, element creation and animation.

use sketchkit_core::{
    DesignerEvent, DiagnosticEvent, ElementKey, Error, ModelError, ModelEvent, Point, Shared,
};
use sketchkit_settings::GridKind;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::DesignController;
use crate::commands::CommandScope;
use crate::element::{Depth, Element};
use crate::model::Model;
use crate::resources::{ResourceLoader, ResourceManager};
use crate::serialization::ElementRecord;
use crate::timer::Tick;

impl DesignController {
    // Model binding

    /// Binds a model, dropping all interaction state for the previous one.
    pub fn set_model(&mut self, model: Option<Shared<Model>>) {
        self.cancel_gesture();
        let mut events = Vec::new();
        self.replace_selection(Vec::new(), &mut events);
        self.mouse_over = None;
        self.drag_over = None;
        self.pressed = None;
        self.model = model;
        if let Some(model) = &self.model {
            let model = model.borrow();
            info!("Designing model {} ({} elements)", model.id(), model.len());
        }
        self.publish_all(events);
        self.invalidate();
    }

    /// Enables or disables interaction. Disabling cancels any gesture; the
    /// optional fill is drawn over the model while disabled.
    pub fn set_enabled(&mut self, enabled: bool, disabled_fill: Option<String>) {
        if !enabled {
            self.cancel_gesture();
        }
        self.enabled = enabled;
        self.disabled_fill = disabled_fill;
        self.invalidate();
    }

    // Elements

    pub fn add_element(&mut self, element: Element) -> Result<ElementKey, ModelError> {
        let model_rc = self.require_model()?;
        let mut events = Vec::new();
        let key = {
            let mut model = model_rc.borrow_mut();
            let key = model.add(element);
            events.push(DesignerEvent::Model(ModelEvent::ElementAdded { key }));
            self.mark_updated(&mut model, &mut events);
            key
        };
        self.publish_all(events);
        self.invalidate();
        Ok(key)
    }

    /// Removes an element and every controller reference to it.
    pub fn remove_element(&mut self, key: ElementKey) -> Result<Element, ModelError> {
        let model_rc = self.require_model()?;
        let mut events = Vec::new();
        let element = {
            let mut model = model_rc.borrow_mut();
            let element = model
                .remove(key)
                .ok_or_else(|| ModelError::ElementNotFound {
                    key: key.to_string(),
                })?;
            self.forget_element(key, &mut events);
            events.push(DesignerEvent::Model(ModelEvent::ElementRemoved { key }));
            self.mark_updated(&mut model, &mut events);
            element
        };
        self.publish_all(events);
        self.invalidate();
        Ok(element)
    }

    /// Removes every selected element; returns how many were removed.
    pub fn remove_selected(&mut self) -> usize {
        let keys = self.selection.clone();
        keys.into_iter()
            .filter(|key| self.remove_element(*key).is_ok())
            .count()
    }

    /// Copies the selected elements, offset by the duplicate offset, and
    /// selects the copies.
    pub fn duplicate_selected(&mut self) -> Result<Vec<ElementKey>, ModelError> {
        let model_rc = self.require_model()?;
        let offset = self.settings.editing.duplicate_offset;
        let mut events = Vec::new();
        let keys = {
            let mut model = model_rc.borrow_mut();
            let copies: Vec<Element> = self
                .selection
                .iter()
                .filter_map(|key| model.get(*key))
                .map(|el| {
                    let mut copy = el.duplicate();
                    copy.translate(offset, offset);
                    copy
                })
                .collect();
            if copies.is_empty() {
                return Ok(Vec::new());
            }
            let keys: Vec<ElementKey> = copies.into_iter().map(|el| model.add(el)).collect();
            for key in &keys {
                events.push(DesignerEvent::Model(ModelEvent::ElementAdded { key: *key }));
            }
            self.mark_updated(&mut model, &mut events);
            keys
        };
        self.replace_selection(keys.clone(), &mut events);
        self.publish_all(events);
        self.invalidate();
        Ok(keys)
    }

    // Selection

    /// Selects `key`, replacing the selection when `exclusive`.
    pub fn select_element(&mut self, key: ElementKey, exclusive: bool) -> Result<bool, ModelError> {
        let model_rc = self.require_model()?;
        if !model_rc.borrow().contains(key) {
            return Err(ModelError::ElementNotFound {
                key: key.to_string(),
            });
        }
        let selection = if exclusive {
            vec![key]
        } else if self.selection.contains(&key) {
            return Ok(false);
        } else {
            let mut s = self.selection.clone();
            s.push(key);
            s
        };
        Ok(self.update_selection(selection))
    }

    pub fn deselect_element(&mut self, key: ElementKey) -> bool {
        let remaining = self.selection.iter().copied().filter(|k| *k != key).collect();
        self.update_selection(remaining)
    }

    pub fn select_all(&mut self) -> bool {
        let Some(model) = &self.model else {
            return false;
        };
        let all = model.borrow().keys();
        self.update_selection(all)
    }

    pub fn clear_selections(&mut self) -> bool {
        self.update_selection(Vec::new())
    }

    fn update_selection(&mut self, selection: Vec<ElementKey>) -> bool {
        let mut events = Vec::new();
        self.replace_selection(selection, &mut events);
        if events.is_empty() {
            return false;
        }
        self.publish_all(events);
        self.invalidate();
        true
    }

    // Z-order

    pub fn move_element_to_top(&mut self, key: ElementKey) -> Result<bool, ModelError> {
        self.reorder(key, Model::move_to_top)
    }

    pub fn move_element_to_bottom(&mut self, key: ElementKey) -> Result<bool, ModelError> {
        self.reorder(key, Model::move_to_bottom)
    }

    pub fn move_element_forward(&mut self, key: ElementKey) -> Result<bool, ModelError> {
        self.reorder(key, Model::move_forward)
    }

    pub fn move_element_backward(&mut self, key: ElementKey) -> Result<bool, ModelError> {
        self.reorder(key, Model::move_backward)
    }

    fn reorder(
        &mut self,
        key: ElementKey,
        op: fn(&mut Model, ElementKey) -> bool,
    ) -> Result<bool, ModelError> {
        let model_rc = self.require_model()?;
        let mut events = Vec::new();
        let moved = {
            let mut model = model_rc.borrow_mut();
            model.require(key)?;
            let moved = op(&mut *model, key);
            if moved {
                self.mark_updated(&mut model, &mut events);
            }
            moved
        };
        self.publish_all(events);
        if moved {
            self.invalidate();
        }
        Ok(moved)
    }

    // Grid and editing options

    pub fn set_grid_type(&mut self, kind: GridKind) {
        self.settings.grid.kind = kind;
        self.invalidate();
    }

    /// Ignores non-positive spacing.
    pub fn set_grid_spacing(&mut self, spacing: f64) -> bool {
        if !(spacing.is_finite() && spacing > 0.0) {
            debug!("Ignoring grid spacing {}", spacing);
            return false;
        }
        self.settings.grid.spacing = spacing;
        self.invalidate();
        true
    }

    pub fn set_grid_color(&mut self, color: impl Into<String>) {
        self.settings.grid.color = color.into();
        self.invalidate();
    }

    pub fn set_snap_to_grid(&mut self, snap: bool) {
        self.settings.grid.snap_to_grid = snap;
    }

    pub fn set_point_depth(&mut self, depth: Depth) {
        self.point_depth = depth;
        self.invalidate();
    }

    /// Makes empty-space drags create elements from `template` instead of
    /// rubber-band selecting; `None` returns to selection.
    pub fn set_creation_tool(&mut self, template: Option<ElementRecord>) {
        self.creation_tool = template;
    }

    pub fn creation_tool(&self) -> Option<&ElementRecord> {
        self.creation_tool.as_ref()
    }

    /// Creates an element from `record` after loading the resources it
    /// draws from. If loading fails nothing is added, a `CreationFailed`
    /// diagnostic is published and the resource error is returned.
    pub async fn create_element(
        &mut self,
        record: &ElementRecord,
        loader: &dyn ResourceLoader,
    ) -> Result<ElementKey, Error> {
        let model_rc = self.require_model()?;
        let element = self.factory.create(record)?;

        let mut staging = ResourceManager::new();
        {
            let model = model_rc.borrow();
            let resources = model.resources();
            staging.set_locale(resources.locale().map(str::to_string));
            for reference in element.resource_keys() {
                match resources.get(&reference.key) {
                    Some(existing) if existing.is_available() => {}
                    Some(existing) => {
                        staging.register(existing.clone());
                    }
                    None => {
                        staging.register_key(reference);
                    }
                }
            }
        }

        if !staging.is_empty() {
            let factory = self.factory.clone();
            if let Err(e) = staging.try_load(loader, &factory).await {
                warn!("Cannot create {}: {}", record.element_type, e);
                self.bus
                    .publish(DesignerEvent::Diagnostic(DiagnosticEvent::CreationFailed {
                        element_type: record.element_type.clone(),
                        reason: e.to_string(),
                    }));
                return Err(e.into());
            }
            model_rc.borrow_mut().resources_mut().merge(staging);
        }
        Ok(self.add_element(element)?)
    }

    // Animation

    /// Starts the animation timer. Needs a model and a bound host surface.
    pub fn start_animation(&mut self, now: Instant) -> Result<(), ModelError> {
        self.require_model()?;
        if self.target.is_none() {
            return Err(ModelError::MissingTarget {
                what: "host surface".to_string(),
            });
        }
        self.timer.set_interval(Duration::from_millis(
            self.settings.animation.timer_interval_ms,
        ));
        self.timer.start(now);
        debug!("Animation started ({:?} interval)", self.timer.interval());
        Ok(())
    }

    pub fn stop_animation(&mut self) {
        self.timer.stop();
    }

    pub fn pause_animation(&mut self, now: Instant) {
        self.timer.pause(now);
    }

    pub fn resume_animation(&mut self, now: Instant) {
        self.timer.resume(now);
    }

    pub fn is_animating(&self) -> bool {
        self.timer.is_running()
    }

    /// When the host should call [`DesignController::tick`] next.
    pub fn next_tick_due(&self) -> Option<Instant> {
        self.timer.next_due()
    }

    /// Runs every timer hook if a tick is due, then requests a redraw.
    pub fn tick(&mut self, now: Instant) -> Option<Tick> {
        let tick = self.timer.poll(now)?;
        if let Some(model) = &self.model {
            match model.try_borrow_mut() {
                Ok(mut model) => {
                    let mut scope = CommandScope::new(&self.bus);
                    let handled = self.router.dispatch_timer_in(&mut model, &mut scope);
                    if handled > 0 {
                        debug!("Tick {}: {} timer hook(s)", tick.count, handled);
                    }
                }
                Err(_) => warn!("Model busy, skipping tick {}", tick.count),
            }
        }
        self.invalidate();
        Some(tick)
    }

    /// Model-space position of a host pixel.
    pub fn model_point(&self, pixel: Point) -> Point {
        self.viewport.pixel_to_model(pixel)
    }
}
