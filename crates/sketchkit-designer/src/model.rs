//! The model: an ordered element list plus its resources.
//!
//! Element order is z-order; the last element draws on top and wins hit
//! tests. Elements are moved into the model by value, so no element can be
//! owned by two models; the element's owner and parent links are plain ids.

use sketchkit_core::{Error, ElementKey, ModelError, ModelId, Point, Region, Size};
use std::collections::HashMap;
use tiny_skia::Transform;
use tracing::debug;

use crate::element::Element;
use crate::factory::ElementFactory;
use crate::fill::{fill_for_element, ElementLookup};
use crate::resources::{Resource, ResourceManager};
use crate::serialization::{ElementRecord, ModelRecord, ResourceRecord};

#[derive(Debug)]
pub struct Model {
    id: ModelId,
    size: Size,
    pub background: Option<String>,
    elements: Vec<Element>,
    resources: ResourceManager,
    dirty: bool,
}

impl Model {
    pub fn new(size: Size) -> Self {
        Self {
            id: ModelId::new(),
            size,
            background: None,
            elements: Vec::new(),
            resources: ResourceManager::new(),
            dirty: false,
        }
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// The model rectangle at the origin.
    pub fn bounds(&self) -> Region {
        Region::from_location_size(Point::ORIGIN, self.size)
    }

    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceManager {
        &mut self.resources
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Sets the dirty flag, returning whether it changed.
    pub fn set_dirty(&mut self, dirty: bool) -> bool {
        let changed = self.dirty != dirty;
        self.dirty = dirty;
        changed
    }

    // Elements

    /// Takes ownership of `element` on top of the z-order.
    pub fn add(&mut self, element: Element) -> ElementKey {
        let index = self.elements.len();
        self.insert(index, element)
    }

    pub fn insert(&mut self, index: usize, mut element: Element) -> ElementKey {
        element.attach(self.id);
        element.register_resources(&mut self.resources);
        let key = element.key();
        let index = index.min(self.elements.len());
        debug!("Adding {} {} at z-index {}", element.type_name(), key, index);
        self.elements.insert(index, element);
        key
    }

    /// Removes an element, severing its owner link and any child links to it.
    pub fn remove(&mut self, key: ElementKey) -> Option<Element> {
        let index = self.index_of(key)?;
        let mut element = self.elements.remove(index);
        element.detach();
        for child in self.elements.iter_mut().filter(|e| e.parent() == Some(key)) {
            child.set_parent(None);
        }
        debug!("Removed {} {}", element.type_name(), key);
        Some(element)
    }

    pub fn get(&self, key: ElementKey) -> Option<&Element> {
        self.elements.iter().find(|e| e.key() == key)
    }

    pub fn get_mut(&mut self, key: ElementKey) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.key() == key)
    }

    /// Looks up an element, failing with [`ModelError::ElementNotFound`].
    pub fn require(&self, key: ElementKey) -> Result<&Element, ModelError> {
        self.get(key).ok_or_else(|| ModelError::ElementNotFound {
            key: key.to_string(),
        })
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id.as_deref() == Some(id))
    }

    pub fn index_of(&self, key: ElementKey) -> Option<usize> {
        self.elements.iter().position(|e| e.key() == key)
    }

    pub fn contains(&self, key: ElementKey) -> bool {
        self.index_of(key).is_some()
    }

    /// Elements bottom to top.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.elements.iter_mut()
    }

    pub fn keys(&self) -> Vec<ElementKey> {
        self.elements.iter().map(Element::key).collect()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    // Queries

    /// Topmost element under `p`. Interior hits count for elements with an
    /// own or inherited fill.
    pub fn hit_test(&self, p: Point) -> Option<ElementKey> {
        self.elements
            .iter()
            .rev()
            .find(|e| e.hit_test_with(p, fill_for_element(e, self).is_some()))
            .map(Element::key)
    }

    /// Elements whose transformed bounds overlap `region`, bottom to top.
    pub fn elements_in(&self, region: Region) -> Vec<ElementKey> {
        self.elements
            .iter()
            .filter(|e| {
                let b = e.transformed_bounds();
                region.intersects_with(&b) || region.contains_region(&b)
            })
            .map(Element::key)
            .collect()
    }

    /// `base` followed by the element's own transform.
    pub fn render_transform(&self, key: ElementKey, base: Transform) -> Transform {
        match self.get(key).and_then(Element::render_transform) {
            Some(t) => base.pre_concat(t),
            None => base,
        }
    }

    // Z-order

    pub fn move_to_top(&mut self, key: ElementKey) -> bool {
        let last = self.elements.len().saturating_sub(1);
        self.move_to(key, |_| last)
    }

    pub fn move_to_bottom(&mut self, key: ElementKey) -> bool {
        self.move_to(key, |_| 0)
    }

    pub fn move_forward(&mut self, key: ElementKey) -> bool {
        let last = self.elements.len().saturating_sub(1);
        self.move_to(key, |i| (i + 1).min(last))
    }

    pub fn move_backward(&mut self, key: ElementKey) -> bool {
        self.move_to(key, |i| i.saturating_sub(1))
    }

    fn move_to(&mut self, key: ElementKey, target: impl FnOnce(usize) -> usize) -> bool {
        let Some(index) = self.index_of(key) else {
            return false;
        };
        let to = target(index);
        if to == index {
            return false;
        }
        let element = self.elements.remove(index);
        self.elements.insert(to, element);
        true
    }

    // Documents

    pub fn from_record(record: ModelRecord, factory: &ElementFactory) -> Result<Model, Error> {
        let size = match record.size.as_deref() {
            Some(text) => text.parse()?,
            None => Size::default(),
        };
        let mut model = Model::new(size);
        model.background = record.background;
        for resource in record.resources {
            model.resources.register(Resource::from(resource));
        }

        let mut ids = HashMap::new();
        let mut parents = Vec::new();
        for element_record in &record.elements {
            let element = factory.create(element_record)?;
            if let Some(id) = &element.id {
                ids.insert(id.clone(), element.key());
            }
            if let Some(parent) = &element_record.parent {
                parents.push((element.key(), parent.clone()));
            }
            model.add(element);
        }
        for (key, parent_id) in parents {
            let parent = *ids.get(&parent_id).ok_or_else(|| ModelError::InvalidRecord {
                reason: format!("unknown parent id '{}'", parent_id),
            })?;
            if let Some(element) = model.get_mut(key) {
                element.set_parent(Some(parent));
            }
        }
        Ok(model)
    }

    pub fn to_record(&self) -> ModelRecord {
        let elements = self
            .elements
            .iter()
            .map(|e| {
                let parent = e
                    .parent()
                    .and_then(|p| self.get(p))
                    .and_then(|p| p.id.clone());
                ElementRecord::from_element(e, parent)
            })
            .collect();
        ModelRecord {
            size: Some(self.size.to_string()),
            background: self.background.clone(),
            elements,
            resources: self.resources.iter().map(ResourceRecord::from).collect(),
        }
    }

    pub fn from_json(json: &str, factory: &ElementFactory) -> Result<Model, Error> {
        let record: ModelRecord = serde_json::from_str(json)?;
        Self::from_record(record, factory)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(&self.to_record())?)
    }
}

impl ElementLookup for Model {
    fn element(&self, key: ElementKey) -> Option<&Element> {
        self.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{RectangleShape, Shape};

    fn rect(x: f64, y: f64) -> Element {
        Element::new(Shape::Rectangle(RectangleShape::new(
            Point::new(x, y),
            Size::new(10.0, 10.0),
        )))
        .with_fill("Red")
    }

    #[test]
    fn test_add_sets_owner_and_remove_clears_it() {
        let mut model = Model::new(Size::new(100.0, 100.0));
        let key = model.add(rect(0.0, 0.0));
        assert_eq!(model.get(key).and_then(Element::owner), Some(model.id()));
        let removed = model.remove(key).expect("present");
        assert_eq!(removed.owner(), None);
        assert!(model.is_empty());
    }

    #[test]
    fn test_hit_test_topmost_first() {
        let mut model = Model::new(Size::new(100.0, 100.0));
        let bottom = model.add(rect(0.0, 0.0));
        let top = model.add(rect(5.0, 5.0));
        assert_eq!(model.hit_test(Point::new(7.0, 7.0)), Some(top));
        assert_eq!(model.hit_test(Point::new(2.0, 2.0)), Some(bottom));
        assert_eq!(model.hit_test(Point::new(50.0, 50.0)), None);

        assert!(model.move_to_top(bottom));
        assert_eq!(model.hit_test(Point::new(7.0, 7.0)), Some(bottom));
        assert!(!model.move_to_top(bottom));
    }

    #[test]
    fn test_z_order_steps() {
        let mut model = Model::new(Size::new(100.0, 100.0));
        let a = model.add(rect(0.0, 0.0));
        let b = model.add(rect(0.0, 0.0));
        let c = model.add(rect(0.0, 0.0));
        assert!(model.move_forward(a));
        assert_eq!(model.keys(), vec![b, a, c]);
        assert!(model.move_backward(c));
        assert_eq!(model.keys(), vec![b, c, a]);
        assert!(model.move_to_bottom(a));
        assert_eq!(model.keys(), vec![a, b, c]);
    }

    #[test]
    fn test_removing_parent_clears_child_link() {
        let mut model = Model::new(Size::new(100.0, 100.0));
        let parent = model.add(rect(0.0, 0.0));
        let mut child = rect(0.0, 0.0);
        child.set_parent(Some(parent));
        let child = model.add(child);
        model.remove(parent);
        assert_eq!(model.get(child).and_then(Element::parent), None);
    }

    #[test]
    fn test_dirty_change_reported_once() {
        let mut model = Model::new(Size::default());
        assert!(model.set_dirty(true));
        assert!(!model.set_dirty(true));
        assert!(model.set_dirty(false));
    }
}
