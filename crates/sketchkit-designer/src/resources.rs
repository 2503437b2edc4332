//! Per-model registry of named assets.
//!
//! A [`ResourceManager`] holds the bitmaps and sub-models a model's elements
//! refer to by key. Resources are registered up front (from the model
//! document or from element declarations) and populated by
//! [`ResourceManager::load`], which resolves every pending entry through a
//! [`ResourceLoader`]. Embedded resources decode in place without touching
//! the loader; URI resources are fetched asynchronously.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sketchkit_core::constants::MAX_MODEL_NESTING;
use sketchkit_core::{shared, ResourceError, Shared};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::rc::Rc;
use std::str::FromStr;
use tiny_skia::{IntSize, Pixmap};
use tracing::{debug, warn};

use crate::factory::ElementFactory;
use crate::model::Model;
use crate::serialization::ModelRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Image,
    Model,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Image => write!(f, "image"),
            ResourceKind::Model => write!(f, "model"),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(ResourceKind::Image),
            "model" => Ok(ResourceKind::Model),
            _ => Err(ResourceError::NotFound { key: s.to_string() }),
        }
    }
}

/// A typed reference to a resource key, as declared by an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub key: String,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceSource {
    /// Fetched through the loader.
    Uri(String),
    /// Inline JSON; only sub-model documents can be embedded.
    Embedded(serde_json::Value),
}

#[derive(Debug, Clone)]
pub enum ResourceContent {
    Image(Rc<Pixmap>),
    Model(Shared<Model>),
}

#[derive(Debug, Clone)]
pub struct Resource {
    key: String,
    kind: ResourceKind,
    source: ResourceSource,
    locale: Option<String>,
    content: Option<ResourceContent>,
}

impl Resource {
    pub fn new(key: impl Into<String>, kind: ResourceKind, source: ResourceSource) -> Self {
        Self {
            key: key.into(),
            kind,
            source,
            locale: None,
            content: None,
        }
    }

    /// A resource whose URI is its key.
    pub fn from_key(kind: ResourceKind, key: impl Into<String>) -> Self {
        let key = key.into();
        Self::new(key.clone(), kind, ResourceSource::Uri(key))
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// A resource that is already populated.
    pub fn with_content(mut self, content: ResourceContent) -> Self {
        self.content = Some(content);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn source(&self) -> &ResourceSource {
        &self.source
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn is_available(&self) -> bool {
        self.content.is_some()
    }

    pub fn content(&self) -> Option<&ResourceContent> {
        self.content.as_ref()
    }

    /// Drops loaded content so the next load fetches it again.
    pub fn unload(&mut self) {
        self.content = None;
    }
}

/// Fetches raw resource bytes.
#[async_trait(?Send)]
pub trait ResourceLoader {
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, ResourceError>;
}

/// Loads URIs as paths relative to a root directory.
#[derive(Debug, Clone)]
pub struct FileLoader {
    root: PathBuf,
}

impl FileLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait(?Send)]
impl ResourceLoader for FileLoader {
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, ResourceError> {
        let path = self.root.join(uri);
        debug!("Reading resource {}", path.display());
        tokio::fs::read(&path)
            .await
            .map_err(|e| ResourceError::LoadFailed {
                key: uri.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Serves resources from an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, uri: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(uri.into(), bytes.into());
    }

    pub fn with(mut self, uri: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(uri, bytes);
        self
    }
}

#[async_trait(?Send)]
impl ResourceLoader for MemoryLoader {
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, ResourceError> {
        self.entries
            .get(uri)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound {
                key: uri.to_string(),
            })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResourceManager {
    resources: Vec<Resource>,
    locale: Option<String>,
}

impl ResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource unless one with the same key and locale exists.
    pub fn register(&mut self, resource: Resource) -> bool {
        let exists = self
            .resources
            .iter()
            .any(|r| r.key == resource.key && r.locale == resource.locale);
        if exists {
            return false;
        }
        self.resources.push(resource);
        true
    }

    /// Declares a referenced key; a no-op when any entry for the key exists.
    pub fn register_key(&mut self, reference: ResourceRef) -> bool {
        if self.resources.iter().any(|r| r.key == reference.key) {
            return false;
        }
        self.resources
            .push(Resource::from_key(reference.kind, reference.key));
        true
    }

    /// Takes over every resource of `other`, replacing entries with the
    /// same key and locale.
    pub fn merge(&mut self, other: ResourceManager) {
        for resource in other.resources {
            match self
                .resources
                .iter_mut()
                .find(|r| r.key == resource.key && r.locale == resource.locale)
            {
                Some(existing) => *existing = resource,
                None => self.resources.push(resource),
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> usize {
        let before = self.resources.len();
        self.resources.retain(|r| r.key != key);
        before - self.resources.len()
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn set_locale(&mut self, locale: Option<String>) {
        self.locale = locale;
    }

    /// Looks up a key, preferring the current locale, then the locale-less
    /// entry, then any entry.
    pub fn get(&self, key: &str) -> Option<&Resource> {
        let mut neutral = None;
        let mut any = None;
        for resource in self.resources.iter().filter(|r| r.key == key) {
            match (&resource.locale, &self.locale) {
                (Some(l), Some(current)) if l == current => return Some(resource),
                (None, _) if neutral.is_none() => neutral = Some(resource),
                _ if any.is_none() => any = Some(resource),
                _ => {}
            }
        }
        neutral.or(any)
    }

    pub fn image(&self, key: &str) -> Option<&Pixmap> {
        match self.get(key)?.content()? {
            ResourceContent::Image(pixmap) => Some(pixmap.as_ref()),
            ResourceContent::Model(_) => None,
        }
    }

    pub fn model(&self, key: &str) -> Option<Shared<Model>> {
        match self.get(key)?.content()? {
            ResourceContent::Model(model) => Some(model.clone()),
            ResourceContent::Image(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(|r| !r.is_available())
    }

    pub fn is_loaded(&self) -> bool {
        self.pending().next().is_none()
    }

    /// Every loaded sub-model, in registration order.
    pub fn sub_models(&self) -> Vec<Shared<Model>> {
        self.resources
            .iter()
            .filter_map(|r| match r.content() {
                Some(ResourceContent::Model(m)) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    /// Loads every pending resource; false as soon as one fails.
    pub async fn load(&mut self, loader: &dyn ResourceLoader, factory: &ElementFactory) -> bool {
        match self.try_load(loader, factory).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Resource loading failed: {}", e);
                false
            }
        }
    }

    /// Loads every pending resource, stopping at the first failure.
    ///
    /// A sub-model resource only becomes available once its own resources
    /// have loaded.
    ///
    /// A sub-model that refers back to a document already being loaded, or
    /// that nests deeper than [`MAX_MODEL_NESTING`], fails with
    /// [`ResourceError::LoadFailed`].
    pub async fn try_load(
        &mut self,
        loader: &dyn ResourceLoader,
        factory: &ElementFactory,
    ) -> Result<(), ResourceError> {
        let mut chain = Vec::new();
        self.load_nested(loader, factory, &mut chain).await
    }

    /// `chain` holds the sources of the sub-models currently being loaded.
    fn load_nested<'a>(
        &'a mut self,
        loader: &'a dyn ResourceLoader,
        factory: &'a ElementFactory,
        chain: &'a mut Vec<String>,
    ) -> Pin<Box<dyn Future<Output = Result<(), ResourceError>> + 'a>> {
        Box::pin(async move {
            for index in 0..self.resources.len() {
                let resource = &self.resources[index];
                if resource.is_available() {
                    continue;
                }
                let key = resource.key.clone();
                let kind = resource.kind;
                let content = match resource.source.clone() {
                    ResourceSource::Embedded(value) => {
                        let record = serde_json::from_value::<ModelRecord>(value).map_err(|e| {
                            ResourceError::Decode {
                                key: key.clone(),
                                reason: e.to_string(),
                            }
                        });
                        match kind {
                            ResourceKind::Model => {
                                let source = format!("#{}", key);
                                decode_model(&key, &source, record?, loader, factory, chain)
                                    .await?
                            }
                            ResourceKind::Image => {
                                return Err(ResourceError::Decode {
                                    key,
                                    reason: "embedded images are not supported".to_string(),
                                })
                            }
                        }
                    }
                    ResourceSource::Uri(uri) => {
                        let bytes = loader.fetch(&uri).await.map_err(|e| match e {
                            ResourceError::NotFound { .. } => ResourceError::LoadFailed {
                                key: key.clone(),
                                reason: format!("'{}' not found", uri),
                            },
                            other => other,
                        })?;
                        match kind {
                            ResourceKind::Image => {
                                ResourceContent::Image(Rc::new(decode_image(&key, &bytes)?))
                            }
                            ResourceKind::Model => {
                                let record = serde_json::from_slice::<ModelRecord>(&bytes)
                                    .map_err(|e| ResourceError::Decode {
                                        key: key.clone(),
                                        reason: e.to_string(),
                                    })?;
                                decode_model(&key, &uri, record, loader, factory, chain)
                                    .await?
                            }
                        }
                    }
                };
                debug!("Loaded {} resource '{}'", kind, key);
                self.resources[index].content = Some(content);
            }
            Ok(())
        })
    }
}

async fn decode_model(
    key: &str,
    source: &str,
    record: ModelRecord,
    loader: &dyn ResourceLoader,
    factory: &ElementFactory,
    chain: &mut Vec<String>,
) -> Result<ResourceContent, ResourceError> {
    if chain.iter().any(|s| s == source) {
        return Err(ResourceError::LoadFailed {
            key: key.to_string(),
            reason: "cyclic sub-model reference".to_string(),
        });
    }
    if chain.len() >= MAX_MODEL_NESTING {
        return Err(ResourceError::LoadFailed {
            key: key.to_string(),
            reason: format!("sub-models nested deeper than {}", MAX_MODEL_NESTING),
        });
    }
    let mut model = Model::from_record(record, factory).map_err(|e| ResourceError::Decode {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    chain.push(source.to_string());
    let loaded = model
        .resources_mut()
        .load_nested(loader, factory, chain)
        .await;
    chain.pop();
    loaded?;
    Ok(ResourceContent::Model(shared(model)))
}

/// Decodes image bytes into a premultiplied pixmap.
pub fn decode_image(key: &str, bytes: &[u8]) -> Result<Pixmap, ResourceError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| ResourceError::Decode {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let size = IntSize::from_wh(width, height).ok_or_else(|| ResourceError::Decode {
        key: key.to_string(),
        reason: "image has no pixels".to_string(),
    })?;
    let mut data = rgba.into_raw();
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        px[0] = (px[0] as u16 * a / 255) as u8;
        px[1] = (px[1] as u16 * a / 255) as u8;
        px[2] = (px[2] as u16 * a / 255) as u8;
    }
    Pixmap::from_vec(data, size).ok_or_else(|| ResourceError::Decode {
        key: key.to_string(),
        reason: "pixel buffer size mismatch".to_string(),
    })
}
