//! Error handling for SketchKit
//!
//! Provides error types for each layer of the engine:
//! - Geometry errors (construction and parsing of shapes)
//! - Model errors (element lookup, element types, model documents)
//! - Resource errors (registration, loading and decoding)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Geometry error type
///
/// Raised when an element is built from geometry it cannot represent.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A point list that must hold at least one point was empty
    #[error("Empty geometry: {kind} requires at least one point")]
    EmptyGeometry {
        /// The element kind being constructed.
        kind: String,
    },

    /// Geometry that is structurally invalid
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry {
        /// Why the geometry was rejected.
        reason: String,
    },

    /// A point index outside the element's point list
    #[error("Point index {index} out of range (element has {count} points)")]
    InvalidPointIndex {
        /// The requested index.
        index: usize,
        /// The number of points the element holds.
        count: usize,
    },

    /// Textual geometry that could not be parsed
    #[error("Cannot parse {kind} from '{input}'")]
    Parse {
        /// What was being parsed (point, size, region, path...).
        kind: &'static str,
        /// The rejected input.
        input: String,
    },
}

impl GeometryError {
    pub fn empty(kind: impl Into<String>) -> Self {
        Self::EmptyGeometry { kind: kind.into() }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }

    pub fn parse(kind: &'static str, input: impl Into<String>) -> Self {
        Self::Parse {
            kind,
            input: input.into(),
        }
    }
}

/// Model error type
///
/// Represents failures while building, querying or editing a model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// No factory is registered for an element type name
    #[error("Unknown element type: {name}")]
    UnknownElementType {
        /// The unregistered type name.
        name: String,
    },

    /// An element key that is not part of the model
    #[error("Element not found: {key}")]
    ElementNotFound {
        /// The missing key.
        key: String,
    },

    /// An operation that needs a model or element target had none
    #[error("Missing target: {what}")]
    MissingTarget {
        /// What the operation needed.
        what: String,
    },

    /// A model document record that cannot be turned into an element
    #[error("Invalid record: {reason}")]
    InvalidRecord {
        /// Why the record was rejected.
        reason: String,
    },
}

/// Resource error type
///
/// Represents failures of the resource manager and its loaders.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// No resource is registered under the key
    #[error("Resource not found: {key}")]
    NotFound {
        /// The requested key.
        key: String,
    },

    /// The loader failed to fetch the resource
    #[error("Failed to load resource '{key}': {reason}")]
    LoadFailed {
        /// The resource key.
        key: String,
        /// The loader's reason.
        reason: String,
    },

    /// The resource was fetched but could not be decoded
    #[error("Failed to decode resource '{key}': {reason}")]
    Decode {
        /// The resource key.
        key: String,
        /// The decoder's reason.
        reason: String,
    },

    /// The resource is registered but has not been loaded yet
    #[error("Resource not loaded: {key}")]
    Unavailable {
        /// The resource key.
        key: String,
    },
}

/// Main error type for SketchKit
///
/// Wraps the layer specific errors and the I/O and JSON failures that can
/// occur while loading documents.
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Model error
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Resource error
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with a message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error with a message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}

/// Result type alias using SketchKit Error
pub type Result<T> = std::result::Result<T, Error>;
