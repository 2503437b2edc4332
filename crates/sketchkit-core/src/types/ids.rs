//! Opaque identifiers.
//!
//! Elements refer to their owning model and parent element through these
//! keys instead of references; lookups go through the owning model.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new unique identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $prefix, &self.0.to_string()[..8])
            }
        }
    };
}

define_id!(
    /// Runtime identity of an element inside its model.
    ElementKey,
    "El"
);
define_id!(
    /// Identity of a model, used as an element's owner back-reference.
    ModelId,
    "Model"
);
define_id!(
    /// Identity of a design controller, used for pointer capture.
    ControllerId,
    "Ctl"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(ElementKey::new(), ElementKey::new());
        assert_ne!(ModelId::new(), ModelId::new());
    }

    #[test]
    fn test_display_prefix() {
        let key = ElementKey::new();
        assert!(key.to_string().starts_with("El("));
        assert_eq!(key.to_string().len(), "El()".len() + 8);
    }
}
