//! Identifier types and shared-state aliases.
//!
//! ## Modules
//!
//! - [`aliases`]: Type aliases for `Rc<RefCell<T>>` shared state.
//! - [`ids`]: Opaque identifiers for elements, models and controllers.

pub mod aliases;
pub mod ids;

pub use aliases::*;
pub use ids::*;
