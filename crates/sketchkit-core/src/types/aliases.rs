//! Type aliases for shared single-threaded state.
//!
//! The designer runs on one event-handling thread, so state that several
//! parts of a host need to reach (the model, the pointer capture slot) is
//! shared through `Rc<RefCell<T>>` rather than locks.
//!
//! ```rust,ignore
//! use sketchkit_core::types::*;
//!
//! let model: Shared<Model> = shared(Model::new(size));
//! model.borrow_mut().add(element);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

/// A reference-counted, interior-mutable wrapper for single-threaded sharing.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wraps a value in a [`Shared`] cell.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}
