use sketchkit_core::{shared, ControllerId, Shared};

/// The pointer-capture slot shared by every controller of one host.
///
/// A controller acquires it on pointer-down and keeps receiving move and
/// up events until it releases; at most one controller holds it at a time.
#[derive(Debug, Clone)]
pub struct PointerCapture(Shared<Option<ControllerId>>);

impl PointerCapture {
    pub fn new() -> Self {
        Self(shared(None))
    }

    /// Takes the capture for `id`; false if another controller holds it.
    pub fn acquire(&self, id: ControllerId) -> bool {
        let mut holder = self.0.borrow_mut();
        match *holder {
            Some(current) if current != id => false,
            _ => {
                *holder = Some(id);
                true
            }
        }
    }

    /// Releases the capture if `id` holds it.
    pub fn release(&self, id: ControllerId) -> bool {
        let mut holder = self.0.borrow_mut();
        if *holder == Some(id) {
            *holder = None;
            true
        } else {
            false
        }
    }

    pub fn holder(&self) -> Option<ControllerId> {
        *self.0.borrow()
    }

    pub fn is_held_by(&self, id: ControllerId) -> bool {
        self.holder() == Some(id)
    }

    pub fn is_held_by_other(&self, id: ControllerId) -> bool {
        self.holder().is_some_and(|h| h != id)
    }
}

impl Default for PointerCapture {
    fn default() -> Self {
        Self::new()
    }
}
