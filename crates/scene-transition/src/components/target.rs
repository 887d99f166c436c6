use std::cell::RefCell;
use std::rc::Rc;

use crate::api::props::TransitionProps;

/// Shared handle to an animated object. Identity is the allocation, never
/// the contents.
pub type TargetHandle = Rc<RefCell<dyn Target>>;

/// An object whose numeric properties the engine reads and writes.
///
/// Paths are dotted (`"position.x"`). A path that `property` cannot read must
/// also fail in `set_property`; the engine never creates properties.
pub trait Target {
    /// Read the number at `path`, or `None` if the path does not exist.
    fn property(&self, path: &str) -> Option<f64>;

    /// Write `value` at `path`. Returns `false` if the path does not exist.
    fn set_property(&mut self, path: &str, value: f64) -> bool;

    /// Secondary objects (filters) that receive the same lifecycle hooks.
    fn secondary_targets(&self) -> Vec<TargetHandle> {
        Vec::new()
    }

    /// Hooks carried by the object itself. Used when it is animated as a
    /// secondary target of something else.
    fn transition_props(&self) -> Option<Rc<TransitionProps>> {
        None
    }
}

/// Identity key for a target handle.
pub(crate) fn target_key(target: &TargetHandle) -> usize {
    Rc::as_ptr(target) as *const () as usize
}
