//! Value accessor: checked reads and writes of target properties.

use crate::api::error::TransitionError;
use crate::api::types::TransitionSpec;
use crate::components::target::{Target, TargetHandle};

/// Read the number at `path`.
pub fn get_value(target: &dyn Target, path: &str) -> Result<f64, TransitionError> {
    target
        .property(path)
        .ok_or_else(|| TransitionError::MissingProperty { path: path.to_string() })
}

/// Write `value` at `path`.
pub fn set_value(target: &mut dyn Target, path: &str, value: f64) -> Result<(), TransitionError> {
    if target.set_property(path, value) {
        Ok(())
    } else {
        Err(TransitionError::MissingProperty { path: path.to_string() })
    }
}

/// Assign every field of `specs` instantly, in order. Timing options are
/// ignored. Stops at the first path the target does not have.
pub fn set_props(target: &TargetHandle, specs: &[TransitionSpec]) -> Result<(), TransitionError> {
    let mut target = target.borrow_mut();
    for spec in specs {
        for (path, value) in &spec.fields {
            set_value(&mut *target, path, *value)?;
        }
    }
    Ok(())
}
