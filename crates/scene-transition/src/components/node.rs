use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use crate::components::target::{Target, TargetHandle};

/// Display object with the usual transform properties.
/// Designed as a ready-made target for hosts that have nothing richer.
///
/// Values are stored as `f32`, like the glam vectors they live in. A number
/// written through [`Target::set_property`] reads back exactly only when it
/// is representable in `f32`; `0.3` comes back as `0.30000001192092896`.
/// Tweens still end exactly on their target, up to that same rounding.
#[derive(Clone)]
pub struct SceneNode {
    /// Free-form label for finding nodes by name.
    pub label: String,
    /// Position in parent space. Also addressable as `x` / `y`.
    pub position: Vec2,
    /// Rotation in radians. `angle` addresses the same value in degrees.
    pub rotation: f32,
    pub scale: Vec2,
    pub pivot: Vec2,
    pub skew: Vec2,
    /// Opacity, 0 (transparent) to 1 (opaque).
    pub alpha: f32,
    /// Secondary targets animated alongside the node.
    pub filters: Vec<TargetHandle>,
}

impl SceneNode {
    /// Create a node at the origin, unscaled and fully opaque.
    pub fn new() -> Self {
        Self {
            label: String::new(),
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            pivot: Vec2::ZERO,
            skew: Vec2::ZERO,
            alpha: 1.0,
            filters: Vec::new(),
        }
    }

    pub fn into_handle(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    // -- Builder pattern --

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_filter(mut self, filter: TargetHandle) -> Self {
        self.filters.push(filter);
        self
    }

    fn slot(&mut self, path: &str) -> Option<&mut f32> {
        let slot = match path {
            "x" | "position.x" => &mut self.position.x,
            "y" | "position.y" => &mut self.position.y,
            "rotation" => &mut self.rotation,
            "alpha" => &mut self.alpha,
            "scale.x" => &mut self.scale.x,
            "scale.y" => &mut self.scale.y,
            "pivot.x" => &mut self.pivot.x,
            "pivot.y" => &mut self.pivot.y,
            "skew.x" => &mut self.skew.x,
            "skew.y" => &mut self.skew.y,
            _ => return None,
        };
        Some(slot)
    }
}

impl Default for SceneNode {
    fn default() -> Self {
        Self::new()
    }
}

impl Target for SceneNode {
    fn property(&self, path: &str) -> Option<f64> {
        let value = match path {
            "x" | "position.x" => self.position.x,
            "y" | "position.y" => self.position.y,
            "rotation" => self.rotation,
            "angle" => self.rotation.to_degrees(),
            "alpha" => self.alpha,
            "scale.x" => self.scale.x,
            "scale.y" => self.scale.y,
            "pivot.x" => self.pivot.x,
            "pivot.y" => self.pivot.y,
            "skew.x" => self.skew.x,
            "skew.y" => self.skew.y,
            _ => return None,
        };
        Some(value as f64)
    }

    fn set_property(&mut self, path: &str, value: f64) -> bool {
        if path == "angle" {
            self.rotation = (value as f32).to_radians();
            return true;
        }
        match self.slot(path) {
            Some(slot) => {
                *slot = value as f32;
                true
            }
            None => false,
        }
    }

    fn secondary_targets(&self) -> Vec<TargetHandle> {
        self.filters.clone()
    }
}

impl std::fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneNode")
            .field("label", &self.label)
            .field("position", &self.position)
            .field("rotation", &self.rotation)
            .field("scale", &self.scale)
            .field("alpha", &self.alpha)
            .field("filters", &self.filters.len())
            .finish()
    }
}
