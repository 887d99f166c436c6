// extensions/mod.rs
//
// Pure math helpers used by the runners. Nothing here touches targets or time.

pub mod easing;

pub use easing::{resolve, lerp, CubicBezier, EaseSpec, Easing, EasingFn};
