pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::config::{EngineConfig, TerminalFrame};
pub use api::error::TransitionError;
pub use api::props::{AnimationHook, SetterHook, TransitionProps};
pub use api::types::{Direction, Done, DurationSpec, Phase, PhaseDurations, Ticker, TransitionSpec};
pub use components::node::SceneNode;
pub use components::property_bag::{Property, PropertyBag};
pub use components::target::{Target, TargetHandle};
pub use core::deferred::Deferred;
pub use core::generation::{GenerationContext, GenerationGuard, GenerationTable};
pub use core::scheduler::{FrameQueue, Scheduler};
pub use systems::accessor::{get_value, set_props, set_value};
pub use systems::dispatch::Transition;
pub use systems::ticker::run_ticker;
pub use systems::transition::run_transition;

// Extensions: curve math, independent of targets and time
pub use extensions::{Easing, EaseSpec, CubicBezier, EasingFn, lerp};
