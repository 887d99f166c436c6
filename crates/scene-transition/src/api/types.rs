use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::Deserialize;

use crate::extensions::easing::EaseSpec;

/// Lifecycle moments the host reports for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    BeforeEnter,
    Enter,
    AfterEnter,
    EnterCancelled,
    BeforeLeave,
    Leave,
    AfterLeave,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::BeforeEnter,
        Phase::Enter,
        Phase::AfterEnter,
        Phase::EnterCancelled,
        Phase::BeforeLeave,
        Phase::Leave,
        Phase::AfterLeave,
    ];

    /// Hook name as written in configs.
    pub fn name(self) -> &'static str {
        match self {
            Phase::BeforeEnter => "beforeEnter",
            Phase::Enter => "enter",
            Phase::AfterEnter => "afterEnter",
            Phase::EnterCancelled => "enterCancelled",
            Phase::BeforeLeave => "beforeLeave",
            Phase::Leave => "leave",
            Phase::AfterLeave => "afterLeave",
        }
    }

    /// Event-style alias, checked after [`Phase::name`].
    pub fn alias(self) -> &'static str {
        match self {
            Phase::BeforeEnter => "onBeforeEnter",
            Phase::Enter => "onEnter",
            Phase::AfterEnter => "onAfterEnter",
            Phase::EnterCancelled => "onEnterCancelled",
            Phase::BeforeLeave => "onBeforeLeave",
            Phase::Leave => "onLeave",
            Phase::AfterLeave => "onAfterLeave",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Phase::BeforeEnter | Phase::Enter | Phase::AfterEnter | Phase::EnterCancelled => {
                Direction::Enter
            }
            Phase::BeforeLeave | Phase::Leave | Phase::AfterLeave => Direction::Leave,
        }
    }

    /// Enter and leave run over time; every other phase is instantaneous.
    pub fn is_animated(self) -> bool {
        matches!(self, Phase::Enter | Phase::Leave)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Enter,
    Leave,
}

/// A duration in milliseconds, either shared or per direction.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DurationSpec {
    Uniform(f64),
    Split { enter: f64, leave: f64 },
}

impl From<f64> for DurationSpec {
    fn from(ms: f64) -> Self {
        Self::Uniform(ms)
    }
}

/// Durations resolved for both directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseDurations {
    pub enter: f64,
    pub leave: f64,
}

impl PhaseDurations {
    pub fn get(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Enter => self.enter,
            Direction::Leave => self.leave,
        }
    }
}

/// Spread a duration over both directions. Absent stays absent.
pub fn normalize_duration(duration: Option<DurationSpec>) -> Option<PhaseDurations> {
    match duration? {
        DurationSpec::Uniform(ms) => Some(PhaseDurations { enter: ms, leave: ms }),
        DurationSpec::Split { enter, leave } => Some(PhaseDurations { enter, leave }),
    }
}

/// Pick the duration for one direction: the spec's own, then the props',
/// then `fallback`.
pub fn resolve_duration(
    spec: Option<DurationSpec>,
    props: Option<DurationSpec>,
    direction: Direction,
    fallback: f64,
) -> f64 {
    normalize_duration(spec)
        .or_else(|| normalize_duration(props))
        .map(|d| d.get(direction))
        .unwrap_or(fallback)
}

/// Clamp a duration to something a frame chain can finish: negative and
/// non-finite values become 0, which completes on the first frame.
pub fn playable_duration(ms: f64) -> f64 {
    if ms.is_finite() && ms > 0.0 {
        ms
    } else {
        0.0
    }
}

/// Declarative tween: property path → target value, plus timing options.
///
/// In JSON every key other than `delay`, `duration` and `ease` is a field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransitionSpec {
    /// Milliseconds to wait before starting.
    #[serde(default)]
    pub delay: Option<f64>,
    #[serde(default)]
    pub duration: Option<DurationSpec>,
    #[serde(default)]
    pub ease: Option<EaseSpec>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, f64>,
}

impl TransitionSpec {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Builder methods --

    pub fn with_field(mut self, path: impl Into<String>, to: f64) -> Self {
        self.fields.insert(path.into(), to);
        self
    }

    pub fn with_delay(mut self, ms: f64) -> Self {
        self.delay = Some(ms);
        self
    }

    pub fn with_duration(mut self, duration: impl Into<DurationSpec>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn with_ease(mut self, ease: impl Into<EaseSpec>) -> Self {
        self.ease = Some(ease.into());
        self
    }
}

/// Imperative per-frame callback driven for a fixed duration.
pub struct Ticker {
    /// Cycle length in milliseconds.
    pub duration: f64,
    /// Called every frame with the cycle's progress.
    pub tick: Box<dyn FnMut(f64)>,
}

impl Ticker {
    pub fn new(duration: f64, tick: impl FnMut(f64) + 'static) -> Self {
        Self {
            duration,
            tick: Box::new(tick),
        }
    }
}

impl fmt::Debug for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticker")
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

/// Completion callback for an animated phase. Clones share one callback,
/// which runs at most once.
#[derive(Clone)]
pub struct Done {
    callback: Rc<RefCell<Option<Box<dyn FnOnce()>>>>,
}

impl Done {
    pub fn new(callback: impl FnOnce() + 'static) -> Self {
        Self {
            callback: Rc::new(RefCell::new(Some(Box::new(callback)))),
        }
    }

    pub fn noop() -> Self {
        Self {
            callback: Rc::new(RefCell::new(None)),
        }
    }

    /// Run the callback if it has not run yet.
    pub fn call(&self) {
        let callback = self.callback.borrow_mut().take();
        if let Some(callback) = callback {
            callback();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.callback.borrow().is_some()
    }
}

impl fmt::Debug for Done {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Done")
            .field("pending", &self.is_pending())
            .finish()
    }
}
