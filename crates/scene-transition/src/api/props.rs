//! Transition props: the hook table for one transition.
//!
//! Hooks are normalized once, when the props are built, into a
//! [`SetterHook`] or [`AnimationHook`], so dispatch never has to inspect
//! shapes again. Malformed hook values are dropped with a warning; a broken
//! hook must not break mounting.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::api::error::TransitionError;
use crate::api::types::{Done, DurationSpec, Phase, Ticker, TransitionSpec};
use crate::components::target::TargetHandle;

pub type SetterCallback = Rc<dyn Fn(&TargetHandle)>;
pub type TickerFactory = Rc<dyn Fn(&TargetHandle, Done) -> Option<Ticker>>;

/// Hook for an instantaneous phase.
#[derive(Clone)]
pub enum SetterHook {
    Callback(SetterCallback),
    /// Assigned instantly, no interpolation.
    Specs(Vec<TransitionSpec>),
}

/// Hook for `enter` / `leave`.
#[derive(Clone)]
pub enum AnimationHook {
    /// Called with the target and the phase's `Done`; may answer with a ticker.
    Ticker(TickerFactory),
    /// Run concurrently through the transition runner.
    Specs(Vec<TransitionSpec>),
}

#[derive(Clone, Default)]
pub struct TransitionProps {
    /// Props-level duration, used when a spec has none.
    pub duration: Option<DurationSpec>,
    setters: HashMap<Phase, SetterHook>,
    animations: HashMap<Phase, AnimationHook>,
}

impl TransitionProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, duration: impl Into<DurationSpec>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    /// Attach specs to any phase. Animated phases tween them; the others
    /// assign them instantly.
    pub fn with_specs(mut self, phase: Phase, specs: impl IntoIterator<Item = TransitionSpec>) -> Self {
        let specs: Vec<TransitionSpec> = specs.into_iter().collect();
        if phase.is_animated() {
            self.animations.insert(phase, AnimationHook::Specs(specs));
        } else {
            self.setters.insert(phase, SetterHook::Specs(specs));
        }
        self
    }

    pub fn with_spec(self, phase: Phase, spec: TransitionSpec) -> Self {
        self.with_specs(phase, [spec])
    }

    /// Attach a plain callback to an instantaneous phase.
    pub fn with_setter(mut self, phase: Phase, callback: impl Fn(&TargetHandle) + 'static) -> Self {
        if phase.is_animated() {
            log::warn!("ignoring setter callback for animated phase '{}'", phase);
        } else {
            self.setters.insert(phase, SetterHook::Callback(Rc::new(callback)));
        }
        self
    }

    /// Attach a ticker factory to `enter` or `leave`.
    pub fn with_ticker(
        mut self,
        phase: Phase,
        factory: impl Fn(&TargetHandle, Done) -> Option<Ticker> + 'static,
    ) -> Self {
        if phase.is_animated() {
            self.animations.insert(phase, AnimationHook::Ticker(Rc::new(factory)));
        } else {
            log::warn!("ignoring ticker for instantaneous phase '{}'", phase);
        }
        self
    }

    pub fn setter_hook(&self, phase: Phase) -> Option<&SetterHook> {
        self.setters.get(&phase)
    }

    pub fn animation_hook(&self, phase: Phase) -> Option<&AnimationHook> {
        self.animations.get(&phase)
    }

    pub fn is_empty(&self) -> bool {
        self.setters.is_empty() && self.animations.is_empty()
    }

    /// Parse props from JSON.
    ///
    /// Keys may be kebab-case. Each phase is looked up under its name, then
    /// its `on*` alias; the first present key wins. A hook is a spec object
    /// or an array of them (nulls skipped); anything else is ignored.
    pub fn from_json(json: &str) -> Result<Self, TransitionError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, TransitionError> {
        let Value::Object(raw) = value else {
            return Err(TransitionError::InvalidConfig {
                message: "transition props must be a JSON object".into(),
            });
        };
        let entries: HashMap<String, &Value> = raw.iter().map(|(k, v)| (camelize(k), v)).collect();
        let present = |key: &str| entries.get(key).copied().filter(|v| !v.is_null());

        let mut props = Self::new();
        if let Some(raw) = present("duration") {
            match serde_json::from_value::<DurationSpec>(raw.clone()) {
                Ok(duration) => props.duration = Some(duration),
                Err(err) => log::warn!("ignoring malformed duration: {}", err),
            }
        }

        for phase in Phase::ALL {
            let Some(raw) = present(phase.name()).or_else(|| present(phase.alias())) else {
                continue;
            };
            match parse_specs(raw) {
                Some(specs) => props = props.with_specs(phase, specs),
                None => log::warn!("ignoring malformed '{}' hook", phase),
            }
        }
        Ok(props)
    }
}

fn parse_specs(value: &Value) -> Option<Vec<TransitionSpec>> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(parse_spec)
            .collect(),
        Value::Object(_) => parse_spec(value).map(|spec| vec![spec]),
        _ => None,
    }
}

fn parse_spec(value: &Value) -> Option<TransitionSpec> {
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value.clone()).ok()
}

/// `before-enter` → `beforeEnter`.
pub fn camelize(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl fmt::Debug for TransitionProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut setters: Vec<&str> = self.setters.keys().map(|p| p.name()).collect();
        let mut animations: Vec<&str> = self.animations.keys().map(|p| p.name()).collect();
        setters.sort_unstable();
        animations.sort_unstable();
        f.debug_struct("TransitionProps")
            .field("duration", &self.duration)
            .field("setters", &setters)
            .field("animations", &animations)
            .finish()
    }
}
