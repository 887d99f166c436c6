//! Hook dispatcher: the lifecycle entry points a host calls on a target.
//!
//! Each call first fans out to the target's secondary targets (filters),
//! which use their own hooks and their own generation contexts, and then
//! runs the target's hook for the phase. Animated phases bump the target's
//! generation once per call, which supersedes whatever the previous enter or
//! leave left running.

use std::rc::Rc;

use crate::api::config::EngineConfig;
use crate::api::error::TransitionError;
use crate::api::props::{AnimationHook, SetterHook, TransitionProps};
use crate::api::types::{resolve_duration, Done, Phase, TransitionSpec};
use crate::components::target::TargetHandle;
use crate::core::deferred::Deferred;
use crate::core::generation::{GenerationContext, GenerationTable};
use crate::core::scheduler::Scheduler;
use crate::extensions::easing;
use crate::systems::accessor::{get_value, set_props};
use crate::systems::ticker::run_ticker;
use crate::systems::transition::run_transition;

/// One transition: a hook table bound to a scheduler.
///
/// Usage:
///   let fade = Transition::new(props, scheduler);
///   fade.before_enter(&node)?;
///   fade.enter(&node, Done::new(|| mounted()))?;
pub struct Transition {
    props: Rc<TransitionProps>,
    scheduler: Rc<dyn Scheduler>,
    config: EngineConfig,
    generations: Rc<GenerationTable>,
}

impl Transition {
    pub fn new(props: TransitionProps, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            props: Rc::new(props),
            scheduler,
            config: EngineConfig::default(),
            generations: Rc::new(GenerationTable::new()),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Share generation contexts with other transitions, so that any of them
    /// can supersede the others on the same target.
    pub fn with_generations(mut self, generations: Rc<GenerationTable>) -> Self {
        self.generations = generations;
        self
    }

    pub fn props(&self) -> &TransitionProps {
        &self.props
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current generation state of `target`, if it has ever been animated.
    pub fn generation(&self, target: &TargetHandle) -> Option<GenerationContext> {
        self.generations.snapshot(target)
    }

    // -- Lifecycle entry points --

    pub fn before_enter(&self, target: &TargetHandle) -> Result<(), TransitionError> {
        self.call_setter_hook(&self.props, target, Phase::BeforeEnter)
    }

    pub fn enter(&self, target: &TargetHandle, done: Done) -> Result<(), TransitionError> {
        self.call_animation_hook(&self.props, target, Phase::Enter, done)
    }

    pub fn after_enter(&self, target: &TargetHandle) -> Result<(), TransitionError> {
        self.call_setter_hook(&self.props, target, Phase::AfterEnter)
    }

    pub fn enter_cancelled(&self, target: &TargetHandle) -> Result<(), TransitionError> {
        self.call_setter_hook(&self.props, target, Phase::EnterCancelled)
    }

    pub fn before_leave(&self, target: &TargetHandle) -> Result<(), TransitionError> {
        self.call_setter_hook(&self.props, target, Phase::BeforeLeave)
    }

    pub fn leave(&self, target: &TargetHandle, done: Done) -> Result<(), TransitionError> {
        self.call_animation_hook(&self.props, target, Phase::Leave, done)
    }

    pub fn after_leave(&self, target: &TargetHandle) -> Result<(), TransitionError> {
        self.call_setter_hook(&self.props, target, Phase::AfterLeave)
    }

    /// Uniform entry point. Instantaneous phases call `done` right away.
    pub fn dispatch(&self, phase: Phase, target: &TargetHandle, done: Done) -> Result<(), TransitionError> {
        if phase.is_animated() {
            self.call_animation_hook(&self.props, target, phase, done)
        } else {
            self.call_setter_hook(&self.props, target, phase)?;
            done.call();
            Ok(())
        }
    }

    fn call_setter_hook(
        &self,
        props: &TransitionProps,
        target: &TargetHandle,
        phase: Phase,
    ) -> Result<(), TransitionError> {
        let filters = target.borrow().secondary_targets();
        for filter in filters {
            let filter_props = own_props(&filter);
            self.call_setter_hook(&filter_props, &filter, phase)?;
        }

        match props.setter_hook(phase) {
            None => Ok(()),
            Some(SetterHook::Callback(callback)) => {
                callback(target);
                Ok(())
            }
            Some(SetterHook::Specs(specs)) => set_props(target, specs),
        }
    }

    fn call_animation_hook(
        &self,
        props: &TransitionProps,
        target: &TargetHandle,
        phase: Phase,
        done: Done,
    ) -> Result<(), TransitionError> {
        let filters = target.borrow().secondary_targets();
        for filter in filters {
            let filter_props = own_props(&filter);
            self.call_animation_hook(&filter_props, &filter, phase, Done::noop())?;
        }

        let Some(hook) = props.animation_hook(phase) else {
            done.call();
            return Ok(());
        };

        match hook {
            AnimationHook::Ticker(factory) => {
                let guard = self.generations.bump(target);
                log::debug!("{} dispatched to ticker (generation {})", phase, guard.id());
                let ticker = factory(target, done.clone());
                run_ticker(phase.direction(), ticker, done, guard, Rc::clone(&self.scheduler));
                Ok(())
            }
            AnimationHook::Specs(specs) => {
                // Refuse a broken config before it supersedes the running cycle.
                preflight(target, specs)?;
                let guard = self.generations.bump(target);
                log::debug!(
                    "{} dispatched to {} spec(s) (generation {})",
                    phase,
                    specs.len(),
                    guard.id()
                );

                let mut parts = Vec::with_capacity(specs.len());
                for spec in specs {
                    let duration = resolve_duration(
                        spec.duration,
                        props.duration,
                        phase.direction(),
                        self.config.fallback_duration,
                    );
                    parts.push(run_transition(
                        target,
                        spec,
                        duration,
                        &guard,
                        &self.scheduler,
                        self.config.terminal_frame,
                    )?);
                }
                Deferred::join_all(parts).on_settle(move || done.call());
                Ok(())
            }
        }
    }
}

/// Hooks a secondary target carries for itself; empty when it has none.
fn own_props(target: &TargetHandle) -> Rc<TransitionProps> {
    let props = target.borrow().transition_props();
    props.unwrap_or_default()
}

/// Check every curve, and every path a spec will read right away.
fn preflight(target: &TargetHandle, specs: &[TransitionSpec]) -> Result<(), TransitionError> {
    let target = target.borrow();
    for spec in specs {
        easing::resolve(spec.ease.as_ref())?;
        if spec.delay.is_some_and(|ms| ms > 0.0) {
            continue;
        }
        for path in spec.fields.keys() {
            get_value(&*target, path)?;
        }
    }
    Ok(())
}
