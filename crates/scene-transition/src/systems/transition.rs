//! Transition runner: drives one declarative spec to completion.
//!
//! Every field gets its own frame chain starting from the value it has when
//! the spec starts. The first write happens on the next frame, so a spec
//! superseded before any frame runs never touches the target. The spec is
//! done when all chains have settled.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::api::config::TerminalFrame;
use crate::api::error::TransitionError;
use crate::api::types::{playable_duration, TransitionSpec};
use crate::components::target::TargetHandle;
use crate::core::deferred::Deferred;
use crate::core::generation::GenerationGuard;
use crate::core::scheduler::Scheduler;
use crate::extensions::easing::{self, lerp, EasingFn};
use crate::systems::accessor::{get_value, set_value};

/// Everything the field chains of one spec share.
struct TweenPlan {
    target: TargetHandle,
    fields: BTreeMap<String, f64>,
    ease: EasingFn,
    duration: f64,
    guard: GenerationGuard,
    scheduler: Rc<dyn Scheduler>,
    terminal: TerminalFrame,
}

struct FieldTween {
    plan: Rc<TweenPlan>,
    path: String,
    from: f64,
    to: f64,
    started_at: f64,
    end_at: f64,
    settled: Deferred,
}

/// Run `spec` on `target` over `duration` ms.
///
/// Without a delay, the easing and every field path are checked before the
/// first write and failures come back here. With a delay, the same checks
/// happen when the delay ends; a failure then is logged and the spec settles.
pub fn run_transition(
    target: &TargetHandle,
    spec: &TransitionSpec,
    duration: f64,
    guard: &GenerationGuard,
    scheduler: &Rc<dyn Scheduler>,
    terminal: TerminalFrame,
) -> Result<Deferred, TransitionError> {
    let ease = easing::resolve(spec.ease.as_ref())?;
    let plan = Rc::new(TweenPlan {
        target: Rc::clone(target),
        fields: spec.fields.clone(),
        ease,
        duration: playable_duration(duration),
        guard: guard.clone(),
        scheduler: Rc::clone(scheduler),
        terminal,
    });

    let delay = match spec.delay {
        Some(ms) if ms > 0.0 => ms,
        _ => return start(&plan),
    };

    // No generation check over the delay window; the first frame does it.
    let settled = Deferred::new();
    let on_timeout = settled.clone();
    scheduler.set_timeout(
        delay,
        Box::new(move || match start(&plan) {
            Ok(joined) => joined.on_settle(move || on_timeout.resolve()),
            Err(err) => {
                log::error!("delayed transition could not start: {}", err);
                on_timeout.resolve();
            }
        }),
    );
    Ok(settled)
}

fn start(plan: &Rc<TweenPlan>) -> Result<Deferred, TransitionError> {
    let started_at = plan.scheduler.now();
    let end_at = started_at + plan.duration;

    let origins = {
        let target = plan.target.borrow();
        plan.fields
            .iter()
            .map(|(path, to)| Ok((path.clone(), get_value(&*target, path)?, *to)))
            .collect::<Result<Vec<_>, TransitionError>>()?
    };

    let parts: Vec<Deferred> = origins
        .into_iter()
        .map(|(path, from, to)| {
            let tween = Rc::new(FieldTween {
                plan: Rc::clone(plan),
                path,
                from,
                to,
                started_at,
                end_at,
                settled: Deferred::new(),
            });
            let settled = tween.settled.clone();
            plan.scheduler.request_frame(Box::new(move || tween.step()));
            settled
        })
        .collect();

    Ok(Deferred::join_all(parts))
}

impl FieldTween {
    fn step(self: Rc<Self>) {
        if self.plan.guard.is_stale() {
            self.settled.resolve();
            return;
        }

        let now = self.plan.scheduler.now();
        let finished = now >= self.end_at;
        let value = self.value_at(now, finished);

        let written = set_value(&mut *self.plan.target.borrow_mut(), &self.path, value);
        if let Err(err) = written {
            log::error!("transition stopped: {}", err);
            self.settled.resolve();
            return;
        }

        if finished {
            log::trace!("transition of '{}' finished at {}", self.path, value);
            self.settled.resolve();
        } else {
            let scheduler = Rc::clone(&self.plan.scheduler);
            scheduler.request_frame(Box::new(move || self.step()));
        }
    }

    fn value_at(&self, now: f64, finished: bool) -> f64 {
        if finished && self.plan.terminal == TerminalFrame::Snap {
            return self.to;
        }
        let progress = if self.plan.duration > 0.0 {
            (now - self.started_at) / self.plan.duration
        } else {
            1.0
        };
        lerp(self.from, self.to, (self.plan.ease)(progress))
    }
}
