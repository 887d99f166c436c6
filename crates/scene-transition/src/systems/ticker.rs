//! Ticker runner: drives a user `tick(progress)` callback for one cycle.
//!
//! Enter counts progress up from the resume point and checkpoints its elapsed
//! time. Leave counts it down and checkpoints its remaining time. An enter
//! that interrupts a leave therefore picks up at the progress the leave had
//! reached.

use std::cell::RefCell;
use std::rc::Rc;

use crate::api::types::{playable_duration, Direction, Done, Ticker};
use crate::core::generation::GenerationGuard;
use crate::core::scheduler::Scheduler;

struct TickerRun {
    direction: Direction,
    duration: f64,
    /// `startedAt` for enter, `endAt` for leave.
    anchor: f64,
    tick: RefCell<Box<dyn FnMut(f64)>>,
    done: Done,
    guard: GenerationGuard,
    scheduler: Rc<dyn Scheduler>,
}

/// Drive `ticker` until its cycle ends or `guard` goes stale, then call `done`.
///
/// `None` is a legitimate "no animation" answer from the hook: nothing runs
/// and `done` is left to whoever produced it.
pub fn run_ticker(
    direction: Direction,
    ticker: Option<Ticker>,
    done: Done,
    guard: GenerationGuard,
    scheduler: Rc<dyn Scheduler>,
) {
    let Some(Ticker { duration, tick }) = ticker else {
        return;
    };
    let duration = playable_duration(duration);

    let now = scheduler.now();
    let prior = guard.elapsed().clamp(0.0, duration);
    let anchor = match direction {
        Direction::Enter => now - prior,
        Direction::Leave => now + duration - prior,
    };
    log::debug!(
        "{:?} ticker started: {}ms, resuming from checkpoint {}ms",
        direction,
        duration,
        prior
    );

    let run = Rc::new(TickerRun {
        direction,
        duration,
        anchor,
        tick: RefCell::new(tick),
        done,
        guard,
        scheduler,
    });
    TickerRun::step(run);
}

impl TickerRun {
    fn step(self: Rc<Self>) {
        if self.guard.is_stale() {
            self.done.call();
            return;
        }

        let now = self.scheduler.now();
        let (progress, checkpoint, finished) = self.sample(now);
        self.guard.record_elapsed(checkpoint);
        (self.tick.borrow_mut())(progress);

        if finished {
            // Reset before `done`: it may start the next cycle synchronously.
            self.guard.record_elapsed(0.0);
            self.done.call();
        } else {
            let scheduler = Rc::clone(&self.scheduler);
            scheduler.request_frame(Box::new(move || self.step()));
        }
    }

    /// `(progress, checkpoint, finished)` at time `now`. The checkpoint is
    /// the elapsed time for enter and the remaining time for leave.
    fn sample(&self, now: f64) -> (f64, f64, bool) {
        if self.duration == 0.0 {
            let progress = match self.direction {
                Direction::Enter => 1.0,
                Direction::Leave => 0.0,
            };
            return (progress, 0.0, true);
        }

        match self.direction {
            Direction::Enter => {
                let elapsed = now - self.anchor;
                (elapsed / self.duration, elapsed, now >= self.anchor + self.duration)
            }
            Direction::Leave => {
                let remaining = self.anchor - now;
                (remaining / self.duration, remaining, now >= self.anchor)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::generation::GenerationContext;
    use crate::core::scheduler::FrameQueue;
    use std::cell::Cell;

    struct Probe {
        ticks: Rc<RefCell<Vec<f64>>>,
        done_calls: Rc<Cell<u32>>,
    }

    impl Probe {
        fn new() -> Self {
            Self {
                ticks: Rc::new(RefCell::new(Vec::new())),
                done_calls: Rc::new(Cell::new(0)),
            }
        }

        fn ticker(&self, duration: f64) -> Option<Ticker> {
            let ticks = self.ticks.clone();
            Some(Ticker::new(duration, move |p| ticks.borrow_mut().push(p)))
        }

        fn done(&self) -> Done {
            let calls = self.done_calls.clone();
            Done::new(move || calls.set(calls.get() + 1))
        }

        fn last(&self) -> f64 {
            *self.ticks.borrow().last().unwrap()
        }
    }

    fn queue() -> (Rc<FrameQueue>, Rc<dyn Scheduler>) {
        let queue = Rc::new(FrameQueue::new());
        let scheduler: Rc<dyn Scheduler> = queue.clone();
        (queue, scheduler)
    }

    #[test]
    fn enter_counts_up_and_completes_once() {
        let (queue, scheduler) = queue();
        let ctx = Rc::new(RefCell::new(GenerationContext::new()));
        let probe = Probe::new();

        run_ticker(Direction::Enter, probe.ticker(100.0), probe.done(), GenerationGuard::bump(&ctx), scheduler);
        assert_eq!(probe.last(), 0.0);

        queue.advance(50.0);
        assert_eq!(probe.last(), 0.5);
        assert_eq!(ctx.borrow().time, 50.0);

        queue.advance(50.0);
        assert_eq!(probe.last(), 1.0);
        assert_eq!(probe.done_calls.get(), 1);
        assert_eq!(ctx.borrow().time, 0.0);
        assert!(queue.is_idle());
    }

    #[test]
    fn fresh_leave_starts_at_one_and_falls() {
        let (queue, scheduler) = queue();
        let ctx = Rc::new(RefCell::new(GenerationContext::new()));
        let probe = Probe::new();

        run_ticker(Direction::Leave, probe.ticker(200.0), probe.done(), GenerationGuard::bump(&ctx), scheduler);
        assert_eq!(probe.last(), 1.0);

        queue.advance(50.0);
        assert_eq!(probe.last(), 0.75);
        assert_eq!(ctx.borrow().time, 150.0);

        queue.run_until_idle(50.0, 10);
        assert_eq!(probe.last(), 0.0);
        assert_eq!(probe.done_calls.get(), 1);
        assert_eq!(ctx.borrow().time, 0.0);
    }

    #[test]
    fn superseded_ticker_completes_without_ticking() {
        let (queue, scheduler) = queue();
        let ctx = Rc::new(RefCell::new(GenerationContext::new()));
        let probe = Probe::new();

        run_ticker(Direction::Enter, probe.ticker(100.0), probe.done(), GenerationGuard::bump(&ctx), scheduler);
        queue.advance(30.0);
        let ticks = probe.ticks.borrow().len();

        GenerationGuard::bump(&ctx);
        queue.advance(16.0);
        assert_eq!(probe.ticks.borrow().len(), ticks);
        assert_eq!(probe.done_calls.get(), 1);
        assert_eq!(ctx.borrow().time, 30.0);
        assert!(queue.is_idle());
    }

    #[test]
    fn enter_picks_up_where_interrupted_leave_stopped() {
        let (queue, scheduler) = queue();
        let ctx = Rc::new(RefCell::new(GenerationContext::new()));
        let leave = Probe::new();
        let enter = Probe::new();

        run_ticker(Direction::Leave, leave.ticker(1000.0), leave.done(), GenerationGuard::bump(&ctx), scheduler.clone());
        queue.advance(250.0);
        assert_eq!(leave.last(), 0.75);
        assert_eq!(ctx.borrow().time, 750.0);

        run_ticker(Direction::Enter, enter.ticker(1000.0), enter.done(), GenerationGuard::bump(&ctx), scheduler);
        assert_eq!(enter.ticks.borrow()[0], leave.last());

        queue.advance(100.0);
        assert_eq!(enter.last(), 0.85);
        assert_eq!(ctx.borrow().time, 850.0);
        assert_eq!(leave.done_calls.get(), 1);
    }

    #[test]
    fn leave_after_interrupted_enter_counts_down_from_the_remainder() {
        let (queue, scheduler) = queue();
        let ctx = Rc::new(RefCell::new(GenerationContext::new()));
        let enter = Probe::new();
        let leave = Probe::new();

        run_ticker(Direction::Enter, enter.ticker(1000.0), enter.done(), GenerationGuard::bump(&ctx), scheduler.clone());
        queue.advance(300.0);
        assert_eq!(enter.last(), 0.3);

        // endAt = now + duration - elapsed, so leave opens at 1 - p.
        run_ticker(Direction::Leave, leave.ticker(1000.0), leave.done(), GenerationGuard::bump(&ctx), scheduler);
        assert!((leave.ticks.borrow()[0] - (1.0 - enter.last())).abs() < 1e-12);
        assert_eq!(ctx.borrow().time, 700.0);

        queue.advance(100.0);
        assert!((leave.last() - 0.6).abs() < 1e-12);
        assert_eq!(ctx.borrow().time, 600.0);
        assert_eq!(enter.done_calls.get(), 1);
    }

    #[test]
    fn enter_after_interrupted_enter_keeps_its_elapsed_time() {
        let (queue, scheduler) = queue();
        let ctx = Rc::new(RefCell::new(GenerationContext::new()));
        let first = Probe::new();
        let second = Probe::new();

        run_ticker(Direction::Enter, first.ticker(1000.0), first.done(), GenerationGuard::bump(&ctx), scheduler.clone());
        queue.advance(400.0);

        run_ticker(Direction::Enter, second.ticker(1000.0), second.done(), GenerationGuard::bump(&ctx), scheduler);
        assert_eq!(second.ticks.borrow()[0], first.last());
        assert_eq!(ctx.borrow().time, 400.0);

        queue.advance(600.0);
        assert_eq!(second.last(), 1.0);
        assert_eq!(second.done_calls.get(), 1);
        assert_eq!(first.done_calls.get(), 1);
    }

    #[test]
    fn absent_ticker_is_a_no_op() {
        let (queue, scheduler) = queue();
        let probe = Probe::new();

        run_ticker(Direction::Enter, None, probe.done(), GenerationGuard::detached(), scheduler);
        assert_eq!(probe.done_calls.get(), 0);
        assert!(queue.is_idle());
    }

    #[test]
    fn zero_duration_ticks_terminal_progress_once() {
        let (queue, scheduler) = queue();
        let probe = Probe::new();

        run_ticker(Direction::Leave, probe.ticker(0.0), probe.done(), GenerationGuard::detached(), scheduler);
        assert_eq!(*probe.ticks.borrow(), vec![0.0]);
        assert_eq!(probe.done_calls.get(), 1);
        assert!(queue.is_idle());
    }

    #[test]
    fn non_finite_duration_finishes_at_once() {
        let (queue, scheduler) = queue();
        let probe = Probe::new();

        run_ticker(Direction::Enter, probe.ticker(f64::NAN), probe.done(), GenerationGuard::detached(), scheduler);
        assert_eq!(*probe.ticks.borrow(), vec![1.0]);
        assert_eq!(probe.done_calls.get(), 1);
        assert!(queue.is_idle());
    }
}
