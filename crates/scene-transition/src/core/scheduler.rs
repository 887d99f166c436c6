use std::cell::{Cell, RefCell};

/// A continuation handed to the scheduler.
pub type FrameCallback = Box<dyn FnOnce()>;

/// The outbound timing capability the runners depend on.
///
/// The engine never owns a render loop. It asks to be woken once before the
/// next rendered frame, or after a wall-clock delay, and reads the clock in
/// milliseconds when it wakes.
pub trait Scheduler {
    /// Current time in milliseconds.
    fn now(&self) -> f64;

    /// Run `callback` once, before the next rendered frame.
    fn request_frame(&self, callback: FrameCallback);

    /// Run `callback` once, after `delay_ms` of wall-clock time.
    fn set_timeout(&self, delay_ms: f64, callback: FrameCallback);
}

struct Timer {
    due: f64,
    seq: u64,
    callback: FrameCallback,
}

/// Host-driven scheduler. The host calls [`FrameQueue::frame`] from its own
/// loop with the frame timestamp; tests drive it with [`FrameQueue::advance`].
///
/// Callbacks requested while a frame is running are deferred to the next
/// frame, so a chain that reschedules itself advances once per frame.
pub struct FrameQueue {
    now: Cell<f64>,
    frames: RefCell<Vec<FrameCallback>>,
    timers: RefCell<Vec<Timer>>,
    next_seq: Cell<u64>,
    frame_count: Cell<u64>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::starting_at(0.0)
    }

    /// Create a queue whose clock starts at `now` milliseconds.
    pub fn starting_at(now: f64) -> Self {
        Self {
            now: Cell::new(now),
            frames: RefCell::new(Vec::new()),
            timers: RefCell::new(Vec::new()),
            next_seq: Cell::new(0),
            frame_count: Cell::new(0),
        }
    }

    /// Run one frame at time `now`: fire due timers, then every frame
    /// callback queued before this call. The clock never moves backwards.
    pub fn frame(&self, now: f64) {
        self.now.set(now.max(self.now.get()));
        self.fire_due_timers();

        let callbacks = std::mem::take(&mut *self.frames.borrow_mut());
        for callback in callbacks {
            callback();
        }
        self.frame_count.set(self.frame_count.get() + 1);
    }

    /// Advance the clock by `ms` and run a frame.
    pub fn advance(&self, ms: f64) {
        self.frame(self.now.get() + ms);
    }

    /// Run frames every `step_ms` until `total_ms` have elapsed.
    pub fn run_for(&self, total_ms: f64, step_ms: f64) {
        let end = self.now.get() + total_ms;
        while self.now.get() < end {
            self.frame((self.now.get() + step_ms).min(end));
        }
    }

    /// Run frames every `step_ms` until nothing is pending, up to `max_frames`.
    /// Returns the number of frames run.
    pub fn run_until_idle(&self, step_ms: f64, max_frames: usize) -> usize {
        let mut ran = 0;
        while !self.is_idle() && ran < max_frames {
            self.advance(step_ms);
            ran += 1;
        }
        ran
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending_frames() == 0 && self.pending_timers() == 0
    }

    /// Number of frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count.get()
    }

    fn fire_due_timers(&self) {
        let now = self.now.get();
        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                let due = timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= now)
                    .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)))
                    .map(|(i, _)| i);
                due.map(|i| timers.remove(i))
            };
            match next {
                Some(timer) => (timer.callback)(),
                None => break,
            }
        }
    }
}

impl Default for FrameQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for FrameQueue {
    fn now(&self) -> f64 {
        self.now.get()
    }

    fn request_frame(&self, callback: FrameCallback) {
        self.frames.borrow_mut().push(callback);
    }

    fn set_timeout(&self, delay_ms: f64, callback: FrameCallback) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.timers.borrow_mut().push(Timer {
            due: self.now.get() + delay_ms.max(0.0),
            seq,
            callback,
        });
    }
}
