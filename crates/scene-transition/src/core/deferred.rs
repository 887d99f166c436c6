//! Deferred settlement handle.
//!
//! A `Deferred` is both an awaitable (`impl Future`) and a signal someone
//! else triggers with [`Deferred::resolve`]. Clones share the same state.
//! Only the first `resolve` does anything.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

#[derive(Default)]
struct DeferredState {
    settled: bool,
    callbacks: Vec<Box<dyn FnOnce()>>,
    wakers: Vec<Waker>,
}

#[derive(Clone, Default)]
pub struct Deferred {
    state: Rc<RefCell<DeferredState>>,
}

impl Deferred {
    pub fn new() -> Self {
        Self::default()
    }

    /// A deferred that is already settled.
    pub fn resolved() -> Self {
        let deferred = Self::new();
        deferred.resolve();
        deferred
    }

    /// Settle the deferred and run its continuations. Later calls are no-ops.
    pub fn resolve(&self) {
        let (callbacks, wakers) = {
            let mut state = self.state.borrow_mut();
            if state.settled {
                return;
            }
            state.settled = true;
            (
                std::mem::take(&mut state.callbacks),
                std::mem::take(&mut state.wakers),
            )
        };
        for callback in callbacks {
            callback();
        }
        for waker in wakers {
            waker.wake();
        }
    }

    pub fn is_settled(&self) -> bool {
        self.state.borrow().settled
    }

    /// Run `callback` once the deferred settles, immediately if it already has.
    pub fn on_settle(&self, callback: impl FnOnce() + 'static) {
        {
            let mut state = self.state.borrow_mut();
            if !state.settled {
                state.callbacks.push(Box::new(callback));
                return;
            }
        }
        callback();
    }

    /// A deferred that settles once every one of `parts` has settled.
    pub fn join_all(parts: impl IntoIterator<Item = Deferred>) -> Deferred {
        let joined = Deferred::new();
        let parts: Vec<Deferred> = parts.into_iter().collect();
        if parts.is_empty() {
            joined.resolve();
            return joined;
        }

        let remaining = Rc::new(RefCell::new(parts.len()));
        for part in parts {
            let remaining = Rc::clone(&remaining);
            let joined = joined.clone();
            part.on_settle(move || {
                let mut left = remaining.borrow_mut();
                *left -= 1;
                if *left == 0 {
                    drop(left);
                    joined.resolve();
                }
            });
        }
        joined
    }
}

impl Future for Deferred {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut state = self.state.borrow_mut();
        if state.settled {
            Poll::Ready(())
        } else {
            if !state.wakers.iter().any(|w| w.will_wake(cx.waker())) {
                state.wakers.push(cx.waker().clone());
            }
            Poll::Pending
        }
    }
}

impl std::fmt::Debug for Deferred {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred")
            .field("settled", &self.is_settled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::task::Wake;

    #[test]
    fn resolve_runs_continuations_once() {
        let deferred = Deferred::new();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        deferred.on_settle(move || h.set(h.get() + 1));

        deferred.resolve();
        deferred.resolve();
        assert_eq!(hits.get(), 1);
        assert!(deferred.is_settled());
    }

    #[test]
    fn on_settle_after_resolve_runs_immediately() {
        let deferred = Deferred::resolved();
        let hit = Rc::new(Cell::new(false));
        let h = hit.clone();
        deferred.on_settle(move || h.set(true));
        assert!(hit.get());
    }

    #[test]
    fn join_waits_for_every_part() {
        let a = Deferred::new();
        let b = Deferred::new();
        let joined = Deferred::join_all([a.clone(), b.clone()]);

        a.resolve();
        assert!(!joined.is_settled());
        a.resolve();
        assert!(!joined.is_settled());
        b.resolve();
        assert!(joined.is_settled());
    }

    #[test]
    fn join_of_nothing_is_settled() {
        assert!(Deferred::join_all(Vec::new()).is_settled());
    }

    struct CountingWake(AtomicUsize);

    impl Wake for CountingWake {
        fn wake(self: Arc<Self>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn repeated_polls_keep_one_waker() {
        let wake = Arc::new(CountingWake(AtomicUsize::new(0)));
        let waker = Waker::from(wake.clone());
        let mut cx = Context::from_waker(&waker);
        let mut deferred = Deferred::new();

        for _ in 0..5 {
            assert!(Pin::new(&mut deferred).poll(&mut cx).is_pending());
        }
        assert_eq!(deferred.state.borrow().wakers.len(), 1);

        deferred.resolve();
        assert_eq!(wake.0.load(Ordering::SeqCst), 1);
        assert!(Pin::new(&mut deferred).poll(&mut cx).is_ready());
    }

    #[test]
    fn awaits_like_a_future() {
        let deferred = Deferred::new();
        deferred.clone().resolve();
        pollster::block_on(deferred);
    }
}
