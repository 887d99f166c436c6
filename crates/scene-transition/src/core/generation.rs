//! Generation guard: cancellation by supersession.
//!
//! Every enter/leave invocation bumps the target's generation id. Work
//! scheduled by an older invocation holds a [`GenerationGuard`] for the id it
//! was started under and polls [`GenerationGuard::is_stale`] before writing.
//! Nothing is ever cancelled directly.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::components::target::{target_key, Target, TargetHandle};

/// Per-target cancellation state, shared by the enter and leave phases.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationContext {
    /// Live generation id. Increments once per animated phase invocation.
    pub id: u64,
    /// Elapsed cycle time in ms, kept across an interrupted cycle so the next
    /// one can resume instead of restarting.
    pub time: f64,
}

impl GenerationContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The abort predicate for one phase invocation.
#[derive(Debug, Clone)]
pub struct GenerationGuard {
    context: Rc<RefCell<GenerationContext>>,
    id: u64,
}

impl GenerationGuard {
    /// Bump `context` and return a guard for the new generation.
    pub fn bump(context: &Rc<RefCell<GenerationContext>>) -> Self {
        let id = {
            let mut ctx = context.borrow_mut();
            ctx.id += 1;
            ctx.id
        };
        Self {
            context: Rc::clone(context),
            id,
        }
    }

    /// A guard over a private context that nothing else can bump.
    pub fn detached() -> Self {
        Self::bump(&Rc::new(RefCell::new(GenerationContext::new())))
    }

    /// The generation this guard was issued for.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// True once a newer invocation has bumped the context.
    pub fn is_stale(&self) -> bool {
        self.context.borrow().id != self.id
    }

    /// Elapsed time recorded by the latest cycle.
    pub fn elapsed(&self) -> f64 {
        self.context.borrow().time
    }

    /// Record elapsed time. Ignored when the guard is stale, so a superseded
    /// chain can never overwrite the live cycle's checkpoint.
    pub fn record_elapsed(&self, time: f64) {
        let mut ctx = self.context.borrow_mut();
        if ctx.id == self.id {
            ctx.time = time;
        }
    }
}

struct Entry {
    target: Weak<RefCell<dyn Target>>,
    context: Rc<RefCell<GenerationContext>>,
}

/// Entry count below which the table never sweeps.
const MIN_SWEEP_LEN: usize = 64;

/// Side-table of generation contexts keyed by target identity, so foreign
/// objects never need an extra field.
///
/// Dead entries are swept whenever an insert finds the table at twice the
/// size it had after the previous sweep, so the table stays proportional to
/// the number of live targets.
pub struct GenerationTable {
    entries: RefCell<HashMap<usize, Entry>>,
    sweep_at: Cell<usize>,
}

impl Default for GenerationTable {
    fn default() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            sweep_at: Cell::new(MIN_SWEEP_LEN),
        }
    }
}

impl GenerationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The context for `target`, created on first use. An entry whose target
    /// has been dropped is replaced rather than reused.
    pub fn context(&self, target: &TargetHandle) -> Rc<RefCell<GenerationContext>> {
        let key = target_key(target);
        let mut entries = self.entries.borrow_mut();
        if let Some(entry) = entries.get(&key) {
            if let Some(alive) = entry.target.upgrade() {
                if Rc::ptr_eq(&alive, target) {
                    return Rc::clone(&entry.context);
                }
            }
        }

        if entries.len() >= self.sweep_at.get() {
            entries.retain(|_, entry| entry.target.strong_count() > 0);
            self.sweep_at.set((entries.len() * 2).max(MIN_SWEEP_LEN));
            log::trace!("generation table swept down to {} entries", entries.len());
        }

        let context = Rc::new(RefCell::new(GenerationContext::new()));
        entries.insert(
            key,
            Entry {
                target: Rc::downgrade(target),
                context: Rc::clone(&context),
            },
        );
        context
    }

    /// Bump the generation for `target` and return its guard.
    pub fn bump(&self, target: &TargetHandle) -> GenerationGuard {
        let guard = GenerationGuard::bump(&self.context(target));
        log::debug!("transition generation {} started", guard.id());
        guard
    }

    /// Snapshot of the context for `target`, if one exists.
    pub fn snapshot(&self, target: &TargetHandle) -> Option<GenerationContext> {
        let key = target_key(target);
        let entries = self.entries.borrow();
        let entry = entries.get(&key)?;
        let alive = entry.target.upgrade()?;
        Rc::ptr_eq(&alive, target).then(|| *entry.context.borrow())
    }

    /// Drop entries whose targets no longer exist.
    pub fn prune(&self) {
        self.entries
            .borrow_mut()
            .retain(|_, entry| entry.target.strong_count() > 0);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::property_bag::PropertyBag;

    fn handle() -> TargetHandle {
        Rc::new(RefCell::new(PropertyBag::new()))
    }

    #[test]
    fn bump_supersedes_older_guards() {
        let ctx = Rc::new(RefCell::new(GenerationContext::new()));
        let first = GenerationGuard::bump(&ctx);
        assert!(!first.is_stale());

        let second = GenerationGuard::bump(&ctx);
        assert!(first.is_stale());
        assert!(!second.is_stale());
        assert_eq!(second.id(), 2);
    }

    #[test]
    fn stale_guard_cannot_record_elapsed() {
        let ctx = Rc::new(RefCell::new(GenerationContext::new()));
        let first = GenerationGuard::bump(&ctx);
        first.record_elapsed(120.0);
        let second = GenerationGuard::bump(&ctx);

        first.record_elapsed(999.0);
        assert_eq!(second.elapsed(), 120.0);
    }

    #[test]
    fn table_keys_by_identity() {
        let table = GenerationTable::new();
        let a = handle();
        let b = handle();

        table.bump(&a);
        table.bump(&a);
        table.bump(&b);
        assert_eq!(table.snapshot(&a).unwrap().id, 2);
        assert_eq!(table.snapshot(&b).unwrap().id, 1);
        assert!(Rc::ptr_eq(&table.context(&a), &table.context(&a)));
    }

    #[test]
    fn prune_drops_dead_targets() {
        let table = GenerationTable::new();
        let a = handle();
        table.bump(&a);
        drop(a);
        table.prune();
        assert!(table.is_empty());
    }

    #[test]
    fn dropped_targets_are_swept_on_insert() {
        let table = GenerationTable::new();
        let keep = handle();
        table.bump(&keep);

        for _ in 0..1000 {
            let temp = handle();
            table.bump(&temp);
        }
        assert!(table.len() <= MIN_SWEEP_LEN, "table grew to {}", table.len());
        assert_eq!(table.snapshot(&keep).unwrap().id, 1);
    }

    #[test]
    fn live_targets_survive_a_sweep() {
        let table = GenerationTable::new();
        let live: Vec<TargetHandle> = (0..200).map(|_| handle()).collect();
        for target in &live {
            table.bump(target);
        }
        assert_eq!(table.len(), 200);
        assert!(live.iter().all(|t| table.snapshot(t).is_some_and(|c| c.id == 1)));
    }

    #[test]
    fn detached_guard_is_never_stale() {
        let guard = GenerationGuard::detached();
        assert!(!guard.is_stale());
    }
}
