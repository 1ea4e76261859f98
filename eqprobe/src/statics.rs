//! Snapshot and restore of process-wide mutable state around probes.
//!
//! Probing a type's `eq`/`hash` can touch process-wide state (lazy caches,
//! interned tables, counters). Each checker runs inside
//! [`StaticStateRegistry::with_restored`], so every probe starts from the
//! same baseline. With nothing registered this is a no-op, which is the
//! common case for plain value types.
//!
//! Snapshot and restore are not synchronized; concurrent verification
//! runs touching the same process-wide state must be serialized by the
//! caller. Test functions are single-threaded, so in practice this only
//! matters when several `#[test]`s probe one shared static.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};

/// One piece of process-wide state that must survive probing unchanged.
pub trait ProcessState {
    /// Capture the current value.
    fn snapshot(&self) -> Box<dyn Any>;

    /// Put a previously captured value back.
    fn restore(&self, snapshot: Box<dyn Any>);
}

/// A [`ProcessState`] built from a pair of closures.
pub struct FnState<S, R> {
    save: S,
    restore: R,
}

impl<S, R, V> FnState<S, R>
where
    S: Fn() -> V,
    R: Fn(V),
    V: 'static,
{
    pub fn new(save: S, restore: R) -> Self {
        Self { save, restore }
    }
}

impl<S, R, V> ProcessState for FnState<S, R>
where
    S: Fn() -> V,
    R: Fn(V),
    V: 'static,
{
    fn snapshot(&self) -> Box<dyn Any> {
        Box::new((self.save)())
    }

    fn restore(&self, snapshot: Box<dyn Any>) {
        if let Ok(value) = snapshot.downcast::<V>() {
            (self.restore)(*value);
        }
    }
}

/// The set of process-wide state guards for one verification run.
pub struct StaticStateRegistry {
    guards: Vec<Box<dyn ProcessState>>,
}

impl StaticStateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { guards: Vec::new() }
    }

    /// Register a guard.
    pub fn register(&mut self, guard: Box<dyn ProcessState>) {
        self.guards.push(guard);
    }

    /// Number of registered guards.
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    /// Whether any guards are registered.
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Run `action` with every guard snapshotted before and restored after,
    /// even if `action` panics (the panic is resumed once restoration is
    /// done). Guards are restored in reverse registration order.
    pub fn with_restored<T>(&self, action: impl FnOnce() -> T) -> T {
        let snapshots: Vec<Box<dyn Any>> = self.guards.iter().map(|g| g.snapshot()).collect();
        let result = catch_unwind(AssertUnwindSafe(action));
        for (guard, snapshot) in self.guards.iter().zip(snapshots).rev() {
            guard.restore(snapshot);
        }
        match result {
            Ok(value) => value,
            Err(payload) => resume_unwind(payload),
        }
    }
}

impl Default for StaticStateRegistry {
    fn default() -> Self {
        Self::new()
    }
}
