//! Repeated runs are independent: prefab caches die with the run and
//! registered process-wide state is restored around every probe.

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use eqprobe::{Inspect, Verifier};

static COMPARISONS: AtomicU64 = AtomicU64::new(0);

/// A correct eq that also bumps a process-wide counter, standing in for
/// types whose comparisons touch lazy global state.
#[derive(Debug, Clone, Inspect)]
struct Counted {
    value: u32,
    label: String,
}

impl PartialEq for Counted {
    fn eq(&self, other: &Self) -> bool {
        COMPARISONS.fetch_add(1, Ordering::SeqCst);
        self.value == other.value && self.label == other.label
    }
}

impl Hash for Counted {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
        self.label.hash(state);
    }
}

fn counted_verifier() -> Verifier<Counted> {
    Verifier::<Counted>::new().with_process_state(
        || COMPARISONS.load(Ordering::SeqCst),
        |value| COMPARISONS.store(value, Ordering::SeqCst),
    )
}

// One test keeps the shared counter single-threaded; the test harness
// would otherwise interleave runs that probe the same static.
#[test]
fn process_state_is_restored_and_runs_are_idempotent() {
    COMPARISONS.store(7, Ordering::SeqCst);
    counted_verifier().assert_valid();
    assert_eq!(COMPARISONS.load(Ordering::SeqCst), 7);

    let first = counted_verifier().verify();
    assert_eq!(COMPARISONS.load(Ordering::SeqCst), 7);
    let second = counted_verifier().verify();
    assert!(first.is_success());
    assert!(second.is_success());
    assert_eq!(first.seed, second.seed);
}

#[derive(Debug, Clone, PartialEq, Hash, Inspect)]
struct Plain {
    value: u32,
}

#[test]
fn repeated_runs_agree_on_failures_too() {
    // Ignoring a used field fails identically on every run.
    let first = Verifier::<Plain>::new().ignore_fields(["value"]).verify();
    let second = Verifier::<Plain>::new().ignore_fields(["value"]).verify();
    let a = first.diagnosis().expect("expected a contract failure");
    let b = second.diagnosis().expect("expected a contract failure");
    assert_eq!(a.kind, b.kind);
    assert_eq!(a.fields, b.fields);
    assert_eq!(a.explanation, b.explanation);
}
