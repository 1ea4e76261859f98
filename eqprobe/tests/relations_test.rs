//! Symmetry and transitivity violations.

use std::hash::{Hash, Hasher};

use eqprobe::{FailureKind, Inspect, Suppress, Verifier};

/// Ordered comparison smuggled into eq: reflexive, but asymmetric as soon
/// as the tags differ.
#[derive(Debug, Clone, Inspect)]
struct Release {
    id: u32,
    tag: String,
}

impl PartialEq for Release {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.tag <= other.tag
    }
}

impl Hash for Release {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.tag.hash(state);
    }
}

/// OR-combined field comparisons: symmetric and reflexive, structurally
/// incapable of transitivity.
#[derive(Debug, Clone, Inspect)]
struct Loose {
    first: u32,
    second: u32,
}

impl PartialEq for Loose {
    fn eq(&self, other: &Self) -> bool {
        self.first == other.first || self.second == other.second
    }
}

impl Hash for Loose {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Cannot hash either field: eq-equal values may differ in both.
        0u8.hash(state);
    }
}

#[test]
fn asymmetric_eq_is_reported_with_the_field() {
    // Pin the tag pair so the probe direction that exposes the asymmetry
    // is deterministic: red sorts after black.
    let result = Verifier::<Release>::new()
        .with_prefab("tock".to_string(), "tick".to_string())
        .verify();
    let diagnosis = result.diagnosis().expect("expected a contract failure");
    assert_eq!(diagnosis.kind, FailureKind::Symmetry);
    assert_eq!(diagnosis.fields, vec!["tag"]);
}

#[test]
fn or_combined_eq_fails_transitivity() {
    let result = Verifier::<Loose>::new().suppress(Suppress::AllFieldsUsed).verify();
    let diagnosis = result.diagnosis().expect("expected a contract failure");
    assert_eq!(diagnosis.kind, FailureKind::Transitivity);
    assert_eq!(diagnosis.fields, vec!["first", "second"]);
}

/// The fixed versions pass.
#[derive(Debug, Clone, PartialEq, Hash, Inspect)]
struct Strict {
    first: u32,
    second: u32,
}

#[test]
fn and_combined_eq_is_transitive() {
    Verifier::<Strict>::new().assert_valid();
}
