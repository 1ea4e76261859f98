//! The classic equality pitfalls: pointer identity, floats, absent
//! values, interior mutability.

use std::cell::Cell;
use std::hash::{Hash, Hasher};

use eqprobe::{FailureKind, Inspect, Suppress, Verifier};

// -- pointer identity -------------------------------------------------------

/// Compares its buffer by address instead of by contents.
#[derive(Debug, Clone, Inspect)]
struct PtrBuffer {
    data: Vec<u8>,
}

impl PartialEq for PtrBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.data.as_ptr() == other.data.as_ptr()
    }
}

impl Hash for PtrBuffer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.hash(state);
    }
}

/// The fixed version: structural comparison.
#[derive(Debug, Clone, PartialEq, Hash, Inspect)]
struct Buffer {
    data: Vec<u8>,
}

#[test]
fn pointer_compared_sequence_field_is_reported() {
    let result = Verifier::<PtrBuffer>::new().verify();
    let diagnosis = result.diagnosis().expect("expected a contract failure");
    assert_eq!(diagnosis.kind, FailureKind::IdentityComparison);
    assert_eq!(diagnosis.fields, vec!["data"]);
}

#[test]
fn structural_sequence_comparison_passes() {
    Verifier::<Buffer>::new().assert_valid();
}

#[test]
fn identity_check_can_be_suppressed() {
    // Versioned-entity style types sometimes want reference equality;
    // the remaining checks still run.
    let result = Verifier::<PtrBuffer>::new().suppress(Suppress::IdenticalCopy).verify();
    assert!(result.is_success(), "{result}");
}

// -- floats -----------------------------------------------------------------

/// Derived PartialEq gives IEEE semantics: NaN breaks reflexivity.
#[derive(Debug, Clone, Inspect)]
struct IeeeMeasure {
    value: f64,
}

impl PartialEq for IeeeMeasure {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Hash for IeeeMeasure {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.to_bits().hash(state);
    }
}

/// Total-order comparison handles NaN and signed zero coherently.
#[derive(Debug, Clone, Inspect)]
struct BitwiseMeasure {
    value: f64,
}

impl PartialEq for BitwiseMeasure {
    fn eq(&self, other: &Self) -> bool {
        self.value.to_bits() == other.value.to_bits()
    }
}

impl Hash for BitwiseMeasure {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.to_bits().hash(state);
    }
}

/// NaN-safe equality, but hashing distinguishes the zero signs.
#[derive(Debug, Clone, Inspect)]
struct ZeroBlindMeasure {
    value: f64,
}

impl PartialEq for ZeroBlindMeasure {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value || (self.value.is_nan() && other.value.is_nan())
    }
}

impl Hash for ZeroBlindMeasure {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.to_bits().hash(state);
    }
}

#[test]
fn nan_breaking_reflexivity_is_reported() {
    let result = Verifier::<IeeeMeasure>::new().verify();
    let diagnosis = result.diagnosis().expect("expected a contract failure");
    assert_eq!(diagnosis.kind, FailureKind::FloatEquality);
    assert_eq!(diagnosis.fields, vec!["value"]);
}

#[test]
fn bitwise_float_comparison_passes() {
    Verifier::<BitwiseMeasure>::new().assert_valid();
}

#[test]
fn signed_zero_hash_divergence_is_reported() {
    let result = Verifier::<ZeroBlindMeasure>::new().verify();
    let diagnosis = result.diagnosis().expect("expected a contract failure");
    assert_eq!(diagnosis.kind, FailureKind::FloatEquality);
    assert!(diagnosis.explanation.contains("-0.0"));
}

// -- absent values ----------------------------------------------------------

/// Unwraps its optional field inside eq and hash.
#[derive(Debug, Clone, Inspect)]
struct Label {
    id: u32,
    color: Option<String>,
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.color.as_ref().unwrap() == other.color.as_ref().unwrap()
    }
}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.color.as_ref().unwrap().hash(state);
    }
}

#[test]
fn unwrap_on_absent_field_is_reported_with_the_panic_as_cause() {
    let result = Verifier::<Label>::new().verify();
    let diagnosis = result.diagnosis().expect("expected a contract failure");
    assert_eq!(diagnosis.kind, FailureKind::AbsentValue);
    assert_eq!(diagnosis.fields, vec!["color"]);
    let cause = diagnosis.cause.as_ref().expect("expected the caught panic");
    assert_eq!(cause.operation, "eq");
    assert!(cause.payload.contains("None"));
}

#[test]
fn absent_value_check_can_be_suppressed() {
    Verifier::<Label>::new().suppress(Suppress::AbsentValues).assert_valid();
}

// -- interior mutability ----------------------------------------------------

/// A `Cell` participating in equality.
#[derive(Debug, Clone, PartialEq, Inspect)]
struct Tagged {
    value: i32,
    version: Cell<i32>,
}

impl Hash for Tagged {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
        self.version.get().hash(state);
    }
}

#[test]
fn interior_mutable_significant_field_is_reported() {
    let result = Verifier::<Tagged>::new().verify();
    let diagnosis = result.diagnosis().expect("expected a contract failure");
    assert_eq!(diagnosis.kind, FailureKind::InteriorMutability);
    assert_eq!(diagnosis.fields, vec!["version"]);
}

#[test]
fn interior_mutability_can_be_suppressed() {
    Verifier::<Tagged>::new().suppress(Suppress::InteriorMutability).assert_valid();
}
