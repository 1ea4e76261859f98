#![allow(clippy::result_large_err)]

//! # eqprobe - PartialEq/Hash contract verification for Rust
//!
//! eqprobe synthesizes instances of your type, mutates them one field at
//! a time, and runs a pipeline of contract checks over the results:
//! reflexivity, symmetry, transitivity, hash consistency, field
//! significance, and the classic pitfalls (pointer identity, NaN, `None`
//! unwraps, interior mutability, cached hashes).
//!
//! ## Quick Start
//!
//! ```rust
//! use eqprobe::{Inspect, Verifier};
//!
//! #[derive(Debug, Clone, PartialEq, Hash, Inspect)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! Verifier::<Point>::new().assert_valid();
//! ```
//!
//! A failing check panics the test with the offending field, the failure
//! category, and the seed to reproduce the exact probe values. Use
//! [`Verifier::verify`] instead to receive the structured
//! [`VerificationResult`] without panicking.

// Public modules
pub mod checkers;
pub mod classify;
pub mod config;
pub mod containers;
pub mod outcome;
pub mod prefab;
pub mod report;
pub mod rng;
pub mod shape;
pub mod statics;
pub mod subject;
pub mod verifier;

// Re-export the main public API
pub use classify::{FieldClassifier, FieldHint, NoHints};
pub use config::{ConfigError, Suppress, VerifyConfig};
pub use containers::ContainerRegistry;
pub use outcome::{
    Diagnosis, FailureKind, PanicCause, SetupError, VerificationResult, Verdict,
};
pub use prefab::{Prefabricate, SynthesisError, ValuePair, ValueSource};
pub use report::{DefaultFormatter, ReportFormatter, VerboseFormatter};
#[cfg(feature = "json-report")]
pub use report::JsonFormatter;
pub use shape::{FieldFlags, FieldShape, FloatProbe, Inspect, Pole, ShapeKind, TypeShape};
pub use statics::{FnState, ProcessState, StaticStateRegistry};
pub use subject::{Verifiable, hash_of};
pub use verifier::{Verifier, verify};

// Re-export the derive macro when the derive feature is enabled
#[cfg(feature = "derive")]
pub use eqprobe_derive::Inspect;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = VerifyConfig::default();
        assert!(config.suppressed.is_empty());
        assert!(config.only_fields.is_none());
        assert!(config.ignored_fields.is_empty());
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_failure_kind_labels_are_stable() {
        assert_eq!(FailureKind::Symmetry.label(), "symmetry");
        assert_eq!(FailureKind::SignificantFields.label(), "significant fields");
        assert_eq!(FailureKind::IdentityComparison.label(), "identity comparison");
    }

    #[test]
    fn test_value_pair_public_api() {
        let pair = ValuePair::new("red", "black");
        assert!(pair.is_distinct());
        assert_eq!(pair.take(Pole::Red), "red");
        assert_eq!(pair.take(Pole::Black), "black");
    }

    #[test]
    fn test_hash_of_matches_itself() {
        assert_eq!(hash_of(&(1, "a")), hash_of(&(1, "a")));
    }
}
