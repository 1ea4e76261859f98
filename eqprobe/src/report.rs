//! Rendering of verification results.
//!
//! The core's contract is the structured [`VerificationResult`]; these
//! formatters are the default sinks for it. `DefaultFormatter` is what
//! `assert_valid` panics with, `VerboseFormatter` adds remediation hints,
//! and `JsonFormatter` (behind the `json-report` feature) emits the
//! record for machine consumption.

use crate::outcome::{FailureKind, VerificationResult, Verdict};

/// Renders a [`VerificationResult`] into text.
pub trait ReportFormatter {
    fn format(&self, result: &VerificationResult) -> String;
}

/// Compact single-report formatter.
pub struct DefaultFormatter;

impl ReportFormatter for DefaultFormatter {
    fn format(&self, result: &VerificationResult) -> String {
        let mut report = String::new();
        match &result.verdict {
            Verdict::Success { checks } => {
                report.push_str(&format!(
                    "eqprobe: {} passed all {} checks\n",
                    result.type_name, checks
                ));
            }
            Verdict::ContractFailure(diagnosis) => {
                report.push_str(&format!(
                    "eqprobe: contract violation in {}\n{}\n",
                    result.type_name, diagnosis
                ));
                report.push_str(&format!(
                    "reproduce with .with_seed({})\n",
                    result.seed
                ));
            }
            Verdict::SetupError(error) => {
                report.push_str(&format!(
                    "eqprobe: could not verify {}\n{}\n",
                    result.type_name, error
                ));
            }
        }
        report
    }
}

/// Formatter that appends a remediation hint for the failure category.
pub struct VerboseFormatter;

impl ReportFormatter for VerboseFormatter {
    fn format(&self, result: &VerificationResult) -> String {
        let mut report = DefaultFormatter.format(result);
        if let Verdict::ContractFailure(diagnosis) = &result.verdict {
            report.push_str(&format!("hint: {}\n", remediation(diagnosis.kind)));
        }
        report
    }
}

fn remediation(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::Reflexivity => {
            "every value must equal itself; check for float fields compared with == \
             or inverted comparisons"
        }
        FailureKind::Symmetry => {
            "eq must read the same fields of both operands; look for comparisons \
             mixing self and other asymmetrically"
        }
        FailureKind::Transitivity => {
            "combine field comparisons with && rather than ||; an OR of field \
             equalities cannot be transitive"
        }
        FailureKind::HashConsistency => {
            "hash exactly the fields eq compares, in a deterministic order"
        }
        FailureKind::SignificantFields => {
            "eq and hash must agree on which fields matter; update one of them or \
             the configured field lists"
        }
        FailureKind::IdentityComparison => {
            "compare contents (==, slice equality) instead of pointers (as_ptr, \
             ptr_eq, references by address)"
        }
        FailureKind::FloatEquality => {
            "compare float fields via to_bits or total_cmp so NaN and signed zero \
             behave consistently with hashing"
        }
        FailureKind::AbsentValue => {
            "handle None explicitly in eq, hash and Debug instead of unwrapping"
        }
        FailureKind::InteriorMutability => {
            "move the mutable state out of equality, or suppress InteriorMutability \
             if keys are never mutated while in a collection"
        }
        FailureKind::Variant => {
            "cross-type PartialEq impls must be symmetric and agree with the \
             declared relationship"
        }
        FailureKind::CachedHash => {
            "make hash read the cache when it is non-zero and recompute when it is \
             zero; keep the recomputation pure"
        }
        FailureKind::Panicked => {
            "eq, hash and Debug must not panic for any synthesizable instance"
        }
    }
}

/// JSON rendering of the result record.
#[cfg(feature = "json-report")]
pub struct JsonFormatter;

#[cfg(feature = "json-report")]
impl ReportFormatter for JsonFormatter {
    fn format(&self, result: &VerificationResult) -> String {
        serde_json::to_string_pretty(result)
            .unwrap_or_else(|err| format!("{{\"error\":\"{err}\"}}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{Diagnosis, FailureKind};

    fn failure() -> VerificationResult {
        VerificationResult {
            type_name: "Point",
            seed: 42,
            verdict: Verdict::ContractFailure(Diagnosis::on_field(
                FailureKind::SignificantFields,
                "y",
                "eq uses this field but hash does not",
            )),
        }
    }

    #[test]
    fn test_default_formatter_mentions_type_field_and_seed() {
        let text = DefaultFormatter.format(&failure());
        assert!(text.contains("Point"));
        assert!(text.contains("y"));
        assert!(text.contains("with_seed(42)"));
    }

    #[test]
    fn test_default_formatter_success() {
        let ok = VerificationResult {
            type_name: "Point",
            seed: 42,
            verdict: Verdict::Success { checks: 11 },
        };
        let text = DefaultFormatter.format(&ok);
        assert!(text.contains("passed all 11 checks"));
    }

    #[test]
    fn test_verbose_formatter_appends_hint() {
        let text = VerboseFormatter.format(&failure());
        assert!(text.contains("hint:"));
        assert!(text.contains("eq and hash must agree"));
    }

    #[cfg(feature = "json-report")]
    #[test]
    fn test_json_formatter_is_parseable() {
        let text = JsonFormatter.format(&failure());
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type_name"], "Point");
    }
}
