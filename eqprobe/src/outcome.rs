//! Failure taxonomy and the structured verification result.
//!
//! The verifier never throws at the caller: every run ends in exactly one
//! [`VerificationResult`]. Contract failures, configuration problems and
//! synthesis problems are kept in separate variants because they require
//! different remediation, matching the distinction between "your equals is
//! broken" and "verification could not run".

use std::fmt;

use crate::config::ConfigError;
use crate::prefab::SynthesisError;

/// Category of a contract failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json-report", derive(serde::Serialize))]
pub enum FailureKind {
    /// An instance did not equal itself.
    Reflexivity,
    /// `eq(a, b)` disagreed with `eq(b, a)`.
    Symmetry,
    /// Two of three probe instances were equal but the third pair was not.
    Transitivity,
    /// Equal values hashed differently, or hashing was non-deterministic.
    HashConsistency,
    /// A field's significance differs between `eq` and `hash`, or violates
    /// the configured field lists.
    SignificantFields,
    /// Structurally equal instances with independent allocations compared
    /// unequal (pointer identity leaking into `eq`).
    IdentityComparison,
    /// NaN or signed-zero handling broke reflexivity or hash agreement.
    FloatEquality,
    /// `eq`, `hash` or `Debug` panicked when an optional field was `None`.
    AbsentValue,
    /// An interior-mutable field participates in equality.
    InteriorMutability,
    /// A cross-type variant violated its declared expectation.
    Variant,
    /// The cached hash code diverged from recomputation.
    CachedHash,
    /// User code panicked during a probe.
    Panicked,
}

impl FailureKind {
    /// Stable label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            FailureKind::Reflexivity => "reflexivity",
            FailureKind::Symmetry => "symmetry",
            FailureKind::Transitivity => "transitivity",
            FailureKind::HashConsistency => "hash consistency",
            FailureKind::SignificantFields => "significant fields",
            FailureKind::IdentityComparison => "identity comparison",
            FailureKind::FloatEquality => "float equality",
            FailureKind::AbsentValue => "absent value",
            FailureKind::InteriorMutability => "interior mutability",
            FailureKind::Variant => "variant",
            FailureKind::CachedHash => "cached hash",
            FailureKind::Panicked => "panicked",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A panic caught while calling into the type under verification.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json-report", derive(serde::Serialize))]
pub struct PanicCause {
    /// Which operation was being probed: "eq", "hash" or "debug".
    pub operation: &'static str,
    /// Field being probed when the panic occurred, if any.
    pub field: Option<&'static str>,
    /// The panic payload, stringified.
    pub payload: String,
}

impl PanicCause {
    /// Wrap the cause in a generic "user code panicked" diagnosis.
    pub(crate) fn into_diagnosis(self) -> Diagnosis {
        let explanation = self.to_string();
        let mut diagnosis = Diagnosis::new(FailureKind::Panicked, explanation);
        if let Some(field) = self.field {
            diagnosis.fields.push(field);
        }
        diagnosis.caused_by(self)
    }
}

impl fmt::Display for PanicCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} panicked", self.operation)?;
        if let Some(field) = self.field {
            write!(f, " while probing field '{}'", field)?;
        }
        write!(f, ": {}", self.payload)
    }
}

/// One diagnosed contract failure.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "json-report", derive(serde::Serialize))]
pub struct Diagnosis {
    pub kind: FailureKind,
    /// Offending fields, in declaration order.
    pub fields: Vec<&'static str>,
    pub explanation: String,
    /// The caught panic that triggered the failure, when there was one.
    pub cause: Option<PanicCause>,
}

impl Diagnosis {
    /// A failure with no specific field.
    pub fn new(kind: FailureKind, explanation: impl Into<String>) -> Self {
        Self { kind, fields: Vec::new(), explanation: explanation.into(), cause: None }
    }

    /// A failure naming one field.
    pub fn on_field(kind: FailureKind, field: &'static str, explanation: impl Into<String>) -> Self {
        Self { kind, fields: vec![field], explanation: explanation.into(), cause: None }
    }

    /// A failure naming several fields.
    pub fn on_fields(
        kind: FailureKind,
        fields: Vec<&'static str>,
        explanation: impl Into<String>,
    ) -> Self {
        Self { kind, fields, explanation: explanation.into(), cause: None }
    }

    /// Attach a caught panic as the underlying cause.
    pub fn caused_by(mut self, cause: PanicCause) -> Self {
        self.cause = Some(cause);
        self
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.explanation)?;
        if !self.fields.is_empty() {
            write!(f, " (field{}: {})", if self.fields.len() > 1 { "s" } else { "" },
                self.fields.join(", "))?;
        }
        if let Some(cause) = &self.cause {
            write!(f, "\n  caused by: {}", cause)?;
        }
        Ok(())
    }
}

/// Problems that prevented verification from running at all.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "json-report", derive(serde::Serialize))]
pub enum SetupError {
    /// The caller's configuration is invalid.
    Config(ConfigError),
    /// A recursive data structure could not be synthesized.
    Recursive { trail: Vec<&'static str> },
    /// A field requires an externally registered pair and none was given.
    MissingPrefab { type_name: &'static str },
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::Config(err) => write!(f, "configuration: {}", err),
            SetupError::Recursive { trail } => {
                write!(f, "recursive data structure: {}", trail.join(" -> "))
            }
            SetupError::MissingPrefab { type_name } => {
                write!(f, "no prefab pair registered for {}", type_name)
            }
        }
    }
}

impl std::error::Error for SetupError {}

impl From<SynthesisError> for SetupError {
    fn from(err: SynthesisError) -> Self {
        match err {
            SynthesisError::Recursive { trail } => SetupError::Recursive { trail },
            SynthesisError::MissingPrefab { type_name } => SetupError::MissingPrefab { type_name },
        }
    }
}

impl From<ConfigError> for SetupError {
    fn from(err: ConfigError) -> Self {
        SetupError::Config(err)
    }
}

/// Internal result type threaded through the checker pipeline.
#[derive(Debug, Clone)]
pub(crate) enum CheckError {
    Contract(Diagnosis),
    Setup(SetupError),
}

impl From<Diagnosis> for CheckError {
    fn from(diagnosis: Diagnosis) -> Self {
        CheckError::Contract(diagnosis)
    }
}

impl From<SynthesisError> for CheckError {
    fn from(err: SynthesisError) -> Self {
        CheckError::Setup(err.into())
    }
}

impl From<ConfigError> for CheckError {
    fn from(err: ConfigError) -> Self {
        CheckError::Setup(err.into())
    }
}

impl From<PanicCause> for CheckError {
    fn from(cause: PanicCause) -> Self {
        CheckError::Contract(cause.into_diagnosis())
    }
}

/// Final verdict of a verification run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "json-report", derive(serde::Serialize))]
pub enum Verdict {
    /// All checks passed.
    Success {
        /// Number of pipeline stages that ran.
        checks: usize,
    },
    /// A contract check failed.
    ContractFailure(Diagnosis),
    /// Verification could not run.
    SetupError(SetupError),
}

/// The one record a verification run produces.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "json-report", derive(serde::Serialize))]
pub struct VerificationResult {
    /// Type under verification.
    pub type_name: &'static str,
    /// Seed the value synthesis ran with; pass to `with_seed` to reproduce.
    pub seed: u64,
    pub verdict: Verdict,
}

impl VerificationResult {
    /// Whether every check passed.
    pub fn is_success(&self) -> bool {
        matches!(self.verdict, Verdict::Success { .. })
    }

    /// The contract failure, if that is what ended the run.
    pub fn diagnosis(&self) -> Option<&Diagnosis> {
        match &self.verdict {
            Verdict::ContractFailure(diagnosis) => Some(diagnosis),
            _ => None,
        }
    }

    /// The setup error, if that is what ended the run.
    pub fn setup_error(&self) -> Option<&SetupError> {
        match &self.verdict {
            Verdict::SetupError(err) => Some(err),
            _ => None,
        }
    }

    /// Panic with a formatted report unless the run succeeded.
    ///
    /// This is the test-runner integration point: a failing verification
    /// fails the surrounding `#[test]` with the full diagnosis.
    #[track_caller]
    pub fn assert_valid(&self) {
        use crate::report::ReportFormatter;
        if !self.is_success() {
            panic!("{}", crate::report::DefaultFormatter.format(self));
        }
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.verdict {
            Verdict::Success { checks } => {
                write!(f, "{}: all {} checks passed", self.type_name, checks)
            }
            Verdict::ContractFailure(diagnosis) => {
                write!(f, "{}: {}", self.type_name, diagnosis)
            }
            Verdict::SetupError(err) => write!(f, "{}: {}", self.type_name, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnosis_display_names_fields() {
        let diagnosis = Diagnosis::on_field(
            FailureKind::SignificantFields,
            "y",
            "hash does not use a field that eq uses",
        );
        let text = diagnosis.to_string();
        assert!(text.contains("significant fields"));
        assert!(text.contains("(field: y)"));
    }

    #[test]
    fn test_diagnosis_display_includes_cause() {
        let diagnosis = Diagnosis::on_field(FailureKind::AbsentValue, "color", "eq panicked")
            .caused_by(PanicCause {
                operation: "eq",
                field: Some("color"),
                payload: "called `Option::unwrap()` on a `None` value".to_string(),
            });
        let text = diagnosis.to_string();
        assert!(text.contains("caused by"));
        assert!(text.contains("unwrap"));
    }

    #[test]
    fn test_setup_error_from_synthesis() {
        let err: SetupError = SynthesisError::recursive(vec!["Node", "Node"]).into();
        assert!(matches!(err, SetupError::Recursive { .. }));
        assert!(err.to_string().contains("Node -> Node"));
    }

    #[test]
    fn test_result_accessors() {
        let ok = VerificationResult {
            type_name: "Point",
            seed: 7,
            verdict: Verdict::Success { checks: 11 },
        };
        assert!(ok.is_success());
        assert!(ok.diagnosis().is_none());
        ok.assert_valid();

        let failed = VerificationResult {
            type_name: "Point",
            seed: 7,
            verdict: Verdict::ContractFailure(Diagnosis::new(
                FailureKind::Symmetry,
                "eq(a, b) != eq(b, a)",
            )),
        };
        assert!(!failed.is_success());
        assert!(failed.diagnosis().is_some());
    }

    #[test]
    #[should_panic(expected = "symmetry")]
    fn test_assert_valid_panics_on_failure() {
        let failed = VerificationResult {
            type_name: "Point",
            seed: 7,
            verdict: Verdict::ContractFailure(Diagnosis::new(
                FailureKind::Symmetry,
                "eq(a, b) != eq(b, a)",
            )),
        };
        failed.assert_valid();
    }
}
