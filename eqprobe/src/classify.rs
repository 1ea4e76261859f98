//! Advisory field classification supplied by an external collaborator.
//!
//! Frameworks that know more about a field than its declaration (ORM
//! entity mappings, generated builders) can plug in a classifier. Hints
//! only ever relax checks; with the default no-op classifier every
//! verdict is identical to running without one.

use crate::shape::FieldShape;

/// Advisory knowledge about one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldHint {
    /// The field is guaranteed populated; skip absence probing.
    NeverAbsent,
    /// A store-assigned identifier that conventionally stays out of
    /// equality; its insignificance is not reported.
    SurrogateKey,
    /// Populated on demand by the owning framework; its insignificance is
    /// not reported.
    LazyLoaded,
    /// Declared immutable by the framework; skip the interior-mutability
    /// report.
    ImmutableDeclared,
}

/// External classifier consulted by the absence, significance and
/// mutability checks.
pub trait FieldClassifier {
    fn classify(&self, field: &FieldShape) -> Vec<FieldHint>;
}

/// Classifier that knows nothing about any field.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHints;

impl FieldClassifier for NoHints {
    fn classify(&self, _field: &FieldShape) -> Vec<FieldHint> {
        Vec::new()
    }
}

pub(crate) fn has_hint(
    classifier: &dyn FieldClassifier,
    field: &FieldShape,
    hint: FieldHint,
) -> bool {
    classifier.classify(field).contains(&hint)
}
