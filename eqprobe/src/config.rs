//! Verification configuration: suppressions, field lists, seed.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::shape::TypeShape;

/// Checks that can be relaxed when a reported defect is intentional.
///
/// Suppressing a warning never skips unrelated checks; each value relaxes
/// exactly the rule it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suppress {
    /// Allow fields that neither `eq` nor `hash` use.
    AllFieldsUsed,
    /// Allow `hash` to use only a subset of the fields `eq` uses.
    StrictHash,
    /// Allow interior-mutable fields to participate in equality.
    InteriorMutability,
    /// Skip the `None` probes on optional fields.
    AbsentValues,
    /// Skip the independent-allocation identity check.
    IdenticalCopy,
    /// Allow a cached hash declaration without a zero-hash example.
    NoCachedHashExample,
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json-report", derive(serde::Serialize))]
pub enum ConfigError {
    /// `only_fields` and `ignore_fields` were both given.
    ConflictingFieldLists,
    /// A configured field name does not exist on the type.
    UnknownField { name: String },
    /// A registered prefab pair's members compare equal.
    EqualPrefabPair { type_name: String },
    /// A cached hash was declared without an example instance.
    MissingCachedHashExample,
    /// Supplied example instances do not satisfy their own preconditions.
    InvalidExamples { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ConflictingFieldLists => {
                write!(f, "only_fields and ignore_fields are mutually exclusive")
            }
            ConfigError::UnknownField { name } => {
                write!(f, "no field named '{}' on the type under verification", name)
            }
            ConfigError::EqualPrefabPair { type_name } => {
                write!(f, "registered prefab pair for {} has equal members", type_name)
            }
            ConfigError::MissingCachedHashExample => {
                write!(
                    f,
                    "cached hash declared without an example instance; supply one or suppress \
                     NoCachedHashExample"
                )
            }
            ConfigError::InvalidExamples { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Untyped configuration consumed by the checker pipeline.
///
/// The typed parts (prefab pairs, examples, variants, the cached hash
/// declaration) live on [`crate::Verifier`]. Immutable once `verify`
/// starts.
#[derive(Debug, Clone, Default)]
pub struct VerifyConfig {
    pub suppressed: HashSet<Suppress>,
    /// When set, exactly these fields must be significant and no others.
    pub only_fields: Option<BTreeSet<String>>,
    /// Fields that must not be significant.
    pub ignored_fields: BTreeSet<String>,
    /// RNG seed override for value synthesis.
    pub seed: Option<u64>,
}

impl VerifyConfig {
    /// Whether a warning is suppressed.
    pub fn is_suppressed(&self, warning: Suppress) -> bool {
        self.suppressed.contains(&warning)
    }

    /// Whether a field name is on the ignore side of the configuration.
    pub fn is_ignored(&self, name: &str) -> bool {
        if let Some(only) = &self.only_fields {
            return !only.contains(name);
        }
        self.ignored_fields.contains(name)
    }

    /// Validate the configuration against the type's descriptor table.
    pub fn validate(&self, shape: &TypeShape) -> Result<(), ConfigError> {
        if self.only_fields.is_some() && !self.ignored_fields.is_empty() {
            return Err(ConfigError::ConflictingFieldLists);
        }
        let names = self.only_fields.iter().flatten().chain(self.ignored_fields.iter());
        for name in names {
            if shape.field_named(name).is_none() {
                return Err(ConfigError::UnknownField { name: name.clone() });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{FieldFlags, FieldShape, ShapeKind};

    const FIELDS: [FieldShape; 2] = [
        FieldShape { name: "x", type_name: "i32", index: 0, flags: FieldFlags::NONE },
        FieldShape { name: "y", type_name: "i32", index: 1, flags: FieldFlags::NONE },
    ];
    const SHAPE: TypeShape =
        TypeShape { type_name: "Point", kind: ShapeKind::Struct, fields: &FIELDS };

    #[test]
    fn test_default_config_validates() {
        assert!(VerifyConfig::default().validate(&SHAPE).is_ok());
    }

    #[test]
    fn test_conflicting_field_lists() {
        let config = VerifyConfig {
            only_fields: Some(BTreeSet::from(["x".to_string()])),
            ignored_fields: BTreeSet::from(["y".to_string()]),
            ..VerifyConfig::default()
        };
        assert_eq!(config.validate(&SHAPE), Err(ConfigError::ConflictingFieldLists));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let config = VerifyConfig {
            ignored_fields: BTreeSet::from(["z".to_string()]),
            ..VerifyConfig::default()
        };
        assert_eq!(
            config.validate(&SHAPE),
            Err(ConfigError::UnknownField { name: "z".to_string() })
        );
    }

    #[test]
    fn test_only_fields_inverts_ignore() {
        let config = VerifyConfig {
            only_fields: Some(BTreeSet::from(["x".to_string()])),
            ..VerifyConfig::default()
        };
        assert!(!config.is_ignored("x"));
        assert!(config.is_ignored("y"));
    }

    #[test]
    fn test_suppression_lookup() {
        let mut config = VerifyConfig::default();
        assert!(!config.is_suppressed(Suppress::AbsentValues));
        config.suppressed.insert(Suppress::AbsentValues);
        assert!(config.is_suppressed(Suppress::AbsentValues));
    }
}
