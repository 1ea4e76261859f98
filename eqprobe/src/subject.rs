//! Instance synthesis and guarded probing of the type under verification.
//!
//! The [`Context`] is the working state of one verification run: it owns
//! the value source, builds probe instances, applies the cached-hash
//! initializer, and remembers which fields turned out significant. All
//! calls into user code (`eq`, `hash`, `Debug`) go through the guarded
//! probe functions so a panic becomes a tagged, diagnosable cause instead
//! of unwinding through the pipeline. Stack overflow from unbounded
//! recursion is not catchable and aborts the run, which is intended.

use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::classify::FieldClassifier;
use crate::config::VerifyConfig;
use crate::outcome::PanicCause;
use crate::prefab::{SynthesisError, ValueSource};
use crate::shape::{FieldShape, Inspect, Pole, TypeShape};

/// Everything the verifier needs from a type under verification.
///
/// Blanket-implemented; the bounds are the Rust spelling of "has equals,
/// hashCode and toString": `PartialEq`, `Hash` and `Debug`, plus the
/// derive-generated [`Inspect`] capability.
pub trait Verifiable: Inspect + PartialEq + Hash + Debug {}

impl<T: Inspect + PartialEq + Hash + Debug> Verifiable for T {}

/// Hash a value with the standard hasher, fixed keys.
///
/// Deterministic within a process, which is what the consistency checks
/// need; the same function is handy when writing `recompute` closures for
/// cached hash declarations.
pub fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn payload_to_string(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "opaque panic payload".to_string()
    }
}

/// Run a closure over user code, converting a panic into a tagged cause.
pub(crate) fn guarded<R>(
    operation: &'static str,
    field: Option<&'static str>,
    probe: impl FnOnce() -> R,
) -> Result<R, PanicCause> {
    catch_unwind(AssertUnwindSafe(probe)).map_err(|payload| PanicCause {
        operation,
        field,
        payload: payload_to_string(payload),
    })
}

/// `a == b`, guarded.
pub(crate) fn eq_probe<T: PartialEq>(
    a: &T,
    b: &T,
    field: Option<&'static str>,
) -> Result<bool, PanicCause> {
    guarded("eq", field, || a == b)
}

/// `hash_of(value)`, guarded.
pub(crate) fn hash_probe<T: Hash>(
    value: &T,
    field: Option<&'static str>,
) -> Result<u64, PanicCause> {
    guarded("hash", field, || hash_of(value))
}

/// `format!("{value:?}")`, guarded.
pub(crate) fn debug_probe<T: Debug>(
    value: &T,
    field: Option<&'static str>,
) -> Result<String, PanicCause> {
    guarded("debug", field, || format!("{value:?}"))
}

/// A caller-declared cached hash code field, expressed as lenses.
///
/// `read`/`write` access the cache field, `recompute` is the pure hash the
/// cache is supposed to hold. Zero is the "not yet computed" sentinel; a
/// type whose real hash can be zero supplies `example` to prove that case
/// is handled.
pub struct CachedHash<T> {
    pub(crate) field: &'static str,
    pub(crate) read: Box<dyn Fn(&T) -> u64>,
    pub(crate) write: Box<dyn Fn(&mut T, u64)>,
    pub(crate) recompute: Box<dyn Fn(&T) -> u64>,
    pub(crate) example: Option<T>,
}

impl<T> CachedHash<T> {
    /// Recompute the hash and store it in the cache field, the way the
    /// type's own constructor would.
    pub(crate) fn initialize(&self, value: &mut T) {
        let hash = (self.recompute)(value);
        (self.write)(value, hash);
    }

    /// Clear the cache field back to the zero sentinel.
    pub(crate) fn reset(&self, value: &mut T) {
        (self.write)(value, 0);
    }
}

/// Working state of one verification run.
pub(crate) struct Context<'c, T: Verifiable> {
    pub shape: TypeShape,
    pub config: &'c VerifyConfig,
    pub classifier: &'c dyn FieldClassifier,
    pub source: ValueSource,
    pub cached_hash: Option<&'c CachedHash<T>>,
    pub equal_examples: &'c [T],
    pub unequal_examples: &'c [T],
    /// Indices of fields observed to change `eq`; filled by the
    /// significance check, consumed by everything after it.
    pub significant: Vec<usize>,
}

impl<'c, T: Verifiable> Context<'c, T> {
    pub fn new(
        config: &'c VerifyConfig,
        classifier: &'c dyn FieldClassifier,
        source: ValueSource,
        cached_hash: Option<&'c CachedHash<T>>,
        equal_examples: &'c [T],
        unequal_examples: &'c [T],
    ) -> Self {
        Self {
            shape: T::shape(),
            config,
            classifier,
            source,
            cached_hash,
            equal_examples,
            unequal_examples,
            significant: Vec::new(),
        }
    }

    /// The descriptor of field `index`.
    pub fn field(&self, index: usize) -> &'static FieldShape {
        &self.shape.fields[index]
    }

    /// Whether the significance check recorded this field as used by `eq`.
    pub fn is_significant(&self, index: usize) -> bool {
        self.significant.contains(&index)
    }

    /// Whether a field takes part in mutation probing. Skipped fields and
    /// the declared cached-hash field (whose value the fixup rewrites on
    /// every synthesis) do not.
    pub fn probeable(&self, index: usize) -> bool {
        let field = self.field(index);
        if field.flags.skipped {
            return false;
        }
        if let Some(cached) = self.cached_hash
            && cached.field == field.name
        {
            return false;
        }
        true
    }

    fn fixup(&self, mut value: T) -> T {
        if let Some(cached) = self.cached_hash {
            cached.initialize(&mut value);
        }
        value
    }

    /// A full instance on the red pole.
    pub fn plain(&mut self) -> Result<T, SynthesisError> {
        let value = T::synthesize(&mut self.source, Pole::Red)?;
        Ok(self.fixup(value))
    }

    /// A full instance on the black pole; unequal to `plain` whenever any
    /// probed field exists.
    pub fn changed(&mut self) -> Result<T, SynthesisError> {
        let value = T::synthesize(&mut self.source, Pole::Black)?;
        Ok(self.fixup(value))
    }

    /// A copy of `base` with one field moved to the given pole.
    pub fn with_field(&mut self, base: &T, field: usize, pole: Pole) -> Result<T, SynthesisError> {
        let value = base.with_field(field, pole, &mut self.source)?;
        Ok(self.fixup(value))
    }

    /// A copy of `base` with an optional field set to `None`, when field
    /// `index` is an `Option`.
    pub fn with_absent(&self, base: &T, field: usize) -> Option<T> {
        base.with_field_absent(field).map(|value| self.fixup(value))
    }

    /// A copy of `base` with a float field set to a probe value, when
    /// field `index` is an `f32` or `f64`.
    pub fn with_float(&self, base: &T, field: usize, probe: crate::shape::FloatProbe) -> Option<T> {
        base.with_field_float(field, probe).map(|value| self.fixup(value))
    }

    /// Whether field `index` has a usable (distinct) prefab pair. Fields
    /// without one cannot be probed and are treated as insignificant.
    pub fn field_pair_distinct(&mut self, index: usize) -> Result<bool, SynthesisError> {
        T::field_pair_distinct(index, &mut self.source)
    }

    /// Two structurally identical red instances whose allocations are
    /// fully independent: the pair cache is bypassed and the RNG replayed,
    /// so the same values are drawn into fresh objects.
    pub fn independent_twins(&mut self) -> Result<(T, T), SynthesisError> {
        self.source.set_cache_bypass(true);
        let snapshot = self.source.snapshot_rng();
        let first = T::synthesize(&mut self.source, Pole::Red);
        self.source.restore_rng(snapshot);
        let second = T::synthesize(&mut self.source, Pole::Red);
        self.source.set_cache_bypass(false);
        Ok((self.fixup(first?), self.fixup(second?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_of_is_deterministic() {
        assert_eq!(hash_of(&"value"), hash_of(&"value"));
        assert_ne!(hash_of(&1_u64), hash_of(&2_u64));
    }

    #[test]
    fn test_guarded_passes_results_through() {
        let result = guarded("eq", None, || 2 + 2);
        assert_eq!(result.unwrap(), 4);
    }

    #[test]
    fn test_guarded_captures_panics() {
        let cause = guarded("hash", Some("color"), || -> u32 { panic!("boom {}", 7) })
            .unwrap_err();
        assert_eq!(cause.operation, "hash");
        assert_eq!(cause.field, Some("color"));
        assert!(cause.payload.contains("boom 7"));
    }

    #[test]
    fn test_eq_probe_reports_panicking_eq() {
        #[derive(Debug)]
        struct Grenade;
        impl PartialEq for Grenade {
            fn eq(&self, _other: &Self) -> bool {
                panic!("no comparing grenades");
            }
        }
        let cause = eq_probe(&Grenade, &Grenade, None).unwrap_err();
        assert_eq!(cause.operation, "eq");
        assert!(cause.payload.contains("grenades"));
    }

    #[test]
    fn test_cached_hash_initialize_and_reset() {
        #[derive(Debug, Clone)]
        struct Doc {
            body: String,
            cache: u64,
        }
        let cached = CachedHash::<Doc> {
            field: "cache",
            read: Box::new(|d| d.cache),
            write: Box::new(|d, v| d.cache = v),
            recompute: Box::new(|d| hash_of(&d.body)),
            example: None,
        };
        let mut doc = Doc { body: "text".to_string(), cache: 0 };
        cached.initialize(&mut doc);
        assert_eq!((cached.read)(&doc), hash_of(&"text".to_string()));
        cached.reset(&mut doc);
        assert_eq!(doc.cache, 0);
    }
}
