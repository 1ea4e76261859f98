//! Prefab value pairs and the recursive value source.
//!
//! Every probe the checkers run is built from a [`ValuePair`]: two values
//! of the same type that are guaranteed unequal. Leaf pairs come from the
//! semantic container impls in [`crate::containers`]; user-defined types
//! are synthesized recursively through their [`crate::Inspect`] derive.
//! The [`ValueSource`] owns the per-run cache and the recursion trail that
//! turns unbounded self-reference into a diagnosable error.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;

use rand::rngs::StdRng;

use crate::containers::ContainerRegistry;
use crate::rng::create_rng;
use crate::shape::Pole;

/// Why a value pair could not be synthesized.
///
/// These are setup problems, not contract violations: they mean
/// verification could not even attempt to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// A type's synthesis re-entered itself. The trail lists the type chain
    /// from the type under verification down to the repeated type.
    Recursive { trail: Vec<&'static str> },

    /// A field was marked `#[inspect(prefab)]` (or is otherwise opaque) and
    /// no pair was registered for its type.
    MissingPrefab { type_name: &'static str },
}

impl SynthesisError {
    pub fn recursive(trail: Vec<&'static str>) -> Self {
        Self::Recursive { trail }
    }

    pub fn missing_prefab(type_name: &'static str) -> Self {
        Self::MissingPrefab { type_name }
    }
}

impl fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthesisError::Recursive { trail } => {
                write!(f, "Recursive data structure: {}", trail.join(" -> "))?;
                write!(f, "; register a prefab pair for one of these types")
            }
            SynthesisError::MissingPrefab { type_name } => {
                write!(f, "No prefab pair registered for {}", type_name)
            }
        }
    }
}

impl std::error::Error for SynthesisError {}

/// Two values of one type, guaranteed unequal to each other.
///
/// `distinct` is false only for degenerate shapes (single-variant unit
/// enums, zero-length arrays, all-skipped structs); such a pair cannot
/// drive a mutation probe and the field holding it is treated as
/// insignificant.
#[derive(Debug, Clone)]
pub struct ValuePair<T> {
    pub red: T,
    pub black: T,
    distinct: bool,
}

impl<T: Clone> ValuePair<T> {
    /// A pair of two distinct values.
    pub fn new(red: T, black: T) -> Self {
        Self { red, black, distinct: true }
    }

    /// A pair whose members are indistinguishable.
    pub fn degenerate(value: T) -> Self {
        Self { red: value.clone(), black: value, distinct: false }
    }

    /// Build a pair with an explicit distinctness claim. Used by derived
    /// impls, which know statically whether any probed field can differ.
    pub fn from_members(red: T, black: T, distinct: bool) -> Self {
        Self { red, black, distinct }
    }

    /// Whether the two members are actually unequal.
    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// Clone out one member of the pair.
    pub fn take(&self, pole: Pole) -> T {
        match pole {
            Pole::Red => self.red.clone(),
            Pole::Black => self.black.clone(),
        }
    }

    pub(crate) fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }
}

/// Types that can produce a prefab pair of themselves.
///
/// Implemented for the built-in leaf and container types in
/// [`crate::containers`], and by `#[derive(Inspect)]` for user types.
/// Implementations recurse through [`ValueSource::pair`] so that caching,
/// registry overrides and cycle detection apply uniformly.
pub trait Prefabricate: Clone + Sized + 'static {
    fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError>;
}

/// Produces and caches prefab pairs for one verification run.
///
/// Owns the caller's registry of override pairs, the per-run cache, the
/// seeded RNG that leaf impls draw from, and the recursion trail. Dropped
/// at the end of the run; nothing leaks across runs.
pub struct ValueSource {
    registry: ContainerRegistry,
    cache: HashMap<TypeId, Box<dyn Any>>,
    trail: Vec<&'static str>,
    rng: StdRng,
    bypass_cache: bool,
}

impl ValueSource {
    /// Create a source over the given registry, seeding the RNG.
    pub fn new(registry: ContainerRegistry, seed: Option<u64>) -> Self {
        Self {
            registry,
            cache: HashMap::new(),
            trail: Vec::new(),
            rng: create_rng(seed),
            bypass_cache: false,
        }
    }

    /// The RNG leaf impls draw their values from.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Produce a pair for `T`.
    ///
    /// Resolution order: caller-registered pair, per-run cache, recursive
    /// synthesis. A type already on the recursion trail fails with
    /// [`SynthesisError::Recursive`] naming the chain; resolving the cycle
    /// silently would either not terminate or produce non-distinct values.
    pub fn pair<T: Prefabricate>(&mut self) -> Result<ValuePair<T>, SynthesisError> {
        if let Some(pair) = self.registry.lookup::<T>() {
            return Ok(pair);
        }
        if !self.bypass_cache
            && let Some(pair) = self.cached::<T>()
        {
            return Ok(pair);
        }

        let name = type_name::<T>();
        if self.trail.contains(&name) {
            let mut trail = self.trail.clone();
            trail.push(name);
            return Err(SynthesisError::recursive(trail));
        }

        self.trail.push(name);
        let result = T::prefab_pair(self);
        self.trail.pop();

        let pair = result?;
        if !self.bypass_cache {
            self.cache.insert(TypeId::of::<T>(), Box::new(pair.clone()));
        }
        Ok(pair)
    }

    /// Produce a pair for a type that cannot be synthesized; only the
    /// registry is consulted.
    pub fn registered_pair<T: Clone + 'static>(&mut self) -> Result<ValuePair<T>, SynthesisError> {
        self.registry
            .lookup::<T>()
            .ok_or_else(|| SynthesisError::missing_prefab(type_name::<T>()))
    }

    /// Whether a pair for `T` could be resolved without synthesis.
    pub fn has_registered<T: 'static>(&self) -> bool {
        self.registry.contains::<T>()
    }

    fn cached<T: Prefabricate>(&self) -> Option<ValuePair<T>> {
        self.cache
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<ValuePair<T>>())
            .cloned()
    }

    pub(crate) fn registry(&self) -> &ContainerRegistry {
        &self.registry
    }

    /// Snapshot the RNG so a later synthesis can replay the same draws.
    pub(crate) fn snapshot_rng(&self) -> StdRng {
        self.rng.clone()
    }

    pub(crate) fn restore_rng(&mut self, rng: StdRng) {
        self.rng = rng;
    }

    /// While set, pairs are recomputed instead of served from (or written
    /// to) the cache. The identity check uses this to obtain structurally
    /// equal instances with independent allocations.
    pub(crate) fn set_cache_bypass(&mut self, bypass: bool) {
        self.bypass_cache = bypass;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> ValueSource {
        ValueSource::new(ContainerRegistry::new(), None)
    }

    #[test]
    fn test_leaf_pair_is_distinct() {
        let mut source = source();
        let pair = source.pair::<i32>().unwrap();
        assert!(pair.is_distinct());
        assert_ne!(pair.red, pair.black);
    }

    #[test]
    fn test_pairs_are_cached_per_run() {
        let mut source = source();
        let first = source.pair::<String>().unwrap();
        let second = source.pair::<String>().unwrap();
        assert_eq!(first.red, second.red);
        assert_eq!(first.black, second.black);
    }

    #[test]
    fn test_registered_pair_overrides_builtin() {
        let mut registry = ContainerRegistry::new();
        registry.register(10_i32, 20_i32);
        let mut source = ValueSource::new(registry, None);
        let pair = source.pair::<i32>().unwrap();
        assert_eq!(pair.red, 10);
        assert_eq!(pair.black, 20);
    }

    #[test]
    fn test_registered_pair_missing() {
        #[derive(Clone)]
        struct Opaque;
        let mut source = source();
        let err = match source.registered_pair::<Opaque>() {
            Err(err) => err,
            Ok(_) => panic!("expected a missing-prefab error"),
        };
        assert!(matches!(err, SynthesisError::MissingPrefab { .. }));
    }

    #[test]
    fn test_take_clones_the_requested_pole() {
        let pair = ValuePair::new(1, 2);
        assert_eq!(pair.take(Pole::Red), 1);
        assert_eq!(pair.take(Pole::Black), 2);
    }

    #[test]
    fn test_degenerate_pair() {
        let pair = ValuePair::degenerate(5);
        assert!(!pair.is_distinct());
        assert_eq!(pair.red, pair.black);
    }

    #[test]
    fn test_recursion_is_detected() {
        // A hand-rolled self-referential impl; the derive produces the same
        // call pattern for `Option<Box<Self>>` fields.
        #[derive(Debug, Clone)]
        struct Node {
            _next: Option<Box<Node>>,
        }
        impl Prefabricate for Node {
            fn prefab_pair(source: &mut ValueSource) -> Result<ValuePair<Self>, SynthesisError> {
                let next = source.pair::<Option<Box<Node>>>()?;
                Ok(ValuePair::new(
                    Node { _next: next.red },
                    Node { _next: next.black },
                ))
            }
        }

        let mut source = source();
        let err = source.pair::<Node>().unwrap_err();
        match err {
            SynthesisError::Recursive { trail } => {
                assert!(trail.len() >= 2);
                assert_eq!(trail.first(), trail.last());
            }
            other => panic!("expected recursion error, got {other:?}"),
        }
    }
}
