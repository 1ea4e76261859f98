//! The verification orchestrator and its fluent configuration surface.

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::checkers;
use crate::checkers::variants::{DistinctVariant, EqualVariant, VariantProbe};
use crate::classify::{FieldClassifier, NoHints};
use crate::config::{Suppress, VerifyConfig};
use crate::containers::ContainerRegistry;
use crate::outcome::{CheckError, VerificationResult, Verdict};
use crate::prefab::ValueSource;
use crate::rng::DEFAULT_SEED;
use crate::statics::{FnState, ProcessState, StaticStateRegistry};
use crate::subject::{CachedHash, Context, Verifiable};

/// Configures and runs a verification of one type's `PartialEq`/`Hash`
/// contract.
///
/// Chain configuration calls, then finish with [`verify`](Self::verify)
/// for the structured result or [`assert_valid`](Self::assert_valid) to
/// fail the surrounding test on a violation.
///
/// # Examples
///
/// ```rust
/// use eqprobe::{Inspect, Verifier};
///
/// #[derive(Debug, Clone, PartialEq, Hash, Inspect)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// Verifier::<Point>::new().assert_valid();
/// ```
pub struct Verifier<T: Verifiable> {
    config: VerifyConfig,
    prefabs: ContainerRegistry,
    statics: StaticStateRegistry,
    classifier: Box<dyn FieldClassifier>,
    cached_hash: Option<CachedHash<T>>,
    cached_hash_example: Option<T>,
    equal_examples: Vec<T>,
    unequal_examples: Vec<T>,
    variants: Vec<Box<dyn VariantProbe<T>>>,
}

impl<T: Verifiable> Verifier<T> {
    /// Create a verifier with default configuration.
    pub fn new() -> Self {
        Self {
            config: VerifyConfig::default(),
            prefabs: ContainerRegistry::new(),
            statics: StaticStateRegistry::new(),
            classifier: Box::new(NoHints),
            cached_hash: None,
            cached_hash_example: None,
            equal_examples: Vec::new(),
            unequal_examples: Vec::new(),
            variants: Vec::new(),
        }
    }

    /// Relax the check the given warning names.
    pub fn suppress(mut self, warning: Suppress) -> Self {
        self.config.suppressed.insert(warning);
        self
    }

    /// Seed value synthesis explicitly, e.g. to replay a reported failure.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Require exactly these fields to be significant, and no others.
    /// Mutually exclusive with [`ignore_fields`](Self::ignore_fields).
    pub fn only_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.only_fields = Some(names.into_iter().map(Into::into).collect::<BTreeSet<_>>());
        self
    }

    /// Require these fields to stay out of equality.
    pub fn ignore_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.ignored_fields.extend(names.into_iter().map(Into::into));
        self
    }

    /// Register an unequal value pair for a field type, overriding the
    /// built-in pair. Required for opaque (`#[inspect(prefab)]`) fields
    /// and for breaking recursive structures.
    pub fn with_prefab<F: Clone + PartialEq + 'static>(mut self, red: F, black: F) -> Self {
        self.prefabs.register(red, black);
        self
    }

    /// Supply instances that must all compare equal to each other.
    pub fn with_equal_examples(mut self, examples: impl IntoIterator<Item = T>) -> Self {
        self.equal_examples.extend(examples);
        self
    }

    /// Supply instances that must all compare unequal to each other.
    pub fn with_unequal_examples(mut self, examples: impl IntoIterator<Item = T>) -> Self {
        self.unequal_examples.extend(examples);
        self
    }

    /// Register a cross-type value that represents the same logical value
    /// as `counterpart` and must compare equal to it, both ways, with
    /// agreeing hashes.
    pub fn with_equal_variant<V>(mut self, variant: V, counterpart: T) -> Self
    where
        T: PartialEq<V>,
        V: PartialEq<T> + Hash + Debug + Clone + 'static,
    {
        self.variants.push(Box::new(EqualVariant { variant, counterpart }));
        self
    }

    /// Register a cross-type value that redefines equality and must never
    /// compare equal to an instance of `T`.
    pub fn with_distinct_variant<V>(mut self, variant: V) -> Self
    where
        T: PartialEq<V>,
        V: PartialEq<T> + Debug + Clone + 'static,
    {
        self.variants.push(Box::new(DistinctVariant { variant, _base: PhantomData }));
        self
    }

    /// Declare a cached hash code field through its lenses: `read`/`write`
    /// access the cache, `recompute` is the pure hash it is supposed to
    /// hold. Zero is treated as "not yet computed"; a type whose real hash
    /// can be zero must also supply
    /// [`with_cached_hash_example`](Self::with_cached_hash_example).
    pub fn with_cached_hash(
        mut self,
        field: &'static str,
        read: impl Fn(&T) -> u64 + 'static,
        write: impl Fn(&mut T, u64) + 'static,
        recompute: impl Fn(&T) -> u64 + 'static,
    ) -> Self {
        self.cached_hash = Some(CachedHash {
            field,
            read: Box::new(read),
            write: Box::new(write),
            recompute: Box::new(recompute),
            example: None,
        });
        self
    }

    /// Supply the example instance for the cached hash declaration.
    pub fn with_cached_hash_example(mut self, example: T) -> Self {
        self.cached_hash_example = Some(example);
        self
    }

    /// Plug in an external field classifier.
    pub fn with_classifier(mut self, classifier: impl FieldClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    /// Register process-wide state to snapshot before and restore after
    /// every check, so probes cannot leak into each other or into the
    /// caller's process.
    pub fn with_process_state<V: 'static>(
        mut self,
        save: impl Fn() -> V + 'static,
        restore: impl Fn(V) + 'static,
    ) -> Self {
        self.statics.register(Box::new(FnState::new(save, restore)));
        self
    }

    /// Register a custom process-state guard.
    pub fn with_state_guard(mut self, guard: Box<dyn ProcessState>) -> Self {
        self.statics.register(guard);
        self
    }

    /// Run the checker pipeline and return the structured result.
    ///
    /// Checkers run in the order documented in [`crate::checkers`]; the
    /// first failure ends the run. Every checker executes inside the
    /// process-state guards, so repeated runs are independent.
    pub fn verify(mut self) -> VerificationResult {
        let shape = T::shape();
        let seed = self.config.seed.unwrap_or(DEFAULT_SEED);

        if let Some(example) = self.cached_hash_example.take()
            && let Some(cached) = self.cached_hash.as_mut()
        {
            cached.example = Some(example);
        }

        let Verifier {
            config,
            prefabs,
            statics,
            classifier,
            cached_hash,
            equal_examples,
            unequal_examples,
            variants,
            ..
        } = self;

        let source = ValueSource::new(prefabs, config.seed);
        let mut ctx = Context::new(
            &config,
            classifier.as_ref(),
            source,
            cached_hash.as_ref(),
            &equal_examples,
            &unequal_examples,
        );

        let outcome = run_pipeline(&statics, &variants, &mut ctx);
        let verdict = match outcome {
            Ok(checks) => Verdict::Success { checks },
            Err(CheckError::Contract(diagnosis)) => Verdict::ContractFailure(diagnosis),
            Err(CheckError::Setup(error)) => Verdict::SetupError(error),
        };
        VerificationResult { type_name: shape.type_name, seed, verdict }
    }

    /// Run the pipeline and panic with a formatted report on failure.
    #[track_caller]
    pub fn assert_valid(self) {
        self.verify().assert_valid();
    }
}

impl<T: Verifiable> Default for Verifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Run every checker in pipeline order, each inside the process-state
/// guards; returns how many stages ran, or the first failure.
fn run_pipeline<T: Verifiable>(
    statics: &StaticStateRegistry,
    variants: &[Box<dyn VariantProbe<T>>],
    ctx: &mut Context<T>,
) -> Result<usize, CheckError> {
    let mut checks = 0;

    statics.with_restored(|| checkers::preconditions::check(&mut *ctx))?;
    checks += 1;
    statics.with_restored(|| checkers::examples::check(&mut *ctx))?;
    checks += 1;
    statics.with_restored(|| checkers::significance::check(&mut *ctx))?;
    checks += 1;
    statics.with_restored(|| checkers::symmetry::check(&mut *ctx))?;
    checks += 1;
    statics.with_restored(|| checkers::transitivity::check(&mut *ctx))?;
    checks += 1;
    statics.with_restored(|| checkers::identity::check(&mut *ctx))?;
    checks += 1;
    statics.with_restored(|| checkers::floats::check(&mut *ctx))?;
    checks += 1;
    statics.with_restored(|| checkers::absence::check(&mut *ctx))?;
    checks += 1;
    statics.with_restored(|| checkers::mutability::check(&mut *ctx))?;
    checks += 1;
    statics.with_restored(|| checkers::variants::check(&mut *ctx, variants))?;
    checks += 1;
    statics.with_restored(|| checkers::cached_hash::check(&mut *ctx))?;
    checks += 1;

    Ok(checks)
}

/// Verify a type with the default configuration.
pub fn verify<T: Verifiable>() -> VerificationResult {
    Verifier::<T>::new().verify()
}
