//! Structural type model: descriptor tables and the `Inspect` capability.
//!
//! Rust has no runtime reflection, so the structural model of a type under
//! verification is a static table emitted by `#[derive(Inspect)]`. The
//! derive also emits the per-field lenses (`with_field` and friends) the
//! instance synthesizer uses to mutate one field at a time.

use crate::prefab::{SynthesisError, ValueSource};

/// Which member of a prefab value pair to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pole {
    Red,
    Black,
}

impl Pole {
    /// The other member of the pair.
    pub fn opposite(self) -> Self {
        match self {
            Pole::Red => Pole::Black,
            Pole::Black => Pole::Red,
        }
    }
}

/// Special floating-point values injected by the float pitfall checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatProbe {
    Nan,
    PositiveZero,
    NegativeZero,
}

impl FloatProbe {
    /// Materialize the probe for a concrete float type.
    pub fn value<F: num_traits::Float>(self) -> F {
        match self {
            FloatProbe::Nan => F::nan(),
            FloatProbe::PositiveZero => F::zero(),
            FloatProbe::NegativeZero => F::neg_zero(),
        }
    }
}

/// Structural classification of a field's declared type.
///
/// Computed syntactically by the derive; the checkers use these flags to
/// pick which probes apply to a field and to tailor diagnoses. Behavioral
/// significance is never decided from flags alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldFlags {
    /// Excluded from probing (`#[inspect(skip)]` or `PhantomData`).
    pub skipped: bool,
    /// Declared as `Option<..>`; eligible for absence probing.
    pub optional: bool,
    /// Declared as `f32` or `f64`; eligible for NaN and signed-zero probing.
    pub float: bool,
    /// A growable or fixed-length sequence (`Vec`, `VecDeque`, arrays, ..).
    pub sequence: bool,
    /// Interior-mutable container (`Cell`, `RefCell`, `Mutex`, `RwLock`,
    /// atomics).
    pub interior_mutable: bool,
    /// Heap indirection that can be compared by pointer (`Box`, `Rc`, `Arc`).
    pub shared_ref: bool,
    /// `#[inspect(prefab)]`: the type cannot be synthesized and a pair must
    /// be registered before verification.
    pub external_prefab: bool,
}

impl FieldFlags {
    /// All flags cleared.
    pub const NONE: FieldFlags = FieldFlags {
        skipped: false,
        optional: false,
        float: false,
        sequence: false,
        interior_mutable: false,
        shared_ref: false,
        external_prefab: false,
    };
}

/// One field of a type under verification.
#[derive(Debug, Clone, Copy)]
pub struct FieldShape {
    /// Field name; tuple struct fields are named "0", "1", ..
    pub name: &'static str,
    /// Declared type, as written in the source.
    pub type_name: &'static str,
    /// Position in declaration order; the lens functions key off this.
    pub index: usize,
    pub flags: FieldFlags,
}

/// What kind of item the type is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Struct,
    TupleStruct,
    UnitStruct,
    /// Enums are synthesized as leaf values from two distinct variants and
    /// carry no probeable fields of their own.
    Enum { variants: usize },
}

/// Descriptor table for a type under verification.
///
/// Field metadata is a `'static` table emitted once by the derive; the
/// type name is resolved through `std::any::type_name` so generic
/// instantiations stay distinguishable.
#[derive(Debug, Clone, Copy)]
pub struct TypeShape {
    pub type_name: &'static str,
    pub kind: ShapeKind,
    pub fields: &'static [FieldShape],
}

impl TypeShape {
    /// Fields that participate in probing (skipped fields excluded).
    pub fn probed_fields(&self) -> impl Iterator<Item = &'static FieldShape> {
        self.fields.iter().filter(|f| !f.flags.skipped)
    }

    /// Look a field up by name.
    pub fn field_named(&self, name: &str) -> Option<&'static FieldShape> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Capability interface between a type under verification and the core.
///
/// Implemented by `#[derive(Inspect)]`; hand-written impls are possible but
/// rarely worth it. The methods mirror what reflection-based verifiers do
/// through field writes: build an instance from prefab values, and produce
/// copies with exactly one field replaced. Mutation never shares mutable
/// state with the receiver; lenses clone.
pub trait Inspect: Clone + Sized + 'static {
    /// The descriptor table for this type.
    fn shape() -> TypeShape;

    /// Build an instance with every field drawn from the given pole of its
    /// prefab pair.
    fn synthesize(source: &mut ValueSource, pole: Pole) -> Result<Self, SynthesisError>;

    /// A copy of `self` with field `field` replaced by the given pole of its
    /// prefab pair. Out-of-range indices return the unmodified clone.
    fn with_field(
        &self,
        field: usize,
        pole: Pole,
        source: &mut ValueSource,
    ) -> Result<Self, SynthesisError>;

    /// A copy of `self` with field `field` set to `None`, when that field is
    /// an `Option`. `None` otherwise.
    fn with_field_absent(&self, field: usize) -> Option<Self>;

    /// A copy of `self` with float field `field` set to the probe value,
    /// when that field is an `f32` or `f64`. `None` otherwise.
    fn with_field_float(&self, field: usize, probe: FloatProbe) -> Option<Self>;

    /// Whether the prefab pair for field `field` has distinct members.
    /// Skipped fields and degenerate pairs report false; such fields
    /// cannot drive a mutation probe and are treated as insignificant.
    fn field_pair_distinct(field: usize, source: &mut ValueSource)
    -> Result<bool, SynthesisError>;
}
