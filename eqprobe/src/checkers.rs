//! The contract checker pipeline.
//!
//! Checkers run in a single, fixed order because later checks assume
//! invariants established by earlier ones (the mutability check consults
//! the significant set, the variant and cached-hash checks assume
//! reflexivity holds, and so on). The first failing checker ends the run.
//!
//! Pipeline order:
//!  1. preconditions: configuration and example validation, warm-up
//!     synthesis so setup errors surface before any contract check
//!  2. examples: reflexivity and hash determinism
//!  3. significance: behavioral field significance, eq/hash consistency
//!  4. symmetry
//!  5. transitivity
//!  6. identity: structural equality must not depend on allocations
//!  7. floats: NaN and signed-zero handling
//!  8. absence: `None` probes on optional fields
//!  9. mutability: interior-mutable significant fields
//! 10. variants: cross-type equality expectations
//! 11. cached_hash: declared hash cache coherence

pub(crate) mod absence;
pub(crate) mod cached_hash;
pub(crate) mod examples;
pub(crate) mod floats;
pub(crate) mod identity;
pub(crate) mod mutability;
pub(crate) mod preconditions;
pub(crate) mod significance;
pub(crate) mod symmetry;
pub(crate) mod transitivity;
pub(crate) mod variants;
