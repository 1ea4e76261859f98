//! Cross-type equality expectations.
//!
//! Rust spells subclass-style equality as `PartialEq` between distinct
//! types. A caller registers each related type with an expectation:
//! an *equal* variant is a counterpart pair that must compare equal in
//! both directions with agreeing hashes (the Liskov-friendly case); a
//! *distinct* variant redefines equality and must never equal an
//! instance of the type under verification. Cross-type symmetry is
//! asserted in every case.

use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::outcome::{CheckError, Diagnosis, FailureKind};
use crate::subject::{Context, Verifiable, guarded, hash_probe};

/// Type-erased probe over one registered variant.
pub(crate) trait VariantProbe<T: Verifiable> {
    fn check(&self, ctx: &mut Context<T>) -> Result<(), CheckError>;
}

pub(crate) fn check<T: Verifiable>(
    ctx: &mut Context<T>,
    probes: &[Box<dyn VariantProbe<T>>],
) -> Result<(), CheckError> {
    for probe in probes {
        probe.check(ctx)?;
    }
    Ok(())
}

/// A variant instance paired with the value it is supposed to equal.
pub(crate) struct EqualVariant<T, V> {
    pub variant: V,
    pub counterpart: T,
}

impl<T, V> VariantProbe<T> for EqualVariant<T, V>
where
    T: Verifiable + PartialEq<V>,
    V: PartialEq<T> + Hash + Debug + Clone + 'static,
{
    fn check(&self, _ctx: &mut Context<T>) -> Result<(), CheckError> {
        let forward = guarded("eq", None, || self.counterpart == self.variant)?;
        let backward = guarded("eq", None, || self.variant == self.counterpart)?;
        if forward != backward {
            return Err(Diagnosis::new(
                FailureKind::Variant,
                format!(
                    "cross-type eq is asymmetric: base == variant is {forward} but \
                     variant == base is {backward}"
                ),
            )
            .into());
        }
        if !forward {
            return Err(Diagnosis::new(
                FailureKind::Variant,
                format!(
                    "variant {:?} was declared equal to {:?} but compares unequal",
                    self.variant, self.counterpart
                ),
            )
            .into());
        }
        let variant_hash = guarded("hash", None, || crate::subject::hash_of(&self.variant))?;
        if variant_hash != hash_probe(&self.counterpart, None)? {
            return Err(Diagnosis::new(
                FailureKind::Variant,
                "an equal variant hashes differently from its counterpart; cross-type \
                 equal values must agree on hash",
            )
            .into());
        }
        Ok(())
    }
}

/// A variant that redefines equality and must never equal the base type.
pub(crate) struct DistinctVariant<T, V> {
    pub variant: V,
    pub _base: PhantomData<fn() -> T>,
}

impl<T, V> VariantProbe<T> for DistinctVariant<T, V>
where
    T: Verifiable + PartialEq<V>,
    V: PartialEq<T> + Debug + Clone + 'static,
{
    fn check(&self, ctx: &mut Context<T>) -> Result<(), CheckError> {
        let plain = ctx.plain()?;
        let changed = ctx.changed()?;
        for instance in [&plain, &changed] {
            let forward = guarded("eq", None, || *instance == self.variant)?;
            let backward = guarded("eq", None, || self.variant == *instance)?;
            if forward != backward {
                return Err(Diagnosis::new(
                    FailureKind::Variant,
                    format!(
                        "cross-type eq is asymmetric: base == variant is {forward} but \
                         variant == base is {backward}"
                    ),
                )
                .into());
            }
            if forward {
                return Err(Diagnosis::new(
                    FailureKind::Variant,
                    format!(
                        "variant {:?} redefines equality but compares equal to {:?}",
                        self.variant, instance
                    ),
                )
                .into());
            }
        }
        Ok(())
    }
}
