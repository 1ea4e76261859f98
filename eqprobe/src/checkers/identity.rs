//! Equality must be structural, never allocation identity.
//!
//! Replacing a field with a freshly cloned copy of the same value, or
//! rebuilding the whole instance from independently allocated parts, must
//! not change equality or hashing. A `Vec` compared via `as_ptr`, a boxed
//! value compared by address, or an `Rc` compared only with `ptr_eq` all
//! fail here.

use crate::config::Suppress;
use crate::outcome::{CheckError, Diagnosis, FailureKind};
use crate::shape::Pole;
use crate::subject::{Context, Verifiable, eq_probe, hash_probe};

pub(crate) fn check<T: Verifiable>(ctx: &mut Context<T>) -> Result<(), CheckError> {
    if ctx.config.is_suppressed(Suppress::IdenticalCopy) {
        return Ok(());
    }

    let base = ctx.plain()?;
    let base_hash = hash_probe(&base, None)?;

    // Field by field: same value, separately cloned allocation.
    for index in 0..ctx.shape.fields.len() {
        let field = ctx.field(index);
        if !ctx.probeable(index) {
            continue;
        }
        let twin = ctx.with_field(&base, index, Pole::Red)?;
        if !eq_probe(&base, &twin, Some(field.name))? {
            let detail = if field.flags.sequence {
                "a separately allocated copy of this sequence field compares unequal; \
                 compare contents, not pointers"
            } else {
                "a separately allocated copy of this field compares unequal; \
                 eq depends on allocation identity"
            };
            return Err(Diagnosis::on_field(FailureKind::IdentityComparison, field.name, detail)
                .into());
        }
        if base_hash != hash_probe(&twin, Some(field.name))? {
            return Err(Diagnosis::on_field(
                FailureKind::HashConsistency,
                field.name,
                "equal instances hash differently after this field was re-allocated; \
                 hash depends on allocation identity",
            )
            .into());
        }
    }

    // Shared references (Rc, Arc) survive the per-field probe because
    // cloning them shares the allocation; a full rebuild with the pair
    // cache bypassed gives genuinely independent allocations.
    let shared: Vec<&'static str> = ctx
        .shape
        .probed_fields()
        .filter(|f| f.flags.shared_ref)
        .map(|f| f.name)
        .collect();
    if !shared.is_empty() {
        let (first, second) = ctx.independent_twins()?;
        if !eq_probe(&first, &second, None)? {
            return Err(Diagnosis::on_fields(
                FailureKind::IdentityComparison,
                shared,
                "independently allocated instances of identical values compare unequal; \
                 a shared-reference field is likely compared with ptr_eq",
            )
            .into());
        }
        if hash_probe(&first, None)? != hash_probe(&second, None)? {
            return Err(Diagnosis::on_fields(
                FailureKind::HashConsistency,
                shared,
                "independently allocated instances of identical values hash differently",
            )
            .into());
        }
    }
    Ok(())
}
