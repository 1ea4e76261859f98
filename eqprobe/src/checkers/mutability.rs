//! Interior-mutable fields participating in equality.
//!
//! A `Cell`/`RefCell`-style field that `eq` or `hash` reads can change
//! after an instance was inserted into a hash-keyed collection, stranding
//! the entry in the wrong bucket. Rust's ownership rules make this the
//! moral equivalent of a non-final significant field.

use crate::classify::{FieldHint, has_hint};
use crate::config::Suppress;
use crate::outcome::{CheckError, Diagnosis, FailureKind};
use crate::subject::{Context, Verifiable};

pub(crate) fn check<T: Verifiable>(ctx: &mut Context<T>) -> Result<(), CheckError> {
    if ctx.config.is_suppressed(Suppress::InteriorMutability) {
        return Ok(());
    }

    for &index in &ctx.significant {
        let field = ctx.field(index);
        if !field.flags.interior_mutable {
            continue;
        }
        if has_hint(ctx.classifier, field, FieldHint::ImmutableDeclared) {
            continue;
        }
        return Err(Diagnosis::on_field(
            FailureKind::InteriorMutability,
            field.name,
            "an interior-mutable field participates in equality; a key mutated after \
             insertion corrupts hash-based collections. Suppress InteriorMutability if \
             this is intended",
        )
        .into());
    }
    Ok(())
}
