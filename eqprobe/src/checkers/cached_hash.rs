//! Coherence of a declared cached hash code field.
//!
//! Zero is the "not yet computed" sentinel. The checks prove that the
//! type's `Hash` actually reads the cache, that a reset (zeroed) cache
//! recomputes to the same result, that recomputation is deterministic,
//! and that the caller's example still hashes coherently (the example
//! exists to cover a legitimately zero hash).

use crate::outcome::{CheckError, Diagnosis, FailureKind};
use crate::subject::{Context, Verifiable, hash_probe};

pub(crate) fn check<T: Verifiable>(ctx: &mut Context<T>) -> Result<(), CheckError> {
    let Some(cached) = ctx.cached_hash else {
        return Ok(());
    };
    let field = cached.field;

    let probe = ctx.plain()?;

    // The synthesis fixup wrote recompute's result through the write lens;
    // if the read lens disagrees, the lenses do not target the same field.
    if (cached.read)(&probe) != (cached.recompute)(&probe) {
        return Err(Diagnosis::on_field(
            FailureKind::CachedHash,
            field,
            "the read lens does not return what the write lens stored; the cache lenses \
             are inconsistent",
        )
        .into());
    }

    let first = (cached.recompute)(&probe);
    let second = (cached.recompute)(&probe);
    if first != second {
        return Err(Diagnosis::on_field(
            FailureKind::CachedHash,
            field,
            format!("recomputation is not deterministic: got {first} and then {second}"),
        )
        .into());
    }

    let initialized_hash = hash_probe(&probe, Some(field))?;

    let mut reset = probe.clone();
    cached.reset(&mut reset);
    if hash_probe(&reset, Some(field))? != initialized_hash {
        return Err(Diagnosis::on_field(
            FailureKind::CachedHash,
            field,
            "an instance with a zeroed cache hashes differently from an initialized one; \
             hash must recompute when the cache holds the zero sentinel",
        )
        .into());
    }

    let mut corrupted = probe.clone();
    let wrong = if first.wrapping_add(1) == 0 { 2 } else { first.wrapping_add(1) };
    (cached.write)(&mut corrupted, wrong);
    if hash_probe(&corrupted, Some(field))? == initialized_hash {
        return Err(Diagnosis::on_field(
            FailureKind::CachedHash,
            field,
            "hash ignores the declared cache field; corrupting the cache did not change \
             the hash",
        )
        .into());
    }

    if let Some(example) = &cached.example {
        let example_hash = hash_probe(example, Some(field))?;
        let mut example_reset = example.clone();
        cached.reset(&mut example_reset);
        if hash_probe(&example_reset, Some(field))? != example_hash {
            return Err(Diagnosis::on_field(
                FailureKind::CachedHash,
                field,
                "the supplied example hashes differently once its cache is zeroed",
            )
            .into());
        }
    }
    Ok(())
}
