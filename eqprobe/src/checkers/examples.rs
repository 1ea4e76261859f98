//! Reflexivity and hash determinism over synthesized and supplied
//! instances.

use crate::outcome::{CheckError, Diagnosis, FailureKind};
use crate::subject::{Context, Verifiable, eq_probe, hash_probe};

pub(crate) fn check<T: Verifiable>(ctx: &mut Context<T>) -> Result<(), CheckError> {
    let plain = ctx.plain()?;
    let changed = ctx.changed()?;

    check_single(&plain)?;
    check_single(&changed)?;
    for example in ctx.equal_examples.iter().chain(ctx.unequal_examples.iter()) {
        check_single(example)?;
    }

    // Equal examples were verified pairwise equal in preconditions; their
    // hashes must agree as well.
    for (i, reference) in ctx.equal_examples.iter().enumerate() {
        for (j, other) in ctx.equal_examples.iter().enumerate().skip(i + 1) {
            if hash_probe(reference, None)? != hash_probe(other, None)? {
                return Err(Diagnosis::new(
                    FailureKind::HashConsistency,
                    format!("equal examples #{i} and #{j} have different hashes"),
                )
                .into());
            }
        }
    }
    Ok(())
}

fn check_single<T: Verifiable>(instance: &T) -> Result<(), CheckError> {
    if !eq_probe(instance, instance, None)? {
        return Err(Diagnosis::new(
            FailureKind::Reflexivity,
            "an instance does not equal itself",
        )
        .into());
    }

    let first = hash_probe(instance, None)?;
    let second = hash_probe(instance, None)?;
    if first != second {
        return Err(Diagnosis::new(
            FailureKind::HashConsistency,
            format!("hashing the same instance twice gave {first} and then {second}"),
        )
        .into());
    }

    // Clone inequality is diagnosed by the identity check with the field
    // named; here only the hash side of the contract is asserted.
    let copy = instance.clone();
    if eq_probe(instance, &copy, None)? && first != hash_probe(&copy, None)? {
        return Err(Diagnosis::new(
            FailureKind::HashConsistency,
            "an instance and its equal clone have different hashes",
        )
        .into());
    }
    Ok(())
}
