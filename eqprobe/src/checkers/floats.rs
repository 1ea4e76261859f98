//! NaN and signed-zero pitfalls on float fields.
//!
//! Deriving `PartialEq` over a float field gives IEEE semantics: an
//! instance holding NaN no longer equals its own clone, which silently
//! breaks every probe built on reflexivity. Total-order comparison
//! (`to_bits`, `total_cmp`) is expected instead. Signed zero is the dual
//! pitfall: when `0.0` and `-0.0` compare equal, hashing their bits makes
//! equal values hash differently.

use crate::outcome::{CheckError, Diagnosis, FailureKind};
use crate::shape::FloatProbe;
use crate::subject::{Context, Verifiable, eq_probe, hash_probe};

pub(crate) fn check<T: Verifiable>(ctx: &mut Context<T>) -> Result<(), CheckError> {
    let base = ctx.plain()?;

    for index in 0..ctx.shape.fields.len() {
        let field = ctx.field(index);
        if !ctx.probeable(index) || !field.flags.float {
            continue;
        }

        if let Some(nan) = ctx.with_float(&base, index, FloatProbe::Nan) {
            let copy = nan.clone();
            if !eq_probe(&nan, &copy, Some(field.name))? {
                return Err(Diagnosis::on_field(
                    FailureKind::FloatEquality,
                    field.name,
                    "with NaN in this field an instance does not equal its own clone; \
                     compare with to_bits or total_cmp instead of ==",
                )
                .into());
            }
        }

        let positive = ctx.with_float(&base, index, FloatProbe::PositiveZero);
        let negative = ctx.with_float(&base, index, FloatProbe::NegativeZero);
        if let (Some(positive), Some(negative)) = (positive, negative)
            && eq_probe(&positive, &negative, Some(field.name))?
            && hash_probe(&positive, Some(field.name))? != hash_probe(&negative, Some(field.name))?
        {
            return Err(Diagnosis::on_field(
                FailureKind::FloatEquality,
                field.name,
                "0.0 and -0.0 in this field compare equal but hash differently; \
                 normalize the sign before hashing",
            )
            .into());
        }
    }
    Ok(())
}
