//! `eq(a, b)` must agree with `eq(b, a)` for every probe pair.

use crate::outcome::{CheckError, Diagnosis, FailureKind};
use crate::shape::Pole;
use crate::subject::{Context, Verifiable, eq_probe};

pub(crate) fn check<T: Verifiable>(ctx: &mut Context<T>) -> Result<(), CheckError> {
    let base = ctx.plain()?;
    let changed = ctx.changed()?;

    let forward = eq_probe(&base, &changed, None)?;
    let backward = eq_probe(&changed, &base, None)?;
    if forward != backward {
        return Err(Diagnosis::new(
            FailureKind::Symmetry,
            format!(
                "for fully differing instances, eq(a, b) is {forward} but eq(b, a) is {backward}"
            ),
        )
        .into());
    }

    for index in 0..ctx.shape.fields.len() {
        let field = ctx.field(index);
        if !ctx.probeable(index) || !ctx.field_pair_distinct(index)? {
            continue;
        }
        let mutant = ctx.with_field(&base, index, Pole::Black)?;
        let forward = eq_probe(&base, &mutant, Some(field.name))?;
        let backward = eq_probe(&mutant, &base, Some(field.name))?;
        if forward != backward {
            return Err(Diagnosis::on_field(
                FailureKind::Symmetry,
                field.name,
                format!(
                    "for instances differing in this field, eq(a, b) is {forward} but \
                     eq(b, a) is {backward}"
                ),
            )
            .into());
        }
    }
    Ok(())
}
