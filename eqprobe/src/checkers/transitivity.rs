//! Detects eq implementations that cannot be transitive.
//!
//! An eq built from OR-combined field comparisons passes reflexivity and
//! symmetry but not transitivity. For every pair of significant fields,
//! three instances are built that pairwise differ in one field each; if
//! two of the three pairs compare equal, the third must as well.

use crate::outcome::{CheckError, Diagnosis, FailureKind};
use crate::shape::Pole;
use crate::subject::{Context, Verifiable, eq_probe};

pub(crate) fn check<T: Verifiable>(ctx: &mut Context<T>) -> Result<(), CheckError> {
    // All probed fields take part, not just the recorded significant set:
    // a field OR-combined into eq looks insignificant to a single-field
    // mutation, and those are exactly the fields this check exists for.
    let mut probed = Vec::new();
    for index in 0..ctx.shape.fields.len() {
        if ctx.probeable(index) && ctx.field_pair_distinct(index)? {
            probed.push(index);
        }
    }
    for (position, &first) in probed.iter().enumerate() {
        for &second in &probed[position + 1..] {
            probe_pair(ctx, first, second)?;
        }
    }
    Ok(())
}

fn probe_pair<T: Verifiable>(
    ctx: &mut Context<T>,
    first: usize,
    second: usize,
) -> Result<(), CheckError> {
    // a and b differ in `first`; b and c differ in `second`; a and c
    // differ in both.
    let a = ctx.plain()?;
    let b = ctx.with_field(&a, first, Pole::Black)?;
    let c = ctx.with_field(&b, second, Pole::Black)?;

    let ab = eq_probe(&a, &b, None)?;
    let bc = eq_probe(&b, &c, None)?;
    let ac = eq_probe(&a, &c, None)?;

    let equal_pairs = usize::from(ab) + usize::from(bc) + usize::from(ac);
    if equal_pairs == 2 {
        let first_name = ctx.field(first).name;
        let second_name = ctx.field(second).name;
        return Err(Diagnosis::on_fields(
            FailureKind::Transitivity,
            vec![first_name, second_name],
            "two of three probe instances compare equal but the third pair does not; \
             eq is likely OR-combining field comparisons",
        )
        .into());
    }
    Ok(())
}
