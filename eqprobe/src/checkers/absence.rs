//! `None` probes on optional fields.
//!
//! The classic defect: `eq` calls `.unwrap()` (or indexes through) an
//! optional field without handling `None`. Each optional field is set to
//! `None` and `eq`, `hash` and `Debug` are exercised; a panic is reported
//! with the field and operation, the payload preserved as the cause.

use crate::classify::{FieldHint, has_hint};
use crate::config::Suppress;
use crate::outcome::{CheckError, Diagnosis, FailureKind, PanicCause};
use crate::subject::{Context, Verifiable, debug_probe, eq_probe, hash_probe};

pub(crate) fn check<T: Verifiable>(ctx: &mut Context<T>) -> Result<(), CheckError> {
    if ctx.config.is_suppressed(Suppress::AbsentValues) {
        return Ok(());
    }

    let base = ctx.plain()?;
    for index in 0..ctx.shape.fields.len() {
        let field = ctx.field(index);
        if !ctx.probeable(index) || !field.flags.optional {
            continue;
        }
        if has_hint(ctx.classifier, field, FieldHint::NeverAbsent) {
            continue;
        }
        let Some(absent) = ctx.with_absent(&base, index) else {
            continue;
        };

        let name = field.name;
        let against_populated =
            eq_probe(&base, &absent, Some(name)).map_err(|cause| absent_failure(name, cause))?;
        let reverse =
            eq_probe(&absent, &base, Some(name)).map_err(|cause| absent_failure(name, cause))?;
        if against_populated != reverse {
            return Err(Diagnosis::on_field(
                FailureKind::Symmetry,
                name,
                format!(
                    "with this field absent, eq(a, b) is {against_populated} but eq(b, a) \
                     is {reverse}"
                ),
            )
            .into());
        }

        let copy = absent.clone();
        let reflexive =
            eq_probe(&absent, &copy, Some(name)).map_err(|cause| absent_failure(name, cause))?;
        if !reflexive {
            return Err(Diagnosis::on_field(
                FailureKind::AbsentValue,
                name,
                "an instance with this field absent does not equal its own clone",
            )
            .into());
        }

        hash_probe(&absent, Some(name)).map_err(|cause| absent_failure(name, cause))?;
        debug_probe(&absent, Some(name)).map_err(|cause| absent_failure(name, cause))?;
    }
    Ok(())
}

fn absent_failure(field: &'static str, cause: PanicCause) -> CheckError {
    Diagnosis::on_field(
        FailureKind::AbsentValue,
        field,
        format!("{} panicked when this field was None; handle the absent case", cause.operation),
    )
    .caused_by(cause)
    .into()
}
