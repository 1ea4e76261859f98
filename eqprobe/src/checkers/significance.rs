//! Behavioral field significance and eq/hash consistency.
//!
//! Significance is observed, not deduced: each probed field is mutated to
//! the opposite pole of its prefab pair and the effect on `eq` and `hash`
//! is recorded. The significant set computed here drives the transitivity
//! and mutability checks later in the pipeline.

use crate::classify::{FieldHint, has_hint};
use crate::config::Suppress;
use crate::outcome::{CheckError, Diagnosis, FailureKind};
use crate::shape::Pole;
use crate::subject::{Context, Verifiable, eq_probe, hash_probe};

pub(crate) fn check<T: Verifiable>(ctx: &mut Context<T>) -> Result<(), CheckError> {
    let base = ctx.plain()?;
    let base_hash = hash_probe(&base, None)?;
    let mut significant = Vec::new();

    for index in 0..ctx.shape.fields.len() {
        let field = ctx.field(index);
        if !ctx.probeable(index) || !ctx.field_pair_distinct(index)? {
            continue;
        }

        let mutated = ctx.with_field(&base, index, Pole::Black)?;
        let eq_changed = !eq_probe(&base, &mutated, Some(field.name))?;
        let hash_changed = base_hash != hash_probe(&mutated, Some(field.name))?;

        // A hash that distinguishes values eq considers equal breaks the
        // hash contract outright; this is never suppressible.
        if !eq_changed && hash_changed {
            return Err(Diagnosis::on_field(
                FailureKind::SignificantFields,
                field.name,
                "hash uses this field but eq does not; equal instances hash differently",
            )
            .into());
        }

        if eq_changed && !hash_changed && !ctx.config.is_suppressed(Suppress::StrictHash) {
            return Err(Diagnosis::on_field(
                FailureKind::SignificantFields,
                field.name,
                "eq uses this field but hash does not",
            )
            .into());
        }

        if ctx.config.is_ignored(field.name) {
            if eq_changed {
                let explanation = if ctx.config.only_fields.is_some() {
                    "eq uses this field, but only_fields does not list it"
                } else {
                    "eq uses this field, but it is listed in ignore_fields"
                };
                return Err(Diagnosis::on_field(
                    FailureKind::SignificantFields,
                    field.name,
                    explanation,
                )
                .into());
            }
            continue;
        }

        if let Some(only) = &ctx.config.only_fields
            && only.contains(field.name)
            && !eq_changed
        {
            return Err(Diagnosis::on_field(
                FailureKind::SignificantFields,
                field.name,
                "only_fields lists this field but eq does not use it",
            )
            .into());
        }

        let hinted_insignificant = has_hint(ctx.classifier, field, FieldHint::SurrogateKey)
            || has_hint(ctx.classifier, field, FieldHint::LazyLoaded);
        if !eq_changed
            && !hash_changed
            && ctx.config.only_fields.is_none()
            && !ctx.config.is_suppressed(Suppress::AllFieldsUsed)
            && !hinted_insignificant
        {
            return Err(Diagnosis::on_field(
                FailureKind::SignificantFields,
                field.name,
                "neither eq nor hash uses this field; remove it from equality or suppress \
                 AllFieldsUsed",
            )
            .into());
        }

        if eq_changed {
            significant.push(index);
        }
    }

    ctx.significant = significant;
    Ok(())
}
