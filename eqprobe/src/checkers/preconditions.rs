//! Configuration and example validation, run before any contract check.

use crate::config::{ConfigError, Suppress};
use crate::outcome::CheckError;
use crate::subject::{Context, Verifiable, eq_probe};

pub(crate) fn check<T: Verifiable>(ctx: &mut Context<T>) -> Result<(), CheckError> {
    ctx.config.validate(&ctx.shape)?;

    if let Some(type_name) = ctx.source.registry().equal_pairs().first() {
        return Err(ConfigError::EqualPrefabPair { type_name: type_name.to_string() }.into());
    }

    if let Some(cached) = ctx.cached_hash {
        if ctx.shape.field_named(cached.field).is_none() {
            return Err(ConfigError::UnknownField { name: cached.field.to_string() }.into());
        }
        if cached.example.is_none() && !ctx.config.is_suppressed(Suppress::NoCachedHashExample) {
            return Err(ConfigError::MissingCachedHashExample.into());
        }
    }

    for (i, reference) in ctx.equal_examples.iter().enumerate() {
        for (j, other) in ctx.equal_examples.iter().enumerate().skip(i + 1) {
            if !eq_probe(reference, other, None)? {
                return Err(ConfigError::InvalidExamples {
                    message: format!("equal examples #{i} and #{j} are not equal"),
                }
                .into());
            }
        }
    }

    for (i, reference) in ctx.unequal_examples.iter().enumerate() {
        for (j, other) in ctx.unequal_examples.iter().enumerate().skip(i + 1) {
            if eq_probe(reference, other, None)? {
                return Err(ConfigError::InvalidExamples {
                    message: format!("unequal examples #{i} and #{j} are equal"),
                }
                .into());
            }
        }
    }

    // Warm-up synthesis: recursive structures and missing prefab pairs
    // surface here as setup errors, before any contract check runs.
    let _ = ctx.plain()?;
    let _ = ctx.changed()?;
    Ok(())
}
