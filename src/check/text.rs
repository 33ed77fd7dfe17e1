use crate::config::Pattern;

use super::{ComplexCheck, Failure, ValidationResult};

/// Every `regexp` entry must match somewhere in `text`; first miss wins.
pub(crate) fn check(text: &str, ctx: &ComplexCheck<'_>) -> ValidationResult {
    for source in ctx.regexp {
        let pattern = Pattern::compile(source)
            .map_err(|error| Failure::invalid_pattern(ctx.value, source, &error, ctx.config))?;
        if !pattern.test(text) {
            return Err(Failure::pattern_mismatch(ctx.value, text, pattern.as_literal(), ctx.config));
        }
    }
    Ok(())
}
