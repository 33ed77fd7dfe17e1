use indexmap::IndexMap;

use crate::value::{Value, UNDEFINED};

use super::{ComplexCheck, Failure, ValidationResult, Validator};

/// Named keys against their `subProps` entries, then every own key against
/// `subPropsType`.
pub(crate) fn check(
    validator: &Validator,
    map: &IndexMap<String, Value>,
    ctx: &ComplexCheck<'_>,
    depth: usize,
) -> ValidationResult {
    for config in ctx.sub_props {
        let Some(key) = config.key.as_deref() else {
            return Err(Failure::missing_key(ctx.value, config));
        };
        let item = map.get(key).unwrap_or(&UNDEFINED);
        validator.check_at(item, config, depth + 1)?;
    }
    if let Some(item_type) = ctx.sub_props_type {
        for item in map.values() {
            validator.check_at(item, item_type, depth + 1)?;
        }
    }
    Ok(())
}
