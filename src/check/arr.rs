use crate::config::TypeConfig;
use crate::value::{Value, UNDEFINED};

use super::{ValidationResult, Validator};

/// Leading positions against `sub_props`, then every element against
/// `sub_props_type`. Either pass stops at its first failure.
///
/// Positions past the end of `list` read as `undefined`; elements past
/// `sub_props.len()` are only seen by the uniform pass.
pub(crate) fn check(
    validator: &Validator,
    list: &[Value],
    sub_props: &[TypeConfig],
    sub_props_type: Option<&TypeConfig>,
    depth: usize,
) -> ValidationResult {
    for (idx, config) in sub_props.iter().enumerate() {
        let item = list.get(idx).unwrap_or(&UNDEFINED);
        validator.check_at(item, config, depth + 1)?;
    }
    if let Some(item_type) = sub_props_type {
        for item in list {
            validator.check_at(item, item_type, depth + 1)?;
        }
    }
    Ok(())
}
