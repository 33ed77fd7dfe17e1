//! Top-level entry: one schema, or a list of alternatives.
//!
//! The path is picked from the *data*: numbers and booleans go through the
//! full rule chain, everything else goes straight to its structural checker.
//! Composite data is therefore never empty- or type-gated at the top level,
//! only its children are.
use crate::check::{default_validator, Failure, ValidationResult, Validator};
use crate::config::Schema;
use crate::kind::SIMPLE_KINDS;
use crate::value::Value;

impl Validator {
    /// First passing alternative wins; otherwise the last failure is returned.
    /// An empty list passes.
    pub fn check_type_handle(&self, data: &Value, schema: &Schema) -> ValidationResult {
        let simple = SIMPLE_KINDS.contains(data.kind().as_str());
        let mut last = Ok(());
        for config in schema.alternatives() {
            last = if simple {
                self.check_type_from_config(data, config)
            } else {
                self.complex_check(data, config)
            };
            if last.is_ok() {
                break;
            }
        }
        last
    }

    /// Same alternative selection, but every alternative runs the full rule
    /// chain against `data`, root included.
    pub fn check_one_of(&self, data: &Value, schema: &Schema) -> ValidationResult {
        let mut last = Ok(());
        for config in schema.alternatives() {
            last = self.check_type_from_config(data, config);
            if last.is_ok() {
                break;
            }
        }
        last
    }

    pub async fn validate(&self, data: Value, schema: impl Into<Schema>) -> Result<Value, Failure> {
        let schema = schema.into();
        self.check_type_handle(&data, &schema).map(|()| data)
    }
}

pub fn check_type_handle(data: &Value, schema: &Schema) -> ValidationResult {
    default_validator().check_type_handle(data, schema)
}

/// Resolves with `data` untouched when it conforms.
pub async fn validate(data: Value, schema: impl Into<Schema>) -> Result<Value, Failure> {
    default_validator().validate(data, schema).await
}
