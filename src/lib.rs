//! Schema-driven shape checks for dynamic values.
//!
//! A value is checked against a hand-written [`TypeConfig`] tree: emptiness,
//! `required`/`nullable`, kind membership, per-position and per-key
//! sub-schemas, a uniform sub-schema, and regex lists for strings. Nothing is
//! inferred and nothing is coerced.
//!
//! - [`check_type_from_config`] runs the full rule chain on one node.
//! - [`validate`] / [`check_type_handle`] accept one schema or a list of
//!   alternatives.
//! - [`guard`] wraps a callable so its arguments and result are checked.
//!
//! ```
//! use json_typecheck::{check_type_from_config, TypeConfig, Value};
//! use serde_json::json;
//!
//! let config = TypeConfig::new("object")
//!     .sub_props([TypeConfig::new("number").key("id").required(true)]);
//! assert!(check_type_from_config(&Value::from(json!({"id": 5})), &config).is_ok());
//! assert!(check_type_from_config(&Value::from(json!({"id": null})), &config).is_err());
//! ```
pub mod check;
pub mod config;
pub mod diagnostics;
pub mod guard;
pub mod handle;
pub mod kind;
pub mod load;
pub mod options;
pub mod value;

pub use check::{
    check_type_from_config, default_validator, is_empty, Failure, FailureKind, Props,
    StructuralChecker, ValidationResult, Validator,
};
pub use config::{ConfigIssue, Pattern, Schema, TypeConfig, TypeConfigOption};
pub use diagnostics::{Diagnostics, SilentDiagnostics, TracingDiagnostics};
pub use guard::{guard, guard_sync, GuardError, Guarded, Stage};
pub use handle::{check_type_handle, validate};
pub use kind::{check_value_type, Kind, TagList};
pub use load::{load_guard_schema, load_schema, LoadError};
pub use options::{UnknownKindPolicy, ValidatorOptions, DEFAULT_MAX_DEPTH};
pub use value::{FunctionRef, Value};
