//! Recursive value-vs-schema checking.
//!
//! [`Validator::check_type_from_config`] walks a value and a [`TypeConfig`]
//! together. Rule order matters: it decides which failure a caller sees.
//!
//! 1. `nullable: false` + empty value → [`FailureKind::Empty`]
//! 2. `required: true` + empty value (NaN excepted) → [`FailureKind::Empty`]
//! 3. `nullable: true` + empty value → pass, nothing else is looked at
//! 4. kind not listed in `type` → [`FailureKind::TypeMismatch`]
//! 5. number/boolean without `subProps`/`regexp` → pass
//! 6. hand off to the [`StructuralChecker`] for the value's kind
//!
//! Composite checkers re-enter step 1 for every child.
mod arr;
mod obj;
mod text;

use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use thiserror::Error;

use crate::config::TypeConfig;
use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::kind::SIMPLE_KINDS;
use crate::options::{UnknownKindPolicy, ValidatorOptions};
use crate::value::Value;

// ------------------------------- Results --------------------------------- //

/// `Ok(())` on success; a [`Failure`] always carries message, value and config.
pub type ValidationResult = Result<(), Failure>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// Empty value where `required` or `nullable: false` forbids it.
    Empty,
    TypeMismatch,
    PatternMismatch,
    /// A `regexp` source that does not compile.
    InvalidPattern,
    /// Object `subProps` entry without a `key`. This is a schema bug rather
    /// than a data bug, but it surfaces through the same channel.
    MissingKey,
    /// Only produced under [`UnknownKindPolicy::Fail`].
    UnsupportedKind,
    DepthExceeded,
}

#[derive(Clone, Debug, PartialEq, Error)]
#[error("{message}")]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
    pub value: Value,
    pub config: TypeConfig,
}

/// The raw `{ value, config }` pair behind a failure.
#[derive(Clone, Debug, PartialEq)]
pub struct Props {
    pub value: Value,
    pub config: TypeConfig,
}

impl Failure {
    fn new(kind: FailureKind, message: String, value: &Value, config: &TypeConfig) -> Self {
        Self { kind, message, value: value.clone(), config: config.clone() }
    }

    pub(crate) fn empty(value: &Value, config: &TypeConfig) -> Self {
        let message = format!("cannot be empty\nvalue:>{value}\nconfig:{}", config.to_json_string());
        Self::new(FailureKind::Empty, message, value, config)
    }

    pub(crate) fn type_mismatch(value: &Value, config: &TypeConfig) -> Self {
        let message = format!(
            "expected {}, got {}\nvalue:>{value}\nconfig:{}",
            config.ty,
            value.kind(),
            config.to_json_string()
        );
        Self::new(FailureKind::TypeMismatch, message, value, config)
    }

    pub(crate) fn pattern_mismatch(value: &Value, text: &str, literal: &str, config: &TypeConfig) -> Self {
        let message = format!("{text} did not pass {literal}");
        Self::new(FailureKind::PatternMismatch, message, value, config)
    }

    pub(crate) fn invalid_pattern(value: &Value, source: &str, error: &regress::Error, config: &TypeConfig) -> Self {
        let message = format!("invalid regexp {source:?}: {error}");
        Self::new(FailureKind::InvalidPattern, message, value, config)
    }

    pub(crate) fn missing_key(value: &Value, config: &TypeConfig) -> Self {
        let message = format!("object subProps entry has no key\nconfig:{}", config.to_json_string());
        Self::new(FailureKind::MissingKey, message, value, config)
    }

    fn unsupported_kind(value: &Value, config: &TypeConfig) -> Self {
        let message = format!(
            "structural checks are not supported for {} values\nvalue:>{value}\nconfig:{}",
            value.kind(),
            config.to_json_string()
        );
        Self::new(FailureKind::UnsupportedKind, message, value, config)
    }

    fn depth_exceeded(value: &Value, config: &TypeConfig, max_depth: usize) -> Self {
        let message = format!("schema nesting exceeds {max_depth} levels\nconfig:{}", config.to_json_string());
        Self::new(FailureKind::DepthExceeded, message, value, config)
    }

    pub fn get_props(&self) -> Props {
        Props { value: self.value.clone(), config: self.config.clone() }
    }

    pub fn into_props(self) -> Props {
        Props { value: self.value, config: self.config }
    }
}

// ------------------------------ Emptiness -------------------------------- //

/// `undefined`, `null`, NaN, and zero-length arrays, strings and objects.
pub fn is_empty(value: &Value) -> bool {
    value.is_undefined()
        || value.is_null()
        || value.is_nan()
        || match value {
            Value::Array(xs) => xs.is_empty(),
            Value::String(s) => s.is_empty(),
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
}

fn is_simple(value: &Value, config: &TypeConfig) -> bool {
    SIMPLE_KINDS.contains(value.kind().as_str()) && config.sub_props.is_none() && config.regexp.is_none()
}

// ------------------------------ Dispatch --------------------------------- //

/// One structural checker per kind that has children or content to inspect.
#[derive(Clone, Copy, Debug)]
pub enum StructuralChecker<'a> {
    Array(&'a [Value]),
    Object(&'a IndexMap<String, Value>),
    Text(&'a str),
}

impl<'a> StructuralChecker<'a> {
    pub fn for_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::Array(xs) => Some(Self::Array(xs)),
            Value::Object(map) => Some(Self::Object(map)),
            Value::String(s) => Some(Self::Text(s)),
            Value::Undefined
            | Value::Null
            | Value::Bool(_)
            | Value::Number(_)
            | Value::Function(_) => None,
        }
    }
}

/// Everything a structural checker needs from the schema node.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ComplexCheck<'a> {
    pub value: &'a Value,
    pub config: &'a TypeConfig,
    pub sub_props: &'a [TypeConfig],
    pub sub_props_type: Option<&'a TypeConfig>,
    pub regexp: &'a [String],
}

impl<'a> ComplexCheck<'a> {
    fn from_config(value: &'a Value, config: &'a TypeConfig) -> Self {
        Self {
            value,
            config,
            sub_props: config.sub_props.as_deref().unwrap_or(&[]),
            sub_props_type: config.sub_props_type.as_deref(),
            regexp: config.regexp.as_deref().unwrap_or(&[]),
        }
    }
}

// ------------------------------ Validator -------------------------------- //

#[derive(Clone)]
pub struct Validator {
    options: ValidatorOptions,
    diagnostics: Arc<dyn Diagnostics>,
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator").field("options", &self.options).finish_non_exhaustive()
    }
}

impl Default for Validator {
    fn default() -> Self { Self::new(ValidatorOptions::default()) }
}

impl Validator {
    pub fn new(options: ValidatorOptions) -> Self {
        Self { options, diagnostics: Arc::new(TracingDiagnostics) }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn options(&self) -> &ValidatorOptions { &self.options }

    pub fn diagnostics(&self) -> &dyn Diagnostics { self.diagnostics.as_ref() }

    pub fn check_type_from_config(&self, value: &Value, config: &TypeConfig) -> ValidationResult {
        self.check_at(value, config, 0)
    }

    /// Structural stage only: no emptiness, nullability or type gating.
    pub fn complex_check(&self, value: &Value, config: &TypeConfig) -> ValidationResult {
        self.complex_at(value, config, 0)
    }

    /// Positional then uniform checks over a plain list, e.g. call arguments.
    pub fn check_list_props(
        &self,
        list: &[Value],
        sub_props: &[TypeConfig],
        sub_props_type: Option<&TypeConfig>,
    ) -> ValidationResult {
        arr::check(self, list, sub_props, sub_props_type, 0)
    }

    pub(crate) fn check_at(&self, value: &Value, config: &TypeConfig, depth: usize) -> ValidationResult {
        if depth >= self.options.max_depth {
            return Err(Failure::depth_exceeded(value, config, self.options.max_depth));
        }
        let empty = is_empty(value);
        if (config.nullable == Some(false) && empty) || (config.is_required() && empty && !value.is_nan()) {
            return Err(Failure::empty(value, config));
        }
        if config.nullable == Some(true) && empty {
            return Ok(());
        }
        if !config.accepts_kind(value.kind()) {
            return Err(Failure::type_mismatch(value, config));
        }
        if is_simple(value, config) {
            return Ok(());
        }
        self.complex_at(value, config, depth)
    }

    pub(crate) fn complex_at(&self, value: &Value, config: &TypeConfig, depth: usize) -> ValidationResult {
        let Some(checker) = StructuralChecker::for_value(value) else {
            self.diagnostics.unsupported_kind(value.kind(), config);
            return match self.options.unknown_kind {
                UnknownKindPolicy::Pass => Ok(()),
                UnknownKindPolicy::Fail => Err(Failure::unsupported_kind(value, config)),
            };
        };
        let ctx = ComplexCheck::from_config(value, config);
        match checker {
            StructuralChecker::Array(xs) => arr::check(self, xs, ctx.sub_props, ctx.sub_props_type, depth),
            StructuralChecker::Object(map) => obj::check(self, map, &ctx, depth),
            StructuralChecker::Text(s) => text::check(s, &ctx),
        }
    }
}

// ----------------------------- Front API --------------------------------- //

static DEFAULT_VALIDATOR: Lazy<Validator> = Lazy::new(Validator::default);

/// Shared validator with default options and `tracing` diagnostics.
pub fn default_validator() -> &'static Validator { &DEFAULT_VALIDATOR }

pub fn check_type_from_config(value: &Value, config: &TypeConfig) -> ValidationResult {
    DEFAULT_VALIDATOR.check_type_from_config(value, config)
}

// ------------------------------- Tests ----------------------------------- //

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::kind::Kind;
    use serde_json::json;

    fn v(j: serde_json::Value) -> Value { Value::from(j) }

    #[derive(Default)]
    struct Recording {
        unsupported: Mutex<Vec<Kind>>,
    }

    impl Diagnostics for Recording {
        fn unsupported_kind(&self, kind: Kind, _config: &TypeConfig) {
            self.unsupported.lock().unwrap().push(kind);
        }
        fn rejected(&self, _failure: &Failure) {}
    }

    #[test]
    fn emptiness_is_total() {
        for empty in [Value::Undefined, Value::Null, Value::Number(f64::NAN), v(json!([])), v(json!("")), v(json!({}))] {
            assert!(is_empty(&empty), "{empty} should be empty");
        }
        for full in [v(json!(0)), v(json!(false)), v(json!([null])), v(json!(" ")), v(json!({"a": null}))] {
            assert!(!is_empty(&full), "{full} should not be empty");
        }
        assert!(!is_empty(&Value::Function(crate::value::FunctionRef::new("f"))));
    }

    #[test]
    fn nullable_short_circuits_before_type() {
        let config = TypeConfig::new("number").nullable(true);
        assert!(check_type_from_config(&Value::Null, &config).is_ok());
        assert!(check_type_from_config(&v(json!("")), &config).is_ok());
        assert!(check_type_from_config(&v(json!([])), &config).is_ok());
        assert_eq!(check_type_from_config(&v(json!("x")), &config).unwrap_err().kind, FailureKind::TypeMismatch);
    }

    #[test]
    fn explicit_non_nullable_rejects_empty() {
        let config = TypeConfig::new("array").nullable(false);
        let err = check_type_from_config(&v(json!([])), &config).unwrap_err();
        assert_eq!(err.kind, FailureKind::Empty);
        assert!(err.message.starts_with("cannot be empty"));
        // Without required or nullable, empties just go through the type check.
        assert!(check_type_from_config(&v(json!([])), &TypeConfig::new("array")).is_ok());
    }

    #[test]
    fn required_beats_nullable() {
        let config = TypeConfig::new("string").required(true).nullable(true);
        assert_eq!(check_type_from_config(&Value::Null, &config).unwrap_err().kind, FailureKind::Empty);
    }

    #[test]
    fn required_lets_nan_through_to_type_matching() {
        let config = TypeConfig::new("number").required(true);
        let err = check_type_from_config(&Value::Undefined, &config).unwrap_err();
        assert_eq!(err.kind, FailureKind::Empty);
        assert_eq!(err.get_props(), Props { value: Value::Undefined, config: config.clone() });
        // NaN classifies as "number", so it passes the rest.
        assert!(check_type_from_config(&Value::Number(f64::NAN), &config).is_ok());
        // But not when nullable is explicitly false.
        let strict = config.clone().nullable(false);
        assert_eq!(
            check_type_from_config(&Value::Number(f64::NAN), &strict).unwrap_err().kind,
            FailureKind::Empty
        );
    }

    #[test]
    fn required_rejects_empty_collections() {
        let config = TypeConfig::new("array,object,string").required(true);
        for empty in [json!([]), json!({}), json!("")] {
            assert_eq!(check_type_from_config(&v(empty), &config).unwrap_err().kind, FailureKind::Empty);
        }
    }

    #[test]
    fn type_mismatch_embeds_value_and_config() {
        let config = TypeConfig::new("number");
        let err = check_type_from_config(&v(json!("x")), &config).unwrap_err();
        assert_eq!(err.kind, FailureKind::TypeMismatch);
        assert!(err.message.contains("value:>\"x\""));
        assert!(err.message.contains(r#"config:{"type":"number"}"#));
        assert_eq!(err.into_props().value, Value::from("x"));
    }

    #[test]
    fn array_positional_then_uniform() {
        let config = TypeConfig::new("array")
            .sub_props([TypeConfig::new("string")])
            .sub_props_type(TypeConfig::new("string"));
        assert!(check_type_from_config(&v(json!(["a", "b", "c"])), &config).is_ok());

        let err = check_type_from_config(&v(json!([1, "b", "c"])), &config).unwrap_err();
        assert_eq!(err.value, Value::from(1));

        let err = check_type_from_config(&v(json!(["a", 2, "c"])), &config).unwrap_err();
        assert_eq!(err.value, Value::from(2));
        assert_eq!(err.config, TypeConfig::new("string"));
    }

    #[test]
    fn array_positions_past_the_end_read_undefined() {
        let config = TypeConfig::new("array")
            .sub_props([TypeConfig::new("number"), TypeConfig::new("string").required(true)]);
        let err = check_type_from_config(&v(json!([1])), &config).unwrap_err();
        assert_eq!(err.kind, FailureKind::Empty);
        assert!(err.value.is_undefined());
        // Extra elements are not checked without subPropsType.
        assert!(check_type_from_config(&v(json!([1, "a", null, {}])), &config).is_ok());
    }

    #[test]
    fn object_named_keys() {
        let config = TypeConfig::new("object").sub_props([TypeConfig::new("number").key("id").required(true)]);
        assert!(check_type_from_config(&v(json!({"id": 5})), &config).is_ok());
        let err = check_type_from_config(&v(json!({"other": 1})), &config).unwrap_err();
        assert_eq!(err.kind, FailureKind::Empty);
        assert_eq!(err.config.key.as_deref(), Some("id"));
    }

    #[test]
    fn empty_object_without_nullable_reaches_key_checks() {
        let config = TypeConfig::new("object").sub_props([TypeConfig::new("number").key("id").required(true)]);
        let err = check_type_from_config(&v(json!({})), &config).unwrap_err();
        assert_eq!(err.kind, FailureKind::Empty);
        assert!(err.value.is_undefined());
    }

    #[test]
    fn object_uniform_type_covers_every_key() {
        let config = TypeConfig::new("object")
            .sub_props([TypeConfig::new("string").key("name")])
            .sub_props_type(TypeConfig::new("string,number"));
        assert!(check_type_from_config(&v(json!({"name": "a", "n": 1})), &config).is_ok());
        let err = check_type_from_config(&v(json!({"name": "a", "flag": true})), &config).unwrap_err();
        assert_eq!(err.value, Value::Bool(true));
    }

    // Schema bug reported as a data failure; kept distinguishable by kind.
    #[test]
    fn object_entry_without_key_fails_as_missing_key() {
        let config = TypeConfig::new("object").sub_props([TypeConfig::new("number")]);
        let err = check_type_from_config(&v(json!({"id": 1})), &config).unwrap_err();
        assert_eq!(err.kind, FailureKind::MissingKey);
        assert_eq!(err.config, TypeConfig::new("number"));
    }

    #[test]
    fn string_regex_chain() {
        let config = TypeConfig::new("string").regexp(["^[a-z]+$", ".{3,}"]);
        let err = check_type_from_config(&v(json!("ab")), &config).unwrap_err();
        assert_eq!(err.kind, FailureKind::PatternMismatch);
        assert_eq!(err.message, "ab did not pass /.{3,}/");
        assert!(check_type_from_config(&v(json!("abcd")), &config).is_ok());
        assert_eq!(
            check_type_from_config(&v(json!("ABCD")), &config).unwrap_err().message,
            "ABCD did not pass /^[a-z]+$/"
        );
    }

    #[test]
    fn string_regex_uses_ecmascript_rules() {
        let password = TypeConfig::new("string").regexp([r"^(?=.*\d).{3,}$"]);
        assert!(check_type_from_config(&v(json!("abc1")), &password).is_ok());
        assert_eq!(
            check_type_from_config(&v(json!("abcd")), &password).unwrap_err().kind,
            FailureKind::PatternMismatch
        );

        let digits = TypeConfig::new("string").regexp([r"^\d+$"]);
        assert!(check_type_from_config(&v(json!("123")), &digits).is_ok());
        assert!(check_type_from_config(&v(json!("١٢٣")), &digits).is_err());

        let route = TypeConfig::new("string").regexp(["/api/"]);
        assert!(check_type_from_config(&v(json!("/api/v1")), &route).is_ok());
        let err = check_type_from_config(&v(json!("xapiy")), &route).unwrap_err();
        assert_eq!(err.message, r"xapiy did not pass /\/api\//");
    }

    #[test]
    fn broken_regex_is_a_failure_not_a_panic() {
        let config = TypeConfig::new("string").regexp(["("]);
        assert_eq!(check_type_from_config(&v(json!("x")), &config).unwrap_err().kind, FailureKind::InvalidPattern);
    }

    #[test]
    fn numbers_with_sub_props_fall_to_permissive_pass() {
        let diag = Arc::new(Recording::default());
        let validator = Validator::default().with_diagnostics(diag.clone());
        let config = TypeConfig::new("number").sub_props([]);
        assert!(validator.check_type_from_config(&v(json!(3)), &config).is_ok());
        assert_eq!(*diag.unsupported.lock().unwrap(), vec![Kind::Number]);
    }

    #[test]
    fn unsupported_kind_warns_and_passes_by_default() {
        let diag = Arc::new(Recording::default());
        let validator = Validator::default().with_diagnostics(diag.clone());
        let f = Value::Function(crate::value::FunctionRef::new("cb"));
        assert!(validator.check_type_from_config(&f, &TypeConfig::new("function")).is_ok());
        assert_eq!(*diag.unsupported.lock().unwrap(), vec![Kind::Function]);
    }

    #[test]
    fn strict_policy_rejects_unsupported_kind() {
        let validator = Validator::new(ValidatorOptions::strict())
            .with_diagnostics(Arc::new(crate::diagnostics::SilentDiagnostics));
        let f = Value::Function(crate::value::FunctionRef::new("cb"));
        let err = validator.check_type_from_config(&f, &TypeConfig::any()).unwrap_err();
        assert_eq!(err.kind, FailureKind::UnsupportedKind);
    }

    #[test]
    fn depth_is_bounded() {
        let mut config = TypeConfig::new("array");
        let mut value = v(json!(1));
        for _ in 0..10 {
            config = TypeConfig::new("array").sub_props([config]);
            value = Value::Array(vec![value]);
        }
        let shallow = Validator::new(ValidatorOptions::default().with_max_depth(4));
        assert_eq!(shallow.check_type_from_config(&value, &config).unwrap_err().kind, FailureKind::DepthExceeded);
        // Innermost config is "array" but value is 1: the default depth reaches it.
        assert_eq!(check_type_from_config(&value, &config).unwrap_err().kind, FailureKind::TypeMismatch);
    }
}
