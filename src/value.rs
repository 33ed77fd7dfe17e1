//! Dynamic runtime values.
//!
//! `serde_json::Value` cannot say "undefined", "NaN" or "function", and all
//! three matter to the emptiness and type rules, so we carry our own tree.
//! Converting from JSON is lossless for everything JSON can express.
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::kind::Kind;

// ------------------------------- Types ----------------------------------- //

#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
    Function(FunctionRef),
}

/// Opaque handle for a callable living inside a value tree.
/// The validator only classifies it; it never calls it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionRef {
    name: Arc<str>,
}

impl FunctionRef {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }
    pub fn name(&self) -> &str { &self.name }
}

// --------------------------- Classification ------------------------------ //

impl Value {
    /// The value classifier: total over every representable value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Undefined => Kind::Undefined,
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Boolean,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
            Value::Function(_) => Kind::Function,
        }
    }

    /// Reflexivity test: only a NaN number is unequal to itself.
    #[allow(clippy::eq_op)]
    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Number(n) if n != n)
    }

    pub fn is_undefined(&self) -> bool { matches!(self, Value::Undefined) }
    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }

    /// Property read. Missing keys and non-objects read as `Undefined`.
    pub fn get(&self, key: &str) -> &Value {
        match self {
            Value::Object(map) => map.get(key).unwrap_or(&UNDEFINED),
            _ => &UNDEFINED,
        }
    }

    /// Index read. Out-of-range and non-arrays read as `Undefined`.
    pub fn index(&self, idx: usize) -> &Value {
        match self {
            Value::Array(xs) => xs.get(idx).unwrap_or(&UNDEFINED),
            _ => &UNDEFINED,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(xs) => Some(xs),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Back to JSON. `undefined` becomes `null`, as does a non-finite number;
    /// functions become their name.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as J;
        match self {
            Value::Undefined | Value::Null => J::Null,
            Value::Bool(b) => J::Bool(*b),
            Value::Number(n) => json_number(*n),
            Value::String(s) => J::String(s.clone()),
            Value::Array(xs) => J::Array(xs.iter().map(Value::to_json).collect()),
            Value::Object(map) => J::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
            ),
            Value::Function(f) => J::String(format!("[function {}]", f.name())),
        }
    }
}

pub(crate) static UNDEFINED: Value = Value::Undefined;

// Prefer integers when exact, like JSON authors wrote them.
fn json_number(n: f64) -> serde_json::Value {
    if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

// ----------------------------- Equality ---------------------------------- //

// Structural equality with IEEE semantics for numbers, so NaN != NaN.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            _ => false,
        }
    }
}

// ----------------------------- Conversions ------------------------------- //

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value as J;
        match v {
            J::Null => Value::Null,
            J::Bool(b) => Value::Bool(b),
            J::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            J::String(s) => Value::String(s),
            J::Array(xs) => Value::Array(xs.into_iter().map(Value::from).collect()),
            J::Object(m) => Value::Object(m.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self { Value::from(v.clone()) }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Bool(b) }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self { Value::Number(n) }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self { Value::Number(f64::from(n)) }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self { Value::Number(n as f64) }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::String(s.to_string()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Value::String(s) }
}

impl From<Vec<Value>> for Value {
    fn from(xs: Vec<Value>) -> Self { Value::Array(xs) }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self { Value::Object(map) }
}

impl From<FunctionRef> for Value {
    fn from(f: FunctionRef) -> Self { Value::Function(f) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

// ------------------------------ Display ---------------------------------- //

/// Compact JSON-ish rendering for diagnostics; `undefined` and `NaN` are
/// spelled out instead of being lost.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) if n.is_nan() => f.write_str("NaN"),
            Value::Number(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Value::Number(n) => write!(f, "{}", json_number(*n)),
            Value::String(s) => write!(f, "{}", serde_json::Value::String(s.clone())),
            Value::Array(xs) => {
                f.write_str("[")?;
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 { f.write_str(",")?; }
                    write!(f, "{x}")?;
                }
                f.write_str("]")
            }
            Value::Object(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 { f.write_str(",")?; }
                    write!(f, "{}:{v}", serde_json::Value::String(k.clone()))?;
                }
                f.write_str("}")
            }
            Value::Function(func) => write!(f, "[function {}]", func.name()),
        }
    }
}

// ------------------------------- Tests ----------------------------------- //
