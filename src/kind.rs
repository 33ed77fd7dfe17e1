//! Kind tags and tag-list membership.
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;

use crate::value::Value;

/// Closed set of classifier tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Number,
    String,
    Boolean,
    Array,
    Object,
    Function,
    Undefined,
    Null,
}

impl Kind {
    pub const ALL: [Kind; 8] = [
        Kind::Number,
        Kind::String,
        Kind::Boolean,
        Kind::Array,
        Kind::Object,
        Kind::Function,
        Kind::Undefined,
        Kind::Null,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Boolean => "boolean",
            Kind::Array => "array",
            Kind::Object => "object",
            Kind::Function => "function",
            Kind::Undefined => "undefined",
            Kind::Null => "null",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown kind tag: {0:?}")]
pub struct UnknownKind(pub String);

impl FromStr for Kind {
    type Err = UnknownKind;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

// ----------------------------- Membership -------------------------------- //

/// A separator-delimited tag list, split once and reused for many lookups.
///
/// Tokens are matched exactly: no trimming, no wildcards, no subtyping.
/// `"number, string"` therefore contains `" string"`, not `"string"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagList {
    tags: Vec<String>,
}

impl TagList {
    pub fn new(list: &str, sep: &str) -> Self {
        Self { tags: list.split(sep).map(str::to_string).collect() }
    }

    pub fn parse(list: &str) -> Self { Self::new(list, ",") }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}

/// Kinds that never need structural recursion.
pub(crate) static SIMPLE_KINDS: Lazy<TagList> = Lazy::new(|| TagList::parse("number,boolean"));

pub const ANY: &str = "any";

/// Type matcher for an ad-hoc `type` string. Schema nodes go through
/// [`TypeConfig::accepts_kind`](crate::config::TypeConfig::accepts_kind),
/// which splits the list once.
pub fn check_value_type(value: &Value, type_spec: &str) -> bool {
    type_spec == ANY || TagList::parse(type_spec).contains(value.kind().as_str())
}
