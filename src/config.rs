//! Schema configuration trees.
//!
//! A [`TypeConfig`] is authored by hand (usually as JSON) and never mutated
//! by the checker. Field names on the wire are camelCase:
//!
//! ```json
//! { "type": "object", "subProps": [{ "key": "id", "type": "number", "required": true }] }
//! ```
use std::borrow::Cow;
use std::fmt;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kind::{Kind, TagList, ANY};

// ------------------------------- Types ----------------------------------- //

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeConfig {
    /// `"any"` or a comma-separated list of kind tags.
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    /// Per-position (arrays) or per-key (objects) schemas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_props: Option<Vec<TypeConfig>>,
    /// Uniform schema for every element / every own key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_props_type: Option<Box<TypeConfig>>,
    /// Property name, only meaningful inside an object's `subProps`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regexp: Option<Vec<String>>,
    #[serde(skip)]
    parsed_type: ParsedType,
}

/// `type` split into tokens on first use, remembered with the text it came from.
#[derive(Clone, Default)]
struct ParsedType(OnceCell<(String, TagList)>);

impl PartialEq for ParsedType {
    fn eq(&self, _other: &Self) -> bool { true }
}

impl Eq for ParsedType {}

impl fmt::Debug for ParsedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ParsedType")
    }
}

/// Argument and return schemas for a guarded callable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeConfigOption {
    #[serde(default)]
    pub props: Vec<TypeConfig>,
    #[serde(default, rename = "return", skip_serializing_if = "Option::is_none")]
    pub ret: Option<TypeConfig>,
}

/// One schema, or a list of alternatives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Schema {
    One(TypeConfig),
    Many(Vec<TypeConfig>),
}

// ------------------------------ Builders --------------------------------- //

impl TypeConfig {
    pub fn new(ty: impl Into<String>) -> Self {
        Self { ty: ty.into(), ..Self::default() }
    }

    pub fn any() -> Self { Self::new(ANY) }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn sub_props(mut self, sub_props: impl IntoIterator<Item = TypeConfig>) -> Self {
        self.sub_props = Some(sub_props.into_iter().collect());
        self
    }

    pub fn sub_props_type(mut self, config: TypeConfig) -> Self {
        self.sub_props_type = Some(Box::new(config));
        self
    }

    pub fn regexp<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regexp = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_required(&self) -> bool { self.required == Some(true) }

    /// The `type` tag list, split once per node. Falls back to a fresh split
    /// if `ty` was reassigned after the first lookup.
    pub fn type_tags(&self) -> Cow<'_, TagList> {
        let (source, tags) = self.parsed_type.0.get_or_init(|| (self.ty.clone(), TagList::parse(&self.ty)));
        if *source == self.ty { Cow::Borrowed(tags) } else { Cow::Owned(TagList::parse(&self.ty)) }
    }

    /// Type matcher: `"any"` accepts everything, otherwise `kind` must be one
    /// of the listed tokens.
    pub fn accepts_kind(&self, kind: Kind) -> bool {
        self.ty == ANY || self.type_tags().contains(kind.as_str())
    }

    /// `JSON.stringify`-style text used inside diagnostic messages.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"type\":{:?}}}", self.ty))
    }
}

impl TypeConfigOption {
    pub fn new(props: impl IntoIterator<Item = TypeConfig>) -> Self {
        Self { props: props.into_iter().collect(), ret: None }
    }

    pub fn returns(mut self, config: TypeConfig) -> Self {
        self.ret = Some(config);
        self
    }
}

impl Schema {
    pub fn alternatives(&self) -> &[TypeConfig] {
        match self {
            Schema::One(config) => std::slice::from_ref(config),
            Schema::Many(list) => list,
        }
    }
}

impl From<TypeConfig> for Schema {
    fn from(config: TypeConfig) -> Self { Schema::One(config) }
}

impl From<Vec<TypeConfig>> for Schema {
    fn from(list: Vec<TypeConfig>) -> Self { Schema::Many(list) }
}

// ------------------------------ Patterns --------------------------------- //

/// A `regexp` entry, compiled with ECMAScript syntax and semantics.
///
/// The entry is always a pattern source, as given to `new RegExp(source)`:
/// slashes are ordinary characters and no flags apply.
#[derive(Clone, Debug)]
pub struct Pattern {
    regex: regress::Regex,
    literal: String,
}

impl Pattern {
    pub fn compile(src: &str) -> Result<Self, regress::Error> {
        Ok(Self { regex: regress::Regex::new(src)?, literal: literal_of(src) })
    }

    /// Unanchored search, like `RegExp.prototype.test`.
    pub fn test(&self, haystack: &str) -> bool { self.regex.find(haystack).is_some() }

    /// Literal form, e.g. `/^[a-z]+$/`.
    pub fn as_literal(&self) -> &str { &self.literal }
}

/// `/source/` with bare slashes escaped, the way `RegExp#toString` prints it.
/// Slashes inside a character class are left alone.
fn literal_of(src: &str) -> String {
    let mut out = String::with_capacity(src.len() + 2);
    out.push('/');
    let (mut escaped, mut in_class) = (false, false);
    for c in src.chars() {
        if !escaped {
            match c {
                '/' if !in_class => out.push('\\'),
                '[' => in_class = true,
                ']' => in_class = false,
                _ => {}
            }
        }
        escaped = c == '\\' && !escaped;
        out.push(c);
    }
    out.push('/');
    out
}

// -------------------------------- Lint ----------------------------------- //

/// Authoring problems found without looking at any data.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigIssue {
    #[error("{path}: `type` is empty")]
    EmptyType { path: String },
    #[error("{path}: unknown kind tag {tag:?} in `type`")]
    UnknownTag { path: String, tag: String },
    #[error("{path}: object subProps entry has no `key`")]
    MissingKey { path: String },
    #[error("{path}: regexp {pattern:?} does not compile: {message}")]
    InvalidPattern { path: String, pattern: String, message: String },
}

impl TypeConfig {
    pub fn lint(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        lint_node(self, String::new(), &mut issues);
        issues
    }
}

impl TypeConfigOption {
    pub fn lint(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for (i, config) in self.props.iter().enumerate() {
            lint_node(config, format!("/props/{i}"), &mut issues);
        }
        if let Some(ret) = &self.ret {
            lint_node(ret, "/return".to_string(), &mut issues);
        }
        issues
    }
}

impl Schema {
    pub fn lint(&self) -> Vec<ConfigIssue> {
        match self {
            Schema::One(config) => config.lint(),
            Schema::Many(list) => {
                let mut issues = Vec::new();
                for (i, config) in list.iter().enumerate() {
                    lint_node(config, format!("/{i}"), &mut issues);
                }
                issues
            }
        }
    }
}

fn lint_node(config: &TypeConfig, path: String, issues: &mut Vec<ConfigIssue>) {
    let here = if path.is_empty() { "/".to_string() } else { path.clone() };

    if config.ty.is_empty() {
        issues.push(ConfigIssue::EmptyType { path: here.clone() });
    } else if config.ty != ANY {
        for tag in config.type_tags().tokens() {
            if tag.parse::<Kind>().is_err() {
                issues.push(ConfigIssue::UnknownTag { path: here.clone(), tag: tag.to_string() });
            }
        }
    }

    for (i, src) in config.regexp.iter().flatten().enumerate() {
        if let Err(error) = Pattern::compile(src) {
            issues.push(ConfigIssue::InvalidPattern {
                path: format!("{path}/regexp/{i}"),
                pattern: src.clone(),
                message: error.to_string(),
            });
        }
    }

    let governs_objects = config.accepts_kind(Kind::Object);
    let governs_arrays = config.accepts_kind(Kind::Array);
    for (i, sub) in config.sub_props.iter().flatten().enumerate() {
        let sub_path = format!("{path}/subProps/{i}");
        // Arrays ignore `key`, so a keyless entry is only a problem for objects.
        if governs_objects && !governs_arrays && sub.key.is_none() {
            issues.push(ConfigIssue::MissingKey { path: sub_path.clone() });
        }
        lint_node(sub, sub_path, issues);
    }

    if let Some(sub) = &config.sub_props_type {
        lint_node(sub, format!("{path}/subPropsType"), issues);
    }
}

// ------------------------------- Tests ----------------------------------- //
