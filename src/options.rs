//! Validator knobs.
use serde::{Deserialize, Serialize};

/// What to do with a value whose kind has no structural checker
/// (`function`, `undefined`, `null` reaching the structural stage).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKindPolicy {
    /// Warn and accept.
    #[default]
    Pass,
    /// Reject with [`FailureKind::UnsupportedKind`](crate::check::FailureKind::UnsupportedKind).
    Fail,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidatorOptions {
    pub unknown_kind: UnknownKindPolicy,
    /// Maximum nesting of schema nodes entered for one check.
    pub max_depth: usize,
}

pub const DEFAULT_MAX_DEPTH: usize = 256;

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self { unknown_kind: UnknownKindPolicy::Pass, max_depth: DEFAULT_MAX_DEPTH }
    }
}

impl ValidatorOptions {
    pub fn strict() -> Self {
        Self { unknown_kind: UnknownKindPolicy::Fail, ..Self::default() }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
