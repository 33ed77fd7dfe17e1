//! Side channel for things worth telling a human that are not failures.
use crate::check::Failure;
use crate::config::TypeConfig;
use crate::kind::Kind;

pub trait Diagnostics: Send + Sync {
    /// A value reached the structural stage but no checker exists for its kind.
    fn unsupported_kind(&self, kind: Kind, config: &TypeConfig);

    /// A guard is about to reject a call.
    fn rejected(&self, failure: &Failure);
}

/// Default sink: structured `tracing` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn unsupported_kind(&self, kind: Kind, config: &TypeConfig) {
        tracing::warn!(
            kind = kind.as_str(),
            config = %config.to_json_string(),
            "structural checks are not supported for {kind} values"
        );
    }

    fn rejected(&self, failure: &Failure) {
        tracing::error!(kind = ?failure.kind, "{}", failure.message);
    }
}

/// Drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentDiagnostics;

impl Diagnostics for SilentDiagnostics {
    fn unsupported_kind(&self, _kind: Kind, _config: &TypeConfig) {}
    fn rejected(&self, _failure: &Failure) {}
}
