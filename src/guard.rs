//! Argument/return validation around a callable.
//!
//! ```ignore
//! let greet = guard_sync(
//!     |args| Ok(Value::from(format!("hello #{}", args[0]))),
//!     TypeConfigOption::new([TypeConfig::new("number").required(true)])
//!         .returns(TypeConfig::new("string")),
//! );
//! let out = greet.call(vec![Value::from(1)]).await?;
//! ```
//!
//! Arguments are checked when [`Guarded::call`] is invoked, before anything
//! is awaited. The callable's result is awaited, then checked against
//! `return`. A rejected return value does not undo whatever the callable did.
//! There is no timeout and no cancellation: a callable that never settles
//! leaves the returned future pending.
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt, Ready};
use thiserror::Error;

use crate::check::{Failure, FailureKind, Props, Validator, default_validator};
use crate::config::{TypeConfig, TypeConfigOption};
use crate::value::Value;

// ------------------------------- Errors ---------------------------------- //

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Arguments,
    Return,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Arguments => "argument",
            Stage::Return => "return value",
        })
    }
}

/// The two ways a guarded call can fail. Shape problems never reach
/// `OperationFailed`, and errors from the callable are never rewrapped as
/// shape problems.
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("{stage} rejected: {value}")]
    ValidationFailed {
        stage: Stage,
        kind: FailureKind,
        value: Value,
        config: TypeConfig,
    },
    #[error(transparent)]
    OperationFailed(anyhow::Error),
}

impl GuardError {
    fn validation(stage: Stage, failure: Failure) -> Self {
        GuardError::ValidationFailed {
            stage,
            kind: failure.kind,
            value: failure.value,
            config: failure.config,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            GuardError::ValidationFailed { stage, .. } => Some(*stage),
            GuardError::OperationFailed(_) => None,
        }
    }

    /// The `{ value, config }` pair of a validation failure.
    pub fn props(&self) -> Option<Props> {
        match self {
            GuardError::ValidationFailed { value, config, .. } => {
                Some(Props { value: value.clone(), config: config.clone() })
            }
            GuardError::OperationFailed(_) => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, GuardError::ValidationFailed { .. })
    }
}

// ------------------------------- Guard ----------------------------------- //

pub struct Guarded<F> {
    callback: F,
    schema: TypeConfigOption,
    validator: Validator,
}

/// Wrap an async callable. Its error type is `anyhow::Error` so any failure
/// of the underlying operation can pass through untouched.
pub fn guard<F, Fut>(callback: F, schema: TypeConfigOption) -> Guarded<F>
where
    F: Fn(Vec<Value>) -> Fut,
    Fut: Future<Output = anyhow::Result<Value>>,
{
    Guarded { callback, schema, validator: default_validator().clone() }
}

/// Wrap a plain function; the guard still hands back a future.
pub fn guard_sync<F>(
    callback: F,
    schema: TypeConfigOption,
) -> Guarded<impl Fn(Vec<Value>) -> Ready<anyhow::Result<Value>>>
where
    F: Fn(Vec<Value>) -> anyhow::Result<Value>,
{
    guard(move |args| future::ready(callback(args)), schema)
}

impl<F, Fut> Guarded<F>
where
    F: Fn(Vec<Value>) -> Fut,
    Fut: Future<Output = anyhow::Result<Value>>,
{
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn schema(&self) -> &TypeConfigOption { &self.schema }

    /// Check `args`, then run the callable and check what it resolves to.
    pub fn call(&self, args: Vec<Value>) -> impl Future<Output = Result<Value, GuardError>> + '_ {
        let checked = self
            .validator
            .check_list_props(&args, &self.schema.props, None)
            .map_err(|failure| self.reject(Stage::Arguments, failure));
        async move {
            checked?;
            let result = (self.callback)(args).await.map_err(GuardError::OperationFailed)?;
            if let Some(ret) = &self.schema.ret {
                self.validator
                    .check_type_from_config(&result, ret)
                    .map_err(|failure| self.reject(Stage::Return, failure))?;
            }
            Ok(result)
        }
    }

    fn reject(&self, stage: Stage, failure: Failure) -> GuardError {
        self.validator.diagnostics().rejected(&failure);
        GuardError::validation(stage, failure)
    }
}

impl<F, Fut> Guarded<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    /// A cloneable, `'static` callable for handing to other tasks.
    pub fn into_fn(
        self,
    ) -> impl Fn(Vec<Value>) -> BoxFuture<'static, Result<Value, GuardError>> + Clone + Send + Sync + 'static {
        let this = Arc::new(self);
        move |args| {
            let this = Arc::clone(&this);
            async move { this.call(args).await }.boxed()
        }
    }
}

// ------------------------------- Tests ----------------------------------- //

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use anyhow::anyhow;

    fn schema() -> TypeConfigOption {
        TypeConfigOption::new([TypeConfig::new("number").required(true)]).returns(TypeConfig::new("string"))
    }

    #[tokio::test]
    async fn bad_argument_rejects_without_calling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let guarded = guard_sync(
            move |_args| {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(Value::from("ok"))
            },
            schema(),
        );

        let err = guarded.call(vec![Value::from("x")]).await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Arguments));
        assert_eq!(
            err.props(),
            Some(Props { value: Value::from("x"), config: TypeConfig::new("number").required(true) })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_argument_reads_as_undefined() {
        let guarded = guard_sync(|_args| Ok(Value::from("ok")), schema());
        let err = guarded.call(vec![]).await.unwrap_err();
        assert!(matches!(
            err,
            GuardError::ValidationFailed { kind: FailureKind::Empty, value: Value::Undefined, .. }
        ));
    }

    #[tokio::test]
    async fn bad_return_rejects_after_calling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let guarded = guard(
            move |_args| {
                let seen = seen.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, anyhow::Error>(Value::from(42))
                }
            },
            schema(),
        );

        let err = guarded.call(vec![Value::from(5)]).await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Return));
        assert_eq!(err.props().map(|p| p.value), Some(Value::from(42)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn good_call_resolves_with_result() {
        let guarded = guard_sync(
            |args| Ok(Value::from(format!("got {}", args[0]))),
            schema(),
        );
        assert_eq!(guarded.call(vec![Value::from(5)]).await.unwrap(), Value::from("got 5"));
    }

    #[tokio::test]
    async fn callable_errors_pass_through_unchanged() {
        let guarded = guard(|_args| async { Err::<Value, _>(anyhow!("disk on fire")) }, schema());
        let err = guarded.call(vec![Value::from(1)]).await.unwrap_err();
        assert!(!err.is_validation());
        assert_eq!(err.stage(), None);
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[tokio::test]
    async fn no_return_schema_skips_return_check() {
        let guarded = guard_sync(|_args| Ok(Value::Null), TypeConfigOption::new([TypeConfig::any()]));
        assert_eq!(guarded.call(vec![Value::from(true)]).await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn extra_arguments_are_not_checked() {
        let guarded = guard_sync(|args| Ok(Value::from(args.len() as i64)), TypeConfigOption::new([TypeConfig::new("number")]));
        assert_eq!(
            guarded.call(vec![Value::from(1), Value::from("extra")]).await.unwrap(),
            Value::from(2)
        );
    }

    #[tokio::test]
    async fn into_fn_is_shareable_across_tasks() {
        let f = guard_sync(|args| Ok(args[0].clone()), schema()).into_fn();
        let g = f.clone();
        let handle = tokio::spawn(async move { g(vec![Value::from(1)]).await });
        assert!(handle.await.unwrap().is_err());
        assert!(f(vec![Value::from("nope")]).await.unwrap_err().is_validation());
    }
}
