//! # Lifecycle hooks.
//!
//! Three per-instance async callables, installed through the loop's
//! control surface:
//!
//! - `before_loop()` — once, before the first cycle of a run;
//! - `after_loop()` — once, on every termination path (clean exit,
//!   cancellation, fatal error);
//! - `on_error(failure)` — on fatal termination, with the failure.
//!
//! Unset `before`/`after` hooks are no-ops; an unset error hook falls back
//! to logging the failure with the job's identity. Registration is
//! last-write-wins; asynchrony is enforced by the registration signatures,
//! so there is no invalid-hook error path.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::JobError;

/// Boxed future returned by a hook invocation.
pub(crate) type BoxHookFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A zero-argument lifecycle hook (`before_loop` / `after_loop`).
pub(crate) type HookFn = Arc<dyn Fn() -> BoxHookFuture + Send + Sync>;

/// The error hook, receiving the fatal failure.
pub(crate) type ErrorHookFn = Arc<dyn Fn(JobError) -> BoxHookFuture + Send + Sync>;

/// Hook registrations for one loop instance.
#[derive(Default)]
pub(crate) struct Hooks {
    pub(crate) before: Option<HookFn>,
    pub(crate) after: Option<HookFn>,
    pub(crate) error: Option<ErrorHookFn>,
}
