//! # Job abstraction.
//!
//! This module defines the [`Job`] trait (async, cancelable): the work
//! function a periodic loop invokes once per cycle. The common handle type
//! is [`JobRef`], an `Arc<dyn Job>` suitable for sharing with the loop.
//!
//! A job receives a [`CancellationToken`] derived from the loop's execution
//! context and should check it across its own suspension points so a
//! [`cancel`](crate::TaskLoop::cancel) lands promptly.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::JobError;

/// Shared handle to a job (`Arc<dyn Job>`).
pub type JobRef = Arc<dyn Job>;

/// # Asynchronous, cancelable unit of periodic work.
///
/// A `Job` has a stable [`name`](Job::name) (used for log identity) and an
/// async [`run`](Job::run) invoked once per loop cycle. The returned value
/// carries no payload; only the failure classification matters to the loop.
///
/// Anything a job needs — clients, owning context, counters — is captured
/// explicitly at construction.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tickvisor::{Job, JobError};
/// use tokio_util::sync::CancellationToken;
///
/// struct Heartbeat;
///
/// #[async_trait]
/// impl Job for Heartbeat {
///     fn name(&self) -> &str { "heartbeat" }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), JobError> {
///         if ctx.is_cancelled() {
///             return Err(JobError::Canceled);
///         }
///         // do work...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Job: Send + Sync + 'static {
    /// Returns a stable, human-readable job name.
    fn name(&self) -> &str;

    /// Executes one cycle of the job.
    ///
    /// Returning [`JobError::Canceled`] when `ctx` is cancelled lets the
    /// loop unwind gracefully mid-body.
    async fn run(&self, ctx: CancellationToken) -> Result<(), JobError>;
}
