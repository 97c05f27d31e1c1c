//! Error types used by the tickvisor runtime and jobs.
//!
//! This module defines three error enums:
//!
//! - [`ConfigError`] — invalid schedule or loop configuration, raised
//!   synchronously at construction or mutation time, never during a cycle.
//! - [`RuntimeError`] — errors raised by the loop control surface itself.
//! - [`JobError`] — failures raised by individual job executions.
//!
//! Job failures carry a closed classification tag ([`FailureKind`]) that the
//! retry whitelist is checked against. Whether a given failure is *actually*
//! retried is decided at runtime by the loop's [`RetrySet`](crate::RetrySet);
//! [`FailureKind::is_retry_eligible`] only says whether a kind may legally be
//! whitelisted at all.

use thiserror::Error;

/// # Errors produced while configuring a loop.
///
/// These surface synchronously to the caller of
/// [`TaskLoopBuilder::build`](crate::TaskLoopBuilder::build) or
/// [`TaskLoop::handle_interval`](crate::TaskLoop::handle_interval);
/// a running cycle never observes them.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The combined seconds/minutes/hours total was zero, negative,
    /// non-finite, or too large to represent as a duration.
    #[error("the sleep interval must be a positive, finite duration")]
    InvalidInterval,

    /// Both the relative form (seconds/minutes/hours) and the absolute
    /// form (times-of-day) were supplied; exactly one must be active.
    #[error("cannot combine time-of-day slots with seconds/minutes/hours")]
    AmbiguousInterval,

    /// The absolute form was selected with an empty list of times-of-day.
    #[error("expected at least one time-of-day, got an empty list")]
    EmptyTimes,

    /// The cycle bound must be greater than zero (or unset).
    #[error("count must be greater than 0 or unset")]
    ZeroCount,
}

/// # Errors produced by the loop control surface.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RuntimeError {
    /// [`TaskLoop::start`](crate::TaskLoop::start) was called while a live
    /// execution context already exists for this instance.
    #[error("the loop is already running")]
    AlreadyRunning,
}

/// # Failures produced by job execution.
///
/// The first four variants classify ordinary failures; [`JobError::Canceled`]
/// is a distinct outcome reserved for cooperative cancellation of the
/// execution context and is never treated as a failure category.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum JobError {
    /// I/O failure (whitelisted as transient by default).
    #[error("i/o failure: {error}")]
    Io {
        /// The underlying error message.
        error: String,
    },

    /// A deadline was exceeded (whitelisted as transient by default).
    #[error("timed out: {error}")]
    Timeout {
        /// The underlying error message.
        error: String,
    },

    /// Transport/client failure (whitelisted as transient by default).
    #[error("transport failure: {error}")]
    Transport {
        /// The underlying error message.
        error: String,
    },

    /// Application-defined failure; retryable only if the caller adds
    /// [`FailureKind::Other`] to the whitelist.
    #[error("job failure: {error}")]
    Other {
        /// The underlying error message.
        error: String,
    },

    /// Non-recoverable failure; terminates the loop and sets the sticky
    /// failed flag. Never retried.
    #[error("fatal error: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// The execution context was cancelled.
    #[error("loop cancelled")]
    Canceled,
}

impl JobError {
    /// Shorthand for [`JobError::Io`].
    pub fn io(error: impl ToString) -> Self {
        JobError::Io { error: error.to_string() }
    }

    /// Shorthand for [`JobError::Timeout`].
    pub fn timeout(error: impl ToString) -> Self {
        JobError::Timeout { error: error.to_string() }
    }

    /// Shorthand for [`JobError::Transport`].
    pub fn transport(error: impl ToString) -> Self {
        JobError::Transport { error: error.to_string() }
    }

    /// Shorthand for [`JobError::Other`].
    pub fn other(error: impl ToString) -> Self {
        JobError::Other { error: error.to_string() }
    }

    /// Shorthand for [`JobError::Fatal`].
    pub fn fatal(error: impl ToString) -> Self {
        JobError::Fatal { error: error.to_string() }
    }

    /// Returns the closed classification tag for this failure.
    ///
    /// # Example
    /// ```
    /// use tickvisor::{FailureKind, JobError};
    ///
    /// let err = JobError::io("connection reset");
    /// assert_eq!(err.kind(), FailureKind::Io);
    /// ```
    pub fn kind(&self) -> FailureKind {
        match self {
            JobError::Io { .. } => FailureKind::Io,
            JobError::Timeout { .. } => FailureKind::Timeout,
            JobError::Transport { .. } => FailureKind::Transport,
            JobError::Other { .. } => FailureKind::Other,
            JobError::Fatal { .. } => FailureKind::Fatal,
            JobError::Canceled => FailureKind::Canceled,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            JobError::Io { .. } => "job_io",
            JobError::Timeout { .. } => "job_timeout",
            JobError::Transport { .. } => "job_transport",
            JobError::Other { .. } => "job_other",
            JobError::Fatal { .. } => "job_fatal",
            JobError::Canceled => "job_canceled",
        }
    }
}

/// Closed classification of job failures, checked by tag against the
/// retry whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// I/O failure.
    Io,
    /// Deadline exceeded.
    Timeout,
    /// Transport/client failure.
    Transport,
    /// Application-defined failure.
    Other,
    /// Non-recoverable failure.
    Fatal,
    /// Cooperative cancellation.
    Canceled,
}

impl FailureKind {
    /// Whether this kind may legally appear in the retry whitelist.
    ///
    /// [`FailureKind::Fatal`] is by definition not retryable and
    /// [`FailureKind::Canceled`] is not a failure category; attempts to
    /// whitelist either are logged and skipped.
    ///
    /// # Example
    /// ```
    /// use tickvisor::FailureKind;
    ///
    /// assert!(FailureKind::Io.is_retry_eligible());
    /// assert!(!FailureKind::Canceled.is_retry_eligible());
    /// ```
    pub fn is_retry_eligible(&self) -> bool {
        matches!(
            self,
            FailureKind::Io | FailureKind::Timeout | FailureKind::Transport | FailureKind::Other
        )
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            FailureKind::Io => "io",
            FailureKind::Timeout => "timeout",
            FailureKind::Transport => "transport",
            FailureKind::Other => "other",
            FailureKind::Fatal => "fatal",
            FailureKind::Canceled => "canceled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(JobError::io("x").kind(), FailureKind::Io);
        assert_eq!(JobError::timeout("x").kind(), FailureKind::Timeout);
        assert_eq!(JobError::transport("x").kind(), FailureKind::Transport);
        assert_eq!(JobError::other("x").kind(), FailureKind::Other);
        assert_eq!(JobError::fatal("x").kind(), FailureKind::Fatal);
        assert_eq!(JobError::Canceled.kind(), FailureKind::Canceled);
    }

    #[test]
    fn test_retry_eligibility() {
        assert!(FailureKind::Io.is_retry_eligible());
        assert!(FailureKind::Timeout.is_retry_eligible());
        assert!(FailureKind::Transport.is_retry_eligible());
        assert!(FailureKind::Other.is_retry_eligible());
        assert!(!FailureKind::Fatal.is_retry_eligible());
        assert!(!FailureKind::Canceled.is_retry_eligible());
    }

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(JobError::Canceled.as_label(), "job_canceled");
        assert_eq!(FailureKind::Timeout.as_label(), "timeout");
    }
}
