//! # TaskLoop: the periodic-task supervisor.
//!
//! [`TaskLoop`] owns one job's schedule, run-state machine, lifecycle hooks,
//! and failure-classification whitelist, and exposes the runtime controls:
//! start/stop/cancel, live re-interval, whitelist mutation, and state
//! observers.
//!
//! ## Architecture
//! ```text
//! TaskLoop (control surface, cheap Clone)
//!    │ start()
//!    ▼
//! Looper (spawned execution context, one at a time)
//!    │ per cycle
//!    ├─► Schedule::next_run()     (deadline math)
//!    ├─► Countdown::wait()        (suspension, live-recalculable)
//!    ├─► Job::run(ctx)            (the body)
//!    └─► RetrySet                 (transient vs. fatal)
//! ```
//!
//! ## Rules
//! - At most one live execution context per instance; `start` on a running
//!   loop is an error.
//! - `stop` is graceful (after the current cycle); `cancel` is cooperative
//!   and immediate (next suspension point).
//! - A fatal job failure never reaches the caller of `start`; it is
//!   surfaced through the error hook and the sticky [`failed`](TaskLoop::failed)
//!   flag.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tokio::task::{AbortHandle, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::core::hooks::Hooks;
use crate::core::looper::Looper;
use crate::core::state::{RunGuard, Shared, Timing, lock};
use crate::error::{ConfigError, FailureKind, JobError, RuntimeError};
use crate::jobs::JobRef;
use crate::policies::RetrySet;
use crate::schedule::{Interval, WallTime};

/// Supervises periodic execution of one [`Job`](crate::Job).
///
/// Cloning is cheap and every clone controls the same loop.
///
/// ## Example
/// ```no_run
/// use tickvisor::{JobError, JobFn, TaskLoop};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let poll = JobFn::arc("poll", |_ctx: CancellationToken| async move {
///     // do work...
///     Ok::<_, JobError>(())
/// });
///
/// let task = TaskLoop::builder(poll).seconds(30.0).build()?;
/// let handle = task.start()?;
///
/// // ... later:
/// task.stop();
/// handle.await??;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TaskLoop {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for TaskLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskLoop")
            .field("job", &self.name())
            .field("running", &self.is_running())
            .field("loop_count", &self.loop_count())
            .finish_non_exhaustive()
    }
}

impl TaskLoop {
    /// Starts building a loop around the given job.
    pub fn builder(job: JobRef) -> TaskLoopBuilder {
        TaskLoopBuilder::new(job)
    }

    /// Returns the supervised job's name.
    pub fn name(&self) -> &str {
        self.shared.job.name()
    }

    /// Spawns a new execution context running the loop.
    ///
    /// Returns the join handle of the context; awaiting it yields
    /// `Err(JobError::Canceled)` if the run was cancelled and `Ok(())`
    /// otherwise (fatal failures are reported via the error hook, not
    /// here).
    ///
    /// ### Errors
    /// [`RuntimeError::AlreadyRunning`] if a live context already exists.
    ///
    /// ### Panics
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> Result<JoinHandle<Result<(), JobError>>, RuntimeError> {
        if self.shared.running.swap(true, Ordering::SeqCst) {
            return Err(RuntimeError::AlreadyRunning);
        }
        self.shared.last_failed.store(false, Ordering::SeqCst);

        let token = CancellationToken::new();
        lock(&self.shared.timing).token = token.clone();

        let guard = RunGuard::new(Arc::clone(&self.shared));
        let looper = Looper::new(Arc::clone(&self.shared), token);
        let handle = tokio::spawn(async move {
            let _guard = guard;
            looper.run().await
        });
        lock(&self.shared.timing).abort = Some(handle.abort_handle());
        Ok(handle)
    }

    /// Requests graceful termination: takes effect once the current cycle
    /// completes. No-op when not running.
    pub fn stop(&self) {
        if self.is_running() {
            self.shared.should_stop.store(true, Ordering::SeqCst);
        }
    }

    /// Requests immediate cooperative cancellation of the running context.
    ///
    /// Delivered at the next suspension point (countdown wait, retry pause,
    /// or an await inside the body). No-op when not running or already
    /// unwinding from a previous cancellation.
    pub fn cancel(&self) {
        if self.can_be_cancelled() {
            lock(&self.shared.timing).token.cancel();
        }
    }

    fn can_be_cancelled(&self) -> bool {
        !self.is_being_cancelled() && self.is_running()
    }

    /// Whether a live execution context exists.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    /// Whether a cancellation is currently unwinding (true from delivery
    /// until cleanup completes).
    pub fn is_being_cancelled(&self) -> bool {
        self.shared.will_cancel.load(Ordering::SeqCst)
    }

    /// Whether the loop has terminated with a fatal failure (sticky).
    pub fn failed(&self) -> bool {
        self.shared.has_failed.load(Ordering::SeqCst)
    }

    /// Completed cycles of the current run (0 when idle).
    pub fn loop_count(&self) -> u64 {
        self.shared.loop_count.load(Ordering::SeqCst)
    }

    /// Deadline of the current/most recent cycle, if any cycle ran.
    pub fn last_run(&self) -> Option<DateTime<Utc>> {
        lock(&self.shared.timing).last_run
    }

    /// Deadline of the next cycle, if scheduled.
    pub fn next_run(&self) -> Option<DateTime<Utc>> {
        lock(&self.shared.timing).next_run
    }

    /// Abort handle of the live execution context, if running.
    ///
    /// Aborting through it is a hard drop that skips lifecycle hooks;
    /// prefer [`cancel`](TaskLoop::cancel).
    pub fn abort_handle(&self) -> Option<AbortHandle> {
        if !self.is_running() {
            return None;
        }
        lock(&self.shared.timing).abort.clone()
    }

    /// Atomically replaces the schedule.
    ///
    /// If the loop is running and has completed at least one cycle, the
    /// pending deadline is recomputed and an in-flight countdown is
    /// live-recalculated, firing at most once for the transition.
    ///
    /// ### Errors
    /// Any [`ConfigError`] the new interval fails validation with; the
    /// previous schedule stays active in that case.
    pub fn handle_interval(&self, interval: Interval) -> Result<(), ConfigError> {
        let schedule = interval.validate()?;
        *lock(&self.shared.schedule) = schedule;

        if self.is_running() {
            let last = lock(&self.shared.timing).last_run;
            if let Some(last) = last {
                let next = lock(&self.shared.schedule).next_run(last, Utc::now());
                let mut timing = lock(&self.shared.timing);
                timing.next_run = Some(next);
                if let Some(countdown) = &timing.countdown {
                    if !countdown.done() {
                        countdown.recalculate(next);
                    }
                }
            }
        }
        Ok(())
    }

    /// Installs the `before_loop` hook (runs once per start, before the
    /// first cycle). Last write wins.
    pub fn before_loop<F, Fut>(&self, hook: F) -> &Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        lock(&self.shared.hooks).before = Some(Arc::new(move || Box::pin(hook())));
        self
    }

    /// Installs the `after_loop` hook (runs once on every termination
    /// path). Last write wins.
    pub fn after_loop<F, Fut>(&self, hook: F) -> &Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        lock(&self.shared.hooks).after = Some(Arc::new(move || Box::pin(hook())));
        self
    }

    /// Installs the error hook, invoked with the failure on fatal
    /// termination. The default logs the failure with the job's identity.
    pub fn on_error<F, Fut>(&self, hook: F) -> &Self
    where
        F: Fn(JobError) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        lock(&self.shared.hooks).error = Some(Arc::new(move |err| Box::pin(hook(err))));
        self
    }

    /// Adds failure categories to the retry whitelist.
    ///
    /// Categories that are not retry-eligible are logged and skipped.
    pub fn add_exception(&self, kinds: impl IntoIterator<Item = FailureKind>) {
        let mut retry = lock(&self.shared.retry);
        for kind in kinds {
            retry.add(kind);
        }
    }

    /// Removes failure categories from the retry whitelist.
    pub fn remove_exception(&self, kinds: impl IntoIterator<Item = FailureKind>) {
        let mut retry = lock(&self.shared.retry);
        for kind in kinds {
            retry.remove(kind);
        }
    }

    /// Restores the default retry whitelist (i/o, timeout, transport).
    pub fn reset_exceptions(&self) {
        lock(&self.shared.retry).reset();
    }
}

/// Builder for [`TaskLoop`].
///
/// Collects the interval (relative or absolute form), an optional cycle
/// bound, and the reconnect flag; [`build`](TaskLoopBuilder::build)
/// validates the combination.
pub struct TaskLoopBuilder {
    job: JobRef,
    interval: Interval,
    count: Option<u64>,
    reconnect: bool,
}

impl TaskLoopBuilder {
    fn new(job: JobRef) -> Self {
        Self {
            job,
            interval: Interval::new(),
            count: None,
            reconnect: true,
        }
    }

    /// Sets the seconds component of the relative interval.
    pub fn seconds(mut self, seconds: f64) -> Self {
        self.interval = self.interval.seconds(seconds);
        self
    }

    /// Sets the minutes component of the relative interval.
    pub fn minutes(mut self, minutes: f64) -> Self {
        self.interval = self.interval.minutes(minutes);
        self
    }

    /// Sets the hours component of the relative interval.
    pub fn hours(mut self, hours: f64) -> Self {
        self.interval = self.interval.hours(hours);
        self
    }

    /// Adds one daily time-of-day slot (absolute form).
    pub fn at(mut self, slot: WallTime) -> Self {
        self.interval = self.interval.at(slot);
        self
    }

    /// Adds several daily time-of-day slots (absolute form).
    pub fn at_times(mut self, slots: impl IntoIterator<Item = WallTime>) -> Self {
        self.interval = self.interval.at_times(slots);
        self
    }

    /// Replaces the interval configuration wholesale.
    pub fn interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    /// Bounds the run to `count` completed cycles (must be > 0).
    pub fn count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    /// Whether whitelisted failures are retried (default) or promoted to
    /// fatal.
    pub fn reconnect(mut self, reconnect: bool) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Validates the configuration and produces the loop.
    ///
    /// ### Errors
    /// [`ConfigError::ZeroCount`] for a zero cycle bound, plus any
    /// interval validation error.
    pub fn build(self) -> Result<TaskLoop, ConfigError> {
        if self.count == Some(0) {
            return Err(ConfigError::ZeroCount);
        }
        let schedule = self.interval.validate()?;

        Ok(TaskLoop {
            shared: Arc::new(Shared {
                job: self.job,
                count: self.count,
                reconnect: self.reconnect,
                schedule: Mutex::new(schedule),
                retry: Mutex::new(RetrySet::default()),
                hooks: Mutex::new(Hooks::default()),
                timing: Mutex::new(Timing::default()),
                running: AtomicBool::new(false),
                loop_count: AtomicU64::new(0),
                will_cancel: AtomicBool::new(false),
                should_stop: AtomicBool::new(false),
                has_failed: AtomicBool::new(false),
                last_failed: AtomicBool::new(false),
            }),
        })
    }
}
