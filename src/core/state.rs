//! # Shared run-state for one loop instance.
//!
//! [`Shared`] is the single allocation behind a [`TaskLoop`](crate::TaskLoop)
//! and its spawned looper. Flags and counters are atomics; everything else
//! sits behind short-lived mutexes that are never held across an await.
//!
//! ## Rules
//! - Lock at most one mutex at a time inside the looper (the control
//!   surface may nest, the looper never does, so lock ordering is moot).
//! - Mutation from outside races with loop reads by design: last write
//!   wins, each read sees a consistent snapshot.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;

use crate::core::hooks::Hooks;
use crate::jobs::JobRef;
use crate::policies::RetrySet;
use crate::schedule::Schedule;
use crate::timer::Countdown;

/// Locks a mutex, recovering the inner data if a holder panicked.
///
/// No critical section in this crate leaves the data in a torn state, so
/// recovery is always sound.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Timing and context state touched by both the looper and the control
/// surface.
#[derive(Debug, Default)]
pub(crate) struct Timing {
    /// Deadline of the cycle currently executing (or just executed).
    pub(crate) last_run: Option<DateTime<Utc>>,
    /// Deadline of the next cycle.
    pub(crate) next_run: Option<DateTime<Utc>>,
    /// Countdown the looper is currently suspended on, if any.
    pub(crate) countdown: Option<Arc<Countdown>>,
    /// Cancellation token of the current execution context.
    pub(crate) token: CancellationToken,
    /// Abort handle of the current execution context.
    pub(crate) abort: Option<AbortHandle>,
}

/// State shared between a [`TaskLoop`](crate::TaskLoop) handle and its
/// spawned looper.
pub(crate) struct Shared {
    /// The job body invoked once per cycle.
    pub(crate) job: JobRef,
    /// Optional bound on completed cycles.
    pub(crate) count: Option<u64>,
    /// Whether whitelisted failures are retried (vs. promoted to fatal).
    pub(crate) reconnect: bool,

    /// Active schedule (exactly one form).
    pub(crate) schedule: Mutex<Schedule>,
    /// Transient failure whitelist.
    pub(crate) retry: Mutex<RetrySet>,
    /// Lifecycle hooks.
    pub(crate) hooks: Mutex<Hooks>,
    /// Timing and execution-context state.
    pub(crate) timing: Mutex<Timing>,

    /// One live execution context at a time.
    pub(crate) running: AtomicBool,
    /// Completed cycles since start (reset when the context terminates).
    pub(crate) loop_count: AtomicU64,
    /// True while a cancellation unwinds (until cleanup completes).
    pub(crate) will_cancel: AtomicBool,
    /// Graceful-stop request, observed after the current cycle.
    pub(crate) should_stop: AtomicBool,
    /// Sticky fatal-termination flag.
    pub(crate) has_failed: AtomicBool,
    /// Whether the previous cycle failed with a whitelisted error.
    pub(crate) last_failed: AtomicBool,
}

/// Reset-on-exit guard owned by the spawned execution context.
///
/// Runs on every termination path — clean exit, cancellation, fatal error,
/// even a hard abort of the join handle — after the looper (and its
/// `after_loop` hook) has returned:
/// cancels any outstanding countdown and restores the per-run flags and
/// counter so a subsequent `start` begins from a clean state.
pub(crate) struct RunGuard {
    shared: Arc<Shared>,
}

impl RunGuard {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if let Some(countdown) = lock(&self.shared.timing).countdown.take() {
            countdown.cancel();
        }
        self.shared.will_cancel.store(false, Ordering::SeqCst);
        self.shared.loop_count.store(0, Ordering::SeqCst);
        self.shared.should_stop.store(false, Ordering::SeqCst);
        self.shared.running.store(false, Ordering::SeqCst);
    }
}
