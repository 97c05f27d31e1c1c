//! # Looper: the periodic-cycle engine of one execution context.
//!
//! Runs the loop algorithm for a single [`TaskLoop`](crate::TaskLoop) run:
//!
//! ```text
//! before_loop
//!   ├─► absolute mode: compute first deadline
//!   └─► relative mode: deadline = now, yield once
//!       (a stop/cancel requested before the first tick lands here)
//! loop {
//!   ├─► absolute mode: suspend on Countdown until deadline
//!   ├─► previous cycle ok: last_run = next_run; recompute next_run
//!   │     └─► mis-wake guard: while next_run <= last_run,
//!   │         warn + re-suspend + recompute (no double-fire per slot)
//!   ├─► invoke body
//!   │     ├─ Ok          ─► stop requested? exit
//!   │     │                relative mode: suspend until next_run
//!   │     │                count bound reached? exit
//!   │     ├─ whitelisted ─► reconnect? pause 5s, retry without advancing
//!   │     │                the schedule; otherwise promote to fatal
//!   │     ├─ Canceled    ─► mark will-cancel, unwind
//!   │     └─ other       ─► sticky failed flag, error hook, exit
//! }
//! after_loop (every termination path)
//! ```
//!
//! ## Rules
//! - Cycles are strictly sequential: the body never runs concurrently
//!   with itself within one context.
//! - A whitelisted failure leaves `last_run`/`next_run` untouched, so the
//!   original cadence resumes once the body recovers.
//! - Cancellation is cooperative: delivered at the next suspension point
//!   (countdown wait, retry pause, or any await inside the body) and
//!   propagated outward after `after_loop` has run.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::core::state::{Shared, lock};
use crate::error::JobError;
use crate::timer::Countdown;

/// Fixed pause before retrying a whitelisted failure.
const RETRY_BACKOFF: Duration = Duration::from_secs(5);

/// Drives the cycles of one execution context.
pub(crate) struct Looper {
    shared: Arc<Shared>,
    token: CancellationToken,
}

impl Looper {
    pub(crate) fn new(shared: Arc<Shared>, token: CancellationToken) -> Self {
        Self { shared, token }
    }

    /// Runs the loop to termination.
    ///
    /// Returns `Err(JobError::Canceled)` when the context was cancelled;
    /// every other outcome — including a fatal job failure, which is
    /// surfaced through the error hook instead — yields `Ok(())`, so a
    /// crashed periodic job cannot crash whoever awaits the handle.
    pub(crate) async fn run(self) -> Result<(), JobError> {
        self.run_hook_before().await;
        self.shared.last_failed.store(false, Ordering::SeqCst);

        if self.is_absolute() {
            let first = self.compute_next(Utc::now());
            lock(&self.shared.timing).next_run = Some(first);
        } else {
            lock(&self.shared.timing).next_run = Some(Utc::now());
            // Give a stop/cancel issued before the first tick a chance to
            // land before any work runs.
            tokio::task::yield_now().await;
        }

        let outcome = if self.token.is_cancelled() {
            Err(JobError::Canceled)
        } else if self.shared.should_stop.load(Ordering::SeqCst) {
            Ok(())
        } else {
            self.drive().await
        };

        let result = match outcome {
            Ok(()) => Ok(()),
            Err(JobError::Canceled) => {
                self.shared.will_cancel.store(true, Ordering::SeqCst);
                Err(JobError::Canceled)
            }
            Err(err) => {
                self.shared.has_failed.store(true, Ordering::SeqCst);
                self.run_hook_error(err).await;
                Ok(())
            }
        };

        self.run_hook_after().await;
        result
    }

    /// The cycle loop. `Err` is either a cancellation or a fatal failure;
    /// `Ok(())` is a clean exit (stop request or count bound).
    async fn drive(&self) -> Result<(), JobError> {
        loop {
            if self.is_absolute() {
                let deadline = self.next_run_or_now();
                self.sleep_until(deadline).await?;
            }

            if !self.shared.last_failed.load(Ordering::SeqCst) {
                let last = {
                    let mut timing = lock(&self.shared.timing);
                    let last = timing.next_run.unwrap_or_else(Utc::now);
                    timing.last_run = Some(last);
                    last
                };
                let mut next = self.compute_next(last);
                lock(&self.shared.timing).next_run = Some(next);

                // The host may wake the timer fractionally early; firing
                // again for the same slot would double-run it.
                while self.is_absolute() && next <= last {
                    warn!(
                        job = self.shared.job.name(),
                        until = %next,
                        "woke up a bit too early, re-sleeping to avoid drift"
                    );
                    self.sleep_until(next).await?;
                    next = self.compute_next(last);
                    lock(&self.shared.timing).next_run = Some(next);
                }
            }

            match self.invoke_body().await {
                Ok(()) => {
                    self.shared.last_failed.store(false, Ordering::SeqCst);

                    if self.shared.should_stop.load(Ordering::SeqCst) {
                        return Ok(());
                    }
                    if !self.is_absolute() {
                        let deadline = self.next_run_or_now();
                        self.sleep_until(deadline).await?;
                    }

                    let completed = self.shared.loop_count.fetch_add(1, Ordering::SeqCst) + 1;
                    if self.shared.count.is_some_and(|bound| completed >= bound) {
                        return Ok(());
                    }
                }
                Err(JobError::Canceled) => return Err(JobError::Canceled),
                Err(err) if self.is_whitelisted(&err) => {
                    self.shared.last_failed.store(true, Ordering::SeqCst);
                    if !self.shared.reconnect {
                        return Err(err);
                    }
                    self.pause(RETRY_BACKOFF).await?;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Invokes the job body, racing it against context cancellation so a
    /// `cancel()` lands even in a body that never checks its token.
    async fn invoke_body(&self) -> Result<(), JobError> {
        let ctx = self.token.child_token();
        tokio::select! {
            res = self.shared.job.run(ctx) => res,
            _ = self.token.cancelled() => Err(JobError::Canceled),
        }
    }

    /// Suspends on a fresh [`Countdown`], published so the control surface
    /// can live-recalculate it on a schedule change.
    async fn sleep_until(&self, deadline: DateTime<Utc>) -> Result<(), JobError> {
        let countdown = Arc::new(Countdown::new(deadline, self.token.child_token()));
        lock(&self.shared.timing).countdown = Some(Arc::clone(&countdown));
        countdown.wait().await
    }

    /// Cancellable fixed-duration pause (transient-failure backoff).
    async fn pause(&self, delay: Duration) -> Result<(), JobError> {
        tokio::select! {
            _ = time::sleep(delay) => Ok(()),
            _ = self.token.cancelled() => Err(JobError::Canceled),
        }
    }

    fn is_absolute(&self) -> bool {
        lock(&self.shared.schedule).is_absolute()
    }

    fn is_whitelisted(&self, err: &JobError) -> bool {
        lock(&self.shared.retry).contains(err.kind())
    }

    fn compute_next(&self, last: DateTime<Utc>) -> DateTime<Utc> {
        lock(&self.shared.schedule).next_run(last, Utc::now())
    }

    fn next_run_or_now(&self) -> DateTime<Utc> {
        lock(&self.shared.timing).next_run.unwrap_or_else(Utc::now)
    }

    async fn run_hook_before(&self) {
        let hook = lock(&self.shared.hooks).before.clone();
        if let Some(hook) = hook {
            hook().await;
        }
    }

    async fn run_hook_after(&self) {
        let hook = lock(&self.shared.hooks).after.clone();
        if let Some(hook) = hook {
            hook().await;
        }
    }

    async fn run_hook_error(&self, err: JobError) {
        let hook = lock(&self.shared.hooks).error.clone();
        match hook {
            Some(hook) => hook(err).await,
            None => tracing::error!(
                job = self.shared.job.name(),
                error = %err,
                "unhandled error in periodic job"
            ),
        }
    }
}
