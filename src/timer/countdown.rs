//! # Countdown: a cancellable, reschedulable single-shot deadline wait.
//!
//! [`Countdown`] wraps one pending timer registration with a stable handle
//! that supports mid-flight recalculation and cancellation.
//!
//! ## Rules
//! - Exactly one pending trigger exists at a time: the wait loop holds a
//!   single sleep future and replaces it atomically when the deadline is
//!   republished through the internal watch channel.
//! - [`Countdown::recalculate`] never loses or duplicates the completion:
//!   the previous trigger is dropped and a new one armed in the same poll.
//! - A deadline already in the past collapses to a zero wait and fires
//!   immediately.
//! - [`Countdown::cancel`] (or cancelling the parent token the countdown
//!   was created with) resolves the wait with [`JobError::Canceled`]
//!   instead of normal completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::JobError;

/// Single-shot wait until an absolute UTC deadline.
///
/// Created per wait cycle by the loop; the loop keeps a shared handle so a
/// runtime schedule change can [`recalculate`](Countdown::recalculate) the
/// in-flight wait.
///
/// ## Example
/// ```no_run
/// use chrono::{TimeDelta, Utc};
/// use tickvisor::Countdown;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn demo() {
/// let cd = Countdown::new(Utc::now() + TimeDelta::seconds(30), CancellationToken::new());
/// cd.wait().await.unwrap();
/// assert!(cd.done());
/// # }
/// ```
#[derive(Debug)]
pub struct Countdown {
    deadline: watch::Sender<DateTime<Utc>>,
    token: CancellationToken,
    done: AtomicBool,
}

impl Countdown {
    /// Arms a countdown for the given deadline.
    ///
    /// Cancelling `token` (or any of its ancestors) resolves a pending
    /// [`wait`](Countdown::wait) with [`JobError::Canceled`].
    pub fn new(deadline: DateTime<Utc>, token: CancellationToken) -> Self {
        let (tx, _rx) = watch::channel(deadline);
        Self {
            deadline: tx,
            token,
            done: AtomicBool::new(false),
        }
    }

    /// Suspends until the deadline elapses or the countdown is cancelled.
    ///
    /// Completes exactly once per countdown; intended for a single awaiting
    /// party. Remaining time is clamped at zero, so a deadline already in
    /// the past fires immediately.
    pub async fn wait(&self) -> Result<(), JobError> {
        let mut rx = self.deadline.subscribe();
        loop {
            let target = *rx.borrow_and_update();
            let remaining = (target - Utc::now()).to_std().unwrap_or(Duration::ZERO);

            tokio::select! {
                _ = time::sleep(remaining) => {
                    self.done.store(true, Ordering::Release);
                    return Ok(());
                }
                changed = rx.changed() => {
                    if changed.is_err() {
                        // Sender half gone; treat as cancellation.
                        self.done.store(true, Ordering::Release);
                        return Err(JobError::Canceled);
                    }
                    // Deadline republished: re-arm with the new target.
                }
                _ = self.token.cancelled() => {
                    self.done.store(true, Ordering::Release);
                    return Err(JobError::Canceled);
                }
            }
        }
    }

    /// Replaces the pending trigger with one for `deadline`.
    ///
    /// Safe to call whether or not a wait is in flight; a deadline already
    /// in the past makes the wait fire immediately.
    pub fn recalculate(&self, deadline: DateTime<Utc>) {
        self.deadline.send_replace(deadline);
    }

    /// Non-blocking completion check (true after firing or cancellation).
    pub fn done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Cancels the pending trigger and the outstanding signal.
    ///
    /// Any party awaiting [`wait`](Countdown::wait) observes
    /// [`JobError::Canceled`] rather than normal completion.
    pub fn cancel(&self) {
        self.done.store(true, Ordering::Release);
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use chrono::TimeDelta;

    #[tokio::test(start_paused = true)]
    async fn test_fires_at_deadline() {
        let cd = Countdown::new(Utc::now() + TimeDelta::seconds(10), CancellationToken::new());
        assert!(!cd.done());
        cd.wait().await.unwrap();
        assert!(cd.done());
    }

    #[tokio::test(start_paused = true)]
    async fn test_past_deadline_fires_immediately() {
        let cd = Countdown::new(Utc::now() - TimeDelta::seconds(60), CancellationToken::new());
        cd.wait().await.unwrap();
        assert!(cd.done());
    }

    #[tokio::test(start_paused = true)]
    async fn test_recalculate_extends_the_wait() {
        let cd = Arc::new(Countdown::new(
            Utc::now() + TimeDelta::seconds(10),
            CancellationToken::new(),
        ));

        let waiter = {
            let cd = Arc::clone(&cd);
            tokio::spawn(async move { cd.wait().await })
        };
        // The waiter has not been polled yet on the current-thread runtime,
        // so it observes the extended deadline on its first poll.
        cd.recalculate(Utc::now() + TimeDelta::seconds(20));

        let before = time::Instant::now();
        waiter.await.unwrap().unwrap();
        assert!(before.elapsed() >= Duration::from_secs(15));
        assert!(cd.done());
    }

    #[tokio::test(start_paused = true)]
    async fn test_recalculate_to_past_fires_immediately() {
        let cd = Arc::new(Countdown::new(
            Utc::now() + TimeDelta::seconds(3600),
            CancellationToken::new(),
        ));

        let waiter = {
            let cd = Arc::clone(&cd);
            tokio::spawn(async move { cd.wait().await })
        };
        cd.recalculate(Utc::now() - TimeDelta::seconds(1));

        let before = time::Instant::now();
        waiter.await.unwrap().unwrap();
        assert!(before.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_resolves_with_canceled() {
        let cd = Arc::new(Countdown::new(
            Utc::now() + TimeDelta::seconds(3600),
            CancellationToken::new(),
        ));

        let waiter = {
            let cd = Arc::clone(&cd);
            tokio::spawn(async move { cd.wait().await })
        };
        cd.cancel();

        let res = waiter.await.unwrap();
        assert!(matches!(res, Err(JobError::Canceled)));
        assert!(cd.done());
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_token_cancellation_propagates() {
        let parent = CancellationToken::new();
        let cd = Countdown::new(Utc::now() + TimeDelta::seconds(3600), parent.child_token());
        parent.cancel();
        assert!(matches!(cd.wait().await, Err(JobError::Canceled)));
    }
}
