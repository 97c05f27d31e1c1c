//! # tickvisor
//!
//! **Tickvisor** is a recurring-task scheduling primitive for tokio.
//!
//! It provides a cancellable single-shot countdown timer and, on top of it,
//! a supervised periodic loop that computes wake times (a fixed relative
//! interval, or one-or-more daily times-of-day), corrects for scheduling
//! drift across wakeups, classifies failures into retryable vs. fatal, and
//! exposes lifecycle hooks and runtime controls.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌─────────────────────────────────────────────────────────┐
//!     │  TaskLoop (control surface, cheap Clone)                │
//!     │  - start / stop / cancel                                │
//!     │  - handle_interval (live re-schedule)                   │
//!     │  - before_loop / after_loop / on_error hooks            │
//!     │  - add/remove/reset exception whitelist                 │
//!     └──────┬──────────────────────────────────────────────────┘
//!            │ start() spawns (one live context at a time)
//!            ▼
//!     ┌─────────────────────────────────────────────────────────┐
//!     │  Looper (execution context)                             │
//!     │                                                         │
//!     │  before_loop                                            │
//!     │  loop {                                                 │
//!     │    ├─► Schedule::next_run()   deadline math             │
//!     │    ├─► Countdown::wait()      suspension point          │
//!     │    │     ▲ live recalculate() on handle_interval()      │
//!     │    ├─► Job::run(ctx)          the body                  │
//!     │    └─► RetrySet               transient? backoff+retry  │
//!     │                               fatal? error hook, exit   │
//!     │  }                                                      │
//!     │  after_loop (every termination path)                    │
//!     └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Scheduling modes
//! - **Relative** ([`Schedule::Every`]): the next deadline is always the
//!   *previous deadline* plus the interval — body latency and scheduler
//!   jitter never accumulate into the cadence.
//! - **Absolute** ([`Schedule::At`]): the next occurrence of one of a set
//!   of daily times-of-day, each pinned to its own fixed UTC offset, so
//!   the sequence progresses deterministically across day boundaries and
//!   DST transitions.
//!
//! ### Failure model
//! | Outcome | Handling |
//! |---------|----------|
//! | Whitelisted failure ([`RetrySet`]) | short backoff, retry the same window; the schedule does not advance |
//! | Whitelisted failure, `reconnect(false)` | promoted to fatal |
//! | Fatal failure | sticky [`failed`](TaskLoop::failed) flag, surfaced via the error hook — never re-raised to whoever started the loop |
//! | Cancellation | a distinct outcome, propagated outward after `after_loop` runs |
//!
//! ## Example
//! ```no_run
//! use tickvisor::{JobError, JobFn, TaskLoop};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let poll = JobFn::arc("poll", |ctx: CancellationToken| async move {
//!         if ctx.is_cancelled() {
//!             return Err(JobError::Canceled);
//!         }
//!         // do work...
//!         Ok(())
//!     });
//!
//!     let task = TaskLoop::builder(poll).seconds(30.0).build()?;
//!     task.on_error(|err| async move {
//!         eprintln!("poll loop died: {err}");
//!     });
//!
//!     let handle = task.start()?;
//!
//!     // ... later:
//!     task.stop();
//!     handle.await??;
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod jobs;
mod policies;
mod schedule;
mod timer;

// ---- Public re-exports ----

pub use crate::core::{TaskLoop, TaskLoopBuilder};
pub use crate::error::{ConfigError, FailureKind, JobError, RuntimeError};
pub use crate::jobs::{Job, JobFn, JobRef};
pub use crate::policies::RetrySet;
pub use crate::schedule::{Interval, Schedule, WallTime};
pub use crate::timer::Countdown;
