//! # Demo: flaky_poll
//!
//! Transient-failure handling: the body fails once with an i/o error
//! before succeeding. I/O failures are whitelisted by default, so the loop
//! absorbs the failure with a short backoff and retries the same schedule
//! window instead of dying.
//!
//! ## Flow
//! ```text
//! cycle 1: Err(Io) ─► whitelisted ─► backoff ─► retry (window unchanged)
//! cycle 1: Ok      ─► cadence resumes from the original deadline
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example flaky_poll
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use tickvisor::{JobError, JobFn, TaskLoop};
use tokio_util::sync::CancellationToken;

static ATTEMPTS: AtomicU64 = AtomicU64::new(0);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let poll = JobFn::arc("flaky-poll", |_ctx: CancellationToken| async move {
        let attempt = ATTEMPTS.fetch_add(1, Ordering::Relaxed) + 1;
        println!("[flaky-poll] attempt {attempt}");
        if attempt < 2 {
            return Err(JobError::io(format!("connection refused (#{attempt})")));
        }
        println!("[flaky-poll] recovered");
        Ok(())
    });

    let task = TaskLoop::builder(poll).seconds(1.0).count(1).build()?;

    // A fatal (non-whitelisted) failure would land here instead.
    task.on_error(|err| async move {
        eprintln!("[flaky-poll] fatal: {err}");
    });

    let handle = task.start()?;
    handle.await??;

    assert!(!task.failed());
    Ok(())
}
