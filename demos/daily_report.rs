//! # Demo: daily_report
//!
//! An absolute-time loop: the body fires at 09:00 and 17:00 UTC, whichever
//! comes next. The demo starts the loop, shows the computed deadline, then
//! cancels instead of waiting hours for it.
//!
//! ## Run
//! ```bash
//! cargo run --example daily_report
//! ```

use std::time::Duration;

use chrono::NaiveTime;
use tickvisor::{JobError, JobFn, TaskLoop, WallTime};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let report = JobFn::arc("daily-report", |_ctx: CancellationToken| async move {
        println!("[daily-report] generating...");
        Ok::<_, JobError>(())
    });

    // Two slots per day; the list is sorted and de-duplicated internally.
    let morning = WallTime::utc(NaiveTime::from_hms_opt(9, 0, 0).expect("valid time"));
    let evening = WallTime::utc(NaiveTime::from_hms_opt(17, 0, 0).expect("valid time"));

    let task = TaskLoop::builder(report)
        .at_times([morning, evening])
        .build()?;

    let handle = task.start()?;

    // Give the loop a moment to compute its first deadline.
    tokio::time::sleep(Duration::from_millis(50)).await;
    println!("next report at {}", task.next_run().expect("scheduled"));

    // Cancellation is cooperative and still runs the after_loop hook.
    task.cancel();
    assert!(matches!(handle.await?, Err(JobError::Canceled)));
    Ok(())
}
