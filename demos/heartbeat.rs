//! # Demo: heartbeat
//!
//! A bounded relative-interval loop: the body runs every 2 seconds, five
//! times, then the loop exits cleanly on its count bound.
//!
//! ## Run
//! ```bash
//! cargo run --example heartbeat
//! ```

use tickvisor::{JobError, JobFn, TaskLoop};
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Define the body: a fresh future per cycle.
    let beat = JobFn::arc("heartbeat", |_ctx: CancellationToken| async move {
        println!("[heartbeat] thump");
        Ok::<_, JobError>(())
    });

    // 2. Every 2 seconds, at most 5 cycles.
    let task = TaskLoop::builder(beat).seconds(2.0).count(5).build()?;

    task.before_loop(|| async { println!("[heartbeat] starting") })
        .after_loop(|| async { println!("[heartbeat] done") });

    // 3. Run to completion (the count bound ends the loop).
    let handle = task.start()?;
    handle.await??;

    assert!(!task.is_running());
    Ok(())
}
