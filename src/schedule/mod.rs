//! # Schedule configuration and deadline math.
//!
//! This module provides the schedule-related types:
//! - [`Interval`] - raw, mutable configuration (relative or absolute form)
//! - [`WallTime`] - one time-of-day slot pinned to a fixed UTC offset
//! - [`Schedule`] - validated schedule with next-deadline computation

mod interval;
mod spec;
mod wall_time;

pub use interval::Interval;
pub use spec::Schedule;
pub use wall_time::WallTime;
