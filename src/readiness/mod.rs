//! Merge-readiness engine
//!
//! Three-phase pattern:
//! 1. Gather - fetch the PR snapshot and permission sets (effectful, concurrent)
//! 2. Select - pick the clock-start review (pure, testable)
//! 3. Time - compute when the waiting period ends (pure)

mod decide;
mod selector;
mod snapshot;
mod wait;

pub use decide::{Decision, Requirements, ReviewPhase, decide, evaluate};
pub use selector::{REQUIRED_APPROVALS, select_time_base_review};
pub use snapshot::fetch_snapshot;
pub use wait::{WaitTime, compute_wait_time};
