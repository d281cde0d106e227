//! Scheduler module
//!
//! Background housekeeping tasks:
//! - Expired admin session sweep

mod session_sweeper;

pub use session_sweeper::SessionSweeper;
