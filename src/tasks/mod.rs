//! Background Tasks Module
//!
//! # Tasks
//! - Expiry sweeper: removes expired entries no read has touched (opt-in)

mod cleanup;

pub use cleanup::spawn_cleanup_task;
