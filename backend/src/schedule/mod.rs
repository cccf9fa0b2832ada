//! Movement scheduling
//!
//! This module handles:
//! - Holding pending movements in time order
//! - Rejecting movements scheduled before the current minute
//! - Handing out the movements due at a given minute

pub mod scheduler;

pub use scheduler::{MovementScheduler, ScheduleError};
