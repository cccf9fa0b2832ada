//! Time management for the simulation
//!
//! The port operates on a discrete clock where one tick is one simulated
//! minute. Docking and unloading happen on fixed minute intervals.

use serde::{Deserialize, Serialize};

/// Ships are docked from the queue on every multiple of this many minutes.
pub const DOCKING_INTERVAL: u64 = 10;

/// Docked ships are unloaded on every multiple of this many minutes.
pub const UNLOADING_INTERVAL: u64 = 5;

/// Minutes elapsed since the simulation started
///
/// # Example
/// ```
/// use port_simulator_core_rs::SimClock;
///
/// let mut clock = SimClock::new();
/// assert_eq!(clock.now(), 0);
///
/// clock.advance_minute();
/// assert_eq!(clock.now(), 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    minutes: u64,
}

impl SimClock {
    /// Create a clock at minute zero
    pub fn new() -> Self {
        Self { minutes: 0 }
    }

    /// Create a clock resumed at the given minute
    ///
    /// # Example
    /// ```
    /// use port_simulator_core_rs::SimClock;
    ///
    /// let clock = SimClock::starting_at(42);
    /// assert_eq!(clock.now(), 42);
    /// ```
    pub fn starting_at(minutes: u64) -> Self {
        Self { minutes }
    }

    /// Advance time by one minute
    pub fn advance_minute(&mut self) {
        self.minutes += 1;
    }

    /// Current minute
    pub fn now(&self) -> u64 {
        self.minutes
    }

    /// Whether the current minute is a docking minute
    ///
    /// # Example
    /// ```
    /// use port_simulator_core_rs::SimClock;
    ///
    /// assert!(SimClock::starting_at(20).is_docking_minute());
    /// assert!(!SimClock::starting_at(25).is_docking_minute());
    /// ```
    pub fn is_docking_minute(&self) -> bool {
        self.minutes % DOCKING_INTERVAL == 0
    }

    /// Whether the current minute is an unloading minute
    pub fn is_unloading_minute(&self) -> bool {
        self.minutes % UNLOADING_INTERVAL == 0
    }
}
