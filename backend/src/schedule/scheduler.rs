//! Time-ordered movement scheduler
//!
//! Movements are keyed by `(time, sequence)` where the sequence number is the
//! insertion counter, so movements due at the same minute come out in the
//! order they were scheduled.

use crate::models::movement::Movement;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised when scheduling a movement
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("movement at minute {time} is scheduled before the current minute {now}")]
    InPast { time: u64, now: u64 },
}

/// Pending movements ordered by scheduled minute
///
/// # Example
/// ```
/// use port_simulator_core_rs::models::movement::{Movement, MovementDirection};
/// use port_simulator_core_rs::schedule::MovementScheduler;
///
/// let mut scheduler = MovementScheduler::new();
/// scheduler
///     .add(Movement::ship(20, MovementDirection::Inbound, 1234567), 5)
///     .unwrap();
/// assert!(scheduler
///     .add(Movement::ship(3, MovementDirection::Inbound, 1234567), 5)
///     .is_err());
///
/// assert_eq!(scheduler.due_movements(20).len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MovementScheduler {
    pending: BTreeMap<(u64, u64), Movement>,
    next_sequence: u64,
}

impl MovementScheduler {
    pub fn new() -> Self {
        Self {
            pending: BTreeMap::new(),
            next_sequence: 0,
        }
    }

    /// Schedule a movement
    ///
    /// # Errors
    ///
    /// `ScheduleError::InPast` if the movement's time is before `now`. Nothing
    /// is inserted in that case.
    pub fn add(&mut self, movement: Movement, now: u64) -> Result<(), ScheduleError> {
        if movement.time() < now {
            return Err(ScheduleError::InPast {
                time: movement.time(),
                now,
            });
        }
        let key = (movement.time(), self.next_sequence);
        self.next_sequence += 1;
        self.pending.insert(key, movement);
        Ok(())
    }

    /// Copies of the movements due exactly at `time`, in schedule order
    pub fn due_movements(&self, time: u64) -> Vec<Movement> {
        self.pending
            .range((time, 0)..=(time, u64::MAX))
            .map(|(_, movement)| movement.clone())
            .collect()
    }

    /// Remove and return the movements due exactly at `time`
    ///
    /// The returned list is detached from the scheduler, so processing it may
    /// schedule further movements.
    pub fn take_due(&mut self, time: u64) -> Vec<Movement> {
        let mut due = self.pending.split_off(&(time, 0));
        let mut later = match time.checked_add(1) {
            Some(next) => due.split_off(&(next, 0)),
            None => BTreeMap::new(),
        };
        self.pending.append(&mut later);
        due.into_values().collect()
    }

    /// Remove and return every movement due before `time`
    ///
    /// A movement may be added for the current minute after that minute has
    /// run; it is left behind here once the clock moves on.
    pub fn take_stale(&mut self, time: u64) -> Vec<Movement> {
        let current = self.pending.split_off(&(time, 0));
        std::mem::replace(&mut self.pending, current)
            .into_values()
            .collect()
    }

    /// Pending movements in schedule order
    pub fn iter(&self) -> impl Iterator<Item = &Movement> {
        self.pending.values()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl PartialEq for MovementScheduler {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}
