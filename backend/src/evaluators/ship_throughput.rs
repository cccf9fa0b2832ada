//! Ship throughput evaluator
//!
//! Counts ships that departed within the last hour. Departures are stamped
//! with the evaluator's own minute counter and expire once they are
//! [`THROUGHPUT_WINDOW`] minutes old.

use super::{EvaluationContext, EvaluatorKind, StatisticsEvaluator};
use crate::core::time::SimClock;
use crate::models::movement::{Movement, MovementDirection, MovementPayload};
use crate::models::ship::ImoNumber;
use std::any::Any;
use std::collections::VecDeque;

/// Length of the throughput window in minutes
pub const THROUGHPUT_WINDOW: u64 = 60;

/// Departing ships over a rolling one hour window
///
/// # Example
/// ```
/// use port_simulator_core_rs::evaluators::{EvaluationContext, ShipThroughputEvaluator, StatisticsEvaluator};
/// use port_simulator_core_rs::models::movement::{Movement, MovementDirection};
/// use port_simulator_core_rs::models::registry::Registries;
///
/// let registries = Registries::new();
/// let ctx = EvaluationContext { quays: &[], registries: &registries };
///
/// let mut evaluator = ShipThroughputEvaluator::new();
/// evaluator.on_movement_processed(&Movement::ship(0, MovementDirection::Outbound, 3456789), &ctx);
/// assert_eq!(evaluator.throughput_per_hour(), 1);
///
/// for _ in 0..60 {
///     evaluator.on_tick(&ctx);
/// }
/// assert_eq!(evaluator.throughput_per_hour(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ShipThroughputEvaluator {
    clock: SimClock,
    departures: VecDeque<(u64, ImoNumber)>,
}

impl ShipThroughputEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ships that departed within the window
    pub fn throughput_per_hour(&self) -> usize {
        self.departures.len()
    }
}

impl StatisticsEvaluator for ShipThroughputEvaluator {
    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::ShipThroughput
    }

    fn time(&self) -> u64 {
        self.clock.now()
    }

    fn on_tick(&mut self, _ctx: &EvaluationContext<'_>) {
        self.clock.advance_minute();
        let now = self.clock.now();
        while let Some(&(departed, _)) = self.departures.front() {
            if now - departed < THROUGHPUT_WINDOW {
                break;
            }
            self.departures.pop_front();
        }
    }

    fn on_movement_processed(&mut self, movement: &Movement, _ctx: &EvaluationContext<'_>) {
        if movement.direction() != MovementDirection::Outbound {
            return;
        }
        if let MovementPayload::Ship(imo) = movement.payload() {
            self.departures.push_back((self.clock.now(), *imo));
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
