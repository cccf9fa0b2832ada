//! Quay occupancy evaluator

use super::{EvaluationContext, EvaluatorKind, StatisticsEvaluator};
use crate::core::time::SimClock;
use crate::models::movement::Movement;
use crate::models::quay::Quay;
use std::any::Any;

/// Number of quays with a ship docked
///
/// Seeded from the port's quays when attached and refreshed on every
/// callback, including quays added after it was attached.
#[derive(Debug, Clone, Default)]
pub struct QuayOccupancyEvaluator {
    clock: SimClock,
    quays_occupied: usize,
}

impl QuayOccupancyEvaluator {
    pub fn new(quays: &[Quay]) -> Self {
        Self {
            clock: SimClock::new(),
            quays_occupied: count_occupied(quays),
        }
    }

    pub fn quays_occupied(&self) -> usize {
        self.quays_occupied
    }
}

fn count_occupied(quays: &[Quay]) -> usize {
    quays.iter().filter(|quay| quay.is_occupied()).count()
}

impl StatisticsEvaluator for QuayOccupancyEvaluator {
    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::QuayOccupancy
    }

    fn time(&self) -> u64 {
        self.clock.now()
    }

    fn on_tick(&mut self, ctx: &EvaluationContext<'_>) {
        self.clock.advance_minute();
        self.quays_occupied = count_occupied(ctx.quays);
    }

    fn on_movement_processed(&mut self, _movement: &Movement, ctx: &EvaluationContext<'_>) {
        self.quays_occupied = count_occupied(ctx.quays);
    }

    fn on_quays_changed(&mut self, ctx: &EvaluationContext<'_>) {
        self.quays_occupied = count_occupied(ctx.quays);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
