//! Ship flag evaluator
//!
//! Tallies inbound ships by the port they originate from.

use super::{increment, EvaluationContext, EvaluatorKind, StatisticsEvaluator};
use crate::core::time::SimClock;
use crate::models::movement::{Movement, MovementDirection, MovementPayload};
use std::any::Any;
use std::collections::BTreeMap;

/// Distribution of inbound ships by origin flag
#[derive(Debug, Clone, Default)]
pub struct ShipFlagEvaluator {
    clock: SimClock,
    flag_distribution: BTreeMap<String, u32>,
}

impl ShipFlagEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inbound ship counts keyed by origin flag
    pub fn flag_distribution(&self) -> &BTreeMap<String, u32> {
        &self.flag_distribution
    }

    /// Inbound ships seen from `origin_flag`, zero if none
    pub fn flag_statistics(&self, origin_flag: &str) -> u32 {
        self.flag_distribution
            .get(origin_flag)
            .copied()
            .unwrap_or(0)
    }
}

impl StatisticsEvaluator for ShipFlagEvaluator {
    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::ShipFlag
    }

    fn time(&self) -> u64 {
        self.clock.now()
    }

    fn on_tick(&mut self, _ctx: &EvaluationContext<'_>) {
        self.clock.advance_minute();
    }

    fn on_movement_processed(&mut self, movement: &Movement, ctx: &EvaluationContext<'_>) {
        if movement.direction() != MovementDirection::Inbound {
            return;
        }
        if let MovementPayload::Ship(imo) = movement.payload() {
            if let Ok(ship) = ctx.registries.ships.get(*imo) {
                increment(&mut self.flag_distribution, ship.origin_flag().to_string());
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
