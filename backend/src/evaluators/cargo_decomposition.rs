//! Cargo decomposition evaluator
//!
//! Breaks departing cargo down by type. Outbound ship movements count the
//! cargo held by the departing ship; outbound cargo movements count their
//! payload. Inbound movements are ignored.

use super::{increment, EvaluationContext, EvaluatorKind, StatisticsEvaluator};
use crate::core::time::SimClock;
use crate::models::cargo::{BulkCargoType, CargoId, CargoKind, ContainerType};
use crate::models::movement::{Movement, MovementDirection, MovementPayload};
use std::any::Any;
use std::collections::BTreeMap;

/// Distribution of departing cargo by type
#[derive(Debug, Clone, Default)]
pub struct CargoDecompositionEvaluator {
    clock: SimClock,
    cargo_distribution: BTreeMap<String, u32>,
    bulk_cargo_distribution: BTreeMap<BulkCargoType, u32>,
    container_distribution: BTreeMap<ContainerType, u32>,
}

impl CargoDecompositionEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts of every cargo type keyed by type name
    pub fn cargo_distribution(&self) -> &BTreeMap<String, u32> {
        &self.cargo_distribution
    }

    pub fn bulk_cargo_distribution(&self) -> &BTreeMap<BulkCargoType, u32> {
        &self.bulk_cargo_distribution
    }

    pub fn container_distribution(&self) -> &BTreeMap<ContainerType, u32> {
        &self.container_distribution
    }

    fn record(&mut self, ids: &[CargoId], ctx: &EvaluationContext<'_>) {
        for id in ids {
            let Ok(cargo) = ctx.registries.cargo.get(*id) else {
                continue;
            };
            match *cargo.kind() {
                CargoKind::Container { container_type } => {
                    increment(&mut self.container_distribution, container_type);
                }
                CargoKind::Bulk { cargo_type, .. } => {
                    increment(&mut self.bulk_cargo_distribution, cargo_type);
                }
            }
            increment(&mut self.cargo_distribution, cargo.type_name().to_string());
        }
    }
}

impl StatisticsEvaluator for CargoDecompositionEvaluator {
    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::CargoDecomposition
    }

    fn time(&self) -> u64 {
        self.clock.now()
    }

    fn on_tick(&mut self, _ctx: &EvaluationContext<'_>) {
        self.clock.advance_minute();
    }

    fn on_movement_processed(&mut self, movement: &Movement, ctx: &EvaluationContext<'_>) {
        if movement.direction() != MovementDirection::Outbound {
            return;
        }
        match movement.payload() {
            MovementPayload::Ship(imo) => {
                if let Ok(ship) = ctx.registries.ships.get(*imo) {
                    let held = ship.hold().cargo_ids();
                    self.record(&held, ctx);
                }
            }
            MovementPayload::Cargo(ids) => self.record(ids, ctx),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
