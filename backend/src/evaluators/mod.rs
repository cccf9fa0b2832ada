//! Statistics Evaluators
//!
//! Evaluators observe the port as it runs. The port calls them synchronously:
//! - `on_movement_processed` after every movement it applies
//! - `on_tick` once at the end of every minute
//! - `on_quays_changed` when a quay is added (no-op by default)
//!
//! Evaluators receive a read-only [`EvaluationContext`] on each callback
//! instead of holding a reference back to the port.
//!
//! # Evaluator Interface
//!
//! ```rust
//! use port_simulator_core_rs::evaluators::{EvaluationContext, EvaluatorKind, StatisticsEvaluator};
//! use port_simulator_core_rs::models::Movement;
//! use port_simulator_core_rs::SimClock;
//!
//! struct CountingEvaluator {
//!     clock: SimClock,
//!     seen: usize,
//! }
//!
//! impl StatisticsEvaluator for CountingEvaluator {
//!     fn kind(&self) -> EvaluatorKind {
//!         EvaluatorKind::ShipFlag
//!     }
//!
//!     fn time(&self) -> u64 {
//!         self.clock.now()
//!     }
//!
//!     fn on_tick(&mut self, _ctx: &EvaluationContext<'_>) {
//!         self.clock.advance_minute();
//!     }
//!
//!     fn on_movement_processed(&mut self, _movement: &Movement, _ctx: &EvaluationContext<'_>) {
//!         self.seen += 1;
//!     }
//!
//!     fn as_any(&self) -> &dyn std::any::Any {
//!         self
//!     }
//! }
//! ```
//!
//! Available evaluators:
//! 1. **ShipFlagEvaluator**: inbound ships by origin flag
//! 2. **QuayOccupancyEvaluator**: occupied quay count
//! 3. **ShipThroughputEvaluator**: departing ships in the last hour
//! 4. **CargoDecompositionEvaluator**: departing cargo by type

pub mod cargo_decomposition;
pub mod quay_occupancy;
pub mod ship_flag;
pub mod ship_throughput;

pub use cargo_decomposition::CargoDecompositionEvaluator;
pub use quay_occupancy::QuayOccupancyEvaluator;
pub use ship_flag::ShipFlagEvaluator;
pub use ship_throughput::ShipThroughputEvaluator;

use crate::models::movement::Movement;
use crate::models::quay::Quay;
use crate::models::registry::Registries;
use crate::models::ParseVariantError;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::str::FromStr;

/// Read-only view of the port handed to evaluators
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub quays: &'a [Quay],
    pub registries: &'a Registries,
}

/// Closed set of evaluator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvaluatorKind {
    #[serde(rename = "ShipFlagEvaluator")]
    ShipFlag,
    #[serde(rename = "QuayOccupancyEvaluator")]
    QuayOccupancy,
    #[serde(rename = "ShipThroughputEvaluator")]
    ShipThroughput,
    #[serde(rename = "CargoDecompositionEvaluator")]
    CargoDecomposition,
}

impl EvaluatorKind {
    pub const ALL: [EvaluatorKind; 4] = [
        EvaluatorKind::ShipFlag,
        EvaluatorKind::QuayOccupancy,
        EvaluatorKind::ShipThroughput,
        EvaluatorKind::CargoDecomposition,
    ];

    /// Name written in the `Evaluators` record
    pub fn name(&self) -> &'static str {
        match self {
            EvaluatorKind::ShipFlag => "ShipFlagEvaluator",
            EvaluatorKind::QuayOccupancy => "QuayOccupancyEvaluator",
            EvaluatorKind::ShipThroughput => "ShipThroughputEvaluator",
            EvaluatorKind::CargoDecomposition => "CargoDecompositionEvaluator",
        }
    }
}

impl fmt::Display for EvaluatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EvaluatorKind {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ParseVariantError::new("evaluator", s))
    }
}

/// Observer notified of processed movements and elapsed minutes
pub trait StatisticsEvaluator {
    fn kind(&self) -> EvaluatorKind;

    /// Minutes this evaluator has observed
    fn time(&self) -> u64;

    /// One minute has elapsed
    fn on_tick(&mut self, ctx: &EvaluationContext<'_>);

    /// The port applied `movement`
    ///
    /// Called for every movement; evaluators filter by direction and payload
    /// themselves.
    fn on_movement_processed(&mut self, movement: &Movement, ctx: &EvaluationContext<'_>);

    /// A quay was added to the port
    fn on_quays_changed(&mut self, _ctx: &EvaluationContext<'_>) {}

    /// Downcast support for reading evaluator-specific statistics
    fn as_any(&self) -> &dyn Any;
}

/// Build an evaluator of the given kind
///
/// `quays` is the quay list of the port the evaluator is attached to.
pub fn create_evaluator(kind: EvaluatorKind, quays: &[Quay]) -> Box<dyn StatisticsEvaluator> {
    match kind {
        EvaluatorKind::ShipFlag => Box::new(ShipFlagEvaluator::new()),
        EvaluatorKind::QuayOccupancy => Box::new(QuayOccupancyEvaluator::new(quays)),
        EvaluatorKind::ShipThroughput => Box::new(ShipThroughputEvaluator::new()),
        EvaluatorKind::CargoDecomposition => Box::new(CargoDecompositionEvaluator::new()),
    }
}

/// Increment a tally in a count map
pub(crate) fn increment<K: Ord>(counts: &mut std::collections::BTreeMap<K, u32>, key: K) {
    *counts.entry(key).or_insert(0) += 1;
}
