//! Port Simulator Core - Rust Engine
//!
//! Minute-by-minute simulation of a shipping port: ships queue, dock at
//! quays, unload into warehouses and depart carrying cargo.
//!
//! # Architecture
//!
//! - **core**: Simulation clock
//! - **models**: Domain types (Cargo, Ship, Quay, Movement) and registries
//! - **schedule**: Time-ordered movement scheduler
//! - **evaluators**: Statistics observers
//! - **orchestrator**: Tick loop and snapshot codec
//!
//! # Critical Invariants
//!
//! 1. Every ship or cargo reference resolves through the port's registries
//! 2. Ticks are deterministic: the same state and schedule yield the same result
//! 3. A port built through its validating constructors and mutators encodes to
//!    a snapshot that decodes back to an equal port

// Module declarations
pub mod core;
pub mod evaluators;
pub mod models;
pub mod orchestrator;
pub mod schedule;

// Re-exports for convenience
pub use core::time::SimClock;
pub use evaluators::{EvaluatorKind, StatisticsEvaluator};
pub use models::{
    Cargo, CargoId, ConstructionError, ImoNumber, LookupError, Movement, MovementDirection, Quay,
    QuayId, Registries, Ship, ShipQueue,
};
pub use orchestrator::{
    DecodeError, DecodeErrorKind, DockedShip, Port, PortConfig, QuayConfig, SimulationError,
    TickResult,
};
pub use schedule::{MovementScheduler, ScheduleError};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn port_simulator_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::port::PyPort>()?;
    Ok(())
}
