//! Orchestrator - port simulation loop and snapshots
//!
//! See `engine.rs` for the tick loop and `checkpoint.rs` for the snapshot
//! format.

pub mod checkpoint;
pub mod engine;

// Re-export main types for convenience
pub use engine::{DockedShip, Port, PortConfig, QuayConfig, SimulationError, TickResult};

// Re-export checkpoint types
pub use checkpoint::{DecodeError, DecodeErrorKind};
