//! Domain models for the port simulator

pub mod cargo;
pub mod movement;
pub mod quay;
pub mod registry;
pub mod ship;
pub mod ship_queue;

use thiserror::Error;

// Re-exports
pub use cargo::{BulkCargoType, Cargo, CargoId, CargoKind, ContainerType};
pub use movement::{Movement, MovementDirection, MovementPayload};
pub use quay::{Quay, QuayId, QuayKind};
pub use registry::{ConstructionError, LookupError, Registries, Registry};
pub use ship::{ImoNumber, NauticalFlag, Ship, ShipHold, UnloadError};
pub use ship_queue::ShipQueue;

/// An enumeration literal that names no known variant
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {expected}: {found:?}")]
pub struct ParseVariantError {
    pub expected: &'static str,
    pub found: String,
}

impl ParseVariantError {
    pub fn new(expected: &'static str, found: &str) -> Self {
        Self {
            expected,
            found: found.to_string(),
        }
    }
}

/// Free-text fields are embedded in colon/comma separated records
pub(crate) fn validate_text(field: &'static str, value: &str) -> Result<(), ConstructionError> {
    if value.is_empty() || value.contains([':', ',', '\n', '\r']) {
        return Err(ConstructionError::InvalidText {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}
