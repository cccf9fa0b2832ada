//! Cargo model
//!
//! Cargo is identified by a non-negative integer id and travels towards a
//! destination. Two concrete kinds exist: shipping containers and bulk cargo
//! measured in tonnes.

use super::{validate_text, ParseVariantError};
use crate::models::registry::{ConstructionError, Keyed};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique cargo identifier
pub type CargoId = u32;

/// Type of a shipping container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContainerType {
    Standard,
    Reefer,
    OpenTop,
    FlatRack,
    Tanker,
}

impl ContainerType {
    pub const ALL: [ContainerType; 5] = [
        ContainerType::Standard,
        ContainerType::Reefer,
        ContainerType::OpenTop,
        ContainerType::FlatRack,
        ContainerType::Tanker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerType::Standard => "STANDARD",
            ContainerType::Reefer => "REEFER",
            ContainerType::OpenTop => "OPEN_TOP",
            ContainerType::FlatRack => "FLAT_RACK",
            ContainerType::Tanker => "TANKER",
        }
    }
}

impl fmt::Display for ContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerType {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseVariantError::new("container type", s))
    }
}

/// Type of bulk cargo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BulkCargoType {
    Grain,
    Minerals,
    Coal,
    Oil,
    Other,
}

impl BulkCargoType {
    pub const ALL: [BulkCargoType; 5] = [
        BulkCargoType::Grain,
        BulkCargoType::Minerals,
        BulkCargoType::Coal,
        BulkCargoType::Oil,
        BulkCargoType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BulkCargoType::Grain => "GRAIN",
            BulkCargoType::Minerals => "MINERALS",
            BulkCargoType::Coal => "COAL",
            BulkCargoType::Oil => "OIL",
            BulkCargoType::Other => "OTHER",
        }
    }
}

impl fmt::Display for BulkCargoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BulkCargoType {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseVariantError::new("bulk cargo type", s))
    }
}

/// Kind-specific cargo attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CargoKind {
    Container { container_type: ContainerType },
    Bulk { cargo_type: BulkCargoType, tonnage: u32 },
}

impl CargoKind {
    /// Record name used as the first field of the encoding
    pub fn name(&self) -> &'static str {
        match self {
            CargoKind::Container { .. } => "Container",
            CargoKind::Bulk { .. } => "BulkCargo",
        }
    }
}

/// A piece of cargo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cargo {
    id: CargoId,
    destination: String,
    kind: CargoKind,
}

impl Cargo {
    /// Create a shipping container
    ///
    /// # Example
    /// ```
    /// use port_simulator_core_rs::models::cargo::{Cargo, ContainerType};
    ///
    /// let cargo = Cargo::container(3, "Brisbane", ContainerType::OpenTop).unwrap();
    /// assert_eq!(cargo.encode(), "Container:3:Brisbane:OPEN_TOP");
    /// ```
    pub fn container(
        id: CargoId,
        destination: impl Into<String>,
        container_type: ContainerType,
    ) -> Result<Self, ConstructionError> {
        Self::new(id, destination.into(), CargoKind::Container { container_type })
    }

    /// Create bulk cargo weighing `tonnage` tonnes
    pub fn bulk(
        id: CargoId,
        destination: impl Into<String>,
        cargo_type: BulkCargoType,
        tonnage: u32,
    ) -> Result<Self, ConstructionError> {
        Self::new(id, destination.into(), CargoKind::Bulk { cargo_type, tonnage })
    }

    fn new(id: CargoId, destination: String, kind: CargoKind) -> Result<Self, ConstructionError> {
        validate_text("destination", &destination)?;
        Ok(Self {
            id,
            destination,
            kind,
        })
    }

    pub fn id(&self) -> CargoId {
        self.id
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn kind(&self) -> &CargoKind {
        &self.kind
    }

    /// Human readable type tag (container type or bulk type)
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            CargoKind::Container { container_type } => container_type.as_str(),
            CargoKind::Bulk { cargo_type, .. } => cargo_type.as_str(),
        }
    }

    /// `Container:id:destination:TYPE` or `BulkCargo:id:destination:TYPE:tonnage`
    pub fn encode(&self) -> String {
        let base = format!("{}:{}:{}", self.kind.name(), self.id, self.destination);
        match self.kind {
            CargoKind::Container { container_type } => format!("{}:{}", base, container_type),
            CargoKind::Bulk {
                cargo_type,
                tonnage,
            } => format!("{}:{}:{}", base, cargo_type, tonnage),
        }
    }
}

impl Keyed for Cargo {
    type Key = CargoId;
    const ENTITY: &'static str = "cargo";

    fn key(&self) -> CargoId {
        self.id
    }
}

impl fmt::Display for Cargo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} to {} [{}]",
            self.kind.name(),
            self.id,
            self.destination,
            self.type_name()
        )
    }
}
