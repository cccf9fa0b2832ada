//! Ship model
//!
//! Ships are identified by a 7-digit IMO number with no leading zero. Each
//! ship carries a nautical flag used for queue prioritisation, and a cargo
//! hold whose shape depends on the ship kind:
//! - **ContainerShip**: ordered list of containers up to a container capacity
//! - **BulkCarrier**: a single bulk cargo up to a tonnage capacity
//!
//! The hold stores cargo ids; the cargo itself stays in the cargo registry.

use super::{validate_text, ParseVariantError};
use crate::models::cargo::{Cargo, CargoId, CargoKind};
use crate::models::quay::{Quay, QuayKind};
use crate::models::registry::{ConstructionError, Keyed};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 7-digit ship identifier
pub type ImoNumber = u64;

/// Smallest valid IMO number
pub const MIN_IMO_NUMBER: ImoNumber = 1_000_000;
/// Largest valid IMO number
pub const MAX_IMO_NUMBER: ImoNumber = 9_999_999;

/// Marker written for a bulk carrier with an empty hold
pub const EMPTY_HOLD_MARKER: &str = "-1";

/// Maritime signal flag flown by a ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NauticalFlag {
    /// No signal
    Nothing,
    /// Carrying dangerous cargo
    Bravo,
    /// Ready to dock
    Hotel,
    /// Negative signal
    November,
    /// Requires medical assistance
    Whiskey,
}

impl NauticalFlag {
    pub const ALL: [NauticalFlag; 5] = [
        NauticalFlag::Nothing,
        NauticalFlag::Bravo,
        NauticalFlag::Hotel,
        NauticalFlag::November,
        NauticalFlag::Whiskey,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NauticalFlag::Nothing => "NOTHING",
            NauticalFlag::Bravo => "BRAVO",
            NauticalFlag::Hotel => "HOTEL",
            NauticalFlag::November => "NOVEMBER",
            NauticalFlag::Whiskey => "WHISKEY",
        }
    }

    pub fn carries_dangerous_cargo(&self) -> bool {
        *self == NauticalFlag::Bravo
    }

    pub fn needs_medical_assistance(&self) -> bool {
        *self == NauticalFlag::Whiskey
    }

    pub fn is_ready_to_dock(&self) -> bool {
        *self == NauticalFlag::Hotel
    }
}

impl fmt::Display for NauticalFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NauticalFlag {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|flag| flag.as_str() == s)
            .ok_or_else(|| ParseVariantError::new("nautical flag", s))
    }
}

/// Raised when a ship has nothing to unload
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("ship {imo_number} has no cargo to unload")]
pub struct UnloadError {
    pub imo_number: ImoNumber,
}

/// Kind-specific cargo hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShipHold {
    Container {
        capacity: u32,
        containers: Vec<CargoId>,
    },
    Bulk {
        capacity_tonnes: u32,
        cargo: Option<CargoId>,
    },
}

impl ShipHold {
    /// Record name used as the first field of the encoding
    pub fn name(&self) -> &'static str {
        match self {
            ShipHold::Container { .. } => "ContainerShip",
            ShipHold::Bulk { .. } => "BulkCarrier",
        }
    }

    /// Cargo currently aboard
    pub fn cargo_ids(&self) -> Vec<CargoId> {
        match self {
            ShipHold::Container { containers, .. } => containers.clone(),
            ShipHold::Bulk { cargo, .. } => cargo.iter().copied().collect(),
        }
    }
}

/// A ship managed by the port
///
/// # Example
/// ```
/// use port_simulator_core_rs::models::ship::{NauticalFlag, Ship};
///
/// let ship = Ship::container_ship(1234567, "Legion", "France", NauticalFlag::Bravo, 800).unwrap();
/// assert!(ship.is_container_ship());
/// assert_eq!(ship.encode(), "ContainerShip:1234567:Legion:France:BRAVO:800:0:");
///
/// assert!(Ship::bulk_carrier(123456, "Tiny", "Peru", NauticalFlag::Nothing, 10).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ship {
    imo_number: ImoNumber,
    name: String,
    origin_flag: String,
    flag: NauticalFlag,
    hold: ShipHold,
}

impl Ship {
    /// Create a container ship with an empty hold
    pub fn container_ship(
        imo_number: ImoNumber,
        name: impl Into<String>,
        origin_flag: impl Into<String>,
        flag: NauticalFlag,
        capacity: u32,
    ) -> Result<Self, ConstructionError> {
        Self::new(
            imo_number,
            name.into(),
            origin_flag.into(),
            flag,
            ShipHold::Container {
                capacity,
                containers: Vec::new(),
            },
        )
    }

    /// Create a bulk carrier with an empty hold
    pub fn bulk_carrier(
        imo_number: ImoNumber,
        name: impl Into<String>,
        origin_flag: impl Into<String>,
        flag: NauticalFlag,
        capacity_tonnes: u32,
    ) -> Result<Self, ConstructionError> {
        Self::new(
            imo_number,
            name.into(),
            origin_flag.into(),
            flag,
            ShipHold::Bulk {
                capacity_tonnes,
                cargo: None,
            },
        )
    }

    fn new(
        imo_number: ImoNumber,
        name: String,
        origin_flag: String,
        flag: NauticalFlag,
        hold: ShipHold,
    ) -> Result<Self, ConstructionError> {
        if !(MIN_IMO_NUMBER..=MAX_IMO_NUMBER).contains(&imo_number) {
            return Err(ConstructionError::InvalidImoNumber(imo_number));
        }
        validate_text("name", &name)?;
        validate_text("origin flag", &origin_flag)?;
        Ok(Self {
            imo_number,
            name,
            origin_flag,
            flag,
            hold,
        })
    }

    pub fn imo_number(&self) -> ImoNumber {
        self.imo_number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin_flag(&self) -> &str {
        &self.origin_flag
    }

    pub fn flag(&self) -> NauticalFlag {
        self.flag
    }

    pub fn hold(&self) -> &ShipHold {
        &self.hold
    }

    pub fn is_container_ship(&self) -> bool {
        matches!(self.hold, ShipHold::Container { .. })
    }

    /// Whether this ship fits the given quay
    ///
    /// Container ships need a container quay with room for their capacity,
    /// bulk carriers a bulk quay rated for their tonnage.
    pub fn can_dock(&self, quay: &Quay) -> bool {
        match (&self.hold, quay.kind()) {
            (ShipHold::Container { capacity, .. }, QuayKind::Container { max_containers }) => {
                capacity <= max_containers
            }
            (ShipHold::Bulk { capacity_tonnes, .. }, QuayKind::Bulk { max_tonnage }) => {
                capacity_tonnes <= max_tonnage
            }
            _ => false,
        }
    }

    /// Whether the given cargo can be taken aboard
    ///
    /// Cargo must be bound for this ship's origin port and match the hold.
    pub fn can_load(&self, cargo: &Cargo) -> bool {
        if cargo.destination() != self.origin_flag {
            return false;
        }
        match (&self.hold, cargo.kind()) {
            (
                ShipHold::Container {
                    capacity,
                    containers,
                },
                CargoKind::Container { .. },
            ) => containers.len() < *capacity as usize,
            (
                ShipHold::Bulk {
                    capacity_tonnes,
                    cargo: None,
                },
                CargoKind::Bulk { tonnage, .. },
            ) => tonnage <= capacity_tonnes,
            _ => false,
        }
    }

    /// Put cargo into the hold
    ///
    /// Callers check `can_load` first; a bulk carrier's existing cargo is
    /// replaced.
    pub fn load_cargo(&mut self, cargo: &Cargo) {
        match &mut self.hold {
            ShipHold::Container { containers, .. } => containers.push(cargo.id()),
            ShipHold::Bulk { cargo: held, .. } => *held = Some(cargo.id()),
        }
    }

    /// Empty the hold, returning everything that was aboard
    ///
    /// # Errors
    ///
    /// `UnloadError` if the hold is already empty.
    pub fn unload_cargo(&mut self) -> Result<Vec<CargoId>, UnloadError> {
        let unloaded = match &mut self.hold {
            ShipHold::Container { containers, .. } => std::mem::take(containers),
            ShipHold::Bulk { cargo, .. } => cargo.take().into_iter().collect(),
        };
        if unloaded.is_empty() {
            return Err(UnloadError {
                imo_number: self.imo_number,
            });
        }
        Ok(unloaded)
    }

    /// Base fields followed by the hold:
    /// `ContainerShip:imo:name:origin:FLAG:capacity:count:ids` or
    /// `BulkCarrier:imo:name:origin:FLAG:capacity:cargoId|-1`
    pub fn encode(&self) -> String {
        let base = format!(
            "{}:{}:{}:{}:{}",
            self.hold.name(),
            self.imo_number,
            self.name,
            self.origin_flag,
            self.flag
        );
        match &self.hold {
            ShipHold::Container {
                capacity,
                containers,
            } => format!(
                "{}:{}:{}:{}",
                base,
                capacity,
                containers.len(),
                join_ids(containers)
            ),
            ShipHold::Bulk {
                capacity_tonnes,
                cargo,
            } => {
                let cargo = match cargo {
                    Some(id) => id.to_string(),
                    None => EMPTY_HOLD_MARKER.to_string(),
                };
                format!("{}:{}:{}", base, capacity_tonnes, cargo)
            }
        }
    }
}

impl Keyed for Ship {
    type Key = ImoNumber;
    const ENTITY: &'static str = "ship";

    fn key(&self) -> ImoNumber {
        self.imo_number
    }
}

impl fmt::Display for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} from {} [{}]",
            self.hold.name(),
            self.name,
            self.origin_flag,
            self.flag
        )
    }
}

/// Comma-join keys with no trailing separator
pub(crate) fn join_ids<T: ToString>(ids: &[T]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
