//! Movement model
//!
//! A movement is a scheduled arrival or departure at a given minute. Its
//! payload is either a single ship or a list of cargo, both held by key.

use super::ParseVariantError;
use crate::models::cargo::CargoId;
use crate::models::ship::{join_ids, ImoNumber};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of travel relative to the port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementDirection {
    Inbound,
    Outbound,
}

impl MovementDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementDirection::Inbound => "INBOUND",
            MovementDirection::Outbound => "OUTBOUND",
        }
    }
}

impl fmt::Display for MovementDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementDirection {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INBOUND" => Ok(MovementDirection::Inbound),
            "OUTBOUND" => Ok(MovementDirection::Outbound),
            other => Err(ParseVariantError::new("movement direction", other)),
        }
    }
}

/// What a movement carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovementPayload {
    Ship(ImoNumber),
    Cargo(Vec<CargoId>),
}

impl MovementPayload {
    /// Record name used as the first field of the encoding
    pub fn name(&self) -> &'static str {
        match self {
            MovementPayload::Ship(_) => "ShipMovement",
            MovementPayload::Cargo(_) => "CargoMovement",
        }
    }
}

/// A scheduled ship or cargo movement
///
/// # Example
/// ```
/// use port_simulator_core_rs::models::movement::{Movement, MovementDirection};
///
/// let movement = Movement::cargo(30, MovementDirection::Outbound, vec![5, 7]);
/// assert_eq!(movement.encode(), "CargoMovement:30:OUTBOUND:2:5,7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movement {
    time: u64,
    direction: MovementDirection,
    payload: MovementPayload,
}

impl Movement {
    pub fn new(time: u64, direction: MovementDirection, payload: MovementPayload) -> Self {
        Self {
            time,
            direction,
            payload,
        }
    }

    /// A ship arriving at or leaving the port
    pub fn ship(time: u64, direction: MovementDirection, imo_number: ImoNumber) -> Self {
        Self::new(time, direction, MovementPayload::Ship(imo_number))
    }

    /// Cargo delivered to or collected from the port's warehouses
    pub fn cargo(time: u64, direction: MovementDirection, cargo: Vec<CargoId>) -> Self {
        Self::new(time, direction, MovementPayload::Cargo(cargo))
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn direction(&self) -> MovementDirection {
        self.direction
    }

    pub fn payload(&self) -> &MovementPayload {
        &self.payload
    }

    /// `ShipMovement:time:DIR:imo` or `CargoMovement:time:DIR:count:ids`
    pub fn encode(&self) -> String {
        let base = format!("{}:{}:{}", self.payload.name(), self.time, self.direction);
        match &self.payload {
            MovementPayload::Ship(imo) => format!("{}:{}", base, imo),
            MovementPayload::Cargo(ids) => format!("{}:{}:{}", base, ids.len(), join_ids(ids)),
        }
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} at {}",
            self.direction, self.payload.name(), self.time
        )?;
        match &self.payload {
            MovementPayload::Ship(imo) => write!(f, " involving the ship {}", imo),
            MovementPayload::Cargo(ids) => write!(f, " involving {} piece(s) of cargo", ids.len()),
        }
    }
}
