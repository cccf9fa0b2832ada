//! Quay model
//!
//! A quay is a berth that holds at most one docked ship. The quay only tracks
//! occupancy by IMO number; the ship itself lives in the ship registry.

use crate::models::ship::ImoNumber;
use std::fmt;

/// Quay identifier
pub type QuayId = u32;

/// Marker written in place of an IMO number for an unoccupied quay
pub const EMPTY_QUAY_MARKER: &str = "None";

/// Kind-specific quay capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuayKind {
    /// Berth for bulk carriers, sized by tonnage
    Bulk { max_tonnage: u32 },
    /// Berth for container ships, sized by container count
    Container { max_containers: u32 },
}

impl QuayKind {
    /// Record name used as the first field of the encoding
    pub fn name(&self) -> &'static str {
        match self {
            QuayKind::Bulk { .. } => "BulkQuay",
            QuayKind::Container { .. } => "ContainerQuay",
        }
    }

    pub fn capacity(&self) -> u32 {
        match *self {
            QuayKind::Bulk { max_tonnage } => max_tonnage,
            QuayKind::Container { max_containers } => max_containers,
        }
    }
}

/// A docking berth
///
/// # Example
/// ```
/// use port_simulator_core_rs::models::quay::Quay;
///
/// let mut quay = Quay::container(1, 500);
/// assert!(!quay.is_occupied());
///
/// quay.occupy(1234567);
/// assert_eq!(quay.occupant(), Some(1234567));
/// assert_eq!(quay.encode(), "ContainerQuay:1:1234567:500");
///
/// assert_eq!(quay.vacate(), Some(1234567));
/// assert_eq!(quay.encode(), "ContainerQuay:1:None:500");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quay {
    id: QuayId,
    kind: QuayKind,
    ship: Option<ImoNumber>,
}

impl Quay {
    /// Create an empty bulk quay
    pub fn bulk(id: QuayId, max_tonnage: u32) -> Self {
        Self::new(id, QuayKind::Bulk { max_tonnage })
    }

    /// Create an empty container quay
    pub fn container(id: QuayId, max_containers: u32) -> Self {
        Self::new(id, QuayKind::Container { max_containers })
    }

    pub fn new(id: QuayId, kind: QuayKind) -> Self {
        Self {
            id,
            kind,
            ship: None,
        }
    }

    pub fn id(&self) -> QuayId {
        self.id
    }

    pub fn kind(&self) -> &QuayKind {
        &self.kind
    }

    /// Dock the given ship at this quay
    pub fn occupy(&mut self, imo_number: ImoNumber) {
        self.ship = Some(imo_number);
    }

    /// Undock the current ship, returning it if there was one
    pub fn vacate(&mut self) -> Option<ImoNumber> {
        self.ship.take()
    }

    pub fn is_occupied(&self) -> bool {
        self.ship.is_some()
    }

    pub fn occupant(&self) -> Option<ImoNumber> {
        self.ship
    }

    /// `Kind:id:imo|None:capacity`
    pub fn encode(&self) -> String {
        let ship = match self.ship {
            Some(imo) => imo.to_string(),
            None => EMPTY_QUAY_MARKER.to_string(),
        };
        format!(
            "{}:{}:{}:{}",
            self.kind.name(),
            self.id,
            ship,
            self.kind.capacity()
        )
    }
}

impl fmt::Display for Quay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ship {
            Some(imo) => write!(f, "{} {} [Ship: {}]", self.kind.name(), self.id, imo),
            None => write!(f, "{} {} [Ship: {}]", self.kind.name(), self.id, EMPTY_QUAY_MARKER),
        }
    }
}
