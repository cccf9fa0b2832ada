//! Ship Queue
//!
//! Ships waiting outside the port to dock, in arrival order. The next ship to
//! dock is chosen by signal flag and ship kind rather than position:
//!
//! ```text
//! 1. first ship flying BRAVO   (dangerous cargo)
//! 2. first ship flying WHISKEY (medical assistance)
//! 3. first ship flying HOTEL   (ready to dock)
//! 4. first container ship
//! 5. first ship in the queue
//! ```
//!
//! # Critical Invariants
//!
//! 1. **Arrival Order**: `add` appends; the queue never reorders itself
//! 2. **Pure Selection**: `peek` never mutates the queue
//! 3. **Selected Removal**: `poll` removes the ship `peek` selected, wherever
//!    it sits in the queue

use crate::models::registry::ShipRegistry;
use crate::models::ship::{join_ids, ImoNumber, Ship};
use std::hash::{Hash, Hasher};

/// Record name of the encoded queue
pub const SHIP_QUEUE_RECORD: &str = "ShipQueue";

/// Waiting ships, held by IMO number
///
/// Selection looks ships up in the registry to read their flags and kinds.
///
/// # Example
/// ```
/// use port_simulator_core_rs::models::registry::Registries;
/// use port_simulator_core_rs::models::ship::{NauticalFlag, Ship};
/// use port_simulator_core_rs::models::ship_queue::ShipQueue;
///
/// let mut registries = Registries::new();
/// registries
///     .register_ship(Ship::bulk_carrier(3456789, "Glorious", "Switzerland", NauticalFlag::Hotel, 120).unwrap())
///     .unwrap();
/// registries
///     .register_ship(Ship::container_ship(2545679, "Legion", "France", NauticalFlag::Bravo, 800).unwrap())
///     .unwrap();
///
/// let mut queue = ShipQueue::new();
/// queue.add(3456789);
/// queue.add(2545679);
///
/// assert_eq!(queue.poll(&registries.ships), Some(2545679));
/// assert_eq!(queue.poll(&registries.ships), Some(3456789));
/// assert_eq!(queue.poll(&registries.ships), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipQueue {
    ships: Vec<ImoNumber>,
}

impl ShipQueue {
    pub fn new() -> Self {
        Self { ships: Vec::new() }
    }

    /// Append a ship to the tail of the queue
    pub fn add(&mut self, imo_number: ImoNumber) {
        self.ships.push(imo_number);
    }

    /// Select the next ship to dock without removing it
    ///
    /// Returns `None` for an empty queue.
    pub fn peek(&self, ships: &ShipRegistry) -> Option<ImoNumber> {
        self.selected_position(ships).map(|index| self.ships[index])
    }

    /// Remove and return the ship `peek` would select
    pub fn poll(&mut self, ships: &ShipRegistry) -> Option<ImoNumber> {
        let index = self.selected_position(ships)?;
        Some(self.ships.remove(index))
    }

    /// Ships in arrival order
    pub fn ships(&self) -> &[ImoNumber] {
        &self.ships
    }

    pub fn len(&self) -> usize {
        self.ships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ships.is_empty()
    }

    /// `ShipQueue:count:imo,imo,...`
    pub fn encode(&self) -> String {
        format!(
            "{}:{}:{}",
            SHIP_QUEUE_RECORD,
            self.ships.len(),
            join_ids(&self.ships)
        )
    }

    fn selected_position(&self, ships: &ShipRegistry) -> Option<usize> {
        let tiers: [fn(&Ship) -> bool; 4] = [
            |ship| ship.flag().carries_dangerous_cargo(),
            |ship| ship.flag().needs_medical_assistance(),
            |ship| ship.flag().is_ready_to_dock(),
            |ship| ship.is_container_ship(),
        ];

        tiers
            .iter()
            .find_map(|matches| {
                self.ships
                    .iter()
                    .position(|imo| ships.get(*imo).is_ok_and(|ship| matches(ship)))
            })
            .or_else(|| if self.ships.is_empty() { None } else { Some(0) })
    }
}

impl Hash for ShipQueue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let sum = self
            .ships
            .iter()
            .fold(0u64, |acc, imo| acc.wrapping_add(*imo));
        sum.hash(state);
    }
}
