//! Entity registries
//!
//! Cargo and ships are looked up by key from anywhere in the port state:
//! quays, the ship queue, stored cargo and scheduled movements all hold keys
//! rather than the entities themselves. The registries own the entities.
//!
//! # Critical Invariants
//!
//! 1. **Key Uniqueness**: a key maps to at most one entity; registering an
//!    existing key fails and leaves the registry untouched
//! 2. **No Removal**: entries are never removed individually, only by `reset`
//! 3. **Ordered Iteration**: entries iterate in ascending key order, which
//!    fixes the order of the encoded snapshot

use crate::models::cargo::{Cargo, CargoId};
use crate::models::ship::{ImoNumber, Ship};
use std::collections::BTreeMap;
use std::fmt::Display;
use thiserror::Error;

/// Errors raised when an entity cannot be created
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("{entity} with key {key} is already registered")]
    DuplicateKey { entity: &'static str, key: String },

    #[error("IMO number must have 7 digits with no leading zero: {0}")]
    InvalidImoNumber(u64),

    #[error("{field} must not be empty or contain ':', ',' or line breaks: {value:?}")]
    InvalidText { field: &'static str, value: String },
}

/// Raised when a key has no registered entity
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no {entity} registered with key {key}")]
pub struct LookupError {
    pub entity: &'static str,
    pub key: String,
}

/// Entities stored in a registry expose their own key
pub trait Keyed {
    type Key: Ord + Copy + Display + std::fmt::Debug;

    /// Entity name used in error messages
    const ENTITY: &'static str;

    fn key(&self) -> Self::Key;
}

/// Key-to-entity store enforcing key uniqueness
///
/// # Example
/// ```
/// use port_simulator_core_rs::models::cargo::{Cargo, ContainerType};
/// use port_simulator_core_rs::models::registry::Registry;
///
/// let mut registry = Registry::new();
/// registry
///     .register(Cargo::container(7, "Brisbane", ContainerType::Reefer).unwrap())
///     .unwrap();
///
/// assert!(registry.exists(7));
/// assert!(registry.get(8).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Registry<V: Keyed> {
    entries: BTreeMap<V::Key, V>,
}

impl<V: Keyed> Default for Registry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Keyed> Registry<V> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register an entity under its own key
    ///
    /// # Errors
    ///
    /// `ConstructionError::DuplicateKey` if the key is already taken.
    pub fn register(&mut self, value: V) -> Result<V::Key, ConstructionError> {
        let key = value.key();
        if self.entries.contains_key(&key) {
            return Err(ConstructionError::DuplicateKey {
                entity: V::ENTITY,
                key: key.to_string(),
            });
        }
        self.entries.insert(key, value);
        Ok(key)
    }

    pub fn exists(&self, key: V::Key) -> bool {
        self.entries.contains_key(&key)
    }

    /// Look up an entity by key
    pub fn get(&self, key: V::Key) -> Result<&V, LookupError> {
        self.entries.get(&key).ok_or_else(|| Self::not_found(key))
    }

    /// Look up an entity by key for mutation
    pub fn get_mut(&mut self, key: V::Key) -> Result<&mut V, LookupError> {
        self.entries.get_mut(&key).ok_or_else(|| Self::not_found(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entities in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }

    /// Drop every entry
    ///
    /// Intended for test harness setup between runs.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    fn not_found(key: V::Key) -> LookupError {
        LookupError {
            entity: V::ENTITY,
            key: key.to_string(),
        }
    }
}

pub type CargoRegistry = Registry<Cargo>;
pub type ShipRegistry = Registry<Ship>;

/// The two registries every port state resolves references through
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registries {
    pub cargo: CargoRegistry,
    pub ships: ShipRegistry,
}

impl Registries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cargo item
    pub fn register_cargo(&mut self, cargo: Cargo) -> Result<CargoId, ConstructionError> {
        self.cargo.register(cargo)
    }

    /// Register a ship
    pub fn register_ship(&mut self, ship: Ship) -> Result<ImoNumber, ConstructionError> {
        self.ships.register(ship)
    }

    /// Clear both registries
    pub fn reset(&mut self) {
        self.cargo.reset();
        self.ships.reset();
    }
}
