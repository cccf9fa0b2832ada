//! Port Engine
//!
//! Main simulation loop for a single port:
//! - Docking queued ships at free quays
//! - Unloading docked ships into the port's warehouses
//! - Applying scheduled ship and cargo movements
//! - Notifying statistics evaluators
//!
//! # Architecture
//!
//! `elapse_one_minute` runs these steps, strictly in this order:
//!
//! ```text
//! For each minute t:
//! 1. Advance the clock to t
//! 2. If t % 10 == 0: dock the selected queued ship at the first free quay it fits
//! 3. If t % 5 == 0:  unload every docked ship into stored cargo
//! 4. Apply every movement scheduled for t, in schedule order
//! 5. Notify every evaluator that a minute elapsed
//! ```
//!
//! A movement due on a docking or unloading minute therefore sees the port
//! after that minute's docking and unloading.
//!
//! # Example
//!
//! ```rust
//! use port_simulator_core_rs::models::{Movement, MovementDirection, NauticalFlag, Quay, Ship};
//! use port_simulator_core_rs::Port;
//!
//! let mut port = Port::new("Brisbane").unwrap();
//! port.add_quay(Quay::container(1, 100)).unwrap();
//! port.registries_mut()
//!     .register_ship(Ship::container_ship(1234567, "Legion", "France", NauticalFlag::Hotel, 50).unwrap())
//!     .unwrap();
//! port.add_movement(Movement::ship(3, MovementDirection::Inbound, 1234567)).unwrap();
//!
//! for _ in 0..10 {
//!     port.elapse_one_minute();
//! }
//! assert_eq!(port.quays()[0].occupant(), Some(1234567));
//! ```

use crate::core::time::SimClock;
use crate::evaluators::{create_evaluator, EvaluationContext, EvaluatorKind, StatisticsEvaluator};
use crate::models::cargo::CargoId;
use crate::models::movement::{Movement, MovementDirection, MovementPayload};
use crate::models::quay::{Quay, QuayId, QuayKind};
use crate::models::registry::{ConstructionError, LookupError, Registries};
use crate::models::ship::ImoNumber;
use crate::models::ship_queue::ShipQueue;
use crate::models::validate_text;
use crate::orchestrator::checkpoint::DecodeError;
use crate::schedule::{MovementScheduler, ScheduleError};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

// ============================================================================
// Configuration Types
// ============================================================================

/// Port configuration
///
/// Describes the fixed layout of a port: its quays and the evaluators that
/// observe it. Ships, cargo and movements are added at runtime.
///
/// # Example
///
/// ```rust
/// use port_simulator_core_rs::orchestrator::PortConfig;
///
/// let config = PortConfig::from_json(r#"{
///     "name": "Brisbane",
///     "quays": [
///         {"type": "BulkQuay", "id": 1, "max_tonnage": 500},
///         {"type": "ContainerQuay", "id": 2, "max_containers": 100}
///     ],
///     "evaluators": ["ShipFlagEvaluator", "QuayOccupancyEvaluator"]
/// }"#).unwrap();
///
/// assert_eq!(config.quays.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortConfig {
    /// Name identifying the port
    pub name: String,

    /// Quays in docking scan order
    #[serde(default)]
    pub quays: Vec<QuayConfig>,

    /// Evaluators to attach, at most one per kind
    #[serde(default)]
    pub evaluators: Vec<EvaluatorKind>,
}

/// Quay layout entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuayConfig {
    BulkQuay { id: QuayId, max_tonnage: u32 },
    ContainerQuay { id: QuayId, max_containers: u32 },
}

impl QuayConfig {
    pub fn id(&self) -> QuayId {
        match self {
            QuayConfig::BulkQuay { id, .. } | QuayConfig::ContainerQuay { id, .. } => *id,
        }
    }

    fn build(&self) -> Quay {
        match *self {
            QuayConfig::BulkQuay { id, max_tonnage } => Quay::new(id, QuayKind::Bulk { max_tonnage }),
            QuayConfig::ContainerQuay { id, max_containers } => {
                Quay::new(id, QuayKind::Container { max_containers })
            }
        }
    }
}

impl PortConfig {
    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Simulation error types
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration validation error
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Configuration could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Entity could not be created or registered
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    /// Referenced cargo or ship is not registered
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Movement rejected by the scheduler
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// Snapshot could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

// ============================================================================
// Port
// ============================================================================

/// A port where ships queue, dock, unload and depart
///
/// The Port owns all simulation state: the clock, the entity registries that
/// every reference resolves through, the ship queue, the movement schedule,
/// the quays, the stored cargo and the evaluators.
pub struct Port {
    /// Name identifying this port
    name: String,

    /// Minutes since the simulation started
    clock: SimClock,

    /// Cargo and ships known to this simulation
    registries: Registries,

    /// Ships waiting to dock
    ship_queue: ShipQueue,

    /// Pending movements in time order
    movements: MovementScheduler,

    /// Quays in docking scan order
    quays: Vec<Quay>,

    /// Cargo held in the port's warehouses, in arrival order
    stored_cargo: Vec<CargoId>,

    /// Evaluators in attachment order, at most one per kind
    evaluators: Vec<Box<dyn StatisticsEvaluator>>,
}

/// Ship docked during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DockedShip {
    pub imo_number: ImoNumber,
    pub quay_id: QuayId,
}

/// Result of a single tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickResult {
    /// Minute the tick advanced to
    pub minute: u64,

    /// Ship docked this tick, if any
    pub docked: Option<DockedShip>,

    /// Number of cargo items unloaded into storage this tick
    pub cargo_unloaded: usize,

    /// Number of movements applied this tick
    pub movements_processed: usize,
}

impl Port {
    /// Create an empty port at minute zero
    ///
    /// # Errors
    ///
    /// `ConstructionError::InvalidText` if the name is blank or contains
    /// `:`, `,` or a line break.
    pub fn new(name: impl Into<String>) -> Result<Self, ConstructionError> {
        Self::with_registries(name, Registries::new())
    }

    /// Create an empty port resolving references through `registries`
    pub fn with_registries(
        name: impl Into<String>,
        registries: Registries,
    ) -> Result<Self, ConstructionError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            clock: SimClock::new(),
            registries,
            ship_queue: ShipQueue::new(),
            movements: MovementScheduler::new(),
            quays: Vec::new(),
            stored_cargo: Vec::new(),
            evaluators: Vec::new(),
        })
    }

    /// Create a port from configuration
    ///
    /// # Errors
    ///
    /// - `SimulationError::InvalidConfig` for an empty name or duplicate quay ids
    /// - `SimulationError::Construction` for a name the snapshot cannot hold
    pub fn from_config(config: &PortConfig) -> Result<Self, SimulationError> {
        Self::validate_config(config)?;

        let mut port = Self::new(config.name.clone())?;
        for quay in &config.quays {
            port.add_quay(quay.build())?;
        }
        for kind in &config.evaluators {
            port.add_evaluator_kind(*kind);
        }

        info!(
            "port {} configured with {} quays and {} evaluators",
            port.name,
            port.quays.len(),
            port.evaluators.len()
        );
        Ok(port)
    }

    /// Validate configuration
    fn validate_config(config: &PortConfig) -> Result<(), SimulationError> {
        if config.name.trim().is_empty() {
            return Err(SimulationError::InvalidConfig(
                "port name must not be empty".to_string(),
            ));
        }

        let mut ids = HashSet::new();
        for quay in &config.quays {
            if !ids.insert(quay.id()) {
                return Err(SimulationError::InvalidConfig(format!(
                    "Duplicate quay ID: {}",
                    quay.id()
                )));
            }
        }

        Ok(())
    }

    /// Assemble a port from already validated parts
    pub(crate) fn from_parts(
        name: String,
        clock: SimClock,
        registries: Registries,
        quays: Vec<Quay>,
        ship_queue: ShipQueue,
        stored_cargo: Vec<CargoId>,
        movements: MovementScheduler,
    ) -> Self {
        Self {
            name,
            clock,
            registries,
            ship_queue,
            movements,
            quays,
            stored_cargo,
            evaluators: Vec::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current minute
    pub fn time(&self) -> u64 {
        self.clock.now()
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    /// Mutable access to the registries for creating cargo and ships
    pub fn registries_mut(&mut self) -> &mut Registries {
        &mut self.registries
    }

    pub fn ship_queue(&self) -> &ShipQueue {
        &self.ship_queue
    }

    pub fn movements(&self) -> &MovementScheduler {
        &self.movements
    }

    pub fn quays(&self) -> &[Quay] {
        &self.quays
    }

    /// Ids of cargo in the port's warehouses
    pub fn stored_cargo(&self) -> &[CargoId] {
        &self.stored_cargo
    }

    pub fn evaluators(&self) -> impl Iterator<Item = &dyn StatisticsEvaluator> {
        self.evaluators.iter().map(|evaluator| evaluator.as_ref())
    }

    /// Kinds of the attached evaluators in attachment order
    pub fn evaluator_kinds(&self) -> Vec<EvaluatorKind> {
        self.evaluators.iter().map(|evaluator| evaluator.kind()).collect()
    }

    /// Attached evaluator of concrete type `T`, if any
    ///
    /// ```rust
    /// use port_simulator_core_rs::evaluators::{EvaluatorKind, ShipFlagEvaluator};
    /// use port_simulator_core_rs::Port;
    ///
    /// let mut port = Port::new("Brisbane").unwrap();
    /// port.add_evaluator_kind(EvaluatorKind::ShipFlag);
    /// assert!(port.evaluator::<ShipFlagEvaluator>().is_some());
    /// ```
    pub fn evaluator<T: 'static>(&self) -> Option<&T> {
        self.evaluators
            .iter()
            .find_map(|evaluator| evaluator.as_any().downcast_ref::<T>())
    }

    // ========================================================================
    // Mutators
    // ========================================================================

    /// Append a quay to the docking scan order
    ///
    /// Attached evaluators are told the quay layout changed.
    ///
    /// # Errors
    ///
    /// - `SimulationError::Construction` if a quay with the same id exists
    /// - `SimulationError::Lookup` if the quay holds an unregistered ship
    pub fn add_quay(&mut self, quay: Quay) -> Result<(), SimulationError> {
        if self.quays.iter().any(|existing| existing.id() == quay.id()) {
            return Err(ConstructionError::DuplicateKey {
                entity: "quay",
                key: quay.id().to_string(),
            }
            .into());
        }
        if let Some(imo_number) = quay.occupant() {
            self.registries.ships.get(imo_number)?;
        }
        self.quays.push(quay);

        let ctx = EvaluationContext {
            quays: &self.quays,
            registries: &self.registries,
        };
        for evaluator in self.evaluators.iter_mut() {
            evaluator.on_quays_changed(&ctx);
        }
        Ok(())
    }

    /// Place registered cargo in the port's warehouses
    pub fn store_cargo(&mut self, id: CargoId) -> Result<(), LookupError> {
        self.registries.cargo.get(id)?;
        self.stored_cargo.push(id);
        Ok(())
    }

    /// Put a registered ship at the tail of the ship queue
    pub fn queue_ship(&mut self, imo_number: ImoNumber) -> Result<(), LookupError> {
        self.registries.ships.get(imo_number)?;
        self.ship_queue.add(imo_number);
        Ok(())
    }

    /// Schedule a movement
    ///
    /// # Errors
    ///
    /// - `SimulationError::Lookup` if the payload references unregistered
    ///   ships or cargo
    /// - `SimulationError::Schedule` if the movement is before the current minute
    pub fn add_movement(&mut self, movement: Movement) -> Result<(), SimulationError> {
        self.resolve_payload(&movement)?;
        self.movements.add(movement, self.clock.now())?;
        Ok(())
    }

    /// Check that every ship or cargo the movement names is registered
    fn resolve_payload(&self, movement: &Movement) -> Result<(), LookupError> {
        match movement.payload() {
            MovementPayload::Ship(imo) => {
                self.registries.ships.get(*imo)?;
            }
            MovementPayload::Cargo(ids) => {
                for id in ids {
                    self.registries.cargo.get(*id)?;
                }
            }
        }
        Ok(())
    }

    /// Attach an evaluator
    ///
    /// Returns `false` and drops `evaluator` if one of the same kind is
    /// already attached.
    pub fn add_evaluator(&mut self, evaluator: Box<dyn StatisticsEvaluator>) -> bool {
        let kind = evaluator.kind();
        if self.evaluators.iter().any(|existing| existing.kind() == kind) {
            return false;
        }
        self.evaluators.push(evaluator);
        true
    }

    /// Attach a freshly built evaluator of the given kind
    pub fn add_evaluator_kind(&mut self, kind: EvaluatorKind) -> bool {
        let evaluator = create_evaluator(kind, &self.quays);
        self.add_evaluator(evaluator)
    }

    // ========================================================================
    // Tick Loop Implementation
    // ========================================================================

    /// Advance the simulation by one minute
    ///
    /// See the module documentation for the step order.
    pub fn elapse_one_minute(&mut self) -> TickResult {
        // STEP 1: CLOCK
        self.clock.advance_minute();
        let minute = self.clock.now();

        // STEP 2: DOCKING
        let docked = if self.clock.is_docking_minute() {
            self.dock_next_ship()
        } else {
            None
        };

        // STEP 3: UNLOADING
        let cargo_unloaded = if self.clock.is_unloading_minute() {
            self.unload_docked_ships()
        } else {
            0
        };

        // STEP 4: MOVEMENTS
        // Detach the due movements first so processing never observes a
        // half-drained schedule. Anything older was scheduled for a minute
        // that had already run and is dropped.
        for movement in self.movements.take_stale(minute) {
            debug!("dropping stale movement {}", movement);
        }
        let due = self.movements.take_due(minute);
        let movements_processed = due
            .iter()
            .filter(|movement| self.process_movement(movement))
            .count();

        // STEP 5: EVALUATORS
        let ctx = EvaluationContext {
            quays: &self.quays,
            registries: &self.registries,
        };
        for evaluator in self.evaluators.iter_mut() {
            evaluator.on_tick(&ctx);
        }

        debug!(
            "minute {}: docked {:?}, unloaded {}, processed {} movements",
            minute, docked, cargo_unloaded, movements_processed
        );

        TickResult {
            minute,
            docked,
            cargo_unloaded,
            movements_processed,
        }
    }

    /// Dock the selected queued ship at the first free quay it fits
    fn dock_next_ship(&mut self) -> Option<DockedShip> {
        let imo_number = self.ship_queue.peek(&self.registries.ships)?;
        let ship = self.registries.ships.get(imo_number).ok()?;

        let Some(quay) = self
            .quays
            .iter_mut()
            .find(|quay| !quay.is_occupied() && ship.can_dock(quay))
        else {
            debug!("no free quay for ship {}, it stays queued", imo_number);
            return None;
        };

        quay.occupy(imo_number);
        let quay_id = quay.id();
        self.ship_queue.poll(&self.registries.ships);

        info!("ship {} docked at quay {}", imo_number, quay_id);
        Some(DockedShip {
            imo_number,
            quay_id,
        })
    }

    /// Unload every docked ship into stored cargo
    ///
    /// Ships with an empty hold are skipped.
    fn unload_docked_ships(&mut self) -> usize {
        let mut unloaded = 0;
        for quay in &self.quays {
            let Some(imo_number) = quay.occupant() else {
                continue;
            };
            let ship = match self.registries.ships.get_mut(imo_number) {
                Ok(ship) => ship,
                Err(e) => {
                    warn!("quay {} holds {}", quay.id(), e);
                    continue;
                }
            };
            match ship.unload_cargo() {
                Ok(cargo) => {
                    unloaded += cargo.len();
                    self.stored_cargo.extend(cargo);
                }
                Err(e) => debug!("skipping quay {}: {}", quay.id(), e),
            }
        }
        unloaded
    }

    /// Apply a movement to the port
    ///
    /// Movements scheduled before the current minute, and movements naming
    /// a ship or cargo that is not registered, are ignored. Returns whether
    /// the movement was applied; evaluators are notified of every applied
    /// movement.
    pub fn process_movement(&mut self, movement: &Movement) -> bool {
        if movement.time() < self.clock.now() {
            debug!("ignoring stale movement {}", movement);
            return false;
        }
        if let Err(e) = self.resolve_payload(movement) {
            warn!("ignoring movement {}: {}", movement, e);
            return false;
        }

        match (movement.payload(), movement.direction()) {
            (MovementPayload::Ship(imo), MovementDirection::Inbound) => {
                self.ship_queue.add(*imo);
            }
            (MovementPayload::Ship(imo), MovementDirection::Outbound) => {
                self.depart_ship(*imo);
            }
            (MovementPayload::Cargo(ids), MovementDirection::Inbound) => {
                self.stored_cargo.extend(ids.iter().copied());
            }
            (MovementPayload::Cargo(ids), MovementDirection::Outbound) => {
                let leaving: HashSet<CargoId> = ids.iter().copied().collect();
                self.stored_cargo.retain(|id| !leaving.contains(id));
            }
        }

        let ctx = EvaluationContext {
            quays: &self.quays,
            registries: &self.registries,
        };
        for evaluator in self.evaluators.iter_mut() {
            evaluator.on_movement_processed(movement, &ctx);
        }
        true
    }

    /// Load every compatible stored cargo onto the ship, then free its quay
    fn depart_ship(&mut self, imo_number: ImoNumber) {
        let Registries { cargo, ships } = &mut self.registries;
        if let Ok(ship) = ships.get_mut(imo_number) {
            let stored = std::mem::take(&mut self.stored_cargo);
            for id in stored {
                match cargo.get(id) {
                    Ok(item) if ship.can_load(item) => ship.load_cargo(item),
                    _ => self.stored_cargo.push(id),
                }
            }
        }

        if let Some(quay) = self
            .quays
            .iter_mut()
            .find(|quay| quay.occupant() == Some(imo_number))
        {
            quay.vacate();
            info!("ship {} departed quay {}", imo_number, quay.id());
        }
    }
}

impl PartialEq for Port {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.clock == other.clock
            && self.registries == other.registries
            && self.ship_queue == other.ship_queue
            && self.movements == other.movements
            && self.quays == other.quays
            && self.stored_cargo == other.stored_cargo
            && self.evaluator_kinds() == other.evaluator_kinds()
    }
}

/// Port names head the snapshot, so they follow the entity text rules and
/// may not be blank
pub(crate) fn validate_name(name: &str) -> Result<(), ConstructionError> {
    if name.trim().is_empty() {
        return Err(ConstructionError::InvalidText {
            field: "port name",
            value: name.to_string(),
        });
    }
    validate_text("port name", name)
}

// Manual Debug implementation (evaluators don't implement Debug)
impl std::fmt::Debug for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Port")
            .field("name", &self.name)
            .field("time", &self.time())
            .field("num_cargo", &self.registries.cargo.len())
            .field("num_ships", &self.registries.ships.len())
            .field("quays", &self.quays)
            .field("ship_queue", &self.ship_queue)
            .field("stored_cargo", &self.stored_cargo)
            .field("num_movements", &self.movements.len())
            .field("evaluators", &self.evaluator_kinds())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
