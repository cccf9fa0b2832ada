//! Checkpoint - Save/Load Port State
//!
//! Encodes the complete port state as newline-separated records and decodes
//! such a snapshot back into a live [`Port`].
//!
//! # Snapshot Layout
//!
//! ```text
//! <port name>
//! <minute>
//! <cargo count>
//! Container:<id>:<destination>:<TYPE>             (one per cargo, key order)
//! <ship count>
//! ContainerShip:<imo>:<name>:<origin>:<FLAG>:...  (one per ship, key order)
//! <quay count>
//! BulkQuay:<id>:<imo|None>:<capacity>             (one per quay, scan order)
//! ShipQueue:<count>:<imo,...>
//! StoredCargo:<count>:<id,...>
//! Movements:<count>
//! ShipMovement:<time>:<DIR>:<imo>                 (one per movement, schedule order)
//! Evaluators:<count>:<name,...>
//! ```
//!
//! # Critical Invariants
//!
//! - **Entities First**: cargo, then ships, are rebuilt before any record that
//!   references them; every reference is resolved against the registries
//!   being rebuilt
//! - **Checks In Order**: each record is checked for field count, then field
//!   syntax, then references
//! - **All Or Nothing**: a decode either returns a complete port or an error;
//!   nothing partially decoded escapes

use crate::core::time::SimClock;
use crate::evaluators::EvaluatorKind;
use crate::models::cargo::{BulkCargoType, Cargo, CargoId, ContainerType};
use crate::models::movement::{Movement, MovementDirection, MovementPayload};
use crate::models::quay::{Quay, QuayId, EMPTY_QUAY_MARKER};
use crate::models::registry::{ConstructionError, LookupError, Registries};
use crate::models::ship::{join_ids, ImoNumber, NauticalFlag, Ship, EMPTY_HOLD_MARKER};
use crate::models::ship_queue::{ShipQueue, SHIP_QUEUE_RECORD};
use crate::models::ParseVariantError;
use crate::orchestrator::engine::{validate_name, Port};
use crate::schedule::{MovementScheduler, ScheduleError};
use log::debug;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::str::FromStr;
use thiserror::Error;

/// Record name of the stored cargo summary
pub const STORED_CARGO_RECORD: &str = "StoredCargo";

/// Record name of the movement count
pub const MOVEMENTS_RECORD: &str = "Movements";

/// Record name of the evaluator summary
pub const EVALUATORS_RECORD: &str = "Evaluators";

const FIELD_SEPARATOR: char = ':';
const LIST_SEPARATOR: char = ',';

// ============================================================================
// Errors
// ============================================================================

/// Snapshot decoding failure
///
/// Carries the 1-based line number and the record being decoded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("line {line}: invalid {record} record: {kind}")]
pub struct DecodeError {
    pub line: usize,
    pub record: &'static str,
    pub kind: DecodeErrorKind,
}

/// Rule a snapshot record violated
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeErrorKind {
    #[error("record is missing")]
    MissingRecord,

    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("expected a {expected} record, found {found:?}")]
    UnexpectedRecord { expected: &'static str, found: String },

    #[error("unknown kind {0:?}")]
    UnknownKind(String),

    #[error("{field} is not a non-negative integer: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error(transparent)]
    UnknownVariant(#[from] ParseVariantError),

    #[error("declared {declared} entries but found {actual}")]
    CountMismatch { declared: usize, actual: usize },

    #[error(transparent)]
    DanglingReference(#[from] LookupError),

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("cargo {cargo} cannot be held by ship {imo_number}")]
    IncompatibleCargo { cargo: CargoId, imo_number: ImoNumber },

    #[error("quay {0} appears more than once")]
    DuplicateQuay(QuayId),

    #[error("evaluator {0} appears more than once")]
    DuplicateEvaluator(EvaluatorKind),

    #[error("unexpected record after the evaluator summary")]
    TrailingRecord,
}

// ============================================================================
// Encoding
// ============================================================================

impl Port {
    /// Encode the complete port state as a snapshot
    ///
    /// Registries are written in ascending key order and movements in
    /// schedule order, so equal states encode identically.
    pub fn encode(&self) -> String {
        let registries = self.registries();
        let mut lines = vec![self.name().to_string(), self.time().to_string()];

        lines.push(registries.cargo.len().to_string());
        lines.extend(registries.cargo.iter().map(Cargo::encode));

        lines.push(registries.ships.len().to_string());
        lines.extend(registries.ships.iter().map(Ship::encode));

        lines.push(self.quays().len().to_string());
        lines.extend(self.quays().iter().map(Quay::encode));

        lines.push(self.ship_queue().encode());
        lines.push(format!(
            "{}:{}:{}",
            STORED_CARGO_RECORD,
            self.stored_cargo().len(),
            join_ids(self.stored_cargo())
        ));

        lines.push(format!("{}:{}", MOVEMENTS_RECORD, self.movements().len()));
        lines.extend(self.movements().iter().map(Movement::encode));

        let evaluators: Vec<&str> = self.evaluators().map(|e| e.kind().name()).collect();
        lines.push(format!(
            "{}:{}:{}",
            EVALUATORS_RECORD,
            evaluators.len(),
            evaluators.join(",")
        ));

        lines.join("\n")
    }

    /// SHA256 of the encoded state, as lowercase hex
    ///
    /// Two ports have the same fingerprint exactly when they encode to the
    /// same snapshot.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.encode().as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Rebuild a port from a snapshot produced by [`Port::encode`]
    ///
    /// # Errors
    ///
    /// `DecodeError` naming the first offending line. No port is returned
    /// unless every record decodes.
    ///
    /// # Example
    ///
    /// ```rust
    /// use port_simulator_core_rs::Port;
    ///
    /// let snapshot = "Brisbane\n0\n0\n0\n1\nBulkQuay:1:None:500\nShipQueue:0:\nStoredCargo:0:\nMovements:0\nEvaluators:0:";
    /// let port = Port::decode(snapshot).unwrap();
    /// assert_eq!(port.encode(), snapshot);
    ///
    /// assert!(Port::decode("Brisbane\n0\n0\n0\n0\nShipQueue:2:1234567").is_err());
    /// ```
    pub fn decode(text: &str) -> Result<Port, DecodeError> {
        let mut reader = RecordReader::new(text);

        let (line, name) = reader.next_record("port name")?;
        if name.trim().is_empty() {
            return Err(DecodeError::new(line, "port name", DecodeErrorKind::EmptyField("port name")));
        }
        validate_name(name).map_err(|e| DecodeError::new(line, "port name", e.into()))?;

        let clock = reader.decode("clock", |text| parse_number::<u64>("minute", text))?;
        let clock = SimClock::starting_at(clock);

        // Entities first: cargo, then ships holding that cargo
        let mut registries = Registries::new();

        let cargo_count = reader.decode("cargo count", |text| parse_number::<usize>("count", text))?;
        for _ in 0..cargo_count {
            reader.decode("cargo", |text| {
                registries.register_cargo(decode_cargo(text)?)?;
                Ok(())
            })?;
        }

        let ship_count = reader.decode("ship count", |text| parse_number::<usize>("count", text))?;
        for _ in 0..ship_count {
            reader.decode("ship", |text| {
                let ship = decode_ship(text, &registries)?;
                registries.register_ship(ship)?;
                Ok(())
            })?;
        }
        debug!(
            "decoded {} cargo and {} ships",
            registries.cargo.len(),
            registries.ships.len()
        );

        // Relationships second
        let quay_count = reader.decode("quay count", |text| parse_number::<usize>("count", text))?;
        let mut quays: Vec<Quay> = Vec::with_capacity(quay_count);
        for _ in 0..quay_count {
            reader.decode("quay", |text| {
                let quay = decode_quay(text, &registries)?;
                if quays.iter().any(|existing| existing.id() == quay.id()) {
                    return Err(DecodeErrorKind::DuplicateQuay(quay.id()));
                }
                quays.push(quay);
                Ok(())
            })?;
        }

        let ship_queue = reader.decode(SHIP_QUEUE_RECORD, |text| {
            let ships = decode_summary(text, SHIP_QUEUE_RECORD)?
                .into_iter()
                .map(|item| parse_number::<ImoNumber>("IMO number", item))
                .collect::<Result<Vec<_>, _>>()?;
            let mut queue = ShipQueue::new();
            for imo in ships {
                registries.ships.get(imo)?;
                queue.add(imo);
            }
            Ok(queue)
        })?;

        let stored_cargo = reader.decode(STORED_CARGO_RECORD, |text| {
            let cargo = decode_summary(text, STORED_CARGO_RECORD)?
                .into_iter()
                .map(|item| parse_number::<CargoId>("cargo id", item))
                .collect::<Result<Vec<_>, _>>()?;
            for id in &cargo {
                registries.cargo.get(*id)?;
            }
            Ok(cargo)
        })?;

        let movement_count = reader.decode(MOVEMENTS_RECORD, |text| {
            let fields = split_fields(text, MOVEMENTS_RECORD, 2)?;
            parse_number::<usize>("count", fields[1])
        })?;
        let mut movements = MovementScheduler::new();
        for _ in 0..movement_count {
            reader.decode("movement", |text| {
                let movement = decode_movement(text, &registries)?;
                movements.add(movement, clock.now())?;
                Ok(())
            })?;
        }

        let evaluators = reader.decode(EVALUATORS_RECORD, |text| {
            let mut seen = HashSet::new();
            let mut kinds = Vec::new();
            for item in decode_summary(text, EVALUATORS_RECORD)? {
                let kind = item.parse::<EvaluatorKind>()?;
                if !seen.insert(kind) {
                    return Err(DecodeErrorKind::DuplicateEvaluator(kind));
                }
                kinds.push(kind);
            }
            Ok(kinds)
        })?;
        reader.finish()?;

        let mut port = Port::from_parts(
            name.to_string(),
            clock,
            registries,
            quays,
            ship_queue,
            stored_cargo,
            movements,
        );
        // Quay-aware evaluators are seeded from the quays decoded above
        for kind in evaluators {
            port.add_evaluator_kind(kind);
        }

        debug!("decoded port {} at minute {}", port.name(), port.time());
        Ok(port)
    }
}

impl FromStr for Port {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Port::decode(s)
    }
}

impl DecodeError {
    fn new(line: usize, record: &'static str, kind: DecodeErrorKind) -> Self {
        Self { line, record, kind }
    }
}

// ============================================================================
// Record Reader
// ============================================================================

/// Sequential access to snapshot lines with 1-based line tracking
struct RecordReader<'a> {
    lines: std::str::Lines<'a>,
    line: usize,
}

impl<'a> RecordReader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            line: 0,
        }
    }

    fn next_record(&mut self, record: &'static str) -> Result<(usize, &'a str), DecodeError> {
        match self.lines.next() {
            Some(text) => {
                self.line += 1;
                Ok((self.line, text))
            }
            None => Err(DecodeError::new(self.line + 1, record, DecodeErrorKind::MissingRecord)),
        }
    }

    /// Read the next line and decode it, attaching line context to failures
    fn decode<T>(
        &mut self,
        record: &'static str,
        decode: impl FnOnce(&'a str) -> Result<T, DecodeErrorKind>,
    ) -> Result<T, DecodeError> {
        let (line, text) = self.next_record(record)?;
        decode(text).map_err(|kind| DecodeError::new(line, record, kind))
    }

    /// Only blank lines may follow the last record
    fn finish(&mut self) -> Result<(), DecodeError> {
        let last = self.line;
        for (offset, text) in self.lines.by_ref().enumerate() {
            if !text.trim().is_empty() {
                return Err(DecodeError::new(
                    last + offset + 1,
                    EVALUATORS_RECORD,
                    DecodeErrorKind::TrailingRecord,
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Field Parsing
// ============================================================================

/// Split a record and check its field count before anything else
fn split_fields<'a>(
    text: &'a str,
    record: &'static str,
    expected: usize,
) -> Result<Vec<&'a str>, DecodeErrorKind> {
    let fields: Vec<&str> = text.split(FIELD_SEPARATOR).collect();
    if fields.len() != expected {
        return Err(DecodeErrorKind::FieldCount {
            expected,
            found: fields.len(),
        });
    }
    if fields[0] != record {
        return Err(DecodeErrorKind::UnexpectedRecord {
            expected: record,
            found: fields[0].to_string(),
        });
    }
    Ok(fields)
}

fn parse_number<T: FromStr>(field: &'static str, value: &str) -> Result<T, DecodeErrorKind> {
    value.parse().map_err(|_| DecodeErrorKind::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Split a comma-separated list and check it against its declared count
fn split_list<'a>(count: &str, list: &'a str) -> Result<Vec<&'a str>, DecodeErrorKind> {
    let declared = parse_number::<usize>("count", count)?;
    let items: Vec<&str> = if list.is_empty() {
        Vec::new()
    } else {
        list.split(LIST_SEPARATOR).collect()
    };
    if items.len() != declared {
        return Err(DecodeErrorKind::CountMismatch {
            declared,
            actual: items.len(),
        });
    }
    Ok(items)
}

/// Parse a `count` field and its comma-separated list of keys
fn parse_list<T: FromStr>(
    field: &'static str,
    count: &str,
    list: &str,
) -> Result<Vec<T>, DecodeErrorKind> {
    split_list(count, list)?
        .into_iter()
        .map(|item| parse_number(field, item))
        .collect()
}

/// `Record:count:item,item,...`
fn decode_summary<'a>(text: &'a str, record: &'static str) -> Result<Vec<&'a str>, DecodeErrorKind> {
    let fields = split_fields(text, record, 3)?;
    split_list(fields[1], fields[2])
}

/// Record kind is the first field; the rest depends on it
fn record_kind(text: &str) -> &str {
    text.split(FIELD_SEPARATOR).next().unwrap_or_default()
}

// ============================================================================
// Entity Records
// ============================================================================

fn decode_cargo(text: &str) -> Result<Cargo, DecodeErrorKind> {
    match record_kind(text) {
        "Container" => {
            let fields = split_fields(text, "Container", 4)?;
            let id = parse_number::<CargoId>("cargo id", fields[1])?;
            let container_type = fields[3].parse::<ContainerType>()?;
            Ok(Cargo::container(id, fields[2], container_type)?)
        }
        "BulkCargo" => {
            let fields = split_fields(text, "BulkCargo", 5)?;
            let id = parse_number::<CargoId>("cargo id", fields[1])?;
            let cargo_type = fields[3].parse::<BulkCargoType>()?;
            let tonnage = parse_number::<u32>("tonnage", fields[4])?;
            Ok(Cargo::bulk(id, fields[2], cargo_type, tonnage)?)
        }
        other => Err(DecodeErrorKind::UnknownKind(other.to_string())),
    }
}

/// Decode a ship and load its hold from already decoded cargo
fn decode_ship(text: &str, registries: &Registries) -> Result<Ship, DecodeErrorKind> {
    let (mut ship, held) = match record_kind(text) {
        "ContainerShip" => {
            let fields = split_fields(text, "ContainerShip", 8)?;
            let imo = parse_number::<ImoNumber>("IMO number", fields[1])?;
            let flag = fields[4].parse::<NauticalFlag>()?;
            let capacity = parse_number::<u32>("capacity", fields[5])?;
            let held = parse_list::<CargoId>("cargo id", fields[6], fields[7])?;
            (Ship::container_ship(imo, fields[2], fields[3], flag, capacity)?, held)
        }
        "BulkCarrier" => {
            let fields = split_fields(text, "BulkCarrier", 7)?;
            let imo = parse_number::<ImoNumber>("IMO number", fields[1])?;
            let flag = fields[4].parse::<NauticalFlag>()?;
            let capacity = parse_number::<u32>("capacity", fields[5])?;
            let held = if fields[6] == EMPTY_HOLD_MARKER {
                Vec::new()
            } else {
                vec![parse_number::<CargoId>("cargo id", fields[6])?]
            };
            (Ship::bulk_carrier(imo, fields[2], fields[3], flag, capacity)?, held)
        }
        other => return Err(DecodeErrorKind::UnknownKind(other.to_string())),
    };

    for id in held {
        let cargo = registries.cargo.get(id)?;
        if !ship.can_load(cargo) {
            return Err(DecodeErrorKind::IncompatibleCargo {
                cargo: id,
                imo_number: ship.imo_number(),
            });
        }
        ship.load_cargo(cargo);
    }
    Ok(ship)
}

fn decode_quay(text: &str, registries: &Registries) -> Result<Quay, DecodeErrorKind> {
    let (record, build): (&'static str, fn(QuayId, u32) -> Quay) = match record_kind(text) {
        "BulkQuay" => ("BulkQuay", Quay::bulk),
        "ContainerQuay" => ("ContainerQuay", Quay::container),
        other => return Err(DecodeErrorKind::UnknownKind(other.to_string())),
    };

    let fields = split_fields(text, record, 4)?;
    let id = parse_number::<QuayId>("quay id", fields[1])?;
    let occupant = if fields[2] == EMPTY_QUAY_MARKER {
        None
    } else {
        Some(parse_number::<ImoNumber>("IMO number", fields[2])?)
    };
    let capacity = parse_number::<u32>("capacity", fields[3])?;

    let mut quay = build(id, capacity);
    if let Some(imo) = occupant {
        registries.ships.get(imo)?;
        quay.occupy(imo);
    }
    Ok(quay)
}

/// Decode a single movement record against the given registries
pub fn decode_movement_record(text: &str, registries: &Registries) -> Result<Movement, DecodeError> {
    decode_movement(text, registries).map_err(|kind| DecodeError::new(1, "movement", kind))
}

fn decode_movement(text: &str, registries: &Registries) -> Result<Movement, DecodeErrorKind> {
    let (time, direction, payload) = match record_kind(text) {
        "ShipMovement" => {
            let fields = split_fields(text, "ShipMovement", 4)?;
            let time = parse_number::<u64>("time", fields[1])?;
            let direction = fields[2].parse::<MovementDirection>()?;
            let imo = parse_number::<ImoNumber>("IMO number", fields[3])?;
            (time, direction, MovementPayload::Ship(imo))
        }
        "CargoMovement" => {
            let fields = split_fields(text, "CargoMovement", 5)?;
            let time = parse_number::<u64>("time", fields[1])?;
            let direction = fields[2].parse::<MovementDirection>()?;
            let cargo = parse_list::<CargoId>("cargo id", fields[3], fields[4])?;
            (time, direction, MovementPayload::Cargo(cargo))
        }
        other => return Err(DecodeErrorKind::UnknownKind(other.to_string())),
    };

    match &payload {
        MovementPayload::Ship(imo) => {
            registries.ships.get(*imo)?;
        }
        MovementPayload::Cargo(ids) => {
            for id in ids {
                registries.cargo.get(*id)?;
            }
        }
    }
    Ok(Movement::new(time, direction, payload))
}

// ============================================================================
// Tests
// ============================================================================
