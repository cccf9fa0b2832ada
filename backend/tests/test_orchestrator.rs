//! Port Orchestrator Tests - tick loop and movement processing
//!
//! Critical invariants tested:
//! - Step order: dock, unload, movements, evaluators
//! - A ship docks at the first free quay it fits, and at only one quay
//! - Departing ships load compatible stored cargo and free their quay
//! - Outbound cargo removes exactly the named keys
//! - Movements naming unregistered ships or cargo never reach port state

use port_simulator_core_rs::evaluators::{EvaluatorKind, QuayOccupancyEvaluator};
use port_simulator_core_rs::models::cargo::{BulkCargoType, Cargo, ContainerType};
use port_simulator_core_rs::models::movement::{Movement, MovementDirection};
use port_simulator_core_rs::models::quay::Quay;
use port_simulator_core_rs::models::registry::Registries;
use port_simulator_core_rs::models::ship::{NauticalFlag, Ship, ShipHold};
use port_simulator_core_rs::orchestrator::{
    DockedShip, Port, PortConfig, QuayConfig, SimulationError,
};
use port_simulator_core_rs::{ConstructionError, LookupError, ScheduleError};

const LEGION: u64 = 1234567;
const ORE: u64 = 7654321;

// ============================================================================
// Test Helpers
// ============================================================================

/// Port with one container quay, one bulk quay and two ships registered
fn create_test_port() -> Port {
    let mut port = Port::new("Brisbane").unwrap();
    port.add_quay(Quay::container(1, 100)).unwrap();
    port.add_quay(Quay::bulk(2, 500)).unwrap();

    let registries = port.registries_mut();
    registries
        .register_ship(
            Ship::container_ship(LEGION, "Legion", "Sydney", NauticalFlag::Nothing, 50).unwrap(),
        )
        .unwrap();
    registries
        .register_ship(Ship::bulk_carrier(ORE, "Ore", "Perth", NauticalFlag::Nothing, 300).unwrap())
        .unwrap();
    port
}

fn register_cargo(port: &mut Port, cargo: Cargo) -> u32 {
    port.registries_mut().register_cargo(cargo).unwrap()
}

/// Put registered cargo aboard a ship without going through a departure
fn load_aboard(port: &mut Port, imo: u64, cargo_id: u32) {
    let Registries { cargo, ships } = port.registries_mut();
    ships.get_mut(imo).unwrap().load_cargo(cargo.get(cargo_id).unwrap());
}

fn run_until(port: &mut Port, minute: u64) {
    while port.time() < minute {
        port.elapse_one_minute();
    }
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_port_from_json_config() {
    let config = PortConfig::from_json(
        r#"{
            "name": "Brisbane",
            "quays": [
                {"type": "ContainerQuay", "id": 1, "max_containers": 100},
                {"type": "BulkQuay", "id": 2, "max_tonnage": 500}
            ],
            "evaluators": ["QuayOccupancyEvaluator", "ShipFlagEvaluator"]
        }"#,
    )
    .unwrap();

    let port = Port::from_config(&config).unwrap();

    assert_eq!(port.name(), "Brisbane");
    assert_eq!(port.quays(), &[Quay::container(1, 100), Quay::bulk(2, 500)]);
    assert_eq!(
        port.evaluator_kinds(),
        vec![EvaluatorKind::QuayOccupancy, EvaluatorKind::ShipFlag]
    );
}

#[test]
fn test_malformed_json_config() {
    assert!(matches!(
        PortConfig::from_json("{\"quays\": []}"),
        Err(SimulationError::ConfigParse(_))
    ));
}

#[test]
fn test_duplicate_quay_config_rejected() {
    let config = PortConfig {
        name: "Brisbane".to_string(),
        quays: vec![
            QuayConfig::BulkQuay {
                id: 4,
                max_tonnage: 10,
            },
            QuayConfig::ContainerQuay {
                id: 4,
                max_containers: 10,
            },
        ],
        evaluators: vec![],
    };

    assert!(matches!(
        Port::from_config(&config),
        Err(SimulationError::InvalidConfig(_))
    ));
}

#[test]
fn test_port_name_must_fit_snapshot_header() {
    for name in ["", "   ", "Bris\nbane", "Bris\rbane", "Bris:bane"] {
        assert!(
            matches!(
                Port::new(name),
                Err(ConstructionError::InvalidText {
                    field: "port name",
                    ..
                })
            ),
            "accepted {:?}",
            name
        );
    }

    let port = Port::new("Port of Brisbane").unwrap();
    assert_eq!(Port::decode(&port.encode()).unwrap(), port);
}

#[test]
fn test_add_quay_rejects_duplicate_id() {
    let mut port = create_test_port();

    assert!(matches!(
        port.add_quay(Quay::bulk(1, 50)),
        Err(SimulationError::Construction(ConstructionError::DuplicateKey { .. }))
    ));
    assert_eq!(port.quays().len(), 2);
}

#[test]
fn test_add_quay_rejects_unregistered_occupant() {
    let mut port = create_test_port();
    let mut quay = Quay::bulk(3, 50);
    quay.occupy(9999999);

    assert!(matches!(
        port.add_quay(quay),
        Err(SimulationError::Lookup(LookupError { entity: "ship", .. }))
    ));
    assert_eq!(port.quays().len(), 2);
}

// ============================================================================
// Scheduling
// ============================================================================

#[test]
fn test_add_movement_in_past_fails() {
    let mut port = create_test_port();
    run_until(&mut port, 5);

    let err = port
        .add_movement(Movement::ship(3, MovementDirection::Inbound, LEGION))
        .unwrap_err();
    assert!(matches!(
        err,
        SimulationError::Schedule(ScheduleError::InPast { time: 3, now: 5 })
    ));
    assert!(port.movements().is_empty());

    port.add_movement(Movement::ship(5, MovementDirection::Inbound, LEGION))
        .unwrap();
    assert_eq!(port.movements().len(), 1);
}

#[test]
fn test_add_movement_with_unknown_ship_fails() {
    let mut port = create_test_port();

    assert!(matches!(
        port.add_movement(Movement::ship(3, MovementDirection::Inbound, 9999999)),
        Err(SimulationError::Lookup(_))
    ));
    assert!(matches!(
        port.add_movement(Movement::cargo(3, MovementDirection::Inbound, vec![42])),
        Err(SimulationError::Lookup(_))
    ));
}

#[test]
fn test_movement_added_after_its_minute_ran_is_dropped() {
    let mut port = create_test_port();
    run_until(&mut port, 5);

    port.add_movement(Movement::ship(5, MovementDirection::Inbound, LEGION))
        .unwrap();
    port.add_movement(Movement::ship(6, MovementDirection::Inbound, ORE))
        .unwrap();
    let result = port.elapse_one_minute();

    assert_eq!(result.movements_processed, 1);
    assert_eq!(port.ship_queue().ships(), &[ORE]);
    assert!(port.movements().is_empty());
}

#[test]
fn test_processed_movements_leave_schedule() {
    let mut port = create_test_port();
    port.add_movement(Movement::ship(2, MovementDirection::Inbound, LEGION))
        .unwrap();
    port.add_movement(Movement::ship(4, MovementDirection::Inbound, ORE))
        .unwrap();

    run_until(&mut port, 2);
    assert_eq!(port.movements().len(), 1);
    assert_eq!(port.ship_queue().ships(), &[LEGION]);

    run_until(&mut port, 4);
    assert!(port.movements().is_empty());
    assert_eq!(port.ship_queue().ships(), &[LEGION, ORE]);
}

// ============================================================================
// Docking
// ============================================================================

#[test]
fn test_ship_docks_on_tenth_minute() {
    let mut port = create_test_port();
    port.add_movement(Movement::ship(3, MovementDirection::Inbound, LEGION))
        .unwrap();

    run_until(&mut port, 9);
    assert!(port.quays().iter().all(|quay| !quay.is_occupied()));

    let result = port.elapse_one_minute();
    assert_eq!(result.minute, 10);
    assert_eq!(
        result.docked,
        Some(DockedShip {
            imo_number: LEGION,
            quay_id: 1
        })
    );
    assert_eq!(port.quays()[0].occupant(), Some(LEGION));
    assert!(port.ship_queue().is_empty());
}

#[test]
fn test_one_ship_docks_per_docking_minute() {
    let mut port = create_test_port();
    port.queue_ship(LEGION).unwrap();
    port.queue_ship(ORE).unwrap();

    run_until(&mut port, 10);
    assert_eq!(port.ship_queue().ships(), &[ORE]);

    run_until(&mut port, 20);
    assert_eq!(port.quays()[1].occupant(), Some(ORE));
    assert!(port.ship_queue().is_empty());
}

#[test]
fn test_ship_docks_at_first_fitting_quay_only() {
    let mut port = Port::new("Brisbane").unwrap();
    port.add_quay(Quay::container(1, 10)).unwrap();
    port.add_quay(Quay::container(2, 80)).unwrap();
    port.add_quay(Quay::container(3, 80)).unwrap();
    port.registries_mut()
        .register_ship(
            Ship::container_ship(LEGION, "Legion", "Sydney", NauticalFlag::Hotel, 50).unwrap(),
        )
        .unwrap();
    port.queue_ship(LEGION).unwrap();

    run_until(&mut port, 10);

    let occupants: Vec<_> = port.quays().iter().map(Quay::occupant).collect();
    assert_eq!(occupants, vec![None, Some(LEGION), None]);
}

#[test]
fn test_ship_without_fitting_quay_stays_queued() {
    let mut port = Port::new("Brisbane").unwrap();
    port.add_quay(Quay::bulk(1, 100)).unwrap();
    port.registries_mut()
        .register_ship(Ship::bulk_carrier(ORE, "Ore", "Perth", NauticalFlag::Bravo, 300).unwrap())
        .unwrap();
    port.queue_ship(ORE).unwrap();

    run_until(&mut port, 30);

    assert!(!port.quays()[0].is_occupied());
    assert_eq!(port.ship_queue().ships(), &[ORE]);
}

// ============================================================================
// Unloading
// ============================================================================

#[test]
fn test_docked_ship_unloaded_on_fifth_minute() {
    let mut port = create_test_port();
    let first = register_cargo(
        &mut port,
        Cargo::container(1, "Sydney", ContainerType::Reefer).unwrap(),
    );
    let second = register_cargo(
        &mut port,
        Cargo::container(2, "Sydney", ContainerType::Standard).unwrap(),
    );
    load_aboard(&mut port, LEGION, first);
    load_aboard(&mut port, LEGION, second);
    port.queue_ship(LEGION).unwrap();

    let result = {
        run_until(&mut port, 9);
        port.elapse_one_minute()
    };

    assert_eq!(result.cargo_unloaded, 2);
    assert_eq!(port.stored_cargo(), &[1, 2]);
    assert_eq!(
        port.registries().ships.get(LEGION).unwrap().hold().cargo_ids(),
        Vec::<u32>::new()
    );

    // Empty ships are skipped on later unloading minutes
    let result = {
        run_until(&mut port, 14);
        port.elapse_one_minute()
    };
    assert_eq!(result.cargo_unloaded, 0);
    assert_eq!(port.stored_cargo(), &[1, 2]);
}

#[test]
fn test_unload_runs_before_movements_on_tenth_minute() {
    let mut port = create_test_port();
    let box_id = register_cargo(
        &mut port,
        Cargo::container(9, "Sydney", ContainerType::OpenTop).unwrap(),
    );
    load_aboard(&mut port, LEGION, box_id);
    port.queue_ship(LEGION).unwrap();
    port.add_movement(Movement::cargo(10, MovementDirection::Outbound, vec![box_id]))
        .unwrap();

    run_until(&mut port, 9);
    let result = port.elapse_one_minute();

    assert_eq!(result.docked.map(|docked| docked.imo_number), Some(LEGION));
    assert_eq!(result.cargo_unloaded, 1);
    assert_eq!(result.movements_processed, 1);
    // Unloaded at step 3, collected by the movement at step 4
    assert!(port.stored_cargo().is_empty());
}

// ============================================================================
// Movement Processing
// ============================================================================

#[test]
fn test_outbound_cargo_removes_exact_keys() {
    let mut port = create_test_port();
    for id in [5, 7, 12, 57, 1] {
        register_cargo(
            &mut port,
            Cargo::bulk(id, "Perth", BulkCargoType::Grain, 10).unwrap(),
        );
    }
    port.add_movement(Movement::cargo(1, MovementDirection::Inbound, vec![57, 5, 12, 7, 1]))
        .unwrap();
    port.add_movement(Movement::cargo(2, MovementDirection::Outbound, vec![5, 7]))
        .unwrap();

    run_until(&mut port, 1);
    assert_eq!(port.stored_cargo(), &[57, 5, 12, 7, 1]);

    run_until(&mut port, 2);
    assert_eq!(port.stored_cargo(), &[57, 12, 1]);
}

#[test]
fn test_departing_ship_loads_compatible_cargo_and_frees_quay() {
    let mut port = create_test_port();
    let coal = register_cargo(&mut port, Cargo::bulk(1, "Perth", BulkCargoType::Coal, 200).unwrap());
    let heavy = register_cargo(&mut port, Cargo::bulk(2, "Perth", BulkCargoType::Oil, 900).unwrap());
    let elsewhere =
        register_cargo(&mut port, Cargo::bulk(3, "Darwin", BulkCargoType::Grain, 10).unwrap());
    let boxed = register_cargo(
        &mut port,
        Cargo::container(4, "Perth", ContainerType::Tanker).unwrap(),
    );

    port.add_movement(Movement::cargo(
        1,
        MovementDirection::Inbound,
        vec![heavy, elsewhere, boxed, coal],
    ))
    .unwrap();
    port.add_movement(Movement::ship(2, MovementDirection::Inbound, ORE))
        .unwrap();
    port.add_movement(Movement::ship(11, MovementDirection::Outbound, ORE))
        .unwrap();

    run_until(&mut port, 10);
    assert_eq!(port.quays()[1].occupant(), Some(ORE));

    run_until(&mut port, 11);
    assert!(!port.quays()[1].is_occupied());
    assert_eq!(
        port.registries().ships.get(ORE).unwrap().hold(),
        &ShipHold::Bulk {
            capacity_tonnes: 300,
            cargo: Some(coal)
        }
    );
    assert_eq!(port.stored_cargo(), &[heavy, elsewhere, boxed]);
}

#[test]
fn test_departing_container_ship_fills_to_capacity() {
    let mut port = Port::new("Brisbane").unwrap();
    port.registries_mut()
        .register_ship(
            Ship::container_ship(LEGION, "Legion", "Sydney", NauticalFlag::Nothing, 2).unwrap(),
        )
        .unwrap();
    for id in 1..=3 {
        register_cargo(
            &mut port,
            Cargo::container(id, "Sydney", ContainerType::Standard).unwrap(),
        );
        port.store_cargo(id).unwrap();
    }

    assert!(port.process_movement(&Movement::ship(0, MovementDirection::Outbound, LEGION)));

    assert_eq!(
        port.registries().ships.get(LEGION).unwrap().hold().cargo_ids(),
        vec![1, 2]
    );
    assert_eq!(port.stored_cargo(), &[3]);
}

#[test]
fn test_stale_movement_is_noop() {
    let mut port = create_test_port();
    run_until(&mut port, 6);

    assert!(!port.process_movement(&Movement::ship(4, MovementDirection::Inbound, LEGION)));
    assert!(port.ship_queue().is_empty());
}

#[test]
fn test_movement_with_unregistered_ship_is_ignored() {
    let mut port = create_test_port();
    port.add_evaluator_kind(EvaluatorKind::ShipFlag);

    assert!(!port.process_movement(&Movement::ship(0, MovementDirection::Inbound, 7777777)));
    assert!(!port.process_movement(&Movement::ship(0, MovementDirection::Outbound, 7777777)));

    assert!(port.ship_queue().is_empty());
    assert_eq!(Port::decode(&port.encode()).unwrap(), port);

    // The queue is not jammed by a ship that cannot be resolved
    port.queue_ship(LEGION).unwrap();
    run_until(&mut port, 10);
    assert_eq!(port.quays()[0].occupant(), Some(LEGION));
}

#[test]
fn test_movement_with_unregistered_cargo_is_ignored() {
    let mut port = create_test_port();
    let kept = register_cargo(
        &mut port,
        Cargo::container(1, "Sydney", ContainerType::Standard).unwrap(),
    );
    port.store_cargo(kept).unwrap();

    assert!(!port.process_movement(&Movement::cargo(
        0,
        MovementDirection::Inbound,
        vec![kept, 42]
    )));
    assert!(!port.process_movement(&Movement::cargo(
        0,
        MovementDirection::Outbound,
        vec![kept, 42]
    )));

    assert_eq!(port.stored_cargo(), &[kept]);
    assert_eq!(Port::decode(&port.encode()).unwrap(), port);
}

#[test]
fn test_evaluators_notified_each_tick() {
    let mut port = create_test_port();
    port.add_evaluator_kind(EvaluatorKind::QuayOccupancy);
    port.queue_ship(LEGION).unwrap();

    run_until(&mut port, 10);

    let evaluator = port.evaluator::<QuayOccupancyEvaluator>().unwrap();
    assert_eq!(evaluator.quays_occupied(), 1);
    assert!(port.evaluators().all(|evaluator| evaluator.time() == 10));
}

#[test]
fn test_duplicate_evaluator_kind_ignored() {
    let mut port = create_test_port();

    assert!(port.add_evaluator_kind(EvaluatorKind::ShipThroughput));
    assert!(!port.add_evaluator_kind(EvaluatorKind::ShipThroughput));
    assert_eq!(port.evaluator_kinds(), vec![EvaluatorKind::ShipThroughput]);
}
