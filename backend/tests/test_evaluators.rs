//! Statistics Evaluator Tests
//!
//! Evaluators are driven through a running port so they observe movements
//! the way the tick loop delivers them.

use port_simulator_core_rs::evaluators::{
    create_evaluator, CargoDecompositionEvaluator, EvaluatorKind, QuayOccupancyEvaluator,
    ShipFlagEvaluator, ShipThroughputEvaluator,
};
use port_simulator_core_rs::models::cargo::{BulkCargoType, Cargo, ContainerType};
use port_simulator_core_rs::models::movement::{Movement, MovementDirection};
use port_simulator_core_rs::models::quay::Quay;
use port_simulator_core_rs::models::ship::{NauticalFlag, Ship};
use port_simulator_core_rs::Port;
use std::collections::BTreeMap;

// ============================================================================
// Test Helpers
// ============================================================================

fn port_with_ships() -> Port {
    let mut port = Port::new("Brisbane").unwrap();
    port.add_quay(Quay::container(1, 100)).unwrap();
    port.add_quay(Quay::bulk(2, 500)).unwrap();

    let registries = port.registries_mut();
    for (imo, origin) in [(1111111, "Sydney"), (2222222, "Sydney"), (3333333, "Perth")] {
        registries
            .register_ship(
                Ship::container_ship(imo, format!("Box{}", imo), origin, NauticalFlag::Nothing, 10)
                    .unwrap(),
            )
            .unwrap();
    }
    port
}

fn run_until(port: &mut Port, minute: u64) {
    while port.time() < minute {
        port.elapse_one_minute();
    }
}

// ============================================================================
// Factory
// ============================================================================

#[test]
fn test_factory_builds_every_kind() {
    for kind in EvaluatorKind::ALL {
        let evaluator = create_evaluator(kind, &[]);
        assert_eq!(evaluator.kind(), kind);
        assert_eq!(evaluator.time(), 0);
    }
}

#[test]
fn test_kind_names_parse_back() {
    for kind in EvaluatorKind::ALL {
        assert_eq!(kind.name().parse::<EvaluatorKind>().unwrap(), kind);
    }
    assert!("ShipEvaluator".parse::<EvaluatorKind>().is_err());
}

// ============================================================================
// ShipFlagEvaluator
// ============================================================================

#[test]
fn test_ship_flag_counts_inbound_ships_by_origin() {
    let mut port = port_with_ships();
    port.add_evaluator_kind(EvaluatorKind::ShipFlag);
    port.add_movement(Movement::ship(1, MovementDirection::Inbound, 1111111))
        .unwrap();
    port.add_movement(Movement::ship(2, MovementDirection::Inbound, 2222222))
        .unwrap();
    port.add_movement(Movement::ship(3, MovementDirection::Inbound, 3333333))
        .unwrap();
    port.add_movement(Movement::ship(4, MovementDirection::Outbound, 3333333))
        .unwrap();

    run_until(&mut port, 4);

    let evaluator = port.evaluator::<ShipFlagEvaluator>().unwrap();
    let expected: BTreeMap<String, u32> =
        [("Sydney".to_string(), 2), ("Perth".to_string(), 1)].into_iter().collect();
    assert_eq!(evaluator.flag_distribution(), &expected);
    assert_eq!(evaluator.flag_statistics("Sydney"), 2);
    assert_eq!(evaluator.flag_statistics("Darwin"), 0);
}

// ============================================================================
// QuayOccupancyEvaluator
// ============================================================================

#[test]
fn test_quay_occupancy_tracks_dock_and_departure() {
    let mut port = port_with_ships();
    port.add_evaluator_kind(EvaluatorKind::QuayOccupancy);
    port.queue_ship(1111111).unwrap();
    port.add_movement(Movement::ship(12, MovementDirection::Outbound, 1111111))
        .unwrap();

    run_until(&mut port, 10);
    assert_eq!(
        port.evaluator::<QuayOccupancyEvaluator>().unwrap().quays_occupied(),
        1
    );

    run_until(&mut port, 12);
    assert_eq!(
        port.evaluator::<QuayOccupancyEvaluator>().unwrap().quays_occupied(),
        0
    );
}

#[test]
fn test_quay_occupancy_counts_quays_added_later() {
    let mut port = port_with_ships();
    port.add_evaluator_kind(EvaluatorKind::QuayOccupancy);

    let mut docked = Quay::container(3, 100);
    docked.occupy(3333333);
    port.add_quay(docked).unwrap();

    assert_eq!(
        port.evaluator::<QuayOccupancyEvaluator>().unwrap().quays_occupied(),
        1
    );
}

#[test]
fn test_quay_occupancy_seeded_from_quays() {
    let mut docked = Quay::bulk(1, 100);
    docked.occupy(1234567);
    let quays = [docked, Quay::bulk(2, 100)];

    assert_eq!(QuayOccupancyEvaluator::new(&quays).quays_occupied(), 1);
}

// ============================================================================
// ShipThroughputEvaluator
// ============================================================================

#[test]
fn test_throughput_window_expires_after_an_hour() {
    let mut port = port_with_ships();
    port.add_evaluator_kind(EvaluatorKind::ShipThroughput);
    port.add_movement(Movement::ship(11, MovementDirection::Outbound, 1111111))
        .unwrap();
    port.add_movement(Movement::ship(11, MovementDirection::Outbound, 2222222))
        .unwrap();
    port.add_movement(Movement::ship(30, MovementDirection::Outbound, 3333333))
        .unwrap();

    let throughput =
        |port: &Port| port.evaluator::<ShipThroughputEvaluator>().unwrap().throughput_per_hour();

    run_until(&mut port, 11);
    // Same-minute departures are both counted
    assert_eq!(throughput(&port), 2);

    run_until(&mut port, 69);
    assert_eq!(throughput(&port), 3);

    run_until(&mut port, 70);
    assert_eq!(throughput(&port), 1);

    run_until(&mut port, 89);
    assert_eq!(throughput(&port), 0);
}

// ============================================================================
// CargoDecompositionEvaluator
// ============================================================================

#[test]
fn test_cargo_decomposition_counts_outbound_cargo() {
    let mut port = port_with_ships();
    port.add_evaluator_kind(EvaluatorKind::CargoDecomposition);
    let registries = port.registries_mut();
    registries
        .register_cargo(Cargo::container(1, "Sydney", ContainerType::Reefer).unwrap())
        .unwrap();
    registries
        .register_cargo(Cargo::container(2, "Sydney", ContainerType::Reefer).unwrap())
        .unwrap();
    registries
        .register_cargo(Cargo::bulk(3, "Perth", BulkCargoType::Coal, 50).unwrap())
        .unwrap();
    registries
        .register_cargo(Cargo::container(4, "Darwin", ContainerType::FlatRack).unwrap())
        .unwrap();

    port.add_movement(Movement::cargo(1, MovementDirection::Inbound, vec![1, 2, 3, 4]))
        .unwrap();
    // Loads both Sydney containers before the evaluator sees the departure
    port.add_movement(Movement::ship(2, MovementDirection::Outbound, 1111111))
        .unwrap();
    port.add_movement(Movement::cargo(3, MovementDirection::Outbound, vec![3]))
        .unwrap();

    run_until(&mut port, 3);

    let evaluator = port.evaluator::<CargoDecompositionEvaluator>().unwrap();
    assert_eq!(evaluator.container_distribution().get(&ContainerType::Reefer), Some(&2));
    assert_eq!(evaluator.container_distribution().get(&ContainerType::FlatRack), None);
    assert_eq!(evaluator.bulk_cargo_distribution().get(&BulkCargoType::Coal), Some(&1));
    assert_eq!(evaluator.cargo_distribution().get("REEFER"), Some(&2));
    assert_eq!(evaluator.cargo_distribution().get("COAL"), Some(&1));
    assert_eq!(port.stored_cargo(), &[4]);
}
