use ducat_sim::model::*;
use ducat_sim::testutil;

/// Deterministic world for flush and archive round-trips:
/// 2 citizens, 3 buildings, 2 stacks, 1 contract, 3 activities, 1 stratagem.
pub fn build_test_world() -> World {
    let mut world = World::new();
    world.current_time = SimTimestamp::from_day(1);

    let marco = world.add_citizen("Marco", 1000.0, Position::new(0.0, 0.0));
    let piera = world.add_citizen("Piera", 50.0, Position::new(0.1, 0.0));
    let home = testutil::house_citizen(&mut world, piera, "Piera's House", 0.1, 0.0);
    let galley = world.add_building("Galley", Position::new(0.4, 0.0), true);
    let warehouse = world.add_building("Warehouse", Position::new(0.7, 0.0), false);

    testutil::grant(
        &mut world,
        Holder::Building(galley),
        marco,
        "grain",
        80.0,
    );
    testutil::grant(&mut world, Holder::Building(home), piera, "bread", 3.0);

    let contract = world.add_contract(
        ContractKind::Import,
        marco,
        piera,
        Some("grain".to_string()),
        2.0,
        50.0,
    );

    let t0 = SimTimestamp::from_day(2);
    let activity = |kind, start: SimTimestamp, end: SimTimestamp| Activity {
        id: 0,
        citizen: piera,
        kind,
        from_building: Some(galley),
        to_building: Some(warehouse),
        path: vec![Position::new(0.4, 0.0), Position::new(0.7, 0.0)],
        start,
        end,
        status: ActivityStatus::Created,
        contract: Some(contract),
        carried: Vec::new(),
        notes: Vec::new(),
    };
    world
        .insert_activities(vec![
            activity(
                ActivityKind::GotoLocation {
                    pantry_pickup: Some(ResourceAmount::new("bread", 1.0)),
                },
                t0,
                t0.plus_minutes(5),
            ),
            activity(
                ActivityKind::PickupFromGalley {
                    resource: "grain".to_string(),
                    amount: 50.0,
                },
                t0.plus_minutes(5),
                t0.plus_minutes(10),
            ),
            activity(
                ActivityKind::DeliverToBuyer {
                    resource: "grain".to_string(),
                    amount: 50.0,
                },
                t0.plus_minutes(10),
                t0.plus_minutes(15),
            ),
        ])
        .unwrap();

    world.add_stratagem(
        StratagemKind::MonopolyPricing {
            resource: "grain".to_string(),
            price_multiplier: 2.0,
        },
        marco,
        StratagemVariant::Standard,
        SimTimestamp::from_day(10),
        25.0,
    );

    world
}

#[allow(dead_code)]
pub fn read_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
