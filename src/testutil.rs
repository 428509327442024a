//! Shared fixtures and cycle helpers for unit and integration tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::EngineError;
use crate::model::*;
use crate::sim::narrative::NarrativeService;
use crate::sim::{
    DeliveryIntent, Engine, EngineConfig, MemorySink, Notification, NotificationKind,
    StraightLineEstimator, ledger,
};

// ---------------------------------------------------------------------------
// Engine construction
// ---------------------------------------------------------------------------

/// Engine with the straight-line estimator and a memory sink. Returns the
/// engine plus a handle to everything it notifies.
pub fn test_engine(seed: u64) -> (Engine, Rc<RefCell<Vec<Notification>>>) {
    let sink = MemorySink::new();
    let handle = sink.handle();
    let engine = Engine::new(
        EngineConfig::new(seed),
        Box::new(StraightLineEstimator::default()),
        Box::new(sink),
    );
    (engine, handle)
}

/// Cycle at a fixed cadence until every activity is terminal. Returns the
/// time of the last cycle run. Panics past `max_cycles` so a stuck chain
/// fails the test instead of spinning.
pub fn settle_all_activities(
    engine: &mut Engine,
    world: &mut World,
    from: SimTimestamp,
    step_seconds: u32,
    max_cycles: u32,
) -> SimTimestamp {
    let mut now = from;
    for _ in 0..max_cycles {
        engine.run_cycle(world, now);
        let open = world
            .activities
            .values()
            .any(|a| !a.status.is_terminal());
        if !open {
            return now;
        }
        now = now.plus_seconds(step_seconds);
    }
    panic!("activities did not settle within {max_cycles} cycles");
}

// ---------------------------------------------------------------------------
// World fixtures
// ---------------------------------------------------------------------------

/// Citizen at a position with a ducat balance.
pub fn citizen_at(world: &mut World, name: &str, ducats: f64, lat: f64, lng: f64) -> u64 {
    world.add_citizen(name, ducats, Position::new(lat, lng))
}

/// Give a citizen a home building and move them there.
pub fn house_citizen(world: &mut World, citizen: u64, name: &str, lat: f64, lng: f64) -> u64 {
    let home = world.add_building(name, Position::new(lat, lng), false);
    if let Some(c) = world.citizen_mut(citizen) {
        c.home = Some(home);
        c.position = Position::new(lat, lng);
    }
    home
}

/// Moored galley holding `amount` of `resource` owned by `owner`.
pub fn galley_with_cargo(
    world: &mut World,
    lat: f64,
    lng: f64,
    owner: u64,
    resource: &str,
    amount: f64,
) -> u64 {
    let galley = world.add_building("Galley", Position::new(lat, lng), true);
    grant(world, Holder::Building(galley), owner, resource, amount);
    galley
}

/// Deposit stock directly through the ledger.
pub fn grant(world: &mut World, holder: Holder, owner: u64, resource: &str, amount: f64) {
    ledger::increment(world, holder, owner, resource, amount).expect("fixture deposit failed");
}

/// Active public sell contract for a resource.
pub fn sell_contract(
    world: &mut World,
    buyer: u64,
    seller: u64,
    resource: &str,
    price_per_unit: f64,
    target_amount: f64,
) -> u64 {
    world.add_contract(
        ContractKind::PublicSell,
        buyer,
        seller,
        Some(resource.to_string()),
        price_per_unit,
        target_amount,
    )
}

/// An import contract plus a delivery intent bound to it: citizen fetches
/// from a galley and delivers to a warehouse.
pub struct DeliveryFixture {
    pub citizen: u64,
    pub galley: u64,
    pub warehouse: u64,
    pub contract: u64,
    pub intent: DeliveryIntent,
}

/// Standard delivery scene: buyer owns cargo sitting on a galley, a porter
/// hauls `amount` to the buyer's warehouse under an import contract.
pub fn delivery_fixture(world: &mut World, resource: &str, on_galley: f64, amount: f64) -> DeliveryFixture {
    let buyer = citizen_at(world, "Buyer", 1000.0, 0.0, 0.0);
    let porter = citizen_at(world, "Porter", 50.0, 0.0, 0.0);
    let galley = galley_with_cargo(world, 0.3, 0.0, buyer, resource, on_galley);
    let warehouse = world.add_building("Warehouse", Position::new(0.6, 0.0), false);
    let contract = world.add_contract(
        ContractKind::Import,
        buyer,
        porter,
        Some(resource.to_string()),
        2.0,
        amount,
    );
    DeliveryFixture {
        citizen: porter,
        galley,
        warehouse,
        contract,
        intent: DeliveryIntent {
            citizen: porter,
            resource: resource.to_string(),
            amount,
            source: galley,
            destination: warehouse,
            contract: Some(contract),
            pantry_pickup: None,
        },
    }
}

// ---------------------------------------------------------------------------
// Query helpers
// ---------------------------------------------------------------------------

/// Status of an activity that must exist.
pub fn status_of(world: &World, id: u64) -> ActivityStatus {
    world.activity(id).map(|a| a.status).expect("activity exists")
}

/// Notes of an activity that must exist.
pub fn notes_of(world: &World, id: u64) -> Vec<String> {
    world
        .activity(id)
        .map(|a| a.notes.clone())
        .expect("activity exists")
}

/// Ducat balance of a citizen that must exist.
pub fn ducats_of(world: &World, id: u64) -> f64 {
    world.citizen(id).map(|c| c.ducats).expect("citizen exists")
}

/// Stock available at a holder for an owner.
pub fn stock(world: &World, holder: Holder, owner: u64, resource: &str) -> f64 {
    ledger::available(world, holder, owner, resource)
}

/// Notifications of one kind, in send order.
pub fn sent_of_kind(
    handle: &Rc<RefCell<Vec<Notification>>>,
    kind: NotificationKind,
) -> Vec<Notification> {
    handle
        .borrow()
        .iter()
        .filter(|n| n.kind == kind)
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Narrative stubs
// ---------------------------------------------------------------------------

/// Deterministic narrative service for queue tests.
pub struct EchoNarrative;

impl NarrativeService for EchoNarrative {
    fn reflect(&self, actor: u64, context: &str) -> Result<String, EngineError> {
        Ok(format!("citizen {actor} reflects: {context}"))
    }
}
