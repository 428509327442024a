//! Chain construction: turn one logical intent into an ordered, timed
//! sequence of activities, persisted all-or-nothing.
//!
//! Each step's start equals its predecessor's end, so the driver's
//! ascending-start ordering settles a chain in causal order. Zero-distance
//! hops emit no travel activity; a built chain always contains at least
//! one action step.

use crate::error::EngineError;
use crate::model::{Activity, ActivityKind, ActivityStatus, Position, ResourceAmount, SimTimestamp, World};

use super::context::EngineContext;
use super::travel::estimate_or_default;

/// Fixed durations for action hops; travel hops take their duration from
/// the estimator.
pub const PICKUP_TASK_SECONDS: u32 = 300;
pub const DELIVER_TASK_SECONDS: u32 = 300;
pub const MESSAGE_TASK_SECONDS: u32 = 60;

/// Hops shorter than this emit no travel activity.
pub const MIN_TRAVEL_DISTANCE: f64 = 1e-6;

/// Fetch `amount` of a resource from a source building (typically a
/// moored galley) and deliver it to a destination building.
#[derive(Debug, Clone)]
pub struct DeliveryIntent {
    pub citizen: u64,
    pub resource: String,
    pub amount: f64,
    pub source: u64,
    pub destination: u64,
    pub contract: Option<u64>,
    /// Ambient pickup taken from the actor's home as the first hop
    /// starts, when household policy asks for it.
    pub pantry_pickup: Option<ResourceAmount>,
}

/// Travel to a construction site and put in a work session.
#[derive(Debug, Clone)]
pub struct ConstructionIntent {
    pub citizen: u64,
    pub site: u64,
    pub work_minutes: u32,
    pub contract: Option<u64>,
}

/// Travel to a recipient and deliver a message.
#[derive(Debug, Clone)]
pub struct MessageIntent {
    pub sender: u64,
    pub recipient: u64,
    pub body: String,
}

fn blank_activity(citizen: u64, kind: ActivityKind, start: SimTimestamp, end: SimTimestamp) -> Activity {
    Activity {
        id: 0,
        citizen,
        kind,
        from_building: None,
        to_building: None,
        path: Vec::new(),
        start,
        end,
        status: ActivityStatus::Created,
        contract: None,
        carried: Vec::new(),
        notes: Vec::new(),
    }
}

/// Emit a travel step unless the hop is effectively zero-distance.
/// Returns the updated cursor either way.
#[allow(clippy::too_many_arguments)]
fn push_travel(
    steps: &mut Vec<Activity>,
    ctx: &EngineContext,
    citizen: u64,
    from_pos: Position,
    to_pos: Position,
    from_building: Option<u64>,
    to_building: Option<u64>,
    pantry_pickup: Option<ResourceAmount>,
    cursor: SimTimestamp,
) -> SimTimestamp {
    if from_pos.distance_to(&to_pos) < MIN_TRAVEL_DISTANCE {
        return cursor;
    }
    let estimate = estimate_or_default(ctx.estimator, from_pos, to_pos);
    let end = cursor.plus_seconds(estimate.duration_seconds);
    let mut step = blank_activity(
        citizen,
        ActivityKind::GotoLocation { pantry_pickup },
        cursor,
        end,
    );
    step.from_building = from_building;
    step.to_building = to_building;
    step.path = estimate.path;
    steps.push(step);
    end
}

fn require_citizen(world: &World, id: u64) -> Result<Position, EngineError> {
    world
        .citizen(id)
        .map(|c| c.position)
        .ok_or_else(|| EngineError::validation(format!("citizen {id} does not exist")))
}

fn require_building(world: &World, id: u64) -> Result<Position, EngineError> {
    world
        .building(id)
        .map(|b| b.position)
        .ok_or_else(|| EngineError::validation(format!("building {id} does not exist")))
}

/// Build and persist a fetch-and-deliver chain starting at `now`.
/// Returns the persisted activity ids in execution order.
pub fn build_delivery_chain(
    world: &mut World,
    ctx: &EngineContext,
    intent: &DeliveryIntent,
    now: SimTimestamp,
) -> Result<Vec<u64>, EngineError> {
    if intent.amount <= 0.0 {
        return Err(EngineError::validation(format!(
            "delivery amount must be positive, got {}",
            intent.amount
        )));
    }
    let actor_pos = require_citizen(world, intent.citizen)?;
    let source_pos = require_building(world, intent.source)?;
    let dest_pos = require_building(world, intent.destination)?;
    let home = world.citizen(intent.citizen).and_then(|c| c.home);

    let mut steps = Vec::new();
    let mut cursor = now;

    cursor = push_travel(
        &mut steps,
        ctx,
        intent.citizen,
        actor_pos,
        source_pos,
        home,
        Some(intent.source),
        intent.pantry_pickup.clone(),
        cursor,
    );

    let pickup_end = cursor.plus_seconds(PICKUP_TASK_SECONDS);
    let mut pickup = blank_activity(
        intent.citizen,
        ActivityKind::PickupFromGalley {
            resource: intent.resource.clone(),
            amount: intent.amount,
        },
        cursor,
        pickup_end,
    );
    pickup.from_building = Some(intent.source);
    pickup.to_building = Some(intent.source);
    pickup.contract = intent.contract;
    steps.push(pickup);
    cursor = pickup_end;

    cursor = push_travel(
        &mut steps,
        ctx,
        intent.citizen,
        source_pos,
        dest_pos,
        Some(intent.source),
        Some(intent.destination),
        None,
        cursor,
    );

    let deliver_end = cursor.plus_seconds(DELIVER_TASK_SECONDS);
    let mut deliver = blank_activity(
        intent.citizen,
        ActivityKind::DeliverToBuyer {
            resource: intent.resource.clone(),
            amount: intent.amount,
        },
        cursor,
        deliver_end,
    );
    deliver.from_building = Some(intent.destination);
    deliver.to_building = Some(intent.destination);
    deliver.contract = intent.contract;
    steps.push(deliver);

    world.insert_activities(steps)
}

/// Build and persist a travel-and-work construction chain.
pub fn build_construction_chain(
    world: &mut World,
    ctx: &EngineContext,
    intent: &ConstructionIntent,
    now: SimTimestamp,
) -> Result<Vec<u64>, EngineError> {
    if intent.work_minutes == 0 {
        return Err(EngineError::validation(
            "construction work session must be positive",
        ));
    }
    let actor_pos = require_citizen(world, intent.citizen)?;
    let site_pos = require_building(world, intent.site)?;

    let mut steps = Vec::new();
    let mut cursor = now;

    cursor = push_travel(
        &mut steps,
        ctx,
        intent.citizen,
        actor_pos,
        site_pos,
        None,
        Some(intent.site),
        None,
        cursor,
    );

    let work_end = cursor.plus_minutes(intent.work_minutes);
    let mut work = blank_activity(
        intent.citizen,
        ActivityKind::ConstructBuilding {
            work_minutes: intent.work_minutes,
        },
        cursor,
        work_end,
    );
    work.from_building = Some(intent.site);
    work.to_building = Some(intent.site);
    work.contract = intent.contract;
    steps.push(work);

    world.insert_activities(steps)
}

/// Build and persist a travel-and-deliver message chain.
pub fn build_message_chain(
    world: &mut World,
    ctx: &EngineContext,
    intent: &MessageIntent,
    now: SimTimestamp,
) -> Result<Vec<u64>, EngineError> {
    let sender_pos = require_citizen(world, intent.sender)?;
    let recipient_pos = require_citizen(world, intent.recipient)?;
    if intent.sender == intent.recipient {
        return Err(EngineError::validation(
            "a citizen cannot send a message to themselves",
        ));
    }

    let mut steps = Vec::new();
    let mut cursor = now;

    // No destination building: the hop ends where the recipient stands,
    // which the path's last waypoint carries.
    cursor = push_travel(
        &mut steps,
        ctx,
        intent.sender,
        sender_pos,
        recipient_pos,
        None,
        None,
        None,
        cursor,
    );

    let message_end = cursor.plus_seconds(MESSAGE_TASK_SECONDS);
    let message = blank_activity(
        intent.sender,
        ActivityKind::SendMessage {
            recipient: intent.recipient,
            body: intent.body.clone(),
        },
        cursor,
        message_end,
    );
    steps.push(message);

    world.insert_activities(steps)
}
