//! Type-specific activity processors. Each handler performs its side
//! effect against the world and reports an outcome; the dispatch loop
//! owns status write-back and error containment.

use crate::error::EngineError;
use crate::model::{
    Activity, ActivityKind, ActivityStatus, ContractKind, ContractStatus, Holder, ResourceAmount,
    World,
};

use super::context::EngineContext;
use super::ledger::{self, AMOUNT_EPSILON};
use super::notify::{Notification, NotificationKind};

/// Trust gained by a recipient toward the sender of a message.
const MESSAGE_TRUST_DELTA: f64 = 0.02;

/// What a handler concluded. `status` is always terminal: `Processed` on
/// success, `Failed` on recoverable failure with the reason in `notes`.
#[derive(Debug)]
pub(crate) struct HandlerOutcome {
    pub status: ActivityStatus,
    pub notes: Vec<String>,
    /// Prompt context for the narrative side channel, success only.
    pub narrative: Option<String>,
}

impl HandlerOutcome {
    fn processed(narrative: impl Into<String>) -> Self {
        Self {
            status: ActivityStatus::Processed,
            notes: Vec::new(),
            narrative: Some(narrative.into()),
        }
    }

    fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: ActivityStatus::Failed,
            notes: vec![reason.into()],
            narrative: None,
        }
    }

    fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

/// Dispatch on the activity kind. `activity` is the record as selected by
/// the driver; handlers mutate the stored record through `world`.
pub(crate) fn execute(
    world: &mut World,
    ctx: &mut EngineContext,
    activity: &Activity,
) -> Result<HandlerOutcome, EngineError> {
    match &activity.kind {
        ActivityKind::GotoLocation { pantry_pickup } => {
            handle_goto(world, activity, pantry_pickup.clone())
        }
        ActivityKind::PickupFromGalley { resource, amount } => {
            handle_pickup(world, activity, resource, *amount)
        }
        ActivityKind::DeliverToBuyer { resource, amount } => {
            handle_deliver(world, ctx, activity, resource, *amount)
        }
        ActivityKind::ConstructBuilding { work_minutes } => {
            handle_construct(world, ctx, activity, *work_minutes)
        }
        ActivityKind::SendMessage { recipient, body } => {
            handle_send_message(world, ctx, activity, *recipient, body)
        }
    }
}

/// If the activity is linked to a contract that has already failed, the
/// handler must not complete its transfer.
fn contract_failed(world: &World, activity: &Activity) -> bool {
    activity
        .contract
        .and_then(|id| world.contract(id))
        .is_some_and(|c| c.status == ContractStatus::Failed)
}

/// Owner of the goods this activity moves: the linked contract's buyer,
/// or the actor when the move is on their own account.
fn cargo_owner(world: &World, activity: &Activity) -> u64 {
    activity
        .contract
        .and_then(|id| world.contract(id))
        .map(|c| c.buyer)
        .unwrap_or(activity.citizen)
}

// ---------------------------------------------------------------------------
// Travel
// ---------------------------------------------------------------------------

/// Advance the actor's position. No ledger effect except the optional
/// pantry pickup taken from the origin building on the way out.
fn handle_goto(
    world: &mut World,
    activity: &Activity,
    pantry_pickup: Option<ResourceAmount>,
) -> Result<HandlerOutcome, EngineError> {
    let destination = activity
        .to_building
        .and_then(|id| world.building(id))
        .map(|b| b.position)
        .or_else(|| activity.path.last().copied());

    let mut outcome = HandlerOutcome::processed("arrived at destination");

    if let Some(pantry) = pantry_pickup
        && let Some(origin) = activity.from_building
    {
        let actor = activity.citizen;
        let at_home = ledger::available(world, Holder::Building(origin), actor, &pantry.resource);
        let take = pantry.amount.min(at_home);
        if take > AMOUNT_EPSILON {
            ledger::transfer(
                world,
                &pantry.resource,
                take,
                Holder::Building(origin),
                actor,
                Holder::Citizen(actor),
                actor,
            )?;
            outcome = outcome.with_note(format!(
                "took {take} {} from the pantry on the way out",
                pantry.resource
            ));
        }
    }

    if let Some(position) = destination {
        let citizen = world
            .citizen_mut(activity.citizen)
            .ok_or_else(|| EngineError::invariant(format!("actor {} vanished", activity.citizen)))?;
        citizen.position = position;
    }
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Pickup
// ---------------------------------------------------------------------------

/// Load cargo from the galley onto the actor. Partial availability moves
/// what exists and records the shortfall rather than failing outright;
/// the downstream deliver step settles the difference.
fn handle_pickup(
    world: &mut World,
    activity: &Activity,
    resource: &str,
    amount: f64,
) -> Result<HandlerOutcome, EngineError> {
    if contract_failed(world, activity) {
        return Ok(HandlerOutcome::failed("linked contract has failed"));
    }
    let galley = activity
        .from_building
        .ok_or_else(|| EngineError::invariant("pickup activity has no source building"))?;
    let owner = cargo_owner(world, activity);
    let actor = activity.citizen;

    let available = ledger::available(world, Holder::Building(galley), owner, resource);
    let moved = amount.min(available);
    if moved <= AMOUNT_EPSILON {
        return Ok(HandlerOutcome::failed(format!(
            "no {resource} available at galley for pickup"
        )));
    }
    ledger::transfer(
        world,
        resource,
        moved,
        Holder::Building(galley),
        owner,
        Holder::Citizen(actor),
        owner,
    )?;
    if let Some(stored) = world.activity_mut(activity.id) {
        stored.carried = vec![ResourceAmount::new(resource, moved)];
    }

    let mut outcome =
        HandlerOutcome::processed(format!("loaded {moved} {resource} from the galley"));
    if moved + AMOUNT_EPSILON < amount {
        outcome = outcome.with_note(format!(
            "picked up {moved} of {amount} {resource}; short {}",
            amount - moved
        ));
    }
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// Unload carried cargo at the destination. Ownership stays with the
/// contract's buyer (or the actor on own-account moves); the contract's
/// delivery ledger and payment settle here. Delivering less than the
/// intent amount concludes the step `Failed` with a shortfall note.
fn handle_deliver(
    world: &mut World,
    ctx: &mut EngineContext,
    activity: &Activity,
    resource: &str,
    amount: f64,
) -> Result<HandlerOutcome, EngineError> {
    if contract_failed(world, activity) {
        return Ok(HandlerOutcome::failed("linked contract has failed"));
    }
    let destination = activity
        .to_building
        .ok_or_else(|| EngineError::invariant("deliver activity has no destination building"))?;
    let owner = cargo_owner(world, activity);
    let actor = activity.citizen;

    let carried = ledger::available(world, Holder::Citizen(actor), owner, resource);
    let moved = amount.min(carried);
    if moved > AMOUNT_EPSILON {
        ledger::transfer(
            world,
            resource,
            moved,
            Holder::Citizen(actor),
            owner,
            Holder::Building(destination),
            owner,
        )?;
        settle_contract(world, activity, moved)?;
    }

    if moved + AMOUNT_EPSILON < amount {
        let buyer = owner;
        ctx.notifier.notify(Notification {
            citizen: buyer,
            kind: NotificationKind::DeliveryShortfall,
            content: format!("{moved} of {amount} {resource} delivered"),
        });
        return Ok(HandlerOutcome::failed(format!(
            "{moved} of {amount} units delivered"
        )));
    }
    Ok(HandlerOutcome::processed(format!(
        "delivered {moved} {resource}"
    )))
}

/// Advance the linked contract's delivery ledger, settle payment, and
/// move its status when the target amount is reached.
fn settle_contract(
    world: &mut World,
    activity: &Activity,
    moved: f64,
) -> Result<(), EngineError> {
    let Some(contract_id) = activity.contract else {
        return Ok(());
    };
    let (kind, status, buyer, seller, price, fulfilled) = {
        let contract = world
            .contract_mut(contract_id)
            .ok_or_else(|| EngineError::invariant(format!("contract {contract_id} vanished")))?;
        contract.delivered += moved;
        contract.push_note(format!(
            "delivered {moved} ({} of {} total)",
            contract.delivered, contract.target_amount
        ));
        (
            contract.kind,
            contract.status,
            contract.buyer,
            contract.seller,
            contract.price_per_unit,
            contract.remaining() <= AMOUNT_EPSILON,
        )
    };

    // Payment moves with the goods.
    let payment = moved * price;
    if payment > 0.0 && buyer != seller {
        if let Some(b) = world.citizen_mut(buyer) {
            b.ducats -= payment;
        }
        if let Some(s) = world.citizen_mut(seller) {
            s.ducats += payment;
        }
    }

    if fulfilled {
        let next = match kind {
            ContractKind::Construction => ContractStatus::MaterialsDelivered,
            _ => ContractStatus::Completed,
        };
        world.set_contract_status(contract_id, next)?;
    } else if kind == ContractKind::Construction && status == ContractStatus::Active {
        // First partial material delivery: the order now waits on the
        // rest of the bill.
        world.set_contract_status(contract_id, ContractStatus::PendingMaterials)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Apply a work session to a site, capped to what on-site materials
/// support: with half the bill of materials delivered, at most half the
/// total work can have been performed.
fn handle_construct(
    world: &mut World,
    ctx: &mut EngineContext,
    activity: &Activity,
    work_minutes: u32,
) -> Result<HandlerOutcome, EngineError> {
    if contract_failed(world, activity) {
        return Ok(HandlerOutcome::failed("linked contract has failed"));
    }
    let site_id = activity
        .to_building
        .or(activity.from_building)
        .ok_or_else(|| EngineError::invariant("construct activity has no site"))?;

    let (remaining, total, materials) = {
        let site = world
            .building(site_id)
            .ok_or_else(|| EngineError::invariant(format!("site {site_id} vanished")))?;
        (
            site.construction_minutes_remaining,
            site.total_construction_minutes(),
            site.construction_materials.clone(),
        )
    };
    if remaining == 0 {
        return Ok(
            HandlerOutcome::processed("site already complete").with_note("no work remaining")
        );
    }

    // Fraction of the bill of materials present on site, any owner.
    let mut fraction: f64 = 1.0;
    for material in &materials {
        if material.amount <= AMOUNT_EPSILON {
            continue;
        }
        let on_site: f64 = world
            .stacks_at(Holder::Building(site_id))
            .into_iter()
            .filter_map(|id| world.stacks.get(&id))
            .filter(|s| s.resource == material.resource)
            .map(|s| s.count)
            .sum();
        fraction = fraction.min((on_site / material.amount).min(1.0));
    }

    let supported = (fraction * total as f64).floor() as u32;
    let done = total.saturating_sub(remaining);
    let allowable = supported.saturating_sub(done);
    let applied = work_minutes.min(allowable);
    if applied == 0 {
        return Ok(HandlerOutcome::failed(
            "materials on site support no further work",
        ));
    }

    let (finished, owner) = {
        let site = world
            .building_mut(site_id)
            .ok_or_else(|| EngineError::invariant(format!("site {site_id} vanished")))?;
        site.construction_minutes_remaining -= applied;
        (site.construction_minutes_remaining == 0, site.owner)
    };

    let mut outcome = HandlerOutcome::processed(format!("worked {applied} minutes on the site"));
    if applied < work_minutes {
        outcome = outcome.with_note(format!(
            "work capped at {applied} of {work_minutes} minutes by materials on site"
        ));
    }
    if finished {
        outcome = outcome.with_note("construction complete");
        if let Some(owner) = owner {
            ctx.notifier.notify(Notification {
                citizen: owner,
                kind: NotificationKind::ConstructionCompleted,
                content: format!("construction of building {site_id} is complete"),
            });
        }
        if let Some(contract_id) = activity.contract {
            world.set_contract_status(contract_id, ContractStatus::Executed)?;
        }
    }
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

fn handle_send_message(
    world: &mut World,
    ctx: &mut EngineContext,
    activity: &Activity,
    recipient: u64,
    body: &str,
) -> Result<HandlerOutcome, EngineError> {
    let sender = activity.citizen;
    let Some(recipient_record) = world.citizen_mut(recipient) else {
        return Ok(HandlerOutcome::failed(format!(
            "recipient {recipient} does not exist"
        )));
    };
    recipient_record.adjust_trust(sender, MESSAGE_TRUST_DELTA);
    ctx.notifier.notify(Notification {
        citizen: recipient,
        kind: NotificationKind::MessageReceived,
        content: body.to_string(),
    });
    Ok(HandlerOutcome::processed("delivered a message"))
}
