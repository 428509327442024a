//! The stratagem engine: advances every long-running campaign by one
//! logical step per engine tick, with at most one day of effect per
//! simulated calendar day, suspension when funding runs dry, and an
//! exactly-once finalization at expiry.

mod monopoly;
mod reputation;
mod watch;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::error::EngineError;
use crate::model::{SimTimestamp, StratagemKind, StratagemStatus, World};

use super::context::EngineContext;
use super::narrative::{NarrativeRequest, NarrativeTarget};
use super::notify::{Notification, NotificationKind};

/// Deterministic per-effect seed from (engine seed, stratagem id, day).
/// SplitMix64-style mixing; a replayed day re-rolls nothing.
fn effect_seed(seed: u64, stratagem_id: u64, day: u32) -> u64 {
    let mut h = seed ^ stratagem_id.wrapping_mul(0x9e3779b97f4a7c15);
    h = h.wrapping_add(day as u64).wrapping_mul(0xbf58476d1ce4e5b9);
    h = (h ^ (h >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    h = (h ^ (h >> 27)).wrapping_mul(0x94d049bb133111eb);
    h ^ (h >> 31)
}

/// Tick every non-terminal stratagem. Returns how many applied an effect
/// or finalized this call. A failing stratagem is marked `Failed` and the
/// loop continues.
pub fn tick_stratagems(world: &mut World, ctx: &mut EngineContext, now: SimTimestamp) -> u32 {
    let mut ticked = 0;
    for id in world.active_stratagems() {
        match tick_one(world, ctx, id, now) {
            Ok(true) => ticked += 1,
            Ok(false) => {}
            Err(err) => {
                tracing::warn!("stratagem {id} errored: {err}");
                if let Some(stratagem) = world.stratagem_mut(id) {
                    stratagem.push_note(err.to_string());
                }
                if let Err(err) = world.set_stratagem_status(id, StratagemStatus::Failed) {
                    tracing::warn!("stratagem {id} could not be marked failed: {err}");
                }
            }
        }
    }
    ticked
}

fn tick_one(
    world: &mut World,
    ctx: &mut EngineContext,
    id: u64,
    now: SimTimestamp,
) -> Result<bool, EngineError> {
    let stratagem = world
        .stratagem(id)
        .ok_or_else(|| EngineError::Store(format!("stratagem {id} not found")))?;
    let status = stratagem.status;
    let kind = stratagem.kind.clone();
    let sponsor = stratagem.executed_by;
    let cost = stratagem.effective_daily_cost();
    let expires_at = stratagem.expires_at;
    let day = now.day();
    let already_fired = stratagem.fired_on(day);

    if now >= expires_at {
        finalize(world, ctx, id, &kind, sponsor)?;
        return Ok(true);
    }
    if already_fired {
        return Ok(false);
    }

    let affordable = world
        .citizen(sponsor)
        .map(|c| c.ducats >= cost)
        .unwrap_or(false);
    if !affordable {
        if status == StratagemStatus::Active {
            if let StratagemKind::MonopolyPricing { .. } = &kind {
                monopoly::suspend(world, id)?;
            }
            world.set_stratagem_status(id, StratagemStatus::Suspended)?;
            if let Some(stratagem) = world.stratagem_mut(id) {
                stratagem.push_note(format!("suspended on day {day}: daily cost unaffordable"));
            }
            ctx.notifier.notify(Notification {
                citizen: sponsor,
                kind: NotificationKind::StratagemSuspended,
                content: format!("your {} campaign is suspended for lack of funds", kind.label()),
            });
        }
        return Ok(false);
    }
    if status == StratagemStatus::Suspended {
        world.set_stratagem_status(id, StratagemStatus::Active)?;
        if let Some(stratagem) = world.stratagem_mut(id) {
            stratagem.push_note(format!("resumed on day {day}"));
        }
    }

    // Deduct the day's cost before the effect; a failing effect still
    // consumed the sponsor's money for the day.
    if let Some(citizen) = world.citizen_mut(sponsor) {
        citizen.ducats -= cost;
    }
    if let Some(stratagem) = world.stratagem_mut(id) {
        stratagem.progress.spent += cost;
    }

    let mut rng = SmallRng::seed_from_u64(effect_seed(ctx.config.seed, id, day));
    match &kind {
        StratagemKind::MonopolyPricing { .. } => monopoly::apply_daily(world, id)?,
        StratagemKind::ReputationBoost { .. } => reputation::apply_daily(world, id, &mut rng)?,
        StratagemKind::NeighborhoodWatch { .. } => watch::apply_daily(world, ctx, id, &mut rng)?,
    }

    let stratagem = world
        .stratagem_mut(id)
        .ok_or_else(|| EngineError::invariant(format!("stratagem {id} vanished mid-tick")))?;
    stratagem.progress.last_event_day = Some(day);
    stratagem.progress.events_fired += 1;
    Ok(true)
}

/// Reverse any perturbed state, mark the campaign completed, and send the
/// completion notification. Callers only reach this for non-terminal
/// stratagems, and `set_stratagem_status` refuses a second finalization,
/// so the notification fires at most once.
fn finalize(
    world: &mut World,
    ctx: &mut EngineContext,
    id: u64,
    kind: &StratagemKind,
    sponsor: u64,
) -> Result<(), EngineError> {
    if let StratagemKind::MonopolyPricing { .. } = kind {
        monopoly::finalize(world, id)?;
    }
    world.set_stratagem_status(id, StratagemStatus::Completed)?;
    if let Some(stratagem) = world.stratagem_mut(id) {
        stratagem.push_note("campaign expired and was finalized");
    }
    ctx.notifier.notify(Notification {
        citizen: sponsor,
        kind: NotificationKind::StratagemCompleted,
        content: format!("your {} campaign has run its course", kind.label()),
    });
    if let Some(queue) = ctx.narrative {
        queue.enqueue(NarrativeRequest {
            target: NarrativeTarget::Stratagem(id),
            actor: sponsor,
            context: format!("concluded a {} campaign", kind.label()),
        });
    }
    Ok(())
}
