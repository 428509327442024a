//! The due-activity driver: selects settled work in start order, invokes
//! the type-specific handler, and contains every per-record failure so
//! one broken activity never halts the batch.

use crate::model::{ActivityStatus, SimTimestamp, World};

use super::context::EngineContext;
use super::handlers;
use super::narrative::{NarrativeRequest, NarrativeTarget};

/// Move `Created` activities whose start has passed (but whose end has
/// not) to `InProgress`. Returns how many were advanced.
pub fn advance_started(world: &mut World, now: SimTimestamp) -> u32 {
    let mut advanced = 0;
    for id in world.startable_activities(now) {
        match world.set_activity_status(id, ActivityStatus::InProgress) {
            Ok(()) => advanced += 1,
            Err(err) => tracing::warn!("activity {id} could not start: {err}"),
        }
    }
    advanced
}

/// Settle every activity whose end time has passed, in ascending start
/// order. Returns how many reached a terminal status this call.
///
/// Replaying the same window is harmless: a handler only runs while the
/// status is non-terminal, and every outcome is terminal.
pub fn process_due_activities(
    world: &mut World,
    ctx: &mut EngineContext,
    now: SimTimestamp,
) -> u32 {
    let mut settled = 0;
    for id in world.due_activities(now) {
        let activity = match world.activity(id) {
            Some(a) => a.clone(),
            None => continue,
        };
        if activity.status.is_terminal() {
            continue;
        }

        let (status, notes, narrative) = match handlers::execute(world, ctx, &activity) {
            Ok(outcome) => (outcome.status, outcome.notes, outcome.narrative),
            Err(err) if err.is_recoverable() => {
                (ActivityStatus::Failed, vec![err.to_string()], None)
            }
            Err(err) => {
                tracing::warn!(
                    "activity {id} ({}) errored: {err}",
                    activity.kind.label()
                );
                (ActivityStatus::Error, vec![err.to_string()], None)
            }
        };

        if let Some(stored) = world.activity_mut(id) {
            for note in notes {
                stored.push_note(note);
            }
        }
        if let Err(err) = world.set_activity_status(id, status) {
            // The handler already ran; a write-back refusal here is a
            // store-level fault, not a reason to stop the batch.
            tracing::warn!("activity {id} status write-back failed: {err}");
            continue;
        }
        settled += 1;

        if status == ActivityStatus::Processed
            && let Some(queue) = ctx.narrative
            && let Some(context) = narrative
        {
            queue.enqueue(NarrativeRequest {
                target: NarrativeTarget::Activity(id),
                actor: activity.citizen,
                context,
            });
        }
    }
    settled
}
