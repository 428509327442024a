//! Neighborhood watch: one crime-prevention attempt per day in a
//! district, lowering crime pressure on its buildings when the patrol
//! succeeds.

use rand::Rng;
use rand::rngs::SmallRng;

use crate::error::EngineError;
use crate::model::{StratagemKind, World};

use crate::sim::context::EngineContext;
use crate::sim::notify::{Notification, NotificationKind};

/// Chance a day's patrol deters anything at all.
const PATROL_SUCCESS_CHANCE: f64 = 0.7;
/// Crime pressure removed from each building on a successful patrol,
/// before the variant factor.
const CRIME_REDUCTION: f64 = 0.1;

pub(super) fn apply_daily(
    world: &mut World,
    ctx: &mut EngineContext,
    stratagem_id: u64,
    rng: &mut SmallRng,
) -> Result<(), EngineError> {
    let stratagem = world
        .stratagem(stratagem_id)
        .ok_or_else(|| EngineError::Store(format!("stratagem {stratagem_id} not found")))?;
    let StratagemKind::NeighborhoodWatch { district } = stratagem.kind.clone() else {
        return Err(EngineError::invariant("watch tick on wrong kind"));
    };
    let scale = stratagem.variant.cost_factor();

    if !rng.random_bool(PATROL_SUCCESS_CHANCE) {
        if let Some(stratagem) = world.stratagem_mut(stratagem_id) {
            stratagem.push_note(format!("patrol of {district} found nothing"));
        }
        return Ok(());
    }

    for building_id in world.buildings_in_district(&district) {
        if let Some(building) = world.building_mut(building_id) {
            building.crime_pressure = (building.crime_pressure - CRIME_REDUCTION * scale).max(0.0);
        }
    }
    let residents: Vec<u64> = world
        .citizens
        .values()
        .filter(|c| c.district.as_deref() == Some(district.as_str()))
        .map(|c| c.id)
        .collect();
    for citizen in residents {
        ctx.notifier.notify(Notification {
            citizen,
            kind: NotificationKind::CrimePrevented,
            content: format!("the watch deterred crime in {district}"),
        });
    }
    if let Some(stratagem) = world.stratagem_mut(stratagem_id) {
        stratagem.push_note(format!("patrol of {district} deterred crime"));
    }
    Ok(())
}
