//! Reputation boost: one reputation event per day, raising a sampled
//! audience's trust toward the target.

use rand::rngs::SmallRng;
use rand::seq::index;

use crate::error::EngineError;
use crate::model::{StratagemKind, World};

/// Citizens reached by one day's event.
const AUDIENCE_SIZE: usize = 5;
/// Trust gained by each audience member toward the target, before the
/// variant factor.
const TRUST_DELTA: f64 = 0.05;

pub(super) fn apply_daily(
    world: &mut World,
    stratagem_id: u64,
    rng: &mut SmallRng,
) -> Result<(), EngineError> {
    let stratagem = world
        .stratagem(stratagem_id)
        .ok_or_else(|| EngineError::Store(format!("stratagem {stratagem_id} not found")))?;
    let StratagemKind::ReputationBoost { target } = stratagem.kind else {
        return Err(EngineError::invariant("reputation tick on wrong kind"));
    };
    let sponsor = stratagem.executed_by;
    let scale = stratagem.variant.cost_factor();

    // Candidate audience: everyone but the target and the sponsor, in
    // stable id order so the sampled set depends only on the rng.
    let candidates: Vec<u64> = world
        .citizens
        .keys()
        .copied()
        .filter(|&id| id != target && id != sponsor)
        .collect();
    if candidates.is_empty() {
        return Ok(());
    }

    let sample_size = AUDIENCE_SIZE.min(candidates.len());
    let chosen = index::sample(rng, candidates.len(), sample_size);
    for idx in chosen.iter() {
        let citizen_id = candidates[idx];
        if let Some(citizen) = world.citizen_mut(citizen_id) {
            citizen.adjust_trust(target, TRUST_DELTA * scale);
        }
    }
    Ok(())
}
