//! Monopoly pricing: multiply the sponsor's active sell prices for one
//! resource, remembering each contract's original price so the campaign
//! can be reversed losslessly at expiry.

use crate::error::EngineError;
use crate::model::{ContractStatus, StratagemKind, World};

/// Raise the sponsor's sell prices to `baseline * multiplier`. Prices are
/// always recomputed from the stored baseline, never compounded, so a
/// second application on the same contract is a no-op. Contracts listed
/// after the campaign began are baselined on their first sighting.
pub(super) fn apply_daily(world: &mut World, stratagem_id: u64) -> Result<(), EngineError> {
    let stratagem = world
        .stratagem(stratagem_id)
        .ok_or_else(|| EngineError::Store(format!("stratagem {stratagem_id} not found")))?;
    let StratagemKind::MonopolyPricing {
        resource,
        price_multiplier,
    } = stratagem.kind.clone()
    else {
        return Err(EngineError::invariant("monopoly tick on wrong kind"));
    };
    let sponsor = stratagem.executed_by;

    let contract_ids = world.sell_contracts_of(sponsor, &resource);
    let mut new_baselines = Vec::new();
    for contract_id in &contract_ids {
        let known = world
            .stratagem(stratagem_id)
            .is_some_and(|s| s.progress.baseline.contains_key(contract_id));
        if !known
            && let Some(contract) = world.contract(*contract_id)
        {
            new_baselines.push((*contract_id, contract.price_per_unit));
        }
    }
    if !new_baselines.is_empty()
        && let Some(stratagem) = world.stratagem_mut(stratagem_id)
    {
        for (contract_id, price) in &new_baselines {
            stratagem.progress.baseline.insert(*contract_id, *price);
            stratagem.push_note(format!(
                "original_price for contract {contract_id}: {price}"
            ));
        }
    }

    let baseline = world
        .stratagem(stratagem_id)
        .map(|s| s.progress.baseline.clone())
        .unwrap_or_default();
    for contract_id in contract_ids {
        let Some(original) = baseline.get(&contract_id) else {
            continue;
        };
        if let Some(contract) = world.contract_mut(contract_id) {
            contract.price_per_unit = original * price_multiplier;
        }
    }
    Ok(())
}

/// Put every baselined price back to its recorded original while the
/// campaign is not being paid for. The baseline map survives so a
/// resumed campaign re-applies its multiplier from the same originals.
pub(super) fn suspend(world: &mut World, stratagem_id: u64) -> Result<(), EngineError> {
    let stratagem = world
        .stratagem(stratagem_id)
        .ok_or_else(|| EngineError::Store(format!("stratagem {stratagem_id} not found")))?;
    let baseline = stratagem.progress.baseline.clone();
    for (contract_id, original) in baseline {
        let Some(contract) = world.contract_mut(contract_id) else {
            continue;
        };
        if contract.status != ContractStatus::Active {
            continue;
        }
        contract.price_per_unit = original;
    }
    Ok(())
}

/// Restore perturbed prices: to the current market average for the
/// resource excluding the sponsor's own offers, or to each contract's
/// recorded original when there is no better signal.
pub(super) fn finalize(world: &mut World, stratagem_id: u64) -> Result<(), EngineError> {
    let stratagem = world
        .stratagem(stratagem_id)
        .ok_or_else(|| EngineError::Store(format!("stratagem {stratagem_id} not found")))?;
    let StratagemKind::MonopolyPricing { resource, .. } = stratagem.kind.clone() else {
        return Err(EngineError::invariant("monopoly finalize on wrong kind"));
    };
    let sponsor = stratagem.executed_by;
    let baseline = stratagem.progress.baseline.clone();

    let market = world.market_average_price(&resource, Some(sponsor));
    for (contract_id, original) in baseline {
        let Some(contract) = world.contract_mut(contract_id) else {
            continue;
        };
        if contract.status != ContractStatus::Active {
            continue;
        }
        contract.price_per_unit = market.unwrap_or(original);
    }
    if let Some(stratagem) = world.stratagem_mut(stratagem_id) {
        match market {
            Some(price) => stratagem.push_note(format!(
                "prices restored to market average {price}"
            )),
            None => stratagem.push_note("prices restored to recorded originals"),
        }
    }
    Ok(())
}
