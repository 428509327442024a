//! The resource ledger: the single component authorized to mutate stack
//! counts. Everything that moves goods goes through `transfer`, which
//! decomposes into an all-or-nothing `decrement` and an always-succeeding
//! `increment`.

use crate::error::EngineError;
use crate::model::{Holder, World};

/// Tolerance for floating-point drift in stack arithmetic. Amounts within
/// epsilon of zero are treated as zero, not as stock remaining.
pub const AMOUNT_EPSILON: f64 = 0.001;

/// Stock available for a (holder, owner, resource) key. Zero if no stack.
pub fn available(world: &World, holder: Holder, owner: u64, resource: &str) -> f64 {
    world
        .stack_of(holder, owner, resource)
        .and_then(|id| world.stacks.get(&id))
        .map(|s| s.count)
        .unwrap_or(0.0)
}

/// Add `amount` to the (holder, owner, resource) stack, creating the row
/// on first deposit. Amounts within epsilon of zero are a no-op.
pub fn increment(
    world: &mut World,
    holder: Holder,
    owner: u64,
    resource: &str,
    amount: f64,
) -> Result<(), EngineError> {
    if amount < 0.0 {
        return Err(EngineError::validation(format!(
            "increment of negative amount {amount} for {resource}"
        )));
    }
    if amount <= AMOUNT_EPSILON {
        return Ok(());
    }
    match world.stack_of(holder, owner, resource) {
        Some(id) => {
            let stack = world
                .stacks
                .get_mut(&id)
                .ok_or_else(|| EngineError::invariant(format!("stack {id} vanished mid-update")))?;
            stack.count += amount;
        }
        None => {
            world.insert_stack(resource, amount, holder, owner);
        }
    }
    Ok(())
}

/// Remove `amount` from the (holder, owner, resource) stack. Fails without
/// partial application if stock is short; deletes the row when the
/// remainder falls within epsilon of zero.
pub fn decrement(
    world: &mut World,
    holder: Holder,
    owner: u64,
    resource: &str,
    amount: f64,
) -> Result<(), EngineError> {
    if amount < 0.0 {
        return Err(EngineError::validation(format!(
            "decrement of negative amount {amount} for {resource}"
        )));
    }
    if amount <= AMOUNT_EPSILON {
        return Ok(());
    }
    let id = world.stack_of(holder, owner, resource).ok_or_else(|| {
        EngineError::InsufficientResources {
            resource: resource.to_string(),
            holder,
            owner,
            available: 0.0,
            requested: amount,
        }
    })?;
    let stack = world
        .stacks
        .get_mut(&id)
        .ok_or_else(|| EngineError::invariant(format!("stack {id} vanished mid-update")))?;
    if stack.count + AMOUNT_EPSILON < amount {
        return Err(EngineError::InsufficientResources {
            resource: resource.to_string(),
            holder,
            owner,
            available: stack.count,
            requested: amount,
        });
    }
    stack.count -= amount;
    if stack.count <= AMOUNT_EPSILON {
        world.stacks.remove(&id);
    }
    Ok(())
}

/// Move `amount` of `resource` between (holder, owner) pairs. The
/// decrement is checked first, so a shortfall leaves both sides untouched.
pub fn transfer(
    world: &mut World,
    resource: &str,
    amount: f64,
    from_holder: Holder,
    from_owner: u64,
    to_holder: Holder,
    to_owner: u64,
) -> Result<(), EngineError> {
    if from_holder == to_holder && from_owner == to_owner {
        return Ok(());
    }
    decrement(world, from_holder, from_owner, resource, amount)?;
    increment(world, to_holder, to_owner, resource, amount)?;
    Ok(())
}
