use std::collections::BTreeMap;

use super::activity::{Activity, ActivityStatus};
use super::building::Building;
use super::citizen::{Citizen, Position};
use super::contract::{Contract, ContractKind, ContractStatus};
use super::resource::{Holder, ResourceStack};
use super::stratagem::{
    Stratagem, StratagemKind, StratagemProgress, StratagemStatus, StratagemVariant,
};
use super::timestamp::SimTimestamp;
use crate::error::EngineError;
use crate::id::IdGenerator;

/// The in-memory record store: one keyed table per record kind, a shared
/// id generator, and the engine clock.
///
/// Ordering is an explicit part of the query contract (`due_activities`
/// returns ascending start time), not an incidental property of storage.
/// Status transitions go through the `set_*_status` methods, which reject
/// backward moves so a handler can never un-settle a record.
#[derive(Debug)]
pub struct World {
    pub citizens: BTreeMap<u64, Citizen>,
    pub buildings: BTreeMap<u64, Building>,
    pub stacks: BTreeMap<u64, ResourceStack>,
    pub activities: BTreeMap<u64, Activity>,
    pub contracts: BTreeMap<u64, Contract>,
    pub stratagems: BTreeMap<u64, Stratagem>,
    pub id_gen: IdGenerator,
    pub current_time: SimTimestamp,
}

impl World {
    pub fn new() -> Self {
        Self {
            citizens: BTreeMap::new(),
            buildings: BTreeMap::new(),
            stacks: BTreeMap::new(),
            activities: BTreeMap::new(),
            contracts: BTreeMap::new(),
            stratagems: BTreeMap::new(),
            id_gen: IdGenerator::new(),
            current_time: SimTimestamp::default(),
        }
    }

    // -- Record creation --

    pub fn add_citizen(
        &mut self,
        name: impl Into<String>,
        ducats: f64,
        position: Position,
    ) -> u64 {
        let id = self.id_gen.next_id();
        self.citizens.insert(
            id,
            Citizen {
                id,
                name: name.into(),
                ducats,
                position,
                home: None,
                district: None,
                trust: BTreeMap::new(),
            },
        );
        id
    }

    pub fn add_building(
        &mut self,
        name: impl Into<String>,
        position: Position,
        is_galley: bool,
    ) -> u64 {
        let id = self.id_gen.next_id();
        self.buildings.insert(
            id,
            Building {
                id,
                name: name.into(),
                position,
                district: None,
                owner: None,
                is_galley,
                construction_minutes_remaining: 0,
                construction_materials: Vec::new(),
                crime_pressure: 0.0,
            },
        );
        id
    }

    pub fn add_contract(
        &mut self,
        kind: ContractKind,
        buyer: u64,
        seller: u64,
        resource: Option<String>,
        price_per_unit: f64,
        target_amount: f64,
    ) -> u64 {
        let id = self.id_gen.next_id();
        self.contracts.insert(
            id,
            Contract {
                id,
                kind,
                buyer,
                seller,
                asset: None,
                resource,
                price_per_unit,
                target_amount,
                delivered: 0.0,
                status: ContractStatus::Active,
                created_at: self.current_time,
                notes: Vec::new(),
            },
        );
        id
    }

    pub fn add_stratagem(
        &mut self,
        kind: StratagemKind,
        executed_by: u64,
        variant: StratagemVariant,
        expires_at: SimTimestamp,
        daily_cost: f64,
    ) -> u64 {
        let id = self.id_gen.next_id();
        self.stratagems.insert(
            id,
            Stratagem {
                id,
                kind,
                executed_by,
                variant,
                status: StratagemStatus::Active,
                executed_at: self.current_time,
                expires_at,
                daily_cost,
                progress: StratagemProgress::default(),
                notes: Vec::new(),
            },
        );
        id
    }

    /// Insert a new stack row. Only the ledger calls this; every other
    /// component moves stock through `sim::ledger`.
    pub(crate) fn insert_stack(
        &mut self,
        resource: impl Into<String>,
        count: f64,
        holder: Holder,
        owner: u64,
    ) -> u64 {
        let id = self.id_gen.next_id();
        self.stacks.insert(
            id,
            ResourceStack {
                id,
                resource: resource.into(),
                count,
                holder,
                owner,
            },
        );
        id
    }

    /// Persist a full activity chain, all-or-nothing. Validates every
    /// record before inserting any, so a rejected batch leaves nothing
    /// visible.
    pub fn insert_activities(
        &mut self,
        mut batch: Vec<Activity>,
    ) -> Result<Vec<u64>, EngineError> {
        for activity in &batch {
            if !self.citizens.contains_key(&activity.citizen) {
                return Err(EngineError::validation(format!(
                    "activity actor {} does not exist",
                    activity.citizen
                )));
            }
            if activity.end < activity.start {
                return Err(EngineError::validation(format!(
                    "activity {} ends before it starts ({} < {})",
                    activity.kind.label(),
                    activity.end,
                    activity.start
                )));
            }
            if activity.status != ActivityStatus::Created {
                return Err(EngineError::validation(format!(
                    "new activity {} must be in created status",
                    activity.kind.label()
                )));
            }
        }
        let mut ids = Vec::with_capacity(batch.len());
        for activity in &mut batch {
            let id = self.id_gen.next_id();
            activity.id = id;
            ids.push(id);
        }
        for activity in batch {
            self.activities.insert(activity.id, activity);
        }
        Ok(ids)
    }

    // -- Lookups --

    pub fn citizen(&self, id: u64) -> Option<&Citizen> {
        self.citizens.get(&id)
    }

    pub fn citizen_mut(&mut self, id: u64) -> Option<&mut Citizen> {
        self.citizens.get_mut(&id)
    }

    pub fn building(&self, id: u64) -> Option<&Building> {
        self.buildings.get(&id)
    }

    pub fn building_mut(&mut self, id: u64) -> Option<&mut Building> {
        self.buildings.get_mut(&id)
    }

    pub fn activity(&self, id: u64) -> Option<&Activity> {
        self.activities.get(&id)
    }

    pub fn activity_mut(&mut self, id: u64) -> Option<&mut Activity> {
        self.activities.get_mut(&id)
    }

    pub fn contract(&self, id: u64) -> Option<&Contract> {
        self.contracts.get(&id)
    }

    pub fn contract_mut(&mut self, id: u64) -> Option<&mut Contract> {
        self.contracts.get_mut(&id)
    }

    pub fn stratagem(&self, id: u64) -> Option<&Stratagem> {
        self.stratagems.get(&id)
    }

    pub fn stratagem_mut(&mut self, id: u64) -> Option<&mut Stratagem> {
        self.stratagems.get_mut(&id)
    }

    // -- Ordered queries --

    /// Activities due for settlement: non-terminal status and `end <=
    /// before`, sorted by start time ascending (earlier-scheduled work
    /// settles first, preserving chain order within one actor), ties by id.
    pub fn due_activities(&self, before: SimTimestamp) -> Vec<u64> {
        let mut due: Vec<&Activity> = self
            .activities
            .values()
            .filter(|a| !a.status.is_terminal() && a.end <= before)
            .collect();
        due.sort_by_key(|a| (a.start, a.id));
        due.into_iter().map(|a| a.id).collect()
    }

    /// Created activities whose start has passed but whose end has not.
    pub fn startable_activities(&self, now: SimTimestamp) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .activities
            .values()
            .filter(|a| a.status == ActivityStatus::Created && a.start <= now && a.end > now)
            .map(|a| a.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Stratagems still owed ticks: active or suspended, by id.
    pub fn active_stratagems(&self) -> Vec<u64> {
        self.stratagems
            .values()
            .filter(|s| !s.status.is_terminal())
            .map(|s| s.id)
            .collect()
    }

    pub fn stack_of(&self, holder: Holder, owner: u64, resource: &str) -> Option<u64> {
        self.stacks
            .values()
            .find(|s| s.holder == holder && s.owner == owner && s.resource == resource)
            .map(|s| s.id)
    }

    pub fn stacks_at(&self, holder: Holder) -> Vec<u64> {
        self.stacks
            .values()
            .filter(|s| s.holder == holder)
            .map(|s| s.id)
            .collect()
    }

    /// Sum of a resource type across every stack, for conservation checks.
    pub fn resource_total(&self, resource: &str) -> f64 {
        self.stacks
            .values()
            .filter(|s| s.resource == resource)
            .map(|s| s.count)
            .sum()
    }

    /// Active public sell contracts of one seller for one resource.
    pub fn sell_contracts_of(&self, seller: u64, resource: &str) -> Vec<u64> {
        self.contracts
            .values()
            .filter(|c| {
                c.kind == ContractKind::PublicSell
                    && c.seller == seller
                    && c.status == ContractStatus::Active
                    && c.resource.as_deref() == Some(resource)
            })
            .map(|c| c.id)
            .collect()
    }

    /// Mean active sell price for a resource, optionally excluding one
    /// seller's offers (a monopolist baselines against everyone else).
    pub fn market_average_price(&self, resource: &str, exclude_seller: Option<u64>) -> Option<f64> {
        let prices: Vec<f64> = self
            .contracts
            .values()
            .filter(|c| {
                c.kind == ContractKind::PublicSell
                    && c.status == ContractStatus::Active
                    && c.resource.as_deref() == Some(resource)
                    && Some(c.seller) != exclude_seller
            })
            .map(|c| c.price_per_unit)
            .collect();
        if prices.is_empty() {
            None
        } else {
            Some(prices.iter().sum::<f64>() / prices.len() as f64)
        }
    }

    /// Buildings in a district, by id.
    pub fn buildings_in_district(&self, district: &str) -> Vec<u64> {
        self.buildings
            .values()
            .filter(|b| b.district.as_deref() == Some(district))
            .map(|b| b.id)
            .collect()
    }

    // -- Forward-only status transitions --

    pub fn set_activity_status(
        &mut self,
        id: u64,
        next: ActivityStatus,
    ) -> Result<(), EngineError> {
        let activity = self
            .activities
            .get_mut(&id)
            .ok_or_else(|| EngineError::Store(format!("activity {id} not found")))?;
        if !activity.status.can_advance_to(next) {
            return Err(EngineError::invariant(format!(
                "activity {id} cannot move {:?} -> {:?}",
                activity.status, next
            )));
        }
        activity.status = next;
        Ok(())
    }

    pub fn set_contract_status(
        &mut self,
        id: u64,
        next: ContractStatus,
    ) -> Result<(), EngineError> {
        let contract = self
            .contracts
            .get_mut(&id)
            .ok_or_else(|| EngineError::Store(format!("contract {id} not found")))?;
        if !contract.status.can_advance_to(next) {
            return Err(EngineError::invariant(format!(
                "contract {id} cannot move {:?} -> {:?}",
                contract.status, next
            )));
        }
        contract.status = next;
        Ok(())
    }

    /// Stratagems may oscillate Active <-> Suspended while running, but a
    /// terminal status is final: a campaign is finalized exactly once.
    pub fn set_stratagem_status(
        &mut self,
        id: u64,
        next: StratagemStatus,
    ) -> Result<(), EngineError> {
        let stratagem = self
            .stratagems
            .get_mut(&id)
            .ok_or_else(|| EngineError::Store(format!("stratagem {id} not found")))?;
        if stratagem.status.is_terminal() {
            return Err(EngineError::invariant(format!(
                "stratagem {id} already finalized as {:?}",
                stratagem.status
            )));
        }
        stratagem.status = next;
        Ok(())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
