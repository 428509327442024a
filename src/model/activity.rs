//! Activity records: one scheduled, time-bounded unit of work.
//!
//! The activity kind is a tagged union carrying the typed parameters its
//! processor needs, so a step never has to re-query the intent that
//! created its chain.

use serde::{Deserialize, Serialize};

use super::citizen::Position;
use super::resource::ResourceAmount;
use super::timestamp::SimTimestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Created,
    InProgress,
    Processed,
    Failed,
    Error,
}

impl ActivityStatus {
    /// Rank in the forward-only state machine. Terminal states share the
    /// top rank: once terminal, no further transition is legal.
    pub fn rank(self) -> u8 {
        match self {
            ActivityStatus::Created => 0,
            ActivityStatus::InProgress => 1,
            ActivityStatus::Processed | ActivityStatus::Failed | ActivityStatus::Error => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.rank() == 2
    }

    /// Whether moving from `self` to `next` is a legal forward transition.
    pub fn can_advance_to(self, next: ActivityStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }
}

/// What an activity does when its end time passes, with the typed
/// parameters the processor needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityKind {
    /// Travel between two locations. No ledger effect beyond the optional
    /// pantry pickup taken from the origin building.
    GotoLocation {
        #[serde(skip_serializing_if = "Option::is_none", default)]
        pantry_pickup: Option<ResourceAmount>,
    },
    /// Load cargo from a galley onto the actor.
    PickupFromGalley { resource: String, amount: f64 },
    /// Unload carried cargo at the destination, passing ownership to the
    /// linked contract's buyer.
    DeliverToBuyer { resource: String, amount: f64 },
    /// Apply accumulated work-minutes to a construction site.
    ConstructBuilding { work_minutes: u32 },
    /// Deliver a message to another citizen.
    SendMessage { recipient: u64, body: String },
}

impl ActivityKind {
    /// Stable snake_case label, used in logs and the archive schema.
    pub fn label(&self) -> &'static str {
        match self {
            ActivityKind::GotoLocation { .. } => "goto_location",
            ActivityKind::PickupFromGalley { .. } => "pickup_from_galley",
            ActivityKind::DeliverToBuyer { .. } => "deliver_to_buyer",
            ActivityKind::ConstructBuilding { .. } => "construct_building",
            ActivityKind::SendMessage { .. } => "send_message",
        }
    }

    /// Travel steps only move the actor; action steps have side effects
    /// on stock, contracts, or relationships.
    pub fn is_travel(&self) -> bool {
        matches!(self, ActivityKind::GotoLocation { .. })
    }
}

/// One scheduled step of work. Created by the chain builder, mutated only
/// by the processor dispatch at or after `end`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: u64,
    pub citizen: u64,
    pub kind: ActivityKind,
    pub from_building: Option<u64>,
    pub to_building: Option<u64>,
    /// Waypoints from the travel estimator; empty for action steps.
    pub path: Vec<Position>,
    pub start: SimTimestamp,
    pub end: SimTimestamp,
    pub status: ActivityStatus,
    /// Contract this step advances, if any.
    pub contract: Option<u64>,
    /// Cargo the actor carries during this step.
    pub carried: Vec<ResourceAmount>,
    /// Append-only outcome log: shortfalls, failure reasons, narrative
    /// write-backs. Never read by processors.
    pub notes: Vec<String>,
}

impl Activity {
    pub fn push_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }
}
