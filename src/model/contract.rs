use serde::{Deserialize, Serialize};

use super::timestamp::SimTimestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractKind {
    PublicSell,
    Import,
    Construction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Active,
    PendingMaterials,
    MaterialsDelivered,
    Executed,
    Completed,
    Failed,
}

impl ContractStatus {
    /// Rank toward completion. `Failed` is terminal from any rank.
    pub fn rank(self) -> u8 {
        match self {
            ContractStatus::Active => 0,
            ContractStatus::PendingMaterials => 1,
            ContractStatus::MaterialsDelivered => 2,
            ContractStatus::Executed => 3,
            ContractStatus::Completed | ContractStatus::Failed => 4,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.rank() == 4
    }

    pub fn can_advance_to(self, next: ContractStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }
}

/// A standing agreement between two citizens. Advanced exclusively by
/// activity processors when their side effect satisfies a clause; a
/// contract can never be executed twice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub id: u64,
    pub kind: ContractKind,
    pub buyer: u64,
    pub seller: u64,
    /// Asset under contract: the building for construction contracts.
    pub asset: Option<u64>,
    /// Resource type for sell/import contracts.
    pub resource: Option<String>,
    pub price_per_unit: f64,
    /// Units the buyer contracted for.
    pub target_amount: f64,
    /// Cumulative units delivered so far (the fulfillment ledger).
    pub delivered: f64,
    pub status: ContractStatus,
    pub created_at: SimTimestamp,
    pub notes: Vec<String>,
}

impl Contract {
    pub fn remaining(&self) -> f64 {
        (self.target_amount - self.delivered).max(0.0)
    }

    pub fn push_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_forward_only() {
        use ContractStatus::*;
        assert!(Active.can_advance_to(PendingMaterials));
        assert!(PendingMaterials.can_advance_to(MaterialsDelivered));
        assert!(MaterialsDelivered.can_advance_to(Executed));
        assert!(Executed.can_advance_to(Completed));
        assert!(Active.can_advance_to(Failed));
        assert!(!Completed.can_advance_to(Active));
        assert!(!Failed.can_advance_to(Active));
        assert!(!Executed.can_advance_to(MaterialsDelivered));
    }

    #[test]
    fn remaining_never_negative() {
        let mut c = Contract {
            id: 1,
            kind: ContractKind::Import,
            buyer: 1,
            seller: 2,
            asset: None,
            resource: Some("grain".to_string()),
            price_per_unit: 1.5,
            target_amount: 50.0,
            delivered: 0.0,
            status: ContractStatus::Active,
            created_at: SimTimestamp::default(),
            notes: Vec::new(),
        };
        assert_eq!(c.remaining(), 50.0);
        c.delivered = 60.0;
        assert_eq!(c.remaining(), 0.0);
    }
}
