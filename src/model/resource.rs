use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a resource stack physically sits. Ownership is separate: a
/// citizen can carry goods owned by their employer, a galley can hold
/// consigned stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Holder {
    Building(u64),
    Citizen(u64),
}

impl fmt::Display for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Holder::Building(id) => write!(f, "building:{id}"),
            Holder::Citizen(id) => write!(f, "citizen:{id}"),
        }
    }
}

/// A (resource type, amount) pair, used in activity payloads and
/// construction bills of materials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceAmount {
    pub resource: String,
    pub amount: f64,
}

impl ResourceAmount {
    pub fn new(resource: impl Into<String>, amount: f64) -> Self {
        Self {
            resource: resource.into(),
            amount,
        }
    }
}

/// A quantity of one resource type at one holder, owned by one citizen.
///
/// Invariant: `count >= 0`. Stacks at (near-)zero are deleted by the
/// ledger, never retained as zero-rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceStack {
    pub id: u64,
    pub resource: String,
    pub count: f64,
    pub holder: Holder,
    pub owner: u64,
}

impl ResourceStack {
    /// The key a ledger mutation is serialized on.
    pub fn key(&self) -> (Holder, u64, &str) {
        (self.holder, self.owner, self.resource.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holder_display() {
        assert_eq!(Holder::Building(3).to_string(), "building:3");
        assert_eq!(Holder::Citizen(9).to_string(), "citizen:9");
    }

    #[test]
    fn holder_serde_shape() {
        let v = serde_json::to_value(Holder::Building(3)).unwrap();
        assert_eq!(v["kind"], "building");
        assert_eq!(v["id"], 3);
    }

    #[test]
    fn stack_key() {
        let stack = ResourceStack {
            id: 1,
            resource: "grain".to_string(),
            count: 80.0,
            holder: Holder::Building(5),
            owner: 2,
        };
        assert_eq!(stack.key(), (Holder::Building(5), 2, "grain"));
    }
}
