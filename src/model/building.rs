use serde::{Deserialize, Serialize};

use super::citizen::Position;
use super::resource::ResourceAmount;

/// A fixed location that can hold resource stacks: a workshop, a home,
/// a construction site, or a moored galley.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: u64,
    pub name: String,
    pub position: Position,
    pub district: Option<String>,
    pub owner: Option<u64>,
    /// True for galleys: floating holders that merchants pick cargo from.
    pub is_galley: bool,
    /// Work-minutes left before construction is complete. Zero for a
    /// finished building.
    pub construction_minutes_remaining: u32,
    /// Total bill of materials for construction. The construct handler
    /// checks delivered stock on site against this.
    pub construction_materials: Vec<ResourceAmount>,
    /// Running crime pressure for the building's district. Lowered by
    /// neighborhood watch campaigns.
    pub crime_pressure: f64,
}

impl Building {
    pub fn is_under_construction(&self) -> bool {
        self.construction_minutes_remaining > 0
    }

    /// Total work-minutes the construction required at the outset, derived
    /// from the bill of materials (one minute of work per unit of material
    /// is the baseline the builders quote).
    pub fn total_construction_minutes(&self) -> u32 {
        self.construction_materials
            .iter()
            .map(|m| m.amount.ceil() as u32)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> Building {
        Building {
            id: 7,
            name: "Rialto workshop".to_string(),
            position: Position::new(0.0, 0.0),
            district: Some("San Polo".to_string()),
            owner: Some(1),
            is_galley: false,
            construction_minutes_remaining: 120,
            construction_materials: vec![
                ResourceAmount::new("timber", 80.0),
                ResourceAmount::new("stone", 40.0),
            ],
            crime_pressure: 0.0,
        }
    }

    #[test]
    fn under_construction_flag() {
        let mut b = site();
        assert!(b.is_under_construction());
        b.construction_minutes_remaining = 0;
        assert!(!b.is_under_construction());
    }

    #[test]
    fn total_minutes_from_materials() {
        assert_eq!(site().total_construction_minutes(), 120);
    }
}
