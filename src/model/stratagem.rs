//! Stratagem records: multi-day strategic campaigns with one daily tick
//! of effect, a reversible market perturbation, and a deterministic
//! expiration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::timestamp::SimTimestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StratagemStatus {
    Active,
    Suspended,
    Completed,
    Failed,
}

impl StratagemStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, StratagemStatus::Completed | StratagemStatus::Failed)
    }
}

/// Intensity of a campaign. Scales the daily cost and the effect size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StratagemVariant {
    Mild,
    Standard,
    Aggressive,
}

impl StratagemVariant {
    pub fn cost_factor(self) -> f64 {
        match self {
            StratagemVariant::Mild => 0.5,
            StratagemVariant::Standard => 1.0,
            StratagemVariant::Aggressive => 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StratagemKind {
    /// Corner the market for one resource: multiply the sponsor's active
    /// sell prices, remembering originals for reversal at expiry.
    MonopolyPricing {
        resource: String,
        price_multiplier: f64,
    },
    /// One reputation event per day raising sampled citizens' trust
    /// toward the target.
    ReputationBoost { target: u64 },
    /// Daily crime-prevention attempt in one district.
    NeighborhoodWatch { district: String },
}

impl StratagemKind {
    pub fn label(&self) -> &'static str {
        match self {
            StratagemKind::MonopolyPricing { .. } => "monopoly_pricing",
            StratagemKind::ReputationBoost { .. } => "reputation_boost",
            StratagemKind::NeighborhoodWatch { .. } => "neighborhood_watch",
        }
    }
}

/// Structured progress counters, persisted with the stratagem so a tick
/// can be replayed without re-rolling anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StratagemProgress {
    /// Ducats spent on daily costs to date.
    pub spent: f64,
    /// Daily effect applications fired to date.
    pub events_fired: u32,
    /// Calendar day of the last effect application. Gates the tick to at
    /// most one per simulated day.
    pub last_event_day: Option<u32>,
    /// Baseline snapshot captured on the first effective tick: original
    /// price per perturbed contract id, for lossless reversal.
    pub baseline: BTreeMap<u64, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stratagem {
    pub id: u64,
    pub kind: StratagemKind,
    pub executed_by: u64,
    pub variant: StratagemVariant,
    pub status: StratagemStatus,
    pub executed_at: SimTimestamp,
    pub expires_at: SimTimestamp,
    /// Base daily cost in ducats, before the variant factor.
    pub daily_cost: f64,
    pub progress: StratagemProgress,
    pub notes: Vec<String>,
}

impl Stratagem {
    /// Daily cost after the variant factor.
    pub fn effective_daily_cost(&self) -> f64 {
        self.daily_cost * self.variant.cost_factor()
    }

    /// Whether the day-gated effect already fired on `day`.
    pub fn fired_on(&self, day: u32) -> bool {
        self.progress.last_event_day == Some(day)
    }

    pub fn push_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stratagem() -> Stratagem {
        Stratagem {
            id: 1,
            kind: StratagemKind::MonopolyPricing {
                resource: "bread".to_string(),
                price_multiplier: 2.0,
            },
            executed_by: 3,
            variant: StratagemVariant::Standard,
            status: StratagemStatus::Active,
            executed_at: SimTimestamp::from_day(10),
            expires_at: SimTimestamp::from_day(17),
            daily_cost: 20.0,
            progress: StratagemProgress::default(),
            notes: Vec::new(),
        }
    }

    #[test]
    fn variant_scales_cost() {
        let mut s = stratagem();
        assert_eq!(s.effective_daily_cost(), 20.0);
        s.variant = StratagemVariant::Aggressive;
        assert_eq!(s.effective_daily_cost(), 40.0);
        s.variant = StratagemVariant::Mild;
        assert_eq!(s.effective_daily_cost(), 10.0);
    }

    #[test]
    fn day_gate() {
        let mut s = stratagem();
        assert!(!s.fired_on(10));
        s.progress.last_event_day = Some(10);
        assert!(s.fired_on(10));
        assert!(!s.fired_on(11));
    }

    #[test]
    fn terminal_statuses() {
        assert!(!StratagemStatus::Active.is_terminal());
        assert!(!StratagemStatus::Suspended.is_terminal());
        assert!(StratagemStatus::Completed.is_terminal());
        assert!(StratagemStatus::Failed.is_terminal());
    }
}
