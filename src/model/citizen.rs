use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A point on the map. Routing between points is the travel collaborator's
/// job; the model only needs identity and straight-line distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Euclidean distance in coordinate units. Good enough for
    /// zero-distance checks and the straight-line estimator.
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dlat = self.lat - other.lat;
        let dlng = self.lng - other.lng;
        (dlat * dlat + dlng * dlng).sqrt()
    }
}

/// An autonomous actor in the economy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citizen {
    pub id: u64,
    pub name: String,
    /// Liquid funds, spent by stratagem daily costs and contract payments.
    pub ducats: f64,
    pub position: Position,
    /// Home building, used as the fallback holder when the citizen is
    /// stationary and for pantry pickups en route to work.
    pub home: Option<u64>,
    pub district: Option<String>,
    /// Pairwise trust toward other citizens, keyed by citizen id.
    /// Mutated by messages and reputation campaigns.
    pub trust: BTreeMap<u64, f64>,
}

impl Citizen {
    pub fn trust_toward(&self, other: u64) -> f64 {
        self.trust.get(&other).copied().unwrap_or(0.0)
    }

    /// Adjust trust toward `other` by `delta`, clamped to [-1, 1].
    pub fn adjust_trust(&mut self, other: u64, delta: f64) {
        let entry = self.trust.entry(other).or_insert(0.0);
        *entry = (*entry + delta).clamp(-1.0, 1.0);
    }
}
