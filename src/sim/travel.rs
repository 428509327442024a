use crate::error::EngineError;
use crate::model::Position;

/// Fallback duration substituted when the estimator fails or times out.
/// Partial information is acceptable; aborting a whole chain is not.
pub const DEFAULT_TRAVEL_SECONDS: u32 = 1800;

/// Walking speed assumed by the straight-line estimator, coordinate units
/// per second.
const STRAIGHT_LINE_UNITS_PER_SECOND: f64 = 0.001;

#[derive(Debug, Clone)]
pub struct TravelEstimate {
    pub path: Vec<Position>,
    pub duration_seconds: u32,
}

/// Routing collaborator. The production implementation sits behind an
/// HTTP client with a short timeout; the engine sees only this trait and
/// the fallback policy in `estimate_or_default`.
pub trait TravelEstimator {
    fn estimate(&self, from: Position, to: Position) -> Result<TravelEstimate, EngineError>;
}

/// Deterministic estimator for tests and offline runs: straight path,
/// duration proportional to euclidean distance.
#[derive(Debug, Clone, Copy)]
pub struct StraightLineEstimator {
    pub units_per_second: f64,
}

impl Default for StraightLineEstimator {
    fn default() -> Self {
        Self {
            units_per_second: STRAIGHT_LINE_UNITS_PER_SECOND,
        }
    }
}

impl TravelEstimator for StraightLineEstimator {
    fn estimate(&self, from: Position, to: Position) -> Result<TravelEstimate, EngineError> {
        let distance = from.distance_to(&to);
        let duration_seconds = (distance / self.units_per_second).ceil().max(1.0) as u32;
        Ok(TravelEstimate {
            path: vec![from, to],
            duration_seconds,
        })
    }
}

/// Estimator that always reports the collaborator unreachable. Exercises
/// the fallback path in tests.
#[derive(Debug, Clone, Copy)]
pub struct UnavailableEstimator;

impl TravelEstimator for UnavailableEstimator {
    fn estimate(&self, _from: Position, _to: Position) -> Result<TravelEstimate, EngineError> {
        Err(EngineError::CollaboratorUnavailable {
            service: "travel_estimator",
            reason: "unreachable".to_string(),
        })
    }
}

/// Ask the estimator for a route; on failure substitute a straight path
/// with the default duration.
pub fn estimate_or_default(
    estimator: &dyn TravelEstimator,
    from: Position,
    to: Position,
) -> TravelEstimate {
    match estimator.estimate(from, to) {
        Ok(estimate) => estimate,
        Err(err) => {
            tracing::warn!("travel estimate failed, using default duration: {err}");
            TravelEstimate {
                path: vec![from, to],
                duration_seconds: DEFAULT_TRAVEL_SECONDS,
            }
        }
    }
}
