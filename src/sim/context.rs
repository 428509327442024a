use super::narrative::NarrativeQueue;
use super::notify::NotificationSink;
use super::runner::EngineConfig;
use super::travel::TravelEstimator;

/// Context passed to every engine component during a cycle: the one
/// process-wide bundle of config and collaborators, constructed by the
/// runner. No component reaches for globals.
pub struct EngineContext<'a> {
    pub config: &'a EngineConfig,
    pub estimator: &'a dyn TravelEstimator,
    pub notifier: &'a mut dyn NotificationSink,
    /// Absent when narrative enrichment is disabled; everything works
    /// without it.
    pub narrative: Option<&'a NarrativeQueue>,
}
