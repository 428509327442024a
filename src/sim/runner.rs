use std::path::PathBuf;

use crate::error::EngineError;
use crate::flush::flush_to_jsonl;
use crate::model::{SimTimestamp, World};

use super::chain::{self, ConstructionIntent, DeliveryIntent, MessageIntent};
use super::context::EngineContext;
use super::dispatch;
use super::narrative::{NarrativeQueue, NarrativeTarget};
use super::notify::NotificationSink;
use super::stratagem;
use super::travel::TravelEstimator;

/// Configuration for an engine instance.
pub struct EngineConfig {
    /// Seed for every derived RNG; the same seed and inputs always
    /// produce the same simulation.
    pub seed: u64,
    /// If set, flush world state every N cycles.
    pub flush_interval: Option<u32>,
    /// Directory to write flush checkpoints into.
    pub output_dir: Option<PathBuf>,
}

impl EngineConfig {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            flush_interval: None,
            output_dir: None,
        }
    }
}

/// Counters for one driver cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Activities moved `Created` -> `InProgress`.
    pub started: u32,
    /// Activities that reached a terminal status.
    pub settled: u32,
    /// Stratagems that applied an effect or finalized.
    pub stratagems_ticked: u32,
    /// Narrative write-backs applied at the top of the cycle.
    pub narrative_notes: u32,
}

/// The engine: config plus collaborators, constructed once per process
/// and handed `&mut World` each cycle.
pub struct Engine {
    pub config: EngineConfig,
    estimator: Box<dyn TravelEstimator>,
    notifier: Box<dyn NotificationSink>,
    narrative: Option<NarrativeQueue>,
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        estimator: Box<dyn TravelEstimator>,
        notifier: Box<dyn NotificationSink>,
    ) -> Self {
        Self {
            config,
            estimator,
            notifier,
            narrative: None,
        }
    }

    pub fn with_narrative(mut self, queue: NarrativeQueue) -> Self {
        self.narrative = Some(queue);
        self
    }

    fn context(&mut self) -> EngineContext<'_> {
        EngineContext {
            config: &self.config,
            estimator: &*self.estimator,
            notifier: &mut *self.notifier,
            narrative: self.narrative.as_ref(),
        }
    }

    /// One batch cycle at simulated time `now`: apply finished narrative
    /// write-backs, start and settle due activities, tick stratagems.
    pub fn run_cycle(&mut self, world: &mut World, now: SimTimestamp) -> CycleStats {
        world.current_time = now;
        let narrative_notes = apply_narrative_notes(world, self.narrative.as_ref());
        let started = dispatch::advance_started(world, now);
        let mut ctx = EngineContext {
            config: &self.config,
            estimator: &*self.estimator,
            notifier: &mut *self.notifier,
            narrative: self.narrative.as_ref(),
        };
        let settled = dispatch::process_due_activities(world, &mut ctx, now);
        let stratagems_ticked = stratagem::tick_stratagems(world, &mut ctx, now);
        CycleStats {
            started,
            settled,
            stratagems_ticked,
            narrative_notes,
        }
    }

    /// Run cycles at a fixed cadence from `from` through `until`
    /// inclusive, flushing JSONL checkpoints at the configured interval.
    pub fn run(
        &mut self,
        world: &mut World,
        from: SimTimestamp,
        until: SimTimestamp,
        step_seconds: u32,
    ) {
        assert!(step_seconds > 0, "cycle cadence must be positive");
        let mut now = from;
        let mut cycle: u32 = 0;
        while now <= until {
            self.run_cycle(world, now);
            cycle += 1;
            if let (Some(interval), Some(dir)) =
                (self.config.flush_interval, &self.config.output_dir)
                && cycle % interval == 0
            {
                let checkpoint_dir = dir.join(format!("cycle_{cycle:06}"));
                flush_to_jsonl(world, &checkpoint_dir).expect("failed to write flush checkpoint");
            }
            now = now.plus_seconds(step_seconds);
        }
    }

    // -- Chain building entry points --

    pub fn build_delivery_chain(
        &mut self,
        world: &mut World,
        intent: &DeliveryIntent,
        now: SimTimestamp,
    ) -> Result<Vec<u64>, EngineError> {
        let ctx = self.context();
        chain::build_delivery_chain(world, &ctx, intent, now)
    }

    pub fn build_construction_chain(
        &mut self,
        world: &mut World,
        intent: &ConstructionIntent,
        now: SimTimestamp,
    ) -> Result<Vec<u64>, EngineError> {
        let ctx = self.context();
        chain::build_construction_chain(world, &ctx, intent, now)
    }

    pub fn build_message_chain(
        &mut self,
        world: &mut World,
        intent: &MessageIntent,
        now: SimTimestamp,
    ) -> Result<Vec<u64>, EngineError> {
        let ctx = self.context();
        chain::build_message_chain(world, &ctx, intent, now)
    }
}

/// Append texts finished by the narrative worker to their records.
/// Concluded records only gain notes; nothing transactional changes.
fn apply_narrative_notes(world: &mut World, queue: Option<&NarrativeQueue>) -> u32 {
    let Some(queue) = queue else {
        return 0;
    };
    let mut applied = 0;
    for note in queue.drain_completed() {
        match note.target {
            NarrativeTarget::Activity(id) => {
                if let Some(activity) = world.activity_mut(id) {
                    activity.push_note(note.text);
                    applied += 1;
                }
            }
            NarrativeTarget::Stratagem(id) => {
                if let Some(stratagem) = world.stratagem_mut(id) {
                    stratagem.push_note(note.text);
                    applied += 1;
                }
            }
        }
    }
    applied
}
