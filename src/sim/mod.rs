pub mod chain;
pub mod context;
pub mod dispatch;
mod handlers;
pub mod ledger;
pub mod narrative;
pub mod notify;
pub mod runner;
pub mod stratagem;
pub mod travel;

pub use chain::{ConstructionIntent, DeliveryIntent, MessageIntent};
pub use context::EngineContext;
pub use narrative::{NarrativeQueue, NarrativeRequest, NarrativeService, NarrativeTarget};
pub use notify::{MemorySink, Notification, NotificationKind, NotificationSink, NullSink};
pub use runner::{CycleStats, Engine, EngineConfig};
pub use travel::{StraightLineEstimator, TravelEstimate, TravelEstimator};
