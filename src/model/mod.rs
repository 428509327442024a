pub mod activity;
pub mod building;
pub mod citizen;
pub mod contract;
pub mod resource;
pub mod stratagem;
pub mod timestamp;
pub mod world;

pub use activity::{Activity, ActivityKind, ActivityStatus};
pub use building::Building;
pub use citizen::{Citizen, Position};
pub use contract::{Contract, ContractKind, ContractStatus};
pub use resource::{Holder, ResourceAmount, ResourceStack};
pub use stratagem::{
    Stratagem, StratagemKind, StratagemProgress, StratagemStatus, StratagemVariant,
};
pub use timestamp::SimTimestamp;
pub use world::World;
