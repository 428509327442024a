pub mod db;
pub mod error;
pub mod flush;
pub mod id;
pub mod model;
pub mod sim;
pub mod testutil;

pub use error::EngineError;
pub use id::IdGenerator;
pub use model::{
    Activity, ActivityKind, ActivityStatus, Building, Citizen, Contract, ContractKind,
    ContractStatus, Holder, Position, ResourceAmount, ResourceStack, SimTimestamp, Stratagem,
    StratagemKind, StratagemProgress, StratagemStatus, StratagemVariant, World,
};
pub use sim::{Engine, EngineConfig};
