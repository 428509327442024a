mod load;
mod migrate;

pub use load::archive_world;
pub use migrate::migrate;
