pub mod capabilities;
pub mod config;
pub mod db;
pub mod environment;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod photos;
pub mod purge;
pub mod seed;
pub mod store;
pub mod transform;

/// Target for entity dumps: `debug` on this target is the data level, `trace`
/// the data-debug level.
pub const DATA_TARGET: &str = "hydromon::data";

pub use hydromon_parser as parser;
