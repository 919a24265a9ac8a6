pub mod cli;
pub mod config;
pub mod error;
pub mod sync;

pub use config::{ConfigResolver, PropertyBag, SyncConfig};
pub use error::ConfigError;
pub use sync::{ExtractionReport, MalformedPathPolicy, PartitionValues, extract_partitions};
