//! CloudWatch metrics destination.
//!
//! Ties the transformation core from `cloudwatch-datum` to a transport seam: configuration supplies the namespace and
//! the per-flush modes, the destination runs each flush cycle's records through the datum builder and batch
//! partitioner, and a caller-provided [`BatchSink`] performs the actual `PutMetricData` submission. Connection
//! management, retries, and flush scheduling all live on the sink's side of that seam.
#![deny(warnings)]
#![deny(missing_docs)]

mod config;
pub use self::config::{CloudWatchConfiguration, ConfigError};

mod destination;
pub use self::destination::{BatchSink, CloudWatchDestination, WriteError};
