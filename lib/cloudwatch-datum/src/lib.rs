//! Transformation core for emitting metrics to Amazon CloudWatch.
//!
//! This crate maps an open-ended, dynamically-typed metric model — named records carrying string tags and arbitrarily
//! typed fields — onto the rigid schema accepted by the `PutMetricData` API: dimensioned numeric datums with a bounded
//! value range, a bounded dimension count, and a hard per-request cardinality limit.
//!
//! ## Structure
//!
//! The crate is split into three pure components, composed by the caller once per flush cycle:
//!
//! - the dimension builder ([`build_dimensions`]) converts a record's tag set into an ordered, capped dimension list;
//! - the datum builder ([`DatumBuilder`]) converts one record into zero or more datums, normalizing field values and
//!   optionally interpreting suffixed fields as pre-aggregated statistic sets;
//! - the batch partitioner ([`partition_datums`]) slices the accumulated datums into request-sized batches.
//!
//! All components are stateless and infallible: fields that cannot be represented as a CloudWatch value are silently
//! skipped rather than failing the flush, so one bad field never blocks the rest of the metric.
#![deny(warnings)]
#![deny(missing_docs)]

mod record;
pub use self::record::{FieldValue, MetricRecord};

mod dimension;
pub use self::dimension::{build_dimensions, Dimension, MAX_DIMENSIONS};

mod datum;
pub use self::datum::{
    DatumBuilder, DatumValue, MetricDatum, StatisticSet, StorageResolution, MAX_ALLOWED_VALUE, MIN_ALLOWED_VALUE,
};

mod statistic;

mod partition;
pub use self::partition::partition_datums;
