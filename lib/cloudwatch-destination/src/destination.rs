use async_trait::async_trait;
use cloudwatch_datum::{partition_datums, DatumBuilder, MetricDatum, MetricRecord};
use snafu::Snafu;
use tracing::{debug, error};

use crate::config::{CloudWatchConfiguration, ConfigError};

/// A write error.
#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)))]
pub enum WriteError<E>
where
    E: std::error::Error + 'static,
{
    /// A batch submission failed.
    #[snafu(display("Failed to submit datum batch {index} of {total}."))]
    SubmitBatch {
        /// Zero-based index of the failed batch.
        index: usize,

        /// Total number of batches in the flush.
        total: usize,

        /// Underlying sink error.
        source: E,
    },
}

/// Transport seam for submitting datum batches.
///
/// Each call corresponds to exactly one `PutMetricData` request. Implementations own everything this crate does not:
/// the client session, request signing, retries, and timeouts.
#[async_trait]
pub trait BatchSink {
    /// Error type returned by the sink.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Submits one batch of datums under the given namespace.
    async fn send_batch(&mut self, namespace: &str, batch: &[MetricDatum]) -> Result<(), Self::Error>;
}

/// CloudWatch metrics destination.
///
/// Drives one flush cycle at a time: records are converted to datums, the datums are partitioned into batches no
/// larger than the configured per-call limit, and each batch is handed to the sink in order. The destination holds no
/// state between flushes.
pub struct CloudWatchDestination {
    namespace: String,
    datum_builder: DatumBuilder,
    max_datums_per_call: usize,
}

impl CloudWatchDestination {
    /// Creates a new `CloudWatchDestination` from the given configuration.
    ///
    /// ## Errors
    ///
    /// If the configuration is invalid, an error is returned.
    pub fn from_configuration(config: &CloudWatchConfiguration) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            namespace: config.namespace().to_string(),
            datum_builder: DatumBuilder::new(config.write_statistics(), config.high_resolution_metrics()),
            max_datums_per_call: config.max_datums_per_call(),
        })
    }

    /// Builds the datums for a full flush cycle's worth of records.
    ///
    /// Records that produce no valid datums simply contribute nothing; the output preserves record order.
    pub fn build_datums(&self, records: &[MetricRecord]) -> Vec<MetricDatum> {
        records.iter().flat_map(|record| self.datum_builder.build(record)).collect()
    }

    /// Runs one flush cycle, submitting every batch to the sink in order.
    ///
    /// ## Errors
    ///
    /// If the sink fails to submit a batch, the flush is aborted and the error is returned. Batches already submitted
    /// are not rolled back.
    pub async fn write<S>(&self, records: &[MetricRecord], sink: &mut S) -> Result<(), WriteError<S::Error>>
    where
        S: BatchSink + Send,
    {
        let datums = self.build_datums(records);
        if datums.is_empty() {
            debug!("No valid datums in flush cycle, nothing to submit.");
            return Ok(());
        }

        let batches = partition_datums(self.max_datums_per_call, &datums);
        let total = batches.len();

        for (index, batch) in batches.into_iter().enumerate() {
            debug!(batch_len = batch.len(), index, total, "Submitting datum batch.");

            if let Err(source) = sink.send_batch(&self.namespace, batch).await {
                error!(error = %source, index, total, "Failed to submit datum batch.");
                return Err(WriteError::SubmitBatch { index, total, source });
            }
        }

        Ok(())
    }
}
