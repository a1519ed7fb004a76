use serde::Deserialize;
use snafu::{ensure, Snafu};

const fn default_max_datums_per_call() -> usize {
    20
}

/// A configuration error.
#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)))]
pub enum ConfigError {
    /// Namespace was empty.
    #[snafu(display("'namespace' must be set to a non-empty string."))]
    EmptyNamespace,

    /// Batch size was zero.
    #[snafu(display("'max_datums_per_call' must be greater than zero."))]
    ZeroBatchSize,
}

/// CloudWatch metrics destination configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct CloudWatchConfiguration {
    /// CloudWatch namespace that all emitted datums are published under.
    ///
    /// Required, and must be non-empty.
    namespace: String,

    /// Whether to interpret suffixed fields (`_max`/`_min`/`_sum`/`_count`) as pre-aggregated statistic sets.
    ///
    /// When enabled, a field group carrying all four suffixes for a common prefix is published as a single
    /// statistic-set datum instead of four independent scalar datums. Aggregation itself is expected to have happened
    /// upstream.
    ///
    /// Defaults to false.
    #[serde(default)]
    write_statistics: bool,

    /// Whether to publish datums at high (1-second) storage resolution instead of standard (60-second).
    ///
    /// Defaults to false.
    #[serde(default)]
    high_resolution_metrics: bool,

    /// Maximum number of datums sent in a single `PutMetricData` call.
    ///
    /// The API itself caps this at 1,000 datums (and 1 MB) per request; the conservative default matches the
    /// historical limit of 20.
    #[serde(default = "default_max_datums_per_call")]
    max_datums_per_call: usize,
}

impl CloudWatchConfiguration {
    /// Validates the configuration.
    ///
    /// Catching a zero batch size here is what lets the batch partitioner assume a positive size downstream.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure!(!self.namespace.is_empty(), EmptyNamespace);
        ensure!(self.max_datums_per_call > 0, ZeroBatchSize);
        Ok(())
    }

    /// Returns the configured namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns whether statistic-set interpretation is enabled.
    pub fn write_statistics(&self) -> bool {
        self.write_statistics
    }

    /// Returns whether high-resolution storage is enabled.
    pub fn high_resolution_metrics(&self) -> bool {
        self.high_resolution_metrics
    }

    /// Returns the maximum number of datums per `PutMetricData` call.
    pub fn max_datums_per_call(&self) -> usize {
        self.max_datums_per_call
    }
}
