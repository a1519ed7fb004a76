use serde::{Serialize, Serializer};
use smallvec::SmallVec;
use tracing::trace;

use crate::dimension::{build_dimensions, Dimension, MAX_DIMENSIONS};
use crate::record::{FieldValue, MetricRecord};
use crate::statistic::{group_fields, FieldGroup};

/// Smallest nonzero value magnitude accepted by the `PutMetricData` API.
pub const MIN_ALLOWED_VALUE: f64 = 8.515920e-109;

/// Largest value magnitude accepted by the `PutMetricData` API.
pub const MAX_ALLOWED_VALUE: f64 = 1.174271e+108;

/// Storage resolution of a datum.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StorageResolution {
    /// Standard resolution: datums are stored at 60-second granularity.
    Standard,

    /// High resolution: datums are stored at 1-second granularity.
    High,
}

impl StorageResolution {
    /// Creates a `StorageResolution` from the high-resolution mode flag.
    pub const fn from_high_resolution(high_resolution: bool) -> Self {
        if high_resolution {
            Self::High
        } else {
            Self::Standard
        }
    }

    /// Returns the resolution as its wire value, in seconds.
    pub const fn as_secs(self) -> i32 {
        match self {
            Self::Standard => 60,
            Self::High => 1,
        }
    }
}

impl Serialize for StorageResolution {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i32(self.as_secs())
    }
}

/// A pre-aggregated statistic set: the summary shape accepted by `PutMetricData` in place of a raw value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatisticSet {
    maximum: f64,
    minimum: f64,
    sum: f64,
    sample_count: f64,
}

impl StatisticSet {
    /// Creates a new `StatisticSet` from the given aggregated values.
    pub const fn new(maximum: f64, minimum: f64, sum: f64, sample_count: f64) -> Self {
        Self {
            maximum,
            minimum,
            sum,
            sample_count,
        }
    }

    /// Returns the maximum observed value.
    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    /// Returns the minimum observed value.
    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    /// Returns the sum of observed values.
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Returns the number of observed values.
    pub fn sample_count(&self) -> f64 {
        self.sample_count
    }
}

/// The measurement carried by a datum.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum DatumValue {
    /// A single scalar value.
    #[serde(rename = "Value")]
    Single(f64),

    /// A pre-aggregated statistic set.
    #[serde(rename = "StatisticValues")]
    Statistics(StatisticSet),
}

/// A single dimensioned datum, shaped for submission via `PutMetricData`.
///
/// Datums are ephemeral: they are created fresh from a record on every flush, handed to the transport, and never
/// persisted. Serialization follows the CloudWatch schema field names.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricDatum {
    metric_name: String,
    timestamp: i64,
    storage_resolution: StorageResolution,
    #[serde(skip_serializing_if = "SmallVec::is_empty")]
    dimensions: SmallVec<[Dimension; MAX_DIMENSIONS]>,
    #[serde(flatten)]
    value: DatumValue,
}

impl MetricDatum {
    /// Returns the name of the datum.
    pub fn metric_name(&self) -> &str {
        &self.metric_name
    }

    /// Returns the timestamp of the datum, as Unix seconds.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Returns the storage resolution of the datum.
    pub fn storage_resolution(&self) -> StorageResolution {
        self.storage_resolution
    }

    /// Returns the dimensions of the datum.
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Returns the measurement carried by the datum.
    pub fn value(&self) -> &DatumValue {
        &self.value
    }
}

/// Builds CloudWatch datums from metric records.
///
/// The builder carries the two per-flush modes: statistic mode, which controls whether suffixed field names
/// (`_max`/`_min`/`_sum`/`_count`) are reassembled into statistic sets, and the storage resolution applied to every
/// emitted datum.
///
/// Building never fails. Fields whose values cannot be represented as a CloudWatch value — text, NaN, infinities, and
/// nonzero magnitudes outside of [`MIN_ALLOWED_VALUE`]..=[`MAX_ALLOWED_VALUE`] — are skipped individually, so a record
/// may yield fewer datums than it has fields, down to none at all.
#[derive(Clone, Copy, Debug)]
pub struct DatumBuilder {
    statistic_mode: bool,
    resolution: StorageResolution,
}

impl DatumBuilder {
    /// Creates a new `DatumBuilder` from the statistic-mode and high-resolution flags.
    pub const fn new(statistic_mode: bool, high_resolution: bool) -> Self {
        Self {
            statistic_mode,
            resolution: StorageResolution::from_high_resolution(high_resolution),
        }
    }

    /// Builds the datums for a single record.
    ///
    /// Every emitted datum carries the record's timestamp, the builder's storage resolution, and the dimension list
    /// derived from the record's tags. Scalar datums are named `<record>_<field>`; statistic-set datums are named
    /// `<record>_<prefix>`.
    pub fn build(&self, record: &MetricRecord) -> Vec<MetricDatum> {
        let dimensions = build_dimensions(record.tags());

        // Normalize the dynamically-typed fields once, up front. Fields without a representable value are dropped
        // here and never reach grouping.
        let fields = record
            .fields()
            .iter()
            .filter_map(|(name, value)| convert(name, value).map(|v| (name.as_str(), v)))
            .collect::<Vec<_>>();

        let mut datums = Vec::with_capacity(fields.len());
        if self.statistic_mode {
            for group in group_fields(fields) {
                match group {
                    FieldGroup::Scalar { field_name, value } => {
                        datums.push(self.datum(record, &dimensions, field_name, DatumValue::Single(value)));
                    }
                    FieldGroup::Statistics { prefix, set } => {
                        datums.push(self.datum(record, &dimensions, prefix, DatumValue::Statistics(set)));
                    }
                    FieldGroup::Partial { prefix, members } => {
                        // Not enough components for a statistic set, so each member stands alone again under its
                        // original, suffixed field name.
                        for (statistic_type, value) in members {
                            let field_name = format!("{}_{}", prefix, statistic_type.suffix());
                            datums.push(self.datum(record, &dimensions, &field_name, DatumValue::Single(value)));
                        }
                    }
                }
            }
        } else {
            for (field_name, value) in fields {
                datums.push(self.datum(record, &dimensions, field_name, DatumValue::Single(value)));
            }
        }
        datums
    }

    fn datum(
        &self, record: &MetricRecord, dimensions: &SmallVec<[Dimension; MAX_DIMENSIONS]>, field_name: &str,
        value: DatumValue,
    ) -> MetricDatum {
        MetricDatum {
            metric_name: format!("{}_{}", record.name(), field_name),
            timestamp: record.timestamp(),
            storage_resolution: self.resolution,
            dimensions: dimensions.clone(),
            value,
        }
    }
}

fn convert(field_name: &str, value: &FieldValue) -> Option<f64> {
    let value = match value.as_f64() {
        Some(value) => value,
        None => {
            trace!(field = field_name, "Skipping field with no numeric representation.");
            return None;
        }
    };

    if value != 0.0 && (value.abs() < MIN_ALLOWED_VALUE || value.abs() > MAX_ALLOWED_VALUE) {
        trace!(
            field = field_name,
            value,
            "Skipping field value outside of the accepted CloudWatch range."
        );
        return None;
    }

    Some(value)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{DatumBuilder, DatumValue, StatisticSet, StorageResolution};
    use crate::record::{FieldValue, MetricRecord};

    const TEST_TIMESTAMP: i64 = 1257894000;

    fn test_record<V: Into<FieldValue>>(value: V) -> MetricRecord {
        MetricRecord::new("test1", TEST_TIMESTAMP)
            .with_tag("tag1", "value1")
            .with_field("value", value)
    }

    #[test]
    fn valid_values_create_one_datum() {
        let valid: Vec<FieldValue> = vec![
            1i64.into(),
            1u64.into(),
            1.0.into(),
            0.0.into(),
            // The CloudWatch documentation does not call out -0 as rejected.
            (-0.0).into(),
            8.515920e-109.into(),
            1.174271e+108.into(),
            true.into(),
        ];

        let builder = DatumBuilder::new(false, false);
        for value in valid {
            let record = test_record(value.clone());
            let datums = builder.build(&record);
            assert_eq!(1, datums.len(), "valid value should create a datum: {:?}", value);
        }
    }

    #[test]
    fn invalid_values_create_no_datum() {
        let invalid: Vec<FieldValue> = vec![
            "Foo".into(),
            f64::NAN.into(),
            f64::INFINITY.into(),
            f64::NEG_INFINITY.into(),
            // Just outside of the accepted magnitude range on both ends.
            8.515919e-109.into(),
            1.174272e+108.into(),
        ];

        let builder = DatumBuilder::new(false, false);
        for value in invalid {
            let record = test_record(value.clone());
            let datums = builder.build(&record);
            assert_eq!(0, datums.len(), "invalid value should not create a datum: {:?}", value);
        }
    }

    #[test]
    fn boolean_values() {
        let builder = DatumBuilder::new(false, false);

        let datums = builder.build(&test_record(true));
        assert_eq!(&DatumValue::Single(1.0), datums[0].value());

        let datums = builder.build(&test_record(false));
        assert_eq!(&DatumValue::Single(0.0), datums[0].value());
    }

    #[test]
    fn scalar_datum_shape() {
        let builder = DatumBuilder::new(false, false);
        let datums = builder.build(&test_record(42i64));

        assert_eq!(1, datums.len());
        let datum = &datums[0];
        assert_eq!("test1_value", datum.metric_name());
        assert_eq!(TEST_TIMESTAMP, datum.timestamp());
        assert_eq!(&DatumValue::Single(42.0), datum.value());
        assert_eq!(1, datum.dimensions().len());
        assert_eq!("tag1", datum.dimensions()[0].name());
        assert_eq!("value1", datum.dimensions()[0].value());
    }

    #[test]
    fn statistic_fields_build_one_statistic_datum() {
        let record = MetricRecord::new("test1", TEST_TIMESTAMP)
            .with_tag("tag1", "value1")
            .with_field("value_max", 10.0)
            .with_field("value_min", 0.0)
            .with_field("value_sum", 100.0)
            .with_field("value_count", 20.0);

        let datums = DatumBuilder::new(true, false).build(&record);

        assert_eq!(1, datums.len());
        assert_eq!("test1_value", datums[0].metric_name());
        assert_eq!(
            &DatumValue::Statistics(StatisticSet::new(10.0, 0.0, 100.0, 20.0)),
            datums[0].value()
        );
    }

    #[test]
    fn unsuffixed_fields_build_independent_datums_in_statistic_mode() {
        let record = MetricRecord::new("test1", TEST_TIMESTAMP)
            .with_tag("tag1", "value1")
            .with_field("valueA", 10.0)
            .with_field("valueB", 0.0)
            .with_field("valueC", 100.0)
            .with_field("valueD", 20.0);

        let datums = DatumBuilder::new(true, false).build(&record);
        assert_eq!(4, datums.len());
    }

    #[test]
    fn mixed_statistic_and_scalar_fields() {
        // Two complete statistic groups, one incomplete group (no count), and two plain scalars. The incomplete group
        // cannot be represented as a statistic set, so its three members are emitted as independent scalars: seven
        // datums in total.
        let record = MetricRecord::new("test1", TEST_TIMESTAMP)
            .with_tag("tag1", "value1")
            .with_field("valueA_max", 10.0)
            .with_field("valueA_min", 0.0)
            .with_field("valueA_sum", 100.0)
            .with_field("valueA_count", 20.0)
            .with_field("valueB_max", 10.0)
            .with_field("valueB_min", 0.0)
            .with_field("valueB_sum", 100.0)
            .with_field("valueB_count", 20.0)
            .with_field("valueC_max", 10.0)
            .with_field("valueC_min", 0.0)
            .with_field("valueC_sum", 100.0)
            .with_field("valueD", 10.0)
            .with_field("valueE", 0.0);

        let datums = DatumBuilder::new(true, false).build(&record);
        assert_eq!(7, datums.len());

        let names = datums.iter().map(|d| d.metric_name()).collect::<Vec<_>>();
        assert_eq!(
            vec![
                "test1_valueA",
                "test1_valueB",
                "test1_valueC_max",
                "test1_valueC_min",
                "test1_valueC_sum",
                "test1_valueD",
                "test1_valueE",
            ],
            names
        );
    }

    #[test]
    fn suffixed_fields_stay_scalar_outside_statistic_mode() {
        let record = MetricRecord::new("test1", TEST_TIMESTAMP)
            .with_field("value_max", 10.0)
            .with_field("value_min", 0.0);

        let datums = DatumBuilder::new(false, false).build(&record);

        assert_eq!(2, datums.len());
        assert_eq!("test1_value_max", datums[0].metric_name());
        assert_eq!("test1_value_min", datums[1].metric_name());
    }

    #[test]
    fn storage_resolution_follows_high_resolution_flag() {
        let record = test_record(1i64);

        let standard = DatumBuilder::new(false, false).build(&record);
        assert_eq!(60, standard[0].storage_resolution().as_secs());
        assert_eq!(StorageResolution::Standard, standard[0].storage_resolution());

        let high = DatumBuilder::new(false, true).build(&record);
        assert_eq!(1, high[0].storage_resolution().as_secs());
        assert_eq!(StorageResolution::High, high[0].storage_resolution());
    }

    #[test]
    fn empty_tag_values_excluded_from_dimensions() {
        let record = MetricRecord::new("cpu", 0)
            .with_tag("host", "example.org")
            .with_tag("foo", "")
            .with_field("value", 42i64);

        let datums = DatumBuilder::new(true, false).build(&record);

        assert_eq!(1, datums[0].dimensions().len());
        assert_eq!("host", datums[0].dimensions()[0].name());
    }

    #[test]
    fn serialized_shape_matches_cloudwatch_schema() {
        let builder = DatumBuilder::new(false, false);
        let datums = builder.build(&test_record(1.5));

        let expected = json!({
            "MetricName": "test1_value",
            "Timestamp": TEST_TIMESTAMP,
            "StorageResolution": 60,
            "Dimensions": [{ "Name": "tag1", "Value": "value1" }],
            "Value": 1.5,
        });
        assert_eq!(expected, serde_json::to_value(&datums[0]).unwrap());

        let record = MetricRecord::new("test1", TEST_TIMESTAMP)
            .with_field("value_max", 10.0)
            .with_field("value_min", 0.0)
            .with_field("value_sum", 100.0)
            .with_field("value_count", 20.0);
        let datums = DatumBuilder::new(true, true).build(&record);

        let expected = json!({
            "MetricName": "test1_value",
            "Timestamp": TEST_TIMESTAMP,
            "StorageResolution": 1,
            "StatisticValues": {
                "Maximum": 10.0,
                "Minimum": 0.0,
                "Sum": 100.0,
                "SampleCount": 20.0,
            },
        });
        assert_eq!(expected, serde_json::to_value(&datums[0]).unwrap());
    }
}
