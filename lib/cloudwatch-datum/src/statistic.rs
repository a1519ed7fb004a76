//! Grouping of pre-aggregated statistic fields.
//!
//! When a record's fields carry upstream-aggregated statistics, they arrive flattened into suffixed field names:
//! `latency_max`, `latency_min`, `latency_sum`, `latency_count`. This module rebuilds the grouping: field names are
//! bucketed by their stripped prefix, and each bucket is then classified as either a complete statistic set or a
//! collection of independent scalars. Keeping the classification policy here, in one place, is what makes it testable
//! in isolation.

use indexmap::IndexMap;

use crate::datum::StatisticSet;

/// A recognized statistic component of a pre-aggregated field group.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub(crate) enum StatisticType {
    /// Maximum observed value (`_max`).
    Max,

    /// Minimum observed value (`_min`).
    Min,

    /// Sum of observed values (`_sum`).
    Sum,

    /// Number of observed values (`_count`).
    Count,
}

impl StatisticType {
    /// Returns the suffix name, without the leading underscore.
    pub(crate) fn suffix(self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Min => "min",
            Self::Sum => "sum",
            Self::Count => "count",
        }
    }

    /// Splits a field name into its stripped prefix and statistic type, if the name carries a recognized suffix.
    fn from_field_name(name: &str) -> Option<(&str, Self)> {
        for statistic_type in [Self::Max, Self::Min, Self::Sum, Self::Count] {
            if let Some(prefix) = name.strip_suffix(statistic_type.suffix()) {
                if let Some(prefix) = prefix.strip_suffix('_') {
                    return Some((prefix, statistic_type));
                }
            }
        }
        None
    }
}

/// A classified group of fields from a single record.
#[derive(Debug, PartialEq)]
pub(crate) enum FieldGroup<'a> {
    /// A field with no recognized statistic suffix, emitted as a single scalar datum.
    Scalar {
        /// Original field name.
        field_name: &'a str,

        /// Normalized field value.
        value: f64,
    },

    /// A complete statistic group, emitted as a single statistic-set datum.
    Statistics {
        /// Common field-name prefix of the group.
        prefix: &'a str,

        /// Aggregated values of the group.
        set: StatisticSet,
    },

    /// An incomplete statistic group.
    ///
    /// A group missing any of its four components cannot be represented as a statistic set, so each collected member
    /// falls back to an independent scalar datum under its original, suffixed field name.
    Partial {
        /// Common field-name prefix of the group.
        prefix: &'a str,

        /// Collected members, in field order.
        members: Vec<(StatisticType, f64)>,
    },
}

#[derive(Default)]
struct StatisticBucket {
    max: Option<f64>,
    min: Option<f64>,
    sum: Option<f64>,
    count: Option<f64>,
    members: Vec<(StatisticType, f64)>,
}

impl StatisticBucket {
    fn insert(&mut self, statistic_type: StatisticType, value: f64) {
        let slot = match statistic_type {
            StatisticType::Max => &mut self.max,
            StatisticType::Min => &mut self.min,
            StatisticType::Sum => &mut self.sum,
            StatisticType::Count => &mut self.count,
        };
        *slot = Some(value);
        self.members.push((statistic_type, value));
    }

    fn into_group(self, prefix: &str) -> FieldGroup<'_> {
        match (self.max, self.min, self.sum, self.count) {
            (Some(maximum), Some(minimum), Some(sum), Some(sample_count)) => FieldGroup::Statistics {
                prefix,
                set: StatisticSet::new(maximum, minimum, sum, sample_count),
            },
            _ => FieldGroup::Partial {
                prefix,
                members: self.members,
            },
        }
    }
}

/// Groups normalized fields by statistic prefix and classifies each group.
///
/// Output order is deterministic: groups appear in order of first appearance in the input, with all members of a
/// suffixed group collapsing into the position of its first member.
pub(crate) fn group_fields<'a>(fields: impl IntoIterator<Item = (&'a str, f64)>) -> Vec<FieldGroup<'a>> {
    // First pass: bucket suffixed fields by stripped prefix, remembering the overall field order.
    let mut ordered = Vec::new();
    let mut buckets: IndexMap<&'a str, StatisticBucket> = IndexMap::new();

    for (name, value) in fields {
        match StatisticType::from_field_name(name) {
            Some((prefix, statistic_type)) => {
                ordered.push((prefix, None));
                buckets.entry(prefix).or_default().insert(statistic_type, value);
            }
            None => ordered.push((name, Some(value))),
        }
    }

    // Second pass: classify each bucket at the position of its first member.
    let mut groups = Vec::with_capacity(ordered.len());
    for (name, maybe_value) in ordered {
        match maybe_value {
            Some(value) => groups.push(FieldGroup::Scalar { field_name: name, value }),
            None => {
                if let Some(bucket) = buckets.swap_remove(name) {
                    groups.push(bucket.into_group(name));
                }
            }
        }
    }
    groups
}
