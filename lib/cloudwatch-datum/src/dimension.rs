use indexmap::IndexMap;
use serde::Serialize;
use smallvec::SmallVec;

/// Maximum number of dimensions that can accompany a single datum.
///
/// This is a hard limit imposed by the `PutMetricData` API.
pub const MAX_DIMENSIONS: usize = 10;

/// A single CloudWatch dimension: a name/value pair that qualifies a datum.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dimension {
    name: String,
    value: String,
}

impl Dimension {
    /// Creates a new `Dimension` from the given name and value.
    pub fn new<N, V>(name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns the name of the dimension.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value of the dimension.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Builds the dimension list for a metric's tag set.
///
/// Tag keys are sorted lexicographically before conversion, so the output is deterministic regardless of the map's
/// iteration order. Tags with an empty value are skipped entirely and do not count toward the cap. After sorting and
/// filtering, only the first [`MAX_DIMENSIONS`] entries are retained: truncation is silent, and the
/// lexicographically-earliest tags win.
pub fn build_dimensions(tags: &IndexMap<String, String>) -> SmallVec<[Dimension; MAX_DIMENSIONS]> {
    let mut entries = tags
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .collect::<Vec<_>>();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    entries
        .into_iter()
        .take(MAX_DIMENSIONS)
        .map(|(key, value)| Dimension::new(key, value))
        .collect()
}
