use indexmap::IndexMap;

/// A single field value carried by a metric record.
///
/// Upstream pipelines deliver field values as a dynamically-typed union. That union is captured here as a tagged
/// variant so that type dispatch happens exactly once, at the boundary: [`FieldValue::as_f64`] normalizes a value into
/// the 64-bit float domain that all downstream datum logic operates on.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// A 64-bit floating-point value.
    Float(f64),

    /// A signed integer value.
    SignedInt(i64),

    /// An unsigned integer value.
    UnsignedInt(u64),

    /// A boolean value.
    Boolean(bool),

    /// A text value.
    ///
    /// Text fields have no numeric representation and never produce a datum.
    Text(String),
}

impl FieldValue {
    /// Returns the value as a finite 64-bit float, if it has one.
    ///
    /// Booleans convert to 1.0 (true) or 0.0 (false), and integers convert exactly. Text values, as well as NaN and
    /// infinite floats, have no representation and return `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(value) => value.is_finite().then_some(*value),
            Self::SignedInt(value) => Some(*value as f64),
            Self::UnsignedInt(value) => Some(*value as f64),
            Self::Boolean(value) => Some(if *value { 1.0 } else { 0.0 }),
            Self::Text(_) => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::SignedInt(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::UnsignedInt(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A metric record.
///
/// Records are the input unit of the transformation core: a name, a tag map, a field map, and a timestamp, as produced
/// by an upstream metrics pipeline. Records are read-only to this crate, and both maps preserve insertion order so
/// that datum output order is deterministic for a given record.
#[derive(Clone, Debug)]
pub struct MetricRecord {
    name: String,
    tags: IndexMap<String, String>,
    fields: IndexMap<String, FieldValue>,
    timestamp: i64,
}

impl MetricRecord {
    /// Creates a new `MetricRecord` with the given name and timestamp, and no tags or fields.
    pub fn new<S: Into<String>>(name: S, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            tags: IndexMap::new(),
            fields: IndexMap::new(),
            timestamp,
        }
    }

    /// Adds a tag to the record.
    ///
    /// If the tag key is already present, its value is replaced.
    pub fn with_tag<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Adds a field to the record.
    ///
    /// If the field name is already present, its value is replaced.
    pub fn with_field<K, V>(mut self, name: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns the name of the record.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a reference to the record's tags.
    pub fn tags(&self) -> &IndexMap<String, String> {
        &self.tags
    }

    /// Returns a reference to the record's fields.
    pub fn fields(&self) -> &IndexMap<String, FieldValue> {
        &self.fields
    }

    /// Returns the timestamp of the record, as Unix seconds.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}
