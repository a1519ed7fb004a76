use crate::datum::MetricDatum;

/// Partitions a datum sequence into request-sized batches.
///
/// Each returned batch is a view over the input: concatenating the batches in order reproduces the input exactly, with
/// no datum duplicated or dropped. Every batch except the last holds exactly `max_datums_per_call` datums, and the
/// last holds the remainder. An empty input yields no batches at all.
///
/// `max_datums_per_call` must be nonzero; configuration validation enforces this before datums are ever built.
pub fn partition_datums(max_datums_per_call: usize, datums: &[MetricDatum]) -> Vec<&[MetricDatum]> {
    if datums.is_empty() {
        return Vec::new();
    }

    datums.chunks(max_datums_per_call).collect()
}
