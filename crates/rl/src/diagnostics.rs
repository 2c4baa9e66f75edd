use serde::Serialize;
use std::collections::BTreeMap;

/// Quantities tracked for introspection during an episode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    ActionMean,
    ActionStd,
    ScaledObservation,
    Action,
    Reward,
    State,
    Loss,
}

/// Per-metric, per-dimension ordered series.
///
/// Recording never fails; a dimension that has not been seen yet is created
/// on first use.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    series: BTreeMap<Metric, Vec<Vec<f32>>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, metric: Metric, dim: usize, value: f32) {
        let dims = self.series.entry(metric).or_default();
        if dims.len() <= dim {
            dims.resize_with(dim + 1, Vec::new);
        }
        dims[dim].push(value);
    }

    /// Records `values[i]` under dimension `i`.
    pub fn record_all(&mut self, metric: Metric, values: &[f32]) {
        for (dim, &v) in values.iter().enumerate() {
            self.record(metric, dim, v);
        }
    }

    pub fn series(&self, metric: Metric, dim: usize) -> &[f32] {
        self.series
            .get(&metric)
            .and_then(|dims| dims.get(dim))
            .map_or(&[][..], Vec::as_slice)
    }

    /// Number of dimensions recorded for `metric`.
    pub fn dims(&self, metric: Metric) -> usize {
        self.series.get(&metric).map_or(0, Vec::len)
    }

    pub fn clear(&mut self) {
        self.series.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
