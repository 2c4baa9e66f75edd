//! Feature scaling for observations and returns.

use crate::config::{ObservationScaling, ReturnScaling};
use crate::space::Space;

const MIN_SCALE: f32 = 1e-8;

fn usable(scale: f32) -> f32 {
    if scale.is_finite() && scale > MIN_SCALE {
        scale
    } else {
        1.0
    }
}

fn standardize(x: &[f32], mean: &[f32], std: &[f32]) -> Vec<f32> {
    x.iter()
        .zip(mean.iter().zip(std))
        .map(|(v, (m, s))| (v - m) / usable(*s))
        .collect()
}

/// Welford running mean and variance per feature.
#[derive(Clone, Debug, Default)]
pub struct RunningStats {
    count: u64,
    mean: Vec<f64>,
    m2: Vec<f64>,
}

impl RunningStats {
    pub fn new(dim: usize) -> Self {
        Self { count: 0, mean: vec![0.0; dim], m2: vec![0.0; dim] }
    }

    pub fn update(&mut self, x: &[f32]) {
        self.count += 1;
        let n = self.count as f64;
        for ((mean, m2), &v) in self.mean.iter_mut().zip(self.m2.iter_mut()).zip(x) {
            let v = f64::from(v);
            let delta = v - *mean;
            *mean += delta / n;
            *m2 += delta * (v - *mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> Vec<f32> {
        self.mean.iter().map(|&m| m as f32).collect()
    }

    /// Population standard deviation, zero before two samples.
    pub fn std(&self) -> Vec<f32> {
        if self.count < 2 {
            return vec![0.0; self.m2.len()];
        }
        let n = self.count as f64;
        self.m2.iter().map(|&m2| (m2 / n).sqrt() as f32).collect()
    }
}

/// Zero-centres and unit-scales observation features: `z = (x - mean) / std`.
#[derive(Clone, Debug)]
pub enum Standardizer {
    /// Statistics of a uniform distribution over the space bounds.
    Bounds { mean: Vec<f32>, std: Vec<f32> },
    /// Statistics accumulated from every observation passed to `update`.
    Running(RunningStats),
}

impl Standardizer {
    pub fn from_bounds(low: &[f32], high: &[f32]) -> Self {
        let mean = low.iter().zip(high).map(|(l, h)| 0.5 * (l + h)).collect();
        let std = low
            .iter()
            .zip(high)
            .map(|(l, h)| usable((h - l) / 12f32.sqrt()))
            .collect();
        Self::Bounds { mean, std }
    }

    pub fn running(dim: usize) -> Self {
        Self::Running(RunningStats::new(dim))
    }

    pub fn for_space(space: &Space, mode: ObservationScaling) -> Self {
        match mode {
            ObservationScaling::Bounds => Self::from_bounds(space.low(), space.high()),
            ObservationScaling::Running => Self::running(space.dim()),
        }
    }

    /// Folds `x` into the running statistics. No-op for bounds scaling.
    pub fn update(&mut self, x: &[f32]) {
        if let Self::Running(stats) = self {
            stats.update(x);
        }
    }

    pub fn transform(&self, x: &[f32]) -> Vec<f32> {
        match self {
            Self::Bounds { mean, std } => standardize(x, mean, std),
            Self::Running(stats) => standardize(x, &stats.mean(), &stats.std()),
        }
    }

    pub fn transform_batch(&self, rows: &[Vec<f32>]) -> Vec<Vec<f32>> {
        rows.iter().map(|r| self.transform(r)).collect()
    }
}

/// Scale-only normalization of a return series: `z = x / scale`.
///
/// The mean is never subtracted, so the sign of every return survives.
#[derive(Clone, Debug)]
pub enum Normalizer {
    /// Scale is the standard deviation of each batch on its own.
    Batch,
    /// Scale is the standard deviation of every value seen so far.
    Running(RunningStats),
}

impl Normalizer {
    pub fn new(mode: ReturnScaling) -> Self {
        match mode {
            ReturnScaling::Batch => Self::Batch,
            ReturnScaling::Running => Self::Running(RunningStats::new(1)),
        }
    }

    /// Population standard deviation of `values`, or 1.0 when it is zero.
    pub fn batch_scale(values: &[f32]) -> f32 {
        if values.is_empty() {
            return 1.0;
        }
        let n = values.len() as f32;
        let mean = values.iter().sum::<f32>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
        usable(var.sqrt())
    }

    pub fn transform(&mut self, values: &[f32]) -> Vec<f32> {
        let scale = match self {
            Self::Batch => Self::batch_scale(values),
            Self::Running(stats) => {
                for &v in values {
                    stats.update(&[v]);
                }
                usable(stats.std()[0])
            }
        };
        values.iter().map(|v| v / scale).collect()
    }
}
