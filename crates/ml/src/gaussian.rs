use std::f32::consts::PI;

/// Diagonal Gaussian parameterised by per-dimension mean and log standard
/// deviation.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagGaussian {
    pub mean: Vec<f32>,
    pub log_std: Vec<f32>,
}

impl DiagGaussian {
    #[must_use]
    pub fn new(mean: Vec<f32>, log_std: Vec<f32>) -> Self {
        assert_eq!(mean.len(), log_std.len());
        Self { mean, log_std }
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn std(&self) -> Vec<f32> {
        self.log_std.iter().map(|l| l.exp()).collect()
    }

    pub fn sample(&self, rng: &mut fastrand::Rng) -> Vec<f32> {
        self.mean
            .iter()
            .zip(&self.log_std)
            .map(|(m, l)| m + l.exp() * standard_normal(rng))
            .collect()
    }

    pub fn log_prob(&self, action: &[f32]) -> f32 {
        action
            .iter()
            .zip(self.mean.iter().zip(&self.log_std))
            .map(|(a, (m, l))| {
                let z = (a - m) / l.exp();
                -0.5 * z * z - l - 0.5 * (2.0 * PI).ln()
            })
            .sum()
    }

    /// Gradient of [`DiagGaussian::log_prob`] with respect to `(mean, log_std)`.
    pub fn log_prob_grad(&self, action: &[f32]) -> (Vec<f32>, Vec<f32>) {
        let mut d_mean = Vec::with_capacity(self.dim());
        let mut d_log_std = Vec::with_capacity(self.dim());
        for (a, (m, l)) in action.iter().zip(self.mean.iter().zip(&self.log_std)) {
            let var = (2.0 * l).exp();
            let diff = a - m;
            d_mean.push(diff / var);
            d_log_std.push(diff * diff / var - 1.0);
        }
        (d_mean, d_log_std)
    }
}

/// Box-Muller draw from N(0, 1).
pub fn standard_normal(rng: &mut fastrand::Rng) -> f32 {
    // f32() is in [0, 1); keep u1 away from zero for the log.
    let u1 = rng.f32().max(f32::MIN_POSITIVE);
    let u2 = rng.f32();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}
