//! The policy capability consumed by the learner, and its two variants.

use crate::config::Config;
use crate::space::Space;
use anyhow::{ensure, Result};
use ml::{policy_gradient_loss, Adam, DiagGaussian, Sequential, Tensor};

/// An action together with the distribution it was drawn from.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionOutput {
    pub action: Vec<f32>,
    /// Per-dimension mean of the action distribution.
    pub means: Vec<f32>,
    /// Per-dimension standard deviation of the action distribution.
    pub stds: Vec<f32>,
}

/// A stochastic policy that can be sampled and improved from returns.
pub trait Policy {
    fn get_action(&mut self, observation: &[f32]) -> Result<ActionOutput>;

    /// One gradient update from a full episode. Returns the loss.
    fn improve(
        &mut self,
        observations: &[Vec<f32>],
        actions: &[Vec<f32>],
        returns: &[f32],
    ) -> Result<f32>;
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn get_action(&mut self, observation: &[f32]) -> Result<ActionOutput> {
        (**self).get_action(observation)
    }

    fn improve(
        &mut self,
        observations: &[Vec<f32>],
        actions: &[Vec<f32>],
        returns: &[f32],
    ) -> Result<f32> {
        (**self).improve(observations, actions, returns)
    }
}

/// Uniform actions within the action-space bounds. Never learns.
pub struct RandomPolicy {
    action_space: Space,
    rng: fastrand::Rng,
}

impl RandomPolicy {
    pub fn new(action_space: Space, seed: u64) -> Self {
        Self { action_space, rng: fastrand::Rng::with_seed(seed) }
    }

    pub fn from_config(action_space: Space, config: &Config) -> Self {
        Self::new(action_space, config.seed.wrapping_add(1))
    }
}

impl Policy for RandomPolicy {
    fn get_action(&mut self, _observation: &[f32]) -> Result<ActionOutput> {
        let low = self.action_space.low();
        let high = self.action_space.high();
        Ok(ActionOutput {
            action: self.action_space.sample(&mut self.rng),
            means: low.iter().zip(high).map(|(l, h)| 0.5 * (l + h)).collect(),
            stds: low.iter().zip(high).map(|(l, h)| (h - l) / 12f32.sqrt()).collect(),
        })
    }

    fn improve(&mut self, _: &[Vec<f32>], _: &[Vec<f32>], _: &[f32]) -> Result<f32> {
        Ok(0.0)
    }
}

const LOG_STD_MIN: f32 = -5.0;
const LOG_STD_MAX: f32 = 2.0;

/// Diagonal Gaussian policy whose mean and log standard deviation come from a
/// tanh MLP with `2 * action_dim` linear outputs.
pub struct GaussianPolicy {
    net: Sequential,
    optimizer: Adam,
    action_dim: usize,
    rng: fastrand::Rng,
}

impl GaussianPolicy {
    pub fn new(obs_dim: usize, action_dim: usize, hidden: &[usize], learning_rate: f32, seed: u64) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut widths = Vec::with_capacity(hidden.len() + 2);
        widths.push(obs_dim);
        widths.extend_from_slice(hidden);
        widths.push(2 * action_dim);
        let net = Sequential::mlp(&widths, &mut rng);
        Self { net, optimizer: Adam::new(learning_rate), action_dim, rng }
    }

    pub fn from_config(obs_dim: usize, action_dim: usize, config: &Config) -> Self {
        // Offset so the policy stream differs from the episode sampler's.
        Self::new(obs_dim, action_dim, &config.hidden, config.learning_rate, config.seed.wrapping_add(1))
    }

    /// Number of optimizer updates applied so far.
    pub fn updates(&self) -> usize {
        self.optimizer.steps()
    }

    /// Forward pass. Returns the distribution, the raw (unclamped) log-std
    /// outputs, and the activations needed for backprop.
    fn distribution(&self, observation: &[f32]) -> Result<(DiagGaussian, Vec<f32>, Vec<Tensor>)> {
        let x = Tensor::from_vec(vec![observation.len()], observation.to_vec());
        let (out, activations) = self.net.forward(&x)?;
        let d = self.action_dim;
        let mean = out.data[..d].to_vec();
        let raw_log_std = out.data[d..].to_vec();
        let log_std = raw_log_std.iter().map(|l| l.clamp(LOG_STD_MIN, LOG_STD_MAX)).collect();
        Ok((DiagGaussian::new(mean, log_std), raw_log_std, activations))
    }
}

impl Policy for GaussianPolicy {
    fn get_action(&mut self, observation: &[f32]) -> Result<ActionOutput> {
        let (dist, _, _) = self.distribution(observation)?;
        ensure!(dist.mean.iter().all(|m| m.is_finite()), "policy produced a non-finite mean");
        Ok(ActionOutput {
            action: dist.sample(&mut self.rng),
            stds: dist.std(),
            means: dist.mean,
        })
    }

    fn improve(
        &mut self,
        observations: &[Vec<f32>],
        actions: &[Vec<f32>],
        returns: &[f32],
    ) -> Result<f32> {
        let n = returns.len();
        ensure!(n > 0, "cannot improve from an empty batch");
        ensure!(
            observations.len() == n && actions.len() == n,
            "batch lengths differ: {} observations, {} actions, {} returns",
            observations.len(),
            actions.len(),
            n
        );

        let mut grads: Vec<Tensor> =
            self.net.params().iter().map(|p| Tensor::zeros(p.shape.clone())).collect();
        let mut log_probs = Vec::with_capacity(n);
        let d = self.action_dim;

        for ((obs, action), &ret) in observations.iter().zip(actions).zip(returns) {
            ensure!(action.len() == d, "action has {} values, policy emits {}", action.len(), d);
            let (dist, raw_log_std, activations) = self.distribution(obs)?;
            log_probs.push(dist.log_prob(action));

            // d(loss)/d(output) for loss = -mean(log_prob * return).
            let (d_mean, d_log_std) = dist.log_prob_grad(action);
            let k = -ret / n as f32;
            let mut grad_out = Vec::with_capacity(2 * d);
            grad_out.extend(d_mean.iter().map(|g| k * g));
            grad_out.extend(d_log_std.iter().zip(&raw_log_std).map(|(g, raw)| {
                if (LOG_STD_MIN..=LOG_STD_MAX).contains(raw) { k * g } else { 0.0 }
            }));

            let (_, param_grads) = self.net.backward(&activations, &Tensor::from_vec(vec![2 * d], grad_out));
            for (acc, g) in grads.iter_mut().zip(&param_grads) {
                acc.accumulate(g);
            }
        }

        let loss = policy_gradient_loss(&log_probs, returns);
        ensure!(loss.is_finite(), "policy loss is not finite");

        let mut pairs: Vec<(&mut Tensor, &Tensor)> =
            self.net.params_mut().into_iter().zip(grads.iter()).collect();
        self.optimizer.step(&mut pairs);
        Ok(loss)
    }
}
