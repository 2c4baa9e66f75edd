//! Monte Carlo REINFORCE without a baseline.
//!
//! One gradient update per completed episode, using every step of that episode
//! once. Returns are normalized by scale only so their signs are preserved.

use crate::config::Config;
use crate::diagnostics::{Diagnostics, Metric};
use crate::env::StepInfo;
use crate::error::{Result, RlError};
use crate::memory::{compute_returns, Batch, Memory};
use crate::policy::Policy;
use crate::scaler::{Normalizer, Standardizer};
use crate::space::Space;
use tracing::{debug, info};

pub struct Reinforce<P> {
    policy: P,
    discount: f32,
    obs_dim: usize,
    action_shape: Vec<usize>,
    observation_scaler: Standardizer,
    returns_scaler: Normalizer,
    memory: Memory,
}

impl<P: Policy> Reinforce<P> {
    pub fn new(policy: P, observation_space: &Space, action_space: &Space, config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            policy,
            discount: config.discount,
            obs_dim: observation_space.dim(),
            action_shape: action_space.shape().to_vec(),
            observation_scaler: Standardizer::for_space(observation_space, config.observation_scaling),
            returns_scaler: Normalizer::new(config.return_scaling),
            memory: Memory::new(),
        })
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.memory.diagnostics
    }

    /// Clears the trajectory and diagnostics ahead of a new episode.
    pub fn reset(&mut self) {
        self.memory.clear();
    }

    pub fn act(&mut self, observation: &[f32]) -> Result<Vec<f32>> {
        if observation.len() != self.obs_dim {
            return Err(RlError::BatchShape(format!(
                "observation has {} values, expected {}",
                observation.len(),
                self.obs_dim
            )));
        }
        self.observation_scaler.update(observation);
        let scaled = self.observation_scaler.transform(observation);
        let output = self.policy.get_action(&scaled).map_err(RlError::Policy)?;
        let expected: usize = self.action_shape.iter().product();
        if output.action.len() != expected {
            return Err(RlError::InvalidAction { expected, got: output.action.len() });
        }

        let diagnostics = &mut self.memory.diagnostics;
        diagnostics.record_all(Metric::ActionMean, &output.means);
        diagnostics.record_all(Metric::ActionStd, &output.stds);
        diagnostics.record_all(Metric::ScaledObservation, &scaled);
        diagnostics.record_all(Metric::Action, &output.action);
        debug!(?scaled, action = ?output.action, "act");
        Ok(output.action)
    }

    pub fn remember(&mut self, observation: Vec<f32>, action: Vec<f32>, reward: f32, info: StepInfo) {
        self.memory.record(observation, action, reward, info);
    }

    /// Learns from the trajectory recorded since the last reset.
    pub fn learn(&mut self) -> Result<f32> {
        let batch = self.memory.batch();
        self.learn_batch(&batch)
    }

    pub fn learn_batch(&mut self, batch: &Batch) -> Result<f32> {
        let n = batch.rewards.len();
        if n == 0 {
            return Err(RlError::BatchShape("empty batch".into()));
        }
        if batch.observations.len() != n || batch.actions.len() != n {
            return Err(RlError::BatchShape(format!(
                "{} observations, {} actions, {} rewards",
                batch.observations.len(),
                batch.actions.len(),
                n
            )));
        }
        let action_dim: usize = self.action_shape.iter().product();
        if let Some(row) = batch.observations.iter().position(|o| o.len() != self.obs_dim) {
            return Err(RlError::BatchShape(format!(
                "observation {row} has {} values, expected {}",
                batch.observations[row].len(),
                self.obs_dim
            )));
        }
        if let Some(row) = batch.actions.iter().position(|a| a.len() != action_dim) {
            return Err(RlError::BatchShape(format!(
                "action {row} has {} values, expected {}",
                batch.actions[row].len(),
                action_dim
            )));
        }

        let observations = self.observation_scaler.transform_batch(&batch.observations);
        let returns = compute_returns(&batch.rewards, self.discount);
        let returns = self.returns_scaler.transform(&returns);

        let loss = self
            .policy
            .improve(&observations, &batch.actions, &returns)
            .map_err(RlError::Policy)?;
        self.memory.diagnostics.record(Metric::Loss, 0, loss);
        info!("loss is {loss:.8}");
        Ok(loss)
    }
}
