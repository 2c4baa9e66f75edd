use crate::diagnostics::Diagnostics;
use crate::env::StepInfo;

/// One recorded environment step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepRecord {
    pub observation: Vec<f32>,
    pub action: Vec<f32>,
    pub reward: f32,
    pub info: StepInfo,
}

/// A full-episode batch handed to the learner.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Batch {
    pub observations: Vec<Vec<f32>>,
    pub actions: Vec<Vec<f32>>,
    pub rewards: Vec<f32>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}

/// Trajectory of the current episode plus the agent-side diagnostics.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    steps: Vec<StepRecord>,
    pub diagnostics: Diagnostics,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, observation: Vec<f32>, action: Vec<f32>, reward: f32, info: StepInfo) {
        self.steps.push(StepRecord { observation, action, reward, info });
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn rewards(&self) -> Vec<f32> {
        self.steps.iter().map(|s| s.reward).collect()
    }

    pub fn batch(&self) -> Batch {
        Batch {
            observations: self.steps.iter().map(|s| s.observation.clone()).collect(),
            actions: self.steps.iter().map(|s| s.action.clone()).collect(),
            rewards: self.rewards(),
        }
    }

    pub fn clear(&mut self) {
        self.steps.clear();
        self.diagnostics.clear();
    }
}

/// Monte Carlo discounted returns: `G[t] = r[t] + discount * G[t+1]`, with
/// `G[T-1] = r[T-1]`.
pub fn compute_returns(rewards: &[f32], discount: f32) -> Vec<f32> {
    let mut returns = vec![0.0; rewards.len()];
    let mut running = 0.0;
    for (g, &r) in returns.iter_mut().zip(rewards).rev() {
        running = r + discount * running;
        *g = running;
    }
    returns
}
