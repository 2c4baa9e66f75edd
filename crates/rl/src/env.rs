//! The episode state machine over a windowed time-series table.

use crate::config::Config;
use crate::diagnostics::{Diagnostics, Metric};
use crate::error::{Result, RlError};
use crate::sampler::{self, Sampler};
use crate::space::{Space, Table, Window};
use std::sync::Arc;
use tracing::debug;

/// Reinforcement learning environment.
///
/// Each call to [`step`] advances the episode by one action and returns the
/// next observation, the reward, whether the episode has terminated, and a
/// small per-step info record.
///
/// [`step`]: Env::step
pub trait Env {
    /// Starts a new episode and returns its first observation.
    fn reset(&mut self) -> Result<Vec<f32>>;

    fn step(&mut self, action: &[f32]) -> Result<Transition>;

    fn observation_space(&self) -> &Space;

    fn action_space(&self) -> &Space;

    /// Size of the observation vector.
    fn obs_size(&self) -> usize {
        self.observation_space().dim()
    }

    /// Size of the action vector.
    fn action_size(&self) -> usize {
        self.action_space().dim()
    }
}

/// Domain-specific reward model applied at every step.
pub trait Dynamics {
    /// Called at the start of every episode.
    fn reset(&mut self) {}

    /// Reward for taking `action` while the world is in `state`.
    fn transition(&mut self, state: &[f32], action: &[f32]) -> anyhow::Result<f32>;
}

impl<F> Dynamics for F
where
    F: FnMut(&[f32], &[f32]) -> anyhow::Result<f32>,
{
    fn transition(&mut self, state: &[f32], action: &[f32]) -> anyhow::Result<f32> {
        self(state, action)
    }
}

/// Per-step bookkeeping returned alongside each transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepInfo {
    /// Step counter within the episode, starting at 0.
    pub step: usize,
    /// Absolute row of the state table the step was taken on.
    pub index: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub observation: Vec<f32>,
    pub reward: f32,
    pub done: bool,
    pub info: StepInfo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Ready,
    Done,
}

/// Steps through a window of historical state and observation rows.
pub struct TimeSeriesEnv<D> {
    state_space: Space,
    observation_space: Space,
    action_space: Space,
    sampler: Box<dyn Sampler>,
    dynamics: D,
    episode_length: usize,
    window: Option<Window>,
    steps: usize,
    phase: Phase,
    info: Diagnostics,
}

impl<D: Dynamics> TimeSeriesEnv<D> {
    /// `episode_length == 0` uses the whole state table; longer requests are
    /// clamped to it.
    pub fn new(
        state: Arc<Table>,
        observation: Arc<Table>,
        action_space: Space,
        dynamics: D,
        sampler: Box<dyn Sampler>,
        episode_length: usize,
    ) -> Result<Self> {
        if state.is_empty() {
            return Err(RlError::Configuration("state table is empty".into()));
        }
        if action_space.dim() == 0 {
            return Err(RlError::Configuration("action space has no dimensions".into()));
        }
        let table_length = state.len();
        let episode_length = if episode_length == 0 {
            table_length
        } else {
            episode_length.min(table_length)
        };
        debug!(table_length, episode_length, "initializing time-series environment");
        Ok(Self {
            state_space: Space::from_table(state),
            observation_space: Space::from_table(observation),
            action_space,
            sampler,
            dynamics,
            episode_length,
            window: None,
            steps: 0,
            phase: Phase::Uninitialized,
            info: Diagnostics::new(),
        })
    }

    pub fn from_config(
        state: Arc<Table>,
        observation: Arc<Table>,
        action_space: Space,
        dynamics: D,
        config: &Config,
    ) -> Result<Self> {
        Self::new(
            state,
            observation,
            action_space,
            dynamics,
            sampler::sampler(config.episode_sample, config.seed),
            config.episode_length,
        )
    }

    /// Effective episode length after clamping.
    pub fn episode_length(&self) -> usize {
        self.episode_length
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn window(&self) -> Option<Window> {
        self.window
    }

    /// Environment-side diagnostics of the current episode.
    pub fn info(&self) -> &Diagnostics {
        &self.info
    }

    /// The current state row: the next one to be acted on, or the last one
    /// once the episode is done.
    pub fn state(&self) -> Option<&[f32]> {
        let rows = self.state_space.episode(self.window?).ok()?;
        rows.get(self.steps.min(rows.len().saturating_sub(1)))
            .map(Vec::as_slice)
    }

    /// Value of a named state column in the current state row.
    pub fn state_variable(&self, name: &str) -> Option<f32> {
        let column = self.state_space.table()?.column_index(name)?;
        self.state()?.get(column).copied()
    }
}

impl<D: Dynamics> Env for TimeSeriesEnv<D> {
    fn reset(&mut self) -> Result<Vec<f32>> {
        // A failed reset must not leave the previous episode steppable.
        self.phase = Phase::Uninitialized;
        self.window = None;
        self.steps = 0;
        self.info.clear();
        let window = self
            .sampler
            .sample(self.episode_length, self.state_space.table_len())?;
        let state_rows = self.state_space.episode(window)?.len();
        let observations = self.observation_space.episode(window)?;
        if state_rows != observations.len() {
            return Err(RlError::EpisodeMismatch {
                state: state_rows,
                observation: observations.len(),
            });
        }
        let first = observations
            .first()
            .cloned()
            .ok_or_else(|| RlError::Configuration("sampled an empty episode window".into()))?;
        debug!(start = window.start, end = window.end, "sampled episode");

        self.dynamics.reset();
        self.window = Some(window);
        self.phase = Phase::Ready;
        Ok(first)
    }

    fn step(&mut self, action: &[f32]) -> Result<Transition> {
        let window = match (self.phase, self.window) {
            (Phase::Ready, Some(window)) => window,
            (Phase::Done, _) => return Err(RlError::Lifecycle("step called after done without reset")),
            _ => return Err(RlError::Lifecycle("step called before reset")),
        };
        let expected: usize = self.action_space.shape().iter().product();
        if action.len() != expected {
            return Err(RlError::InvalidAction { expected, got: action.len() });
        }

        let states = self.state_space.episode(window)?;
        let state = &states[self.steps];
        debug!(step = self.steps, ?action, "step");
        let reward = self
            .dynamics
            .transition(state, action)
            .map_err(RlError::Dynamics)?;

        self.info.record_all(Metric::State, state);
        self.info.record_all(Metric::Action, action);
        self.info.record(Metric::Reward, 0, reward);

        let info = StepInfo { step: self.steps, index: window.start + self.steps };
        self.steps += 1;
        let len = states.len();
        let done = self.steps >= len;
        if done {
            self.phase = Phase::Done;
        }
        let observations = self.observation_space.episode(window)?;
        let observation = observations[self.steps.min(len - 1)].clone();
        Ok(Transition { observation, reward, done, info })
    }

    fn observation_space(&self) -> &Space {
        &self.observation_space
    }

    fn action_space(&self) -> &Space {
        &self.action_space
    }
}
