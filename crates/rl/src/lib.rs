//! Episodic policy-gradient training over windows of historical time-series
//! data.
//!
//! A [`TimeSeriesEnv`] samples a row window per episode and steps through it,
//! delegating rewards to a [`Dynamics`] model. [`Reinforce`] scales
//! observations, queries a [`Policy`], records the trajectory, and at episode
//! end turns rewards into discounted returns for one policy update.

pub mod config;
pub mod diagnostics;
pub mod env;
pub mod error;
pub mod memory;
pub mod policy;
pub mod reinforce;
pub mod sampler;
pub mod scaler;
pub mod space;
pub mod train;

pub use config::{Config, EpisodeSample, ObservationScaling, ReturnScaling};
pub use diagnostics::{Diagnostics, Metric};
pub use env::{Dynamics, Env, Phase, StepInfo, TimeSeriesEnv, Transition};
pub use error::{Result, RlError};
pub use memory::{compute_returns, Batch, Memory, StepRecord};
pub use policy::{ActionOutput, GaussianPolicy, Policy, RandomPolicy};
pub use reinforce::Reinforce;
pub use sampler::{FixedSampler, RandomSampler, Sampler};
pub use scaler::{Normalizer, RunningStats, Standardizer};
pub use space::{Space, Table, Window};
pub use train::{run_episode, train, EpisodeSummary};
