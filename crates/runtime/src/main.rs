#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::cast_precision_loss, clippy::float_cmp, clippy::missing_errors_doc)]

//! # gridlearn
//!
//! Trains a policy-gradient agent to run a battery against a historical (or
//! synthetic) electricity price series. One episode is one window of the
//! series; the agent updates once at the end of every episode.

mod battery;
mod dataset;

use anyhow::{Context, Result};
use battery::Battery;
use clap::{Parser, ValueEnum};
use dataset::Dataset;
use rl::{
    train, Config, Diagnostics, EpisodeSummary, Env, GaussianPolicy, Policy, RandomPolicy,
    Reinforce, TimeSeriesEnv,
};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AgentKind {
    /// REINFORCE with a Gaussian MLP policy.
    Reinforce,
    /// Uniform random actions, no learning.
    Random,
}

#[derive(Parser, Debug)]
#[command(name = "gridlearn", about = "Episodic policy-gradient training on time-series data")]
struct Args {
    /// JSON configuration; missing fields take defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON dataset. A synthetic price series is generated when omitted.
    #[arg(long)]
    dataset: Option<PathBuf>,
    /// Rows of synthetic data to generate.
    #[arg(long, default_value_t = 4032)]
    rows: usize,
    #[arg(long, default_value_t = 10)]
    episodes: usize,
    #[arg(long, value_enum, default_value_t = AgentKind::Reinforce)]
    agent: AgentKind,
    /// Overrides the configured seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Writes episode summaries and last-episode diagnostics as JSON.
    #[arg(long)]
    diagnostics: Option<PathBuf>,
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,
    #[arg(long, default_value_t = 1.0)]
    battery_power_mw: f32,
    #[arg(long, default_value_t = 2.0)]
    battery_capacity_mwh: f32,
}

#[derive(Serialize)]
struct Report<'a> {
    config: &'a Config,
    episodes: &'a [EpisodeSummary],
    agent: &'a Diagnostics,
    environment: &'a Diagnostics,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            Config::from_json_str(&json).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => Config::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt().with_max_level(args.log_level).init();

    let config = load_config(&args)?;
    let dataset = match &args.dataset {
        Some(path) => Dataset::load(path)?,
        None => Dataset::synthetic(args.rows, config.seed)?,
    };
    tracing::info!(
        rows = dataset.state.len(),
        episode_length = config.episode_length,
        sample = ?config.episode_sample,
        "dataset ready"
    );

    let price_column = dataset.state.column_index("price").unwrap_or(0);
    let battery = Battery::new(args.battery_power_mw, args.battery_capacity_mwh, 0.9, price_column)?;
    let action_space = battery.action_space()?;
    let mut env = TimeSeriesEnv::from_config(
        dataset.state,
        dataset.observation,
        action_space.clone(),
        battery,
        &config,
    )?;

    let policy: Box<dyn Policy> = match args.agent {
        AgentKind::Reinforce => Box::new(GaussianPolicy::from_config(env.obs_size(), env.action_size(), &config)),
        AgentKind::Random => Box::new(RandomPolicy::from_config(action_space, &config)),
    };
    let mut agent = Reinforce::new(policy, env.observation_space(), env.action_space(), &config)?;

    let summaries = train(&mut env, &mut agent, args.episodes)?;
    if let (Some(first), Some(last)) = (summaries.first(), summaries.last()) {
        tracing::info!(
            first_reward = first.total_reward,
            last_reward = last.total_reward,
            episodes = summaries.len(),
            "training finished"
        );
    }

    if let Some(path) = &args.diagnostics {
        let report = Report {
            config: &config,
            episodes: &summaries,
            agent: agent.diagnostics(),
            environment: env.info(),
        };
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report)?;
        tracing::info!(path = %path.display(), "diagnostics written");
    }

    Ok(())
}
