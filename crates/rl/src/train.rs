//! Episode runner: act, step, record until done, then learn once.

use crate::env::Env;
use crate::error::Result;
use crate::policy::Policy;
use crate::reinforce::Reinforce;
use serde::Serialize;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub steps: usize,
    pub total_reward: f32,
    pub loss: f32,
}

/// Runs one full episode and applies the single policy update for it.
pub fn run_episode<E, P>(env: &mut E, agent: &mut Reinforce<P>, episode: usize) -> Result<EpisodeSummary>
where
    E: Env + ?Sized,
    P: Policy,
{
    agent.reset();
    let mut observation = env.reset()?;
    let mut total_reward = 0.0;
    let mut steps = 0;

    loop {
        let action = agent.act(&observation)?;
        let transition = env.step(&action)?;
        total_reward += transition.reward;
        steps += 1;
        agent.remember(observation, action, transition.reward, transition.info);
        observation = transition.observation;
        if transition.done {
            break;
        }
    }

    let loss = agent.learn()?;
    let summary = EpisodeSummary { episode, steps, total_reward, loss };
    info!(episode, steps, total_reward, loss, "episode finished");
    Ok(summary)
}

/// Runs `episodes` episodes back to back.
pub fn train<E, P>(env: &mut E, agent: &mut Reinforce<P>, episodes: usize) -> Result<Vec<EpisodeSummary>>
where
    E: Env + ?Sized,
    P: Policy,
{
    (0..episodes).map(|episode| run_episode(env, agent, episode)).collect()
}
