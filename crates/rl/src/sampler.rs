use crate::config::EpisodeSample;
use crate::error::{Result, RlError};
use crate::space::Window;

/// Chooses the row window of the next episode.
pub trait Sampler {
    /// `episode_length == 0` asks for the whole table.
    fn sample(&mut self, episode_length: usize, table_length: usize) -> Result<Window>;
}

/// Always the most recent `episode_length` rows.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedSampler;

impl Sampler for FixedSampler {
    fn sample(&mut self, episode_length: usize, table_length: usize) -> Result<Window> {
        if episode_length > table_length {
            return Err(RlError::Configuration(format!(
                "episode length {episode_length} exceeds table length {table_length}"
            )));
        }
        let len = if episode_length == 0 { table_length } else { episode_length };
        let start = table_length - len;
        Ok(Window { start, end: start + len })
    }
}

/// Uniformly drawn start in `[0, table_length - episode_length)`.
#[derive(Clone, Debug)]
pub struct RandomSampler {
    rng: fastrand::Rng,
}

impl RandomSampler {
    pub fn new(seed: u64) -> Self {
        Self { rng: fastrand::Rng::with_seed(seed) }
    }
}

impl Sampler for RandomSampler {
    fn sample(&mut self, episode_length: usize, table_length: usize) -> Result<Window> {
        let len = if episode_length == 0 { table_length } else { episode_length };
        if table_length <= len {
            return Err(RlError::Configuration(format!(
                "random sampling needs more rows than the episode length ({table_length} <= {len})"
            )));
        }
        let start = self.rng.usize(0..table_length - len);
        Ok(Window { start, end: start + len })
    }
}

/// Resolves the configured strategy once, at construction time.
pub fn sampler(mode: EpisodeSample, seed: u64) -> Box<dyn Sampler> {
    match mode {
        EpisodeSample::Fixed => Box::new(FixedSampler),
        EpisodeSample::Random => Box::new(RandomSampler::new(seed)),
    }
}
