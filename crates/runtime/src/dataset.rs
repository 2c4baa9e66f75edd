use anyhow::{Context, Result};
use rl::Table;
use serde::Deserialize;
use std::f32::consts::TAU;
use std::path::Path;
use std::sync::Arc;

/// Five-minute steps per day.
const STEPS_PER_DAY: usize = 288;

/// On-disk dataset: state rows drive the reward, observation rows are what the
/// agent sees. Observations default to the state rows.
#[derive(Deserialize)]
struct DatasetFile {
    columns: Vec<String>,
    state: Vec<Vec<f32>>,
    #[serde(default)]
    observation_columns: Option<Vec<String>>,
    #[serde(default)]
    observation: Option<Vec<Vec<f32>>>,
}

pub struct Dataset {
    pub state: Arc<Table>,
    pub observation: Arc<Table>,
}

impl Dataset {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: DatasetFile = serde_json::from_str(json).context("malformed dataset")?;
        let state = Arc::new(Table::new(file.columns.clone(), file.state)?);
        let observation = match file.observation {
            Some(rows) => {
                let columns = file.observation_columns.unwrap_or(file.columns);
                Arc::new(Table::new(columns, rows)?)
            }
            None => Arc::clone(&state),
        };
        Ok(Self { state, observation })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading dataset {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("parsing dataset {}", path.display()))
    }

    /// A seeded daily price cycle with noise. State is the price alone; the
    /// observation adds the time of day as a point on the unit circle.
    pub fn synthetic(rows: usize, seed: u64) -> Result<Self> {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut state = Vec::with_capacity(rows);
        let mut observation = Vec::with_capacity(rows);
        for t in 0..rows {
            let phase = TAU * (t % STEPS_PER_DAY) as f32 / STEPS_PER_DAY as f32;
            let price = 50.0 - 20.0 * phase.cos() + 5.0 * (rng.f32() - 0.5);
            state.push(vec![price]);
            observation.push(vec![price, phase.sin(), phase.cos()]);
        }
        Ok(Self {
            state: Arc::new(Table::new(vec!["price".into()], state)?),
            observation: Arc::new(Table::new(
                vec!["price".into(), "time_sin".into(), "time_cos".into()],
                observation,
            )?),
        })
    }
}
