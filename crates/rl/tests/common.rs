#![allow(dead_code)]

use rl::{Space, Table};
use std::sync::Arc;

pub fn close(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5)
}

/// Single-column table `0, 1, ..., rows - 1`.
pub fn ramp_table(rows: usize) -> Arc<Table> {
    Arc::new(Table::from_rows((0..rows).map(|i| vec![i as f32]).collect()).unwrap())
}

pub fn unit_action_space(dim: usize) -> Space {
    Space::bounded(vec![-1.0; dim], vec![1.0; dim]).unwrap()
}

/// Reward is the negative squared distance of the first action element from
/// the first state column.
pub fn track_state(state: &[f32], action: &[f32]) -> anyhow::Result<f32> {
    Ok(-(action[0] - state[0]).powi(2))
}
