use crate::error::{Result, RlError};
use std::sync::Arc;

/// Immutable time-indexed rows, every row the same width.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<f32>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f32>>) -> Result<Self> {
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(RlError::Configuration(format!(
                "row {i} has {} values, expected {} columns",
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Builds a table with generated column names `c0, c1, ...`.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let width = rows.first().map_or(0, Vec::len);
        let columns = (0..width).map(|i| format!("c{i}")).collect();
        Self::new(columns, rows)
    }

    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Index of a named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Half-open row range `[start, end)` of one episode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

impl Window {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Shape and per-dimension bounds of state, observation, or action vectors.
///
/// Data-backed spaces also hold the full table they were built from and can
/// cut an episode window out of it.
#[derive(Clone, Debug)]
pub struct Space {
    shape: Vec<usize>,
    low: Vec<f32>,
    high: Vec<f32>,
    table: Option<Arc<Table>>,
}

impl Space {
    /// A bounds-only space of `low.len()` dimensions.
    pub fn bounded(low: Vec<f32>, high: Vec<f32>) -> Result<Self> {
        if low.len() != high.len() {
            return Err(RlError::Configuration(format!(
                "space bounds differ in length: {} low, {} high",
                low.len(),
                high.len()
            )));
        }
        if let Some(i) = low.iter().zip(&high).position(|(l, h)| !(l <= h)) {
            return Err(RlError::Configuration(format!(
                "space dimension {i} has low {} above high {}",
                low[i], high[i]
            )));
        }
        Ok(Self { shape: vec![low.len()], low, high, table: None })
    }

    /// A space whose bounds are the per-column min/max of `table`.
    pub fn from_table(table: Arc<Table>) -> Self {
        let width = table.width();
        let mut low = vec![f32::INFINITY; width];
        let mut high = vec![f32::NEG_INFINITY; width];
        for row in table.rows() {
            for (i, &v) in row.iter().enumerate() {
                low[i] = low[i].min(v);
                high[i] = high[i].max(v);
            }
        }
        if table.is_empty() {
            low.fill(0.0);
            high.fill(0.0);
        }
        Self { shape: vec![table.len(), width], low, high, table: Some(table) }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Width of a single vector in this space.
    pub fn dim(&self) -> usize {
        self.low.len()
    }

    pub fn low(&self) -> &[f32] {
        &self.low
    }

    pub fn high(&self) -> &[f32] {
        &self.high
    }

    pub fn table(&self) -> Option<&Arc<Table>> {
        self.table.as_ref()
    }

    /// Rows in the backing table, zero for bounds-only spaces.
    pub fn table_len(&self) -> usize {
        self.table.as_ref().map_or(0, |t| t.len())
    }

    /// The rows covered by `window`, clamped to the table length.
    pub fn episode(&self, window: Window) -> Result<&[Vec<f32>]> {
        let table = self
            .table
            .as_ref()
            .ok_or_else(|| RlError::Configuration("space has no backing table".into()))?;
        let rows = table.rows();
        let end = window.end.min(rows.len());
        let start = window.start.min(end);
        Ok(&rows[start..end])
    }

    pub fn contains(&self, x: &[f32]) -> bool {
        x.len() == self.dim()
            && x.iter().zip(self.low.iter().zip(&self.high)).all(|(v, (l, h))| l <= v && v <= h)
    }

    /// A uniform draw within the bounds.
    pub fn sample(&self, rng: &mut fastrand::Rng) -> Vec<f32> {
        self.low
            .iter()
            .zip(&self.high)
            .map(|(l, h)| l + rng.f32() * (h - l))
            .collect()
    }
}
