use anyhow::{ensure, Context, Result};
use rl::{Dynamics, Space};

/// Price arbitrage with a single battery.
///
/// The action is the requested charge rate in MW (negative discharges). The
/// reward is the cost of the energy imported from the grid over one step,
/// negated, so discharging at high prices earns money.
#[derive(Clone, Debug)]
pub struct Battery {
    pub power_mw: f32,
    pub capacity_mwh: f32,
    /// Round-trip losses applied on the charging side.
    pub efficiency: f32,
    pub initial_charge_mwh: f32,
    pub step_hours: f32,
    price_column: usize,
    charge_mwh: f32,
}

impl Battery {
    pub fn new(power_mw: f32, capacity_mwh: f32, efficiency: f32, price_column: usize) -> Result<Self> {
        ensure!(power_mw > 0.0, "battery power must be positive");
        ensure!(capacity_mwh > 0.0, "battery capacity must be positive");
        ensure!(efficiency > 0.0 && efficiency <= 1.0, "efficiency must be within (0, 1]");
        Ok(Self {
            power_mw,
            capacity_mwh,
            efficiency,
            initial_charge_mwh: 0.0,
            step_hours: 5.0 / 60.0,
            price_column,
            charge_mwh: 0.0,
        })
    }

    /// Charge rate in MW, symmetric around zero.
    pub fn action_space(&self) -> rl::Result<Space> {
        Space::bounded(vec![-self.power_mw], vec![self.power_mw])
    }

    pub fn charge_mwh(&self) -> f32 {
        self.charge_mwh
    }
}

impl Dynamics for Battery {
    fn reset(&mut self) {
        self.charge_mwh = self.initial_charge_mwh.clamp(0.0, self.capacity_mwh);
    }

    fn transition(&mut self, state: &[f32], action: &[f32]) -> Result<f32> {
        let price = *state
            .get(self.price_column)
            .with_context(|| format!("state row has no column {}", self.price_column))?;
        let power = action
            .first()
            .context("battery expects a one-dimensional action")?
            .clamp(-self.power_mw, self.power_mw);

        let requested = power * self.step_hours;
        let stored = if requested >= 0.0 { requested * self.efficiency } else { requested };
        let new_charge = (self.charge_mwh + stored).clamp(0.0, self.capacity_mwh);
        let delta = new_charge - self.charge_mwh;
        self.charge_mwh = new_charge;

        let imported = if delta >= 0.0 { delta / self.efficiency } else { delta };
        Ok(-imported * price)
    }
}
