use serde::{Deserialize, Serialize};
use simcore::{ElectricalModel, Model, SimContext, SimState};

/// Linear battery drain proportional to motor rpm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Battery {
    /// Charge fraction drained per rpm-second.
    pub drain_rate: f64,
}

impl Default for Battery {
    fn default() -> Self {
        Battery { drain_rate: 0.000005 }
    }
}

impl Model for Battery {
    fn reset(&mut self) {
        // Charge lives in the car state
    }
}

impl ElectricalModel for Battery {
    fn step_electrical(&mut self, ctx: SimContext, state: &mut SimState) {
        let car = &mut state.true_state;
        car.battery = (car.battery - car.rpm * ctx.dt * self.drain_rate).max(0.0);
    }
}
