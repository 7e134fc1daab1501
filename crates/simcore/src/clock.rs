use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::SimContext;

/// How the simulation clock produces the timestep for each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ClockMode {
    /// Every tick advances by the same `dt` seconds. Runs are reproducible.
    Fixed { dt: f64 },
    /// Every tick advances by the wall-clock time elapsed since the previous tick
    /// (or since the last reset for the first tick).
    RealTime,
}

impl Default for ClockMode {
    fn default() -> Self {
        ClockMode::Fixed { dt: 1.0 / 60.0 }
    }
}

/// Simulation time source handing out one `SimContext` per tick.
#[derive(Debug, Clone)]
pub struct SimClock {
    pub mode: ClockMode,
    t: f64,
    last_tick: Instant,
}

impl SimClock {
    pub fn new(mode: ClockMode) -> Self {
        SimClock {
            mode,
            t: 0.0,
            last_tick: Instant::now(),
        }
    }

    /// Simulation time elapsed since the last reset, in seconds.
    pub fn time(&self) -> f64 {
        self.t
    }

    pub fn reset(&mut self) {
        self.t = 0.0;
        self.last_tick = Instant::now();
    }

    /// Advances by the timestep the clock mode dictates.
    pub fn tick(&mut self) -> SimContext {
        let dt = match self.mode {
            ClockMode::Fixed { dt } => dt,
            ClockMode::RealTime => self.last_tick.elapsed().as_secs_f64(),
        };
        self.advance(dt)
    }

    /// Advances by an explicit timestep, bypassing the clock mode.
    /// Negative timesteps are treated as zero.
    pub fn advance(&mut self, dt: f64) -> SimContext {
        let dt = dt.max(0.0);
        let ctx = SimContext { dt, t: self.t };
        self.t += dt;
        self.last_tick = Instant::now();
        ctx
    }
}

impl Default for SimClock {
    fn default() -> Self {
        SimClock::new(ClockMode::default())
    }
}
