use log::debug;

use crate::error::Result;
use crate::remote::RemoteEnv;
use crate::sim_env::{SimEnv, StepOutcome};
use crate::state::StateVector;

/// The environment a trainer talks to, chosen at construction.
pub enum Environment {
    Simulated(SimEnv),
    Remote(RemoteEnv),
    Dual(Box<DualEnv>),
}

impl Environment {
    pub fn reset(&mut self) -> Result<StateVector> {
        match self {
            Environment::Simulated(env) => Ok(env.reset()),
            Environment::Remote(env) => Ok(env.reset()),
            Environment::Dual(env) => env.reset(),
        }
    }

    pub fn step(&mut self, index: usize) -> Result<StepOutcome> {
        match self {
            Environment::Simulated(env) => env.step(index),
            Environment::Remote(env) => env.step(index),
            Environment::Dual(env) => env.step(index),
        }
    }

    pub fn state(&self) -> (StateVector, bool) {
        match self {
            Environment::Simulated(env) => env.state(),
            Environment::Remote(env) => env.state(),
            Environment::Dual(env) => env.primary.state(),
        }
    }

    pub fn compute_reward(&self, prev: &StateVector, outcome: &StepOutcome) -> f64 {
        match self {
            Environment::Simulated(env) => env.compute_reward(prev, outcome),
            Environment::Remote(env) => env.last_reward(),
            Environment::Dual(env) => env.primary.compute_reward(prev, outcome),
        }
    }

    pub fn load_map(&mut self, reference: &str) -> Result<()> {
        match self {
            Environment::Simulated(env) => env.load_map(reference),
            Environment::Remote(env) => env.load_map(reference),
            Environment::Dual(env) => env.load_map(reference),
        }
    }

    pub fn action_size(&self) -> usize {
        match self {
            Environment::Simulated(env) => env.action_size(),
            Environment::Remote(env) => env.action_size(),
            Environment::Dual(env) => env.primary.action_size(),
        }
    }

    pub fn map_name(&self) -> String {
        match self {
            Environment::Simulated(env) => env.map_name().to_string(),
            Environment::Remote(env) => env.map_name().to_string(),
            Environment::Dual(env) => env.primary.map_name(),
        }
    }
}

impl From<SimEnv> for Environment {
    fn from(env: SimEnv) -> Self {
        Environment::Simulated(env)
    }
}

impl From<RemoteEnv> for Environment {
    fn from(env: RemoteEnv) -> Self {
        Environment::Remote(env)
    }
}

impl From<DualEnv> for Environment {
    fn from(env: DualEnv) -> Self {
        Environment::Dual(Box::new(env))
    }
}

/// Drives a primary environment and replays every call on a mirror,
/// typically a remote display. Observations, rewards and errors come from
/// the primary only; the mirror's failures are logged and dropped.
pub struct DualEnv {
    pub primary: Environment,
    pub mirror: Environment,
}

impl DualEnv {
    pub fn new(primary: Environment, mirror: Environment) -> Self {
        DualEnv { primary, mirror }
    }

    pub fn reset(&mut self) -> Result<StateVector> {
        let state = self.primary.reset()?;
        if let Err(e) = self.mirror.reset() {
            debug!("Mirror reset failed: {e}");
        }
        Ok(state)
    }

    pub fn step(&mut self, index: usize) -> Result<StepOutcome> {
        let outcome = self.primary.step(index)?;
        if let Err(e) = self.mirror.step(index) {
            debug!("Mirror step failed: {e}");
        }
        Ok(outcome)
    }

    pub fn load_map(&mut self, reference: &str) -> Result<()> {
        self.primary.load_map(reference)?;
        if let Err(e) = self.mirror.load_map(reference) {
            debug!("Mirror load_map failed: {e}");
        }
        Ok(())
    }
}
