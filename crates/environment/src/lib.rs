//! Episode environment for driving-policy training
//!
//! This crate provides:
//! - `SimEnv`: the headless simulator behind `reset/step/state/load_map`
//! - Episode termination detection and reward policies
//! - `Environment`: one interface over simulated, remote and mirrored variants
//! - The JSON request/response mapping used by the HTTP transport

pub mod config;
pub mod environment;
pub mod episode;
pub mod error;
pub mod protocol;
pub mod remote;
pub mod reward;
pub mod service;
pub mod sim_env;
pub mod state;

pub use config::SimConfig;
pub use environment::{DualEnv, Environment};
pub use episode::{Episode, EpisodeConfig, EpisodeEvents, EpisodeFlags, Termination};
pub use error::{EnvError, Result};
pub use remote::RemoteEnv;
pub use reward::{RewardPolicy, ShapedReward, SimpleReward};
pub use sim_env::{SimEnv, StepOutcome};
pub use state::{StateVector, Telemetry, STATE_SIZE};
