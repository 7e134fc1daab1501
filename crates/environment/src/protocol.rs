//! JSON bodies exchanged with a simulator served over HTTP.
//!
//! Every response field has a default so a client can read partial or
//! older payloads.

use serde::{Deserialize, Serialize};

use crate::episode::{EpisodeEvents, EpisodeFlags, Termination};
use crate::sim_env::StepOutcome;
use crate::state::StateVector;

/// Body of `POST /step`. `action` is an index into the action space;
/// `camera` alone only turns the camera. `dt` overrides the clock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dt: Option<f64>,
}

impl StepRequest {
    pub fn action(index: usize) -> Self {
        StepRequest {
            action: Some(index),
            ..StepRequest::default()
        }
    }
}

/// Body of `POST /load_map`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadMapRequest {
    pub file: String,
}

/// Reply to `POST /reset` and `POST /step`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepResponse {
    pub state: StateVector,
    pub done: bool,
    pub reward: f64,
    pub goal_reached: bool,
    pub crashed: bool,
    pub stalled: bool,
    pub waypoint_hit: bool,
    pub battery: f64,
    pub coverage: f64,
    pub coverage_done: bool,
    pub map_name: String,
    pub termination: Option<Termination>,
}

impl StepResponse {
    pub fn from_reset(state: StateVector, map_name: &str) -> Self {
        StepResponse {
            state,
            battery: state.battery,
            coverage: state.coverage,
            map_name: map_name.to_string(),
            ..StepResponse::default()
        }
    }

    pub fn from_outcome(outcome: &StepOutcome, reward: f64, map_name: &str) -> Self {
        StepResponse {
            state: outcome.state,
            done: outcome.done,
            reward,
            goal_reached: outcome.events.goal_reached,
            crashed: outcome.flags.crashed,
            stalled: outcome.events.stalled,
            waypoint_hit: outcome.events.waypoint_hit,
            battery: outcome.state.battery,
            coverage: outcome.state.coverage,
            coverage_done: outcome.flags.coverage_done,
            map_name: map_name.to_string(),
            termination: outcome.flags.termination,
        }
    }

    /// Rebuilds the outcome a remote simulator reported.
    pub fn to_outcome(&self) -> StepOutcome {
        StepOutcome {
            state: self.state,
            done: self.done,
            events: EpisodeEvents {
                stalled: self.stalled,
                goal_reached: self.goal_reached,
                waypoint_hit: self.waypoint_hit,
            },
            flags: EpisodeFlags {
                done: self.done,
                crashed: self.crashed,
                battery_depleted: self.done && self.battery <= 0.0,
                coverage_done: self.coverage_done,
                goal_reached: self.goal_reached,
                last_move_time: 0.0,
                termination: self.termination,
            },
        }
    }
}

/// Reply to `GET /state`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateResponse {
    pub state: StateVector,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
