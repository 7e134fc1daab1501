//! Reward policies.
//!
//! Rewards are pure functions of the previous observation and the outcome
//! of the tick that followed it; events in the outcome are only ever read
//! here, so one occurrence pays out once no matter how often it is inspected.

use serde::{Deserialize, Serialize};

use crate::sim_env::StepOutcome;
use crate::state::StateVector;

/// Terminal-dominant reward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleReward {
    pub goal: f64,
    pub crash: f64,
    pub step: f64,
}

impl Default for SimpleReward {
    fn default() -> Self {
        SimpleReward {
            goal: 100.0,
            crash: -10.0,
            step: -0.1,
        }
    }
}

/// Dense reward for exploration and coverage training.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapedReward {
    pub step_penalty: f64,
    pub coverage_weight: f64,
    pub zero_speed_penalty: f64,
    /// Nearest reading below this counts as a collision.
    pub collision_distance: f64,
    pub collision_penalty: f64,
    /// Nearest reading below this counts as a near miss.
    pub near_distance: f64,
    pub near_penalty: f64,
    pub goal_bonus: f64,
    pub waypoint_bonus: f64,
    pub battery_penalty: f64,
    /// Replaces every other term on the tick the car stalls.
    pub stall_penalty: f64,
}

impl Default for ShapedReward {
    fn default() -> Self {
        ShapedReward {
            step_penalty: -0.1,
            coverage_weight: 5.0,
            zero_speed_penalty: -1.0,
            collision_distance: 5.0,
            collision_penalty: -20.0,
            near_distance: 20.0,
            near_penalty: -5.0,
            goal_bonus: 150.0,
            waypoint_bonus: 15.0,
            battery_penalty: -50.0,
            stall_penalty: -20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RewardPolicy {
    Simple(SimpleReward),
    Shaped(ShapedReward),
}

impl Default for RewardPolicy {
    fn default() -> Self {
        RewardPolicy::Simple(SimpleReward::default())
    }
}

impl RewardPolicy {
    pub fn simple() -> Self {
        RewardPolicy::Simple(SimpleReward::default())
    }

    pub fn shaped() -> Self {
        RewardPolicy::Shaped(ShapedReward::default())
    }

    pub fn compute(&self, prev: &StateVector, outcome: &StepOutcome) -> f64 {
        match self {
            RewardPolicy::Simple(r) => r.compute(outcome),
            RewardPolicy::Shaped(r) => r.compute(prev, outcome),
        }
    }
}

impl SimpleReward {
    pub fn compute(&self, outcome: &StepOutcome) -> f64 {
        if outcome.events.goal_reached {
            self.goal
        } else if outcome.flags.crashed {
            self.crash
        } else {
            self.step
        }
    }
}

impl ShapedReward {
    pub fn compute(&self, prev: &StateVector, outcome: &StepOutcome) -> f64 {
        if outcome.events.stalled {
            return self.stall_penalty;
        }
        let next = &outcome.state;

        let mut reward = self.step_penalty;
        reward += (next.coverage - prev.coverage) * self.coverage_weight;
        if next.speed == 0.0 {
            reward += self.zero_speed_penalty;
        }

        let nearest = next.min_distance();
        reward += if nearest < self.collision_distance {
            self.collision_penalty
        } else if nearest < self.near_distance {
            self.near_penalty
        } else {
            prev.front - next.front
        };

        if outcome.events.goal_reached {
            reward += self.goal_bonus;
        }
        if outcome.events.waypoint_hit {
            reward += self.waypoint_bonus;
        }
        if outcome.flags.battery_depleted && !outcome.flags.goal_reached {
            reward += self.battery_penalty;
        }
        reward
    }
}
