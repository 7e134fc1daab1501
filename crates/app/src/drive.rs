//! Scripted policies for running the simulator without a trainer.

use clap::ValueEnum;
use environment::{SimEnv, StepOutcome, Termination};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

const FORWARD: usize = 0;
const LEFT: usize = 1;
const RIGHT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Policy {
    /// Always accelerate straight ahead
    Forward,
    /// Uniformly random drive commands
    Random,
    /// Drive forward, turning away from the nearer side when something is ahead
    Wander,
}

/// Front reading below which `wander` starts turning.
const WANDER_CLEARANCE: f64 = 60.0;

impl Policy {
    fn choose(self, last: &StepOutcome, rng: &mut StdRng) -> usize {
        match self {
            Policy::Forward => FORWARD,
            Policy::Random => rng.gen_range(0..5),
            Policy::Wander => {
                let s = &last.state;
                if s.front >= WANDER_CLEARANCE {
                    FORWARD
                } else if s.left > s.right {
                    LEFT
                } else {
                    RIGHT
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub map_name: String,
    pub steps: usize,
    pub total_reward: f64,
    pub termination: Option<Termination>,
    pub coverage: f64,
    pub battery: f64,
    pub waypoints_hit: usize,
}

pub fn run(
    env: &mut SimEnv,
    policy: Policy,
    episodes: usize,
    max_steps: usize,
    seed: u64,
) -> environment::Result<Vec<EpisodeSummary>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut summaries = Vec::with_capacity(episodes);

    for episode in 0..episodes {
        let mut prev = env.reset();
        let mut last = StepOutcome {
            state: prev,
            done: false,
            events: Default::default(),
            flags: *env.flags(),
        };
        let mut summary = EpisodeSummary {
            episode,
            map_name: env.map_name().to_string(),
            steps: 0,
            total_reward: 0.0,
            termination: None,
            coverage: 0.0,
            battery: prev.battery,
            waypoints_hit: 0,
        };

        while summary.steps < max_steps && !last.done {
            let action = policy.choose(&last, &mut rng);
            last = env.step(action)?;
            let reward = env.compute_reward(&prev, &last);
            summary.total_reward += reward;
            summary.steps += 1;
            debug!(
                "step {} action {action}: {:?} reward {reward:.3}",
                summary.steps,
                last.state.to_array()
            );
            if last.events.waypoint_hit {
                summary.waypoints_hit += 1;
            }
            prev = last.state;
        }

        summary.termination = last.termination();
        summary.coverage = last.state.coverage;
        summary.battery = last.state.battery;
        info!(
            "Episode {episode} on {:?}: {} steps, reward {:.2}, {:?}",
            summary.map_name, summary.steps, summary.total_reward, summary.termination
        );
        summaries.push(summary);
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use environment::SimConfig;
    use world::MapModel;

    fn env() -> SimEnv {
        let map = MapModel::new(12, 12, 50.0, 0.0)
            .with_name("box")
            .with_start(100.0, 100.0)
            .with_obstacle(400.0, 100.0, 50.0);
        SimEnv::new(map, SimConfig::default())
    }

    #[test]
    fn test_forward_policy_crashes() {
        let mut env = env();
        let summaries = run(&mut env, Policy::Forward, 1, 500, 0).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].termination, Some(Termination::Crashed));
        assert!(summaries[0].steps < 500);
    }

    #[test]
    fn test_step_budget_is_respected() {
        let mut env = env();
        let summaries = run(&mut env, Policy::Random, 3, 25, 42).unwrap();
        assert_eq!(summaries.len(), 3);
        assert!(summaries.iter().all(|s| s.steps <= 25));
        assert!(summaries.iter().all(|s| s.map_name == "box"));
    }

    #[test]
    fn test_random_policy_is_seeded() {
        let a = run(&mut env(), Policy::Random, 2, 200, 9).unwrap();
        let b = run(&mut env(), Policy::Random, 2, 200, 9).unwrap();
        let steps = |s: &[EpisodeSummary]| s.iter().map(|e| (e.steps, e.coverage)).collect::<Vec<_>>();
        assert_eq!(steps(&a), steps(&b));
    }

    #[test]
    fn test_wander_turns_near_obstacles() {
        let mut last = StepOutcome {
            state: Default::default(),
            done: false,
            events: Default::default(),
            flags: Default::default(),
        };
        let mut rng = StdRng::seed_from_u64(0);
        last.state.front = 150.0;
        assert_eq!(Policy::Wander.choose(&last, &mut rng), FORWARD);
        last.state.front = 30.0;
        last.state.left = 100.0;
        last.state.right = 40.0;
        assert_eq!(Policy::Wander.choose(&last, &mut rng), LEFT);
        last.state.left = 10.0;
        assert_eq!(Policy::Wander.choose(&last, &mut rng), RIGHT);
    }
}
