//! Episode lifecycle: termination detectors and one-shot events.

use log::debug;
use serde::{Deserialize, Serialize};
use simcore::{Rect, SimState};
use world::MapModel;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeConfig {
    /// Seconds of simulation time at zero speed before the car counts as stalled.
    pub stall_window: f64,
    /// Coverage ratio that completes an episode.
    pub coverage_threshold: f64,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        EpisodeConfig {
            stall_window: 10.0,
            coverage_threshold: 0.95,
        }
    }
}

/// Why an episode ended. When several detectors fire on the same tick the
/// earliest variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Stalled,
    Crashed,
    BatteryDepleted,
    CoverageComplete,
    GoalReached,
}

impl Termination {
    /// Terminations after which the next map in rotation is loaded.
    pub fn is_success(self) -> bool {
        matches!(self, Termination::CoverageComplete | Termination::GoalReached)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Termination::Stalled => "stalled",
            Termination::Crashed => "crashed",
            Termination::BatteryDepleted => "battery_depleted",
            Termination::CoverageComplete => "coverage_complete",
            Termination::GoalReached => "goal_reached",
        }
    }
}

/// One-shot occurrences of a single tick. Each is reported exactly once, in
/// the outcome of the tick that produced it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeEvents {
    pub stalled: bool,
    pub goal_reached: bool,
    pub waypoint_hit: bool,
}

/// Level flags describing the episode after the latest tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeFlags {
    /// Sticky until the next reset.
    pub done: bool,
    /// The last move was rejected.
    pub crashed: bool,
    pub battery_depleted: bool,
    pub coverage_done: bool,
    /// Sticky until the next reset.
    pub goal_reached: bool,
    /// Simulation time the car was last seen moving.
    pub last_move_time: f64,
    pub termination: Option<Termination>,
}

#[derive(Debug, Clone)]
pub struct Episode {
    pub config: EpisodeConfig,
    flags: EpisodeFlags,
    armed: Vec<bool>,
}

impl Episode {
    pub fn new(config: EpisodeConfig, map: &MapModel) -> Self {
        let mut episode = Episode {
            config,
            flags: EpisodeFlags::default(),
            armed: Vec::new(),
        };
        episode.reset(map, 0.0);
        episode
    }

    /// Clears all flags and re-arms every waypoint the map marks active.
    pub fn reset(&mut self, map: &MapModel, now: f64) {
        self.flags = EpisodeFlags {
            last_move_time: now,
            ..EpisodeFlags::default()
        };
        self.armed = map.waypoints.iter().map(|w| w.active).collect();
    }

    pub fn flags(&self) -> &EpisodeFlags {
        &self.flags
    }

    pub fn is_done(&self) -> bool {
        self.flags.done
    }

    pub fn waypoints_remaining(&self) -> usize {
        self.armed.iter().filter(|a| **a).count()
    }

    /// Runs every detector against the state committed at simulation time
    /// `now`. `hitbox` is the car's collision rectangle at that state.
    pub fn evaluate(&mut self, now: f64, state: &SimState, hitbox: &Rect, map: &MapModel) -> EpisodeEvents {
        let car = &state.true_state;
        let mut events = EpisodeEvents::default();
        let mut fired: Option<Termination> = None;
        let mut fire = |t: Termination| {
            fired.get_or_insert(t);
        };

        // 1. Stall
        if car.speed > 0.0 {
            self.flags.last_move_time = now;
        } else if now - self.flags.last_move_time > self.config.stall_window {
            events.stalled = true;
            self.flags.last_move_time = now;
            fire(Termination::Stalled);
        }

        // 2. Rejected move
        self.flags.crashed = car.crashed;
        if car.crashed {
            fire(Termination::Crashed);
        }

        // 3. Battery
        self.flags.battery_depleted = car.battery <= 0.0;
        if self.flags.battery_depleted {
            fire(Termination::BatteryDepleted);
        }

        // 4. Coverage
        self.flags.coverage_done = state.sensor_bus.coverage >= self.config.coverage_threshold;
        if self.flags.coverage_done {
            fire(Termination::CoverageComplete);
        }

        // 5. Target, reported on the first contact only
        let on_target = map.target.as_ref().is_some_and(|t| t.intersects(hitbox));
        if on_target && !self.flags.goal_reached {
            events.goal_reached = true;
            self.flags.goal_reached = true;
            fire(Termination::GoalReached);
        }

        // 6. Waypoints, each pays out once per episode
        for (armed, waypoint) in self.armed.iter_mut().zip(&map.waypoints) {
            if *armed && waypoint.rect().overlaps(hitbox) {
                *armed = false;
                events.waypoint_hit = true;
                debug!("Waypoint at ({}, {}) reached", waypoint.x, waypoint.y);
            }
        }

        if let Some(reason) = fired {
            if !self.flags.done {
                self.flags.done = true;
                self.flags.termination = Some(reason);
            }
        }
        events
    }
}
