//! Headless simulator facade.
//!
//! One tick runs: action → vehicle (kinematics, collision, battery) →
//! range sensor → coverage → episode detectors.

use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};
use mechanics::{Action, ActionSpace, Vehicle};
use sensors::{CoverageTracker, RangeSensor};
use serde::{Deserialize, Serialize};
use simcore::{MechanicsModel, Model, SensorModel, SimClock, SimContext, SimState};
use world::{MapCatalog, MapModel};

use crate::config::SimConfig;
use crate::episode::{Episode, EpisodeEvents, EpisodeFlags, Termination};
use crate::error::{EnvError, Result};
use crate::state::{StateVector, Telemetry};

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub state: StateVector,
    pub done: bool,
    /// One-shot events produced by this tick only.
    pub events: EpisodeEvents,
    pub flags: EpisodeFlags,
}

impl StepOutcome {
    pub fn termination(&self) -> Option<Termination> {
        self.flags.termination
    }
}

pub struct SimEnv {
    config: SimConfig,
    catalog: MapCatalog,
    map: Arc<MapModel>,
    vehicle: Vehicle,
    ranges: RangeSensor,
    coverage: CoverageTracker,
    episode: Episode,
    clock: SimClock,
    state: SimState,
    steps: u64,
}

impl SimEnv {
    pub fn new(map: MapModel, config: SimConfig) -> Self {
        let map = Arc::new(map);
        let hitbox = config.vehicle.hitbox;
        let vehicle = Vehicle::new(config.vehicle.clone(), Arc::clone(&map));
        let ranges = RangeSensor::new(config.sensors.clone(), hitbox, Arc::clone(&map));
        let coverage = CoverageTracker::new(config.coverage.clone(), hitbox, &map);
        let episode = Episode::new(config.episode.clone(), &map);
        let clock = SimClock::new(config.clock);
        let catalog = MapCatalog::new(config.maps_dir.clone());
        let state = vehicle.start_state();

        let mut env = SimEnv {
            config,
            catalog,
            map,
            vehicle,
            ranges,
            coverage,
            episode,
            clock,
            state,
            steps: 0,
        };
        env.reset_models();
        info!(
            "Simulator ready on map {:?} ({}x{} cells)",
            env.map.name, env.map.cols, env.map.rows
        );
        env
    }

    pub fn from_map_file<P: AsRef<Path>>(path: P, config: SimConfig) -> Result<Self> {
        let map = MapModel::load(path)?;
        Ok(Self::new(map, config))
    }

    /// Loads the initial map by reference from `config.maps_dir`.
    pub fn from_catalog(reference: &str, config: SimConfig) -> Result<Self> {
        let map = MapCatalog::new(config.maps_dir.clone()).load(reference)?;
        Ok(Self::new(map, config))
    }

    /// Starts a new episode at the map's start pose. With map rotation
    /// enabled, a successful previous episode first advances to the next map.
    pub fn reset(&mut self) -> StateVector {
        if self.config.rotate_maps_on_success {
            self.rotate_map();
        }
        self.reset_models();
        debug!("Episode reset on map {:?}", self.map.name);
        StateVector::from_sim(&self.state)
    }

    /// Applies the action at `index` for one tick of the configured clock.
    pub fn step(&mut self, index: usize) -> Result<StepOutcome> {
        let action = self.decode(index)?;
        let ctx = self.clock.tick();
        Ok(self.advance(action, ctx))
    }

    /// Like `step`, with an explicit timestep regardless of clock mode.
    pub fn step_with_dt(&mut self, index: usize, dt: f64) -> Result<StepOutcome> {
        let action = self.decode(index)?;
        let ctx = self.clock.advance(dt);
        Ok(self.advance(action, ctx))
    }

    pub fn step_action(&mut self, action: Action, dt: Option<f64>) -> StepOutcome {
        let ctx = match dt {
            Some(dt) => self.clock.advance(dt),
            None => self.clock.tick(),
        };
        self.advance(action, ctx)
    }

    /// Current observation and whether the episode has ended.
    pub fn state(&self) -> (StateVector, bool) {
        (StateVector::from_sim(&self.state), self.episode.is_done())
    }

    /// Replaces the map with one from the catalog and resets. On failure
    /// the environment is left untouched.
    pub fn load_map(&mut self, reference: &str) -> Result<()> {
        let map = self
            .catalog
            .load(reference)
            .inspect_err(|e| warn!("Failed to load map {reference:?}: {e}"))?;
        info!("Loaded map {:?}", map.name);
        self.set_map(map);
        Ok(())
    }

    pub fn set_map(&mut self, map: MapModel) {
        self.install_map(map);
        self.reset_models();
    }

    pub fn compute_reward(&self, prev: &StateVector, outcome: &StepOutcome) -> f64 {
        self.config.reward.compute(prev, outcome)
    }

    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            map_name: self.map.name.clone(),
            time: self.clock.time(),
            steps: self.steps,
            car: self.state.true_state,
            sensors: self.state.sensor_bus,
            visited_cells: self.coverage.visited_cells(),
            waypoints_remaining: self.episode.waypoints_remaining(),
            done: self.episode.is_done(),
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn map(&self) -> &MapModel {
        &self.map
    }

    pub fn map_name(&self) -> &str {
        &self.map.name
    }

    pub fn action_space(&self) -> ActionSpace {
        self.config.action_space
    }

    pub fn action_size(&self) -> usize {
        self.config.action_space.size()
    }

    pub fn flags(&self) -> &EpisodeFlags {
        self.episode.flags()
    }

    pub fn sim_state(&self) -> &SimState {
        &self.state
    }

    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    fn decode(&self, index: usize) -> Result<Action> {
        let space = self.config.action_space;
        space.decode(index).ok_or(EnvError::InvalidAction {
            index,
            size: space.size(),
        })
    }

    fn advance(&mut self, action: Action, ctx: SimContext) -> StepOutcome {
        action.apply_to(&mut self.state.control_input);

        self.vehicle.step_physics(ctx, &mut self.state);
        self.ranges.step_sensor(ctx, &mut self.state);
        self.coverage.step_sensor(ctx, &mut self.state);

        let was_done = self.episode.is_done();
        let hitbox = self.vehicle.hitbox_of(&self.state);
        let events = self
            .episode
            .evaluate(self.clock.time(), &self.state, &hitbox, &self.map);
        self.steps += 1;

        let flags = *self.episode.flags();
        if flags.done && !was_done {
            info!(
                "Episode on {:?} ended after {} steps ({:.2}s): {:?}",
                self.map.name,
                self.steps,
                self.clock.time(),
                flags.termination
            );
        }

        StepOutcome {
            state: StateVector::from_sim(&self.state),
            done: flags.done,
            events,
            flags,
        }
    }

    fn install_map(&mut self, map: MapModel) {
        let map = Arc::new(map);
        self.vehicle.set_map(Arc::clone(&map));
        self.ranges.set_map(Arc::clone(&map));
        self.coverage.set_map(&map);
        self.map = map;
    }

    fn rotate_map(&mut self) {
        let Some(reason) = self.episode.flags().termination else {
            return;
        };
        if !reason.is_success() {
            return;
        }
        let next = match self.catalog.next_after(&self.map.name) {
            Ok(Some(next)) => next,
            Ok(None) => return,
            Err(e) => {
                warn!("Map rotation skipped: {e}");
                return;
            }
        };
        match self.catalog.load(&next) {
            Ok(map) => {
                info!("Rotating to map {next:?} after {reason:?}");
                self.install_map(map);
            }
            Err(e) => warn!("Failed to load next map {next:?}: {e}"),
        }
    }

    fn reset_models(&mut self) {
        self.clock.reset();
        self.vehicle.reset();
        self.ranges.reset();
        self.coverage.reset();
        self.episode.reset(&self.map, self.clock.time());
        self.state = self.vehicle.start_state();
        self.steps = 0;

        // Initial readings, without marking the start cell as visited
        let ctx = SimContext { dt: 0.0, t: 0.0 };
        self.ranges.step_sensor(ctx, &mut self.state);
    }
}
