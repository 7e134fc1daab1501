//! Simulator configuration
//!
//! Every section has defaults reproducing the reference car, so a config
//! file only needs the values it changes:
//!
//! ```json
//! {
//!   "clock": { "mode": "fixed", "dt": 0.0166 },
//!   "reward": { "policy": "shaped" },
//!   "coverage": { "clamp_to_map": true },
//!   "maps_dir": "maps",
//!   "rotate_maps_on_success": true
//! }
//! ```

use std::path::{Path, PathBuf};

use mechanics::{ActionSpace, VehicleConfig};
use sensors::{CoverageConfig, SensorConfig};
use serde::{Deserialize, Serialize};
use simcore::ClockMode;

use crate::episode::EpisodeConfig;
use crate::error::{EnvError, Result};
use crate::reward::RewardPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub vehicle: VehicleConfig,
    pub sensors: SensorConfig,
    pub coverage: CoverageConfig,
    pub episode: EpisodeConfig,
    pub reward: RewardPolicy,
    pub clock: ClockMode,
    pub action_space: ActionSpace,
    /// Directory that `load_map` references resolve against.
    pub maps_dir: PathBuf,
    /// Move to the next map in `maps_dir` after a goal or full coverage.
    pub rotate_maps_on_success: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            vehicle: VehicleConfig::default(),
            sensors: SensorConfig::default(),
            coverage: CoverageConfig::default(),
            episode: EpisodeConfig::default(),
            reward: RewardPolicy::default(),
            clock: ClockMode::default(),
            action_space: ActionSpace::default(),
            maps_dir: PathBuf::from("maps"),
            rotate_maps_on_success: false,
        }
    }
}

impl SimConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| EnvError::Config(format!("Failed to parse config: {e}")))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EnvError::Config(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    pub fn with_maps_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.maps_dir = dir.into();
        self
    }

    pub fn with_reward(mut self, reward: RewardPolicy) -> Self {
        self.reward = reward;
        self
    }

    pub fn with_clock(mut self, clock: ClockMode) -> Self {
        self.clock = clock;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reward::ShapedReward;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SimConfig::from_json_str("{}").unwrap();
        assert_eq!(config.vehicle.max_speed, 5.0);
        assert_eq!(config.sensors.max_range, 150.0);
        assert_eq!(config.episode.stall_window, 10.0);
        assert_eq!(config.action_space, ActionSpace::Drive);
        assert!(matches!(config.reward, RewardPolicy::Simple(_)));
        assert!(!config.coverage.clamp_to_map);
    }

    #[test]
    fn test_partial_sections_override() {
        let config = SimConfig::from_json_str(
            r#"{
                "vehicle": { "max_speed": 3.0 },
                "reward": { "policy": "shaped", "goal_bonus": 200.0 },
                "clock": { "mode": "real_time" },
                "action_space": "drive_with_camera",
                "maps_dir": "levels"
            }"#,
        )
        .unwrap();
        assert_eq!(config.vehicle.max_speed, 3.0);
        assert_eq!(config.vehicle.accel_rate, 0.2);
        match config.reward {
            RewardPolicy::Shaped(shaped) => {
                assert_eq!(shaped.goal_bonus, 200.0);
                assert_eq!(shaped.waypoint_bonus, ShapedReward::default().waypoint_bonus);
            }
            other => panic!("unexpected policy {other:?}"),
        }
        assert_eq!(config.clock, ClockMode::RealTime);
        assert_eq!(config.action_space, ActionSpace::DriveWithCamera);
        assert_eq!(config.maps_dir, PathBuf::from("levels"));
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let err = SimConfig::from_json_str("{\"vehicle\": 3}").unwrap_err();
        assert!(matches!(err, EnvError::Config(_)));
        assert!(SimConfig::from_json_file("/nonexistent/sim.json").is_err());
    }
}
