use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

// Vehicle State
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarState {
    /// Top-left corner of the unrotated hitbox in map units.
    pub position: [f64; 2],
    /// Heading in radians. The car drives towards `rotation + PI`.
    pub rotation: f64,
    pub velocity: f64,
    pub acceleration: f64,
    pub steering_angle: f64,
    pub speed: f64,
    pub rpm: f64,
    /// Rotation in degrees, wrapped to [0, 360).
    pub gyro: f64,
    /// Remaining charge in [0, 1].
    pub battery: f64,
    pub crashed: bool,
    /// Camera orientation in degrees. Telemetry only, never read by physics.
    pub camera_angle: f64,
}

impl CarState {
    /// A fully charged car standing still at the given pose.
    pub fn at_rest(x: f64, y: f64, rotation: f64) -> Self {
        CarState {
            position: [x, y],
            rotation,
            velocity: 0.0,
            acceleration: 0.0,
            steering_angle: 0.0,
            speed: 0.0,
            rpm: 0.0,
            gyro: gyro_degrees(rotation),
            battery: 1.0,
            crashed: false,
            camera_angle: 0.0,
        }
    }
}

impl Default for CarState {
    fn default() -> Self {
        CarState::at_rest(0.0, 0.0, PI)
    }
}

/// Converts a heading in radians to degrees in [0, 360).
pub fn gyro_degrees(rotation: f64) -> f64 {
    (rotation.to_degrees() % 360.0 + 360.0) % 360.0
}

// Control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveCommand {
    Forward,
    Left,
    Right,
    Backward,
    #[default]
    Stop,
}

impl DriveCommand {
    /// Drive commands in action-index order.
    pub const ALL: [DriveCommand; 5] = [
        DriveCommand::Forward,
        DriveCommand::Left,
        DriveCommand::Right,
        DriveCommand::Backward,
        DriveCommand::Stop,
    ];

    /// True for commands that apply throttle (forward or reverse).
    pub fn is_throttle(self) -> bool {
        matches!(self, DriveCommand::Forward | DriveCommand::Backward)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DriveCommand::Forward => "forward",
            DriveCommand::Left => "left",
            DriveCommand::Right => "right",
            DriveCommand::Backward => "backward",
            DriveCommand::Stop => "stop",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ActuatorInput {
    pub command: DriveCommand,
    pub camera_angle: f64,
}

// Sensors
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorBus {
    pub front: f64,
    pub left: f64,
    pub right: f64,
    pub rear: f64,
    /// Visited-cell ratio of the current episode.
    pub coverage: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SimState {
    pub true_state: CarState,
    pub control_input: ActuatorInput,
    pub sensor_bus: SensorBus,
}

impl SimState {
    pub fn at_rest(x: f64, y: f64, rotation: f64) -> Self {
        SimState {
            true_state: CarState::at_rest(x, y, rotation),
            control_input: ActuatorInput::default(),
            sensor_bus: SensorBus::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimContext {
    pub dt: f64,
    pub t: f64,
}

pub trait Model {
    fn reset(&mut self);
}

pub trait MechanicsModel: Model {
    fn step_physics(&mut self, ctx: SimContext, state: &mut SimState);
}

pub trait ElectricalModel: Model {
    fn step_electrical(&mut self, ctx: SimContext, state: &mut SimState);
}

pub trait SensorModel: Model {
    fn step_sensor(&mut self, ctx: SimContext, state: &mut SimState);
}
