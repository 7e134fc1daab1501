use serde::{Deserialize, Serialize};
use simcore::{CarState, SensorBus, SimState};

/// Length of the observation vector handed to trainers.
pub const STATE_SIZE: usize = 8;

/// Observation vector, serialized as the plain array
/// `[front, left, right, speed, gyro, rpm, coverage, battery]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; STATE_SIZE]", into = "[f64; STATE_SIZE]")]
pub struct StateVector {
    pub front: f64,
    pub left: f64,
    pub right: f64,
    pub speed: f64,
    pub gyro: f64,
    pub rpm: f64,
    pub coverage: f64,
    pub battery: f64,
}

impl StateVector {
    pub fn from_sim(state: &SimState) -> Self {
        let car = &state.true_state;
        let bus = &state.sensor_bus;
        StateVector {
            front: bus.front,
            left: bus.left,
            right: bus.right,
            speed: car.speed,
            gyro: car.gyro,
            rpm: car.rpm,
            coverage: bus.coverage,
            battery: car.battery,
        }
    }

    /// Builds a vector from a slice of any length. Missing entries are zero
    /// and extra entries are ignored.
    pub fn from_slice(values: &[f64]) -> Self {
        let mut array = [0.0; STATE_SIZE];
        for (slot, value) in array.iter_mut().zip(values) {
            *slot = *value;
        }
        array.into()
    }

    pub fn to_array(self) -> [f64; STATE_SIZE] {
        self.into()
    }

    /// Nearest of the three forward-facing range readings.
    pub fn min_distance(&self) -> f64 {
        self.front.min(self.left).min(self.right)
    }
}

impl From<[f64; STATE_SIZE]> for StateVector {
    fn from(v: [f64; STATE_SIZE]) -> Self {
        StateVector {
            front: v[0],
            left: v[1],
            right: v[2],
            speed: v[3],
            gyro: v[4],
            rpm: v[5],
            coverage: v[6],
            battery: v[7],
        }
    }
}

impl From<StateVector> for [f64; STATE_SIZE] {
    fn from(s: StateVector) -> Self {
        [
            s.front, s.left, s.right, s.speed, s.gyro, s.rpm, s.coverage, s.battery,
        ]
    }
}

/// Full snapshot of the simulator for dashboards and debugging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Telemetry {
    pub map_name: String,
    pub time: f64,
    pub steps: u64,
    pub car: CarState,
    pub sensors: SensorBus,
    pub visited_cells: usize,
    pub waypoints_remaining: usize,
    pub done: bool,
}
