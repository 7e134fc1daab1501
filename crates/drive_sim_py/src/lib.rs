use std::path::Path;

use pyo3::exceptions::{PyFileNotFoundError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use environment::{EnvError, SimConfig, SimEnv, StepOutcome, STATE_SIZE};

fn to_py_err(err: EnvError) -> PyErr {
    match &err {
        e if e.is_not_found() => PyFileNotFoundError::new_err(err.to_string()),
        EnvError::InvalidAction { .. } => PyValueError::new_err(err.to_string()),
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

/// Python-accessible headless car simulator.
#[pyclass]
pub struct DriveSim {
    env: SimEnv,
}

#[pymethods]
impl DriveSim {
    /// Create a simulator on a map.
    ///
    /// Args:
    ///     map: Path to a map file, or a map name inside `maps_dir`.
    ///     config: Optional path to a JSON simulator config.
    ///     maps_dir: Directory that `load_map` references resolve against.
    #[new]
    #[pyo3(signature = (map, config=None, maps_dir=None))]
    fn new(map: &str, config: Option<&str>, maps_dir: Option<&str>) -> PyResult<Self> {
        let mut sim_config = match config {
            Some(path) => SimConfig::from_json_file(path).map_err(to_py_err)?,
            None => SimConfig::default(),
        };
        if let Some(dir) = maps_dir {
            sim_config.maps_dir = dir.into();
        }
        let env = if Path::new(map).is_file() {
            SimEnv::from_map_file(map, sim_config)
        } else {
            SimEnv::from_catalog(map, sim_config)
        }
        .map_err(to_py_err)?;
        Ok(DriveSim { env })
    }

    /// Start a new episode and return the 8-element state vector.
    fn reset(&mut self) -> Vec<f64> {
        self.env.reset().to_array().to_vec()
    }

    /// Apply one action and return a dict with the new state, reward and flags.
    ///
    /// Args:
    ///     action: Index into the action space.
    ///     dt: Optional timestep in seconds overriding the configured clock.
    #[pyo3(signature = (action, dt=None))]
    fn step(&mut self, py: Python<'_>, action: usize, dt: Option<f64>) -> PyResult<PyObject> {
        let (prev, _) = self.env.state();
        let outcome = match dt {
            Some(dt) => self.env.step_with_dt(action, dt),
            None => self.env.step(action),
        }
        .map_err(to_py_err)?;
        let reward = self.env.compute_reward(&prev, &outcome);
        outcome_dict(py, &outcome, reward)
    }

    /// Current (state, done) without advancing the simulation.
    fn state(&self) -> (Vec<f64>, bool) {
        let (state, done) = self.env.state();
        (state.to_array().to_vec(), done)
    }

    /// Replace the map and reset. Raises FileNotFoundError for unknown maps.
    fn load_map(&mut self, file: &str) -> PyResult<()> {
        self.env.load_map(file).map_err(to_py_err)
    }

    /// Full car and sensor snapshot as a dict.
    fn telemetry(&self, py: Python<'_>) -> PyResult<PyObject> {
        let t = self.env.telemetry();
        let dict = PyDict::new_bound(py);
        dict.set_item("map_name", t.map_name)?;
        dict.set_item("time", t.time)?;
        dict.set_item("steps", t.steps)?;
        dict.set_item("position", t.car.position)?;
        dict.set_item("rotation", t.car.rotation)?;
        dict.set_item("velocity", t.car.velocity)?;
        dict.set_item("steering_angle", t.car.steering_angle)?;
        dict.set_item("speed", t.car.speed)?;
        dict.set_item("rpm", t.car.rpm)?;
        dict.set_item("gyro", t.car.gyro)?;
        dict.set_item("battery", t.car.battery)?;
        dict.set_item("crashed", t.car.crashed)?;
        dict.set_item("camera_angle", t.car.camera_angle)?;
        dict.set_item("front", t.sensors.front)?;
        dict.set_item("left", t.sensors.left)?;
        dict.set_item("right", t.sensors.right)?;
        dict.set_item("rear", t.sensors.rear)?;
        dict.set_item("coverage", t.sensors.coverage)?;
        dict.set_item("visited_cells", t.visited_cells)?;
        dict.set_item("waypoints_remaining", t.waypoints_remaining)?;
        dict.set_item("done", t.done)?;
        Ok(dict.into())
    }

    /// Number of discrete actions `step` accepts.
    fn action_size(&self) -> usize {
        self.env.action_size()
    }

    fn state_size(&self) -> usize {
        STATE_SIZE
    }

    fn map_name(&self) -> String {
        self.env.map_name().to_string()
    }
}

fn outcome_dict(py: Python<'_>, outcome: &StepOutcome, reward: f64) -> PyResult<PyObject> {
    let dict = PyDict::new_bound(py);
    dict.set_item("state", outcome.state.to_array().to_vec())?;
    dict.set_item("done", outcome.done)?;
    dict.set_item("reward", reward)?;
    dict.set_item("goal_reached", outcome.events.goal_reached)?;
    dict.set_item("waypoint_hit", outcome.events.waypoint_hit)?;
    dict.set_item("stalled", outcome.events.stalled)?;
    dict.set_item("crashed", outcome.flags.crashed)?;
    dict.set_item("coverage_done", outcome.flags.coverage_done)?;
    dict.set_item("battery", outcome.state.battery)?;
    dict.set_item("coverage", outcome.state.coverage)?;
    dict.set_item("termination", outcome.termination().map(|t| t.as_str()))?;
    Ok(dict.into())
}

/// Python module for the headless car simulator.
#[pymodule]
fn drive_sim_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<DriveSim>()?;
    m.add("STATE_SIZE", STATE_SIZE)?;
    Ok(())
}
