use std::f64::consts::PI;
use std::sync::Arc;

use log::trace;
use serde::{Deserialize, Serialize};
use simcore::{
    gyro_degrees, DriveCommand, ElectricalModel, MechanicsModel, Model, Rect, SimContext, SimState,
};
use world::MapModel;

use crate::battery::Battery;
use crate::collision::{is_clear, Hitbox};

/// Physical limits and rates of the simulated car. Rates are applied once
/// per tick; only the battery drain scales with the timestep.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// Collision rectangle before rotation (map units).
    pub hitbox: Hitbox,
    /// Distance between axles used by the bicycle model.
    pub wheel_base: f64,
    /// Velocity limit in map units per tick, both directions.
    pub max_speed: f64,
    /// Velocity gained per tick under throttle.
    pub accel_rate: f64,
    /// Velocity lost per tick when coasting.
    pub decel_rate: f64,
    /// Below this speed a coasting car snaps to rest.
    pub stop_threshold: f64,
    /// Steering limit in radians, both directions.
    pub max_steering: f64,
    /// Steering change per tick in radians.
    pub steer_rate: f64,
    /// Reported rpm at `max_speed`.
    pub max_rpm: f64,
    /// Converts velocity (units/tick) to reported speed.
    pub speed_scale: f64,
    pub battery: Battery,
    /// Heading assigned at the start pose.
    pub start_rotation: f64,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        VehicleConfig {
            hitbox: Hitbox::default(),
            wheel_base: 50.0,
            max_speed: 5.0,
            accel_rate: 0.2,
            decel_rate: 0.05,
            stop_threshold: 0.01,
            max_steering: 60f64.to_radians(),
            steer_rate: 0.015,
            max_rpm: 5000.0,
            speed_scale: 60.0,
            battery: Battery::default(),
            start_rotation: PI,
        }
    }
}

/// Bicycle-model car that rejects any move ending in a collision.
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub config: VehicleConfig,
    map: Arc<MapModel>,
}

impl Vehicle {
    pub fn new(config: VehicleConfig, map: Arc<MapModel>) -> Self {
        Vehicle { config, map }
    }

    pub fn map(&self) -> &MapModel {
        &self.map
    }

    pub fn set_map(&mut self, map: Arc<MapModel>) {
        self.map = map;
    }

    /// Simulation state with the car at rest on the map's start pose.
    pub fn start_state(&self) -> SimState {
        SimState::at_rest(self.map.start[0], self.map.start[1], self.config.start_rotation)
    }

    /// Hitbox of the car at its committed pose.
    pub fn hitbox_of(&self, state: &SimState) -> Rect {
        let car = &state.true_state;
        self.config
            .hitbox
            .aabb(car.position[0], car.position[1], car.rotation)
    }

    /// Centre of the car, the origin of sensor rays and coverage samples.
    pub fn center_of(&self, state: &SimState) -> [f64; 2] {
        let car = &state.true_state;
        self.config.hitbox.center(car.position[0], car.position[1])
    }

    fn update_velocity(&self, command: DriveCommand, state: &mut SimState) {
        let cfg = &self.config;
        let car = &mut state.true_state;
        match command {
            DriveCommand::Forward => {
                car.acceleration = cfg.accel_rate;
                car.velocity += cfg.accel_rate;
            }
            DriveCommand::Backward => {
                car.acceleration = -cfg.accel_rate;
                car.velocity -= cfg.accel_rate;
            }
            _ => {
                // Coast towards rest without reversing direction. Velocities
                // reachable from rest are multiples of decel_rate (it divides
                // accel_rate), so the clamp equals `velocity += acceleration`
                // there and only keeps float drift from flipping the sign.
                if car.velocity > 0.0 {
                    car.acceleration = -cfg.decel_rate;
                    car.velocity = (car.velocity - cfg.decel_rate).max(0.0);
                } else if car.velocity < 0.0 {
                    car.acceleration = cfg.decel_rate;
                    car.velocity = (car.velocity + cfg.decel_rate).min(0.0);
                } else {
                    car.acceleration = 0.0;
                }
            }
        }

        car.velocity = car.velocity.clamp(-cfg.max_speed, cfg.max_speed);
        if car.velocity.abs() < cfg.stop_threshold && !command.is_throttle() {
            car.velocity = 0.0;
        }
    }

    fn update_steering(&self, command: DriveCommand, state: &mut SimState) {
        let cfg = &self.config;
        let car = &mut state.true_state;
        car.steering_angle = match command {
            DriveCommand::Left => (car.steering_angle - cfg.steer_rate).max(-cfg.max_steering),
            DriveCommand::Right => (car.steering_angle + cfg.steer_rate).min(cfg.max_steering),
            _ if car.steering_angle > 0.0 => (car.steering_angle - cfg.steer_rate).max(0.0),
            _ if car.steering_angle < 0.0 => (car.steering_angle + cfg.steer_rate).min(0.0),
            _ => 0.0,
        };
    }

    fn update_telemetry(&self, state: &mut SimState) {
        let cfg = &self.config;
        let car = &mut state.true_state;
        car.speed = (car.velocity * cfg.speed_scale).abs();
        car.rpm = (car.velocity / cfg.max_speed * cfg.max_rpm).abs();
        car.gyro = gyro_degrees(car.rotation);
        car.camera_angle = state.control_input.camera_angle;
    }
}

impl Model for Vehicle {
    fn reset(&mut self) {
        self.config.battery.reset();
    }
}

impl MechanicsModel for Vehicle {
    fn step_physics(&mut self, ctx: SimContext, state: &mut SimState) {
        let command = state.control_input.command;

        // 1. Throttle and steering
        self.update_velocity(command, state);
        self.update_steering(command, state);

        // 2. Propose the next pose. The car drives towards rotation + PI.
        let car = &state.true_state;
        let rot_change = if car.velocity != 0.0 {
            (car.velocity / self.config.wheel_base) * car.steering_angle.tan()
        } else {
            0.0
        };
        let new_rotation = car.rotation + rot_change;
        let heading = car.rotation + PI;
        let nx = car.position[0] + heading.cos() * car.velocity;
        let ny = car.position[1] + heading.sin() * car.velocity;

        // 3. Accept the move or reject it outright
        let bbox = self.config.hitbox.aabb(nx, ny, new_rotation);
        let car = &mut state.true_state;
        if is_clear(&self.map, &bbox) {
            car.position = [nx, ny];
            car.rotation = new_rotation;
            car.crashed = false;
        } else {
            trace!("Rejected move to ({nx:.2}, {ny:.2}) at t={:.3}", ctx.t);
            car.velocity = 0.0;
            car.acceleration = 0.0;
            car.crashed = true;
        }

        // 4. Telemetry and battery
        self.update_telemetry(state);
        self.config.battery.step_electrical(ctx, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use simcore::ActuatorInput;

    const DT: f64 = 1.0 / 60.0;

    fn open_map() -> Arc<MapModel> {
        Arc::new(MapModel::new(30, 30, 40.0, 0.0).with_start(500.0, 500.0))
    }

    fn step(vehicle: &mut Vehicle, state: &mut SimState, command: DriveCommand, t: f64) {
        state.control_input = ActuatorInput {
            command,
            camera_angle: state.control_input.camera_angle,
        };
        vehicle.step_physics(SimContext { dt: DT, t }, state);
    }

    #[test]
    fn test_stop_at_rest_keeps_pose() {
        let mut vehicle = Vehicle::new(VehicleConfig::default(), open_map());
        let mut state = vehicle.start_state();
        for i in 0..5 {
            step(&mut vehicle, &mut state, DriveCommand::Stop, i as f64 * DT);
        }
        let car = &state.true_state;
        assert_eq!(car.position, [500.0, 500.0]);
        assert_eq!(car.rotation, PI);
        assert_eq!(car.velocity, 0.0);
        assert!(!car.crashed);
        assert_eq!(car.battery, 1.0);
    }

    #[test]
    fn test_forward_moves_along_reversed_heading() {
        let mut vehicle = Vehicle::new(VehicleConfig::default(), open_map());
        let mut state = vehicle.start_state();
        step(&mut vehicle, &mut state, DriveCommand::Forward, 0.0);

        let car = &state.true_state;
        assert_relative_eq!(car.velocity, 0.2);
        // rotation PI drives towards +x
        assert_relative_eq!(car.position[0], 500.2, epsilon = 1e-9);
        assert_relative_eq!(car.position[1], 500.0, epsilon = 1e-9);
        assert_relative_eq!(car.speed, 12.0, epsilon = 1e-9);
        assert_relative_eq!(car.rpm, 200.0, epsilon = 1e-9);
        assert_relative_eq!(car.gyro, 180.0, epsilon = 1e-9);
        assert!(car.battery < 1.0);
    }

    #[test]
    fn test_velocity_is_capped() {
        let mut vehicle = Vehicle::new(VehicleConfig::default(), open_map());
        let mut state = vehicle.start_state();
        state.true_state.position = [100.0, 500.0];
        for i in 0..40 {
            step(&mut vehicle, &mut state, DriveCommand::Forward, i as f64 * DT);
        }
        assert_relative_eq!(state.true_state.velocity, 5.0, epsilon = 1e-9);
        assert_relative_eq!(state.true_state.rpm, 5000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_coasting_snaps_to_rest() {
        let mut vehicle = Vehicle::new(VehicleConfig::default(), open_map());
        let mut state = vehicle.start_state();
        step(&mut vehicle, &mut state, DriveCommand::Forward, 0.0);
        for i in 0..4 {
            step(&mut vehicle, &mut state, DriveCommand::Stop, i as f64 * DT);
        }
        assert_eq!(state.true_state.velocity, 0.0);
        assert_eq!(state.true_state.acceleration, -0.05);

        step(&mut vehicle, &mut state, DriveCommand::Stop, 1.0);
        assert_eq!(state.true_state.acceleration, 0.0);
    }

    #[test]
    fn test_reverse_and_coast_back() {
        let mut vehicle = Vehicle::new(VehicleConfig::default(), open_map());
        let mut state = vehicle.start_state();
        step(&mut vehicle, &mut state, DriveCommand::Backward, 0.0);
        assert_relative_eq!(state.true_state.velocity, -0.2);
        assert!(state.true_state.position[0] < 500.0);

        step(&mut vehicle, &mut state, DriveCommand::Left, DT);
        assert_relative_eq!(state.true_state.velocity, -0.15, epsilon = 1e-12);
        assert_relative_eq!(state.true_state.acceleration, 0.05);
    }

    #[test]
    fn test_steering_clamps_and_relaxes() {
        let mut vehicle = Vehicle::new(VehicleConfig::default(), open_map());
        let mut state = vehicle.start_state();
        let max = 60f64.to_radians();

        for i in 0..100 {
            step(&mut vehicle, &mut state, DriveCommand::Left, i as f64 * DT);
        }
        assert_relative_eq!(state.true_state.steering_angle, -max);

        step(&mut vehicle, &mut state, DriveCommand::Stop, 2.0);
        assert_relative_eq!(state.true_state.steering_angle, -max + 0.015, epsilon = 1e-12);

        for i in 0..200 {
            step(&mut vehicle, &mut state, DriveCommand::Right, i as f64 * DT);
        }
        assert_relative_eq!(state.true_state.steering_angle, max);
    }

    #[test]
    fn test_steering_turns_moving_car() {
        let mut vehicle = Vehicle::new(VehicleConfig::default(), open_map());
        let mut state = vehicle.start_state();
        step(&mut vehicle, &mut state, DriveCommand::Forward, 0.0);
        step(&mut vehicle, &mut state, DriveCommand::Right, DT);

        let car = &state.true_state;
        // velocity 0.15 after coasting one tick, steering +0.015
        let expected = PI + (0.15 / 50.0) * 0.015f64.tan();
        assert_relative_eq!(car.rotation, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_obstacle_rejects_move() {
        // Car hitbox spans x in [500, 540]; the obstacle starts right after.
        let map = Arc::new(
            MapModel::new(30, 30, 40.0, 0.0)
                .with_start(500.0, 500.0)
                .with_obstacle(541.0, 500.0, 40.0),
        );
        let mut vehicle = Vehicle::new(VehicleConfig::default(), map);
        let mut state = vehicle.start_state();

        let mut crashed_at = None;
        for i in 0..20 {
            step(&mut vehicle, &mut state, DriveCommand::Forward, i as f64 * DT);
            if state.true_state.crashed {
                crashed_at = Some(i);
                break;
            }
        }
        assert!(crashed_at.is_some());
        let car = &state.true_state;
        assert_eq!(car.velocity, 0.0);
        assert_eq!(car.acceleration, 0.0);
        assert!(car.position[0] + 40.0 < 541.0);
        assert_eq!(car.speed, 0.0);
        assert_eq!(car.rpm, 0.0);
    }

    #[test]
    fn test_map_edge_rejects_move() {
        let map = Arc::new(MapModel::new(10, 10, 40.0, 10.0).with_start(349.9, 100.0));
        let mut vehicle = Vehicle::new(VehicleConfig::default(), map);
        let mut state = vehicle.start_state();
        step(&mut vehicle, &mut state, DriveCommand::Forward, 0.0);
        assert!(state.true_state.crashed);
        assert_eq!(state.true_state.position, [349.9, 100.0]);
    }

    #[test]
    fn test_random_driving_respects_limits() {
        let map = Arc::new(
            MapModel::new(20, 20, 40.0, 10.0)
                .with_start(380.0, 370.0)
                .with_obstacle(200.0, 200.0, 40.0)
                .with_obstacle(600.0, 300.0, 60.0)
                .with_obstacle(350.0, 600.0, 30.0),
        );
        let mut vehicle = Vehicle::new(VehicleConfig::default(), map.clone());
        let mut state = vehicle.start_state();
        let mut rng = StdRng::seed_from_u64(7);
        let max_steer = 60f64.to_radians();
        let mut battery = state.true_state.battery;

        for i in 0..3000 {
            let command = DriveCommand::ALL[rng.gen_range(0..5)];
            step(&mut vehicle, &mut state, command, i as f64 * DT);
            let car = &state.true_state;
            assert!(car.velocity.abs() <= 5.0);
            assert!(car.steering_angle.abs() <= max_steer + 1e-12);
            assert!(car.battery <= battery);
            battery = car.battery;

            let bbox = vehicle.hitbox_of(&state);
            assert!(map.in_bounds(&bbox));
            assert!(!map.collides_with_obstacle(&bbox));
        }
    }
}
