//! Ray-cast distance sensing against axis-aligned rectangles.
//!
//! Rays start at the car centre and see every obstacle plus the target.
//! Map bounds are not sensed.

use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use mechanics::Hitbox;
use serde::{Deserialize, Serialize};
use simcore::{Model, Rect, SensorModel, SimContext, SimState};
use world::MapModel;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Reading reported when nothing is hit (map units).
    pub max_range: f64,
    /// Direction components smaller than this are treated as parallel to an edge.
    pub parallel_epsilon: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        SensorConfig {
            max_range: 150.0,
            parallel_epsilon: 1e-6,
        }
    }
}

/// Distances read by the four rays in one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeReadings {
    pub front: f64,
    pub left: f64,
    pub right: f64,
    pub rear: f64,
}

/// Smallest non-negative ray parameter at which the ray crosses the
/// rectangle's boundary, or `None` if the ray misses.
///
/// Each edge is clipped separately: the crossing with an edge line counts
/// only when the crossing point lies within the edge's span.
pub fn ray_rect_distance(origin: [f64; 2], angle: f64, rect: &Rect, epsilon: f64) -> Option<f64> {
    let (sin, cos) = angle.sin_cos();
    let [fx, fy] = origin;
    let mut best: Option<f64> = None;
    let mut keep = |t: f64| {
        if best.is_none_or(|b| t < b) {
            best = Some(t);
        }
    };

    if cos.abs() > epsilon {
        for edge_x in [rect.x, rect.right()] {
            let t = (edge_x - fx) / cos;
            if t >= 0.0 {
                let y = fy + t * sin;
                if rect.y <= y && y <= rect.bottom() {
                    keep(t);
                }
            }
        }
    }
    if sin.abs() > epsilon {
        for edge_y in [rect.y, rect.bottom()] {
            let t = (edge_y - fy) / sin;
            if t >= 0.0 {
                let x = fx + t * cos;
                if rect.x <= x && x <= rect.right() {
                    keep(t);
                }
            }
        }
    }
    best
}

/// Four fixed rays: front (`rotation + PI`), left (`rotation + PI/2`),
/// right (`rotation - PI/2`) and rear (`rotation`).
#[derive(Debug, Clone)]
pub struct RangeSensor {
    pub config: SensorConfig,
    hitbox: Hitbox,
    map: Arc<MapModel>,
}

impl RangeSensor {
    pub fn new(config: SensorConfig, hitbox: Hitbox, map: Arc<MapModel>) -> Self {
        RangeSensor {
            config,
            hitbox,
            map,
        }
    }

    pub fn set_map(&mut self, map: Arc<MapModel>) {
        self.map = map;
    }

    /// Distance to the nearest sensed rectangle along `angle`, capped at the range.
    pub fn cast(&self, origin: [f64; 2], angle: f64) -> f64 {
        self.map
            .sensed_rects()
            .filter_map(|rect| ray_rect_distance(origin, angle, &rect, self.config.parallel_epsilon))
            .fold(self.config.max_range, f64::min)
    }

    pub fn read(&self, state: &SimState) -> RangeReadings {
        let car = &state.true_state;
        let origin = self.hitbox.center(car.position[0], car.position[1]);
        let rotation = car.rotation;
        RangeReadings {
            front: self.cast(origin, rotation + PI),
            left: self.cast(origin, rotation + FRAC_PI_2),
            right: self.cast(origin, rotation - FRAC_PI_2),
            rear: self.cast(origin, rotation),
        }
    }
}

impl Model for RangeSensor {
    fn reset(&mut self) {
        // Stateless between ticks
    }
}

impl SensorModel for RangeSensor {
    fn step_sensor(&mut self, _ctx: SimContext, state: &mut SimState) {
        let readings = self.read(state);
        let bus = &mut state.sensor_bus;
        bus.front = readings.front;
        bus.left = readings.left;
        bus.right = readings.right;
        bus.rear = readings.rear;
    }
}
