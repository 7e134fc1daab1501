use std::collections::HashSet;

use log::trace;
use mechanics::Hitbox;
use serde::{Deserialize, Serialize};
use simcore::{Model, SensorModel, SimContext, SimState};
use world::MapModel;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Ignore cells outside `[0, cols) x [0, rows)`. Off by default, in
    /// which case a car outside the grid can push the ratio above 1.
    pub clamp_to_map: bool,
}

/// Records the grid cells visited by the car centre during an episode.
#[derive(Debug, Clone)]
pub struct CoverageTracker {
    pub config: CoverageConfig,
    hitbox: Hitbox,
    cell_size: f64,
    cols: i64,
    rows: i64,
    visited: HashSet<(i64, i64)>,
}

impl CoverageTracker {
    pub fn new(config: CoverageConfig, hitbox: Hitbox, map: &MapModel) -> Self {
        CoverageTracker {
            config,
            hitbox,
            cell_size: map.cell_size,
            cols: map.cols as i64,
            rows: map.rows as i64,
            visited: HashSet::new(),
        }
    }

    /// Adopts a new grid and forgets all visits.
    pub fn set_map(&mut self, map: &MapModel) {
        self.cell_size = map.cell_size;
        self.cols = map.cols as i64;
        self.rows = map.rows as i64;
        self.visited.clear();
    }

    pub fn cell_of(&self, point: [f64; 2]) -> (i64, i64) {
        (
            (point[0] / self.cell_size).floor() as i64,
            (point[1] / self.cell_size).floor() as i64,
        )
    }

    /// Marks the cell containing `point`. Returns true if it was new.
    pub fn visit(&mut self, point: [f64; 2]) -> bool {
        let cell = self.cell_of(point);
        let inside = (0..self.cols).contains(&cell.0) && (0..self.rows).contains(&cell.1);
        if self.config.clamp_to_map && !inside {
            return false;
        }
        self.visited.insert(cell)
    }

    pub fn visited_cells(&self) -> usize {
        self.visited.len()
    }

    pub fn is_visited(&self, cell: (i64, i64)) -> bool {
        self.visited.contains(&cell)
    }

    pub fn ratio(&self) -> f64 {
        let total = self.cols as f64 * self.rows as f64;
        if total <= 0.0 {
            return 0.0;
        }
        self.visited.len() as f64 / total
    }
}

impl Model for CoverageTracker {
    fn reset(&mut self) {
        self.visited.clear();
    }
}

impl SensorModel for CoverageTracker {
    fn step_sensor(&mut self, _ctx: SimContext, state: &mut SimState) {
        let car = &state.true_state;
        let center = self.hitbox.center(car.position[0], car.position[1]);
        if self.visit(center) {
            trace!("Visited cell {:?}, coverage {:.3}", self.cell_of(center), self.ratio());
        }
        state.sensor_bus.coverage = self.ratio();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn tracker(clamp: bool) -> CoverageTracker {
        let map = MapModel::new(4, 5, 10.0, 0.0);
        CoverageTracker::new(CoverageConfig { clamp_to_map: clamp }, Hitbox::default(), &map)
    }

    #[test]
    fn test_floor_discretization() {
        let t = tracker(false);
        assert_eq!(t.cell_of([0.0, 0.0]), (0, 0));
        assert_eq!(t.cell_of([9.99, 10.0]), (0, 1));
        assert_eq!(t.cell_of([-0.5, 25.0]), (-1, 2));
    }

    #[test]
    fn test_ratio_counts_unique_cells() {
        let mut t = tracker(false);
        assert_eq!(t.ratio(), 0.0);
        assert!(t.visit([1.0, 1.0]));
        assert!(!t.visit([2.0, 3.0]));
        assert!(t.visit([15.0, 1.0]));
        assert_eq!(t.visited_cells(), 2);
        assert_eq!(t.ratio(), 2.0 / 20.0);
        t.reset();
        assert_eq!(t.ratio(), 0.0);
    }

    #[test]
    fn test_cells_outside_grid_are_kept_unless_clamped() {
        let mut loose = tracker(false);
        let mut clamped = tracker(true);
        for x in 0..30 {
            let p = [x as f64 * 10.0 + 1.0, 1.0];
            loose.visit(p);
            clamped.visit(p);
        }
        assert!(loose.ratio() > 1.0);
        assert_eq!(clamped.visited_cells(), 4);
        assert!(clamped.ratio() <= 1.0);
    }

    #[test]
    fn test_step_samples_car_center() {
        let mut t = tracker(false);
        // hitbox 40x60 at (0, 0): centre (20, 30) lies in cell (2, 3)
        let mut state = SimState::at_rest(0.0, 0.0, PI);
        t.step_sensor(SimContext { dt: 0.1, t: 0.0 }, &mut state);
        assert!(t.is_visited((2, 3)));
        assert_eq!(state.sensor_bus.coverage, 1.0 / 20.0);
    }

    #[test]
    fn test_ratio_on_huge_grid() {
        let map = MapModel::new(u32::MAX, u32::MAX, 1.0, 0.0);
        let mut t = CoverageTracker::new(CoverageConfig::default(), Hitbox::default(), &map);
        assert!(t.visit([5.0, 5.0]));
        let ratio = t.ratio();
        assert!(ratio > 0.0 && ratio < 1e-18);
    }
}
