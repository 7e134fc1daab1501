//! Hitbox geometry and move acceptance.
//!
//! The hitbox is the axis-aligned box enclosing the rotated car rectangle.
//! It over-reports contact at grazing angles compared with an oriented
//! rectangle test; sensors and rewards are tuned against this box, so it
//! must not be tightened.

use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};
use simcore::Rect;
use world::MapModel;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub width: f64,
    pub height: f64,
}

impl Hitbox {
    pub fn new(width: f64, height: f64) -> Self {
        Hitbox { width, height }
    }

    /// Centre of the hitbox whose unrotated top-left corner is `(x, y)`.
    pub fn center(&self, x: f64, y: f64) -> [f64; 2] {
        [x + self.width / 2.0, y + self.height / 2.0]
    }

    /// Corners of the rectangle rotated about its centre.
    pub fn corners(&self, x: f64, y: f64, rotation: f64) -> [[f64; 2]; 4] {
        let [cx, cy] = self.center(x, y);
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        let rot = Rotation2::new(rotation);
        [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)].map(|(dx, dy)| {
            let r = rot * Vector2::new(dx, dy);
            [cx + r.x, cy + r.y]
        })
    }

    /// Axis-aligned box enclosing the rotated rectangle.
    pub fn aabb(&self, x: f64, y: f64, rotation: f64) -> Rect {
        Rect::enclosing(&self.corners(x, y, rotation)).unwrap_or_default()
    }
}

impl Default for Hitbox {
    fn default() -> Self {
        Hitbox::new(40.0, 60.0)
    }
}

/// A proposed hitbox is accepted when it stays inside the map margin and
/// touches no obstacle.
pub fn is_clear(map: &MapModel, bbox: &Rect) -> bool {
    map.in_bounds(bbox) && !map.collides_with_obstacle(bbox)
}
