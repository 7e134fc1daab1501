use serde::{Deserialize, Serialize};
use simcore::Rect;

/// A square map object (obstacle or target).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapObject {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

impl MapObject {
    pub fn new(x: f64, y: f64, size: f64) -> Self {
        MapObject { x, y, size }
    }

    pub fn rect(&self) -> Rect {
        Rect::square(self.x, self.y, self.size)
    }

    pub fn intersects(&self, rect: &Rect) -> bool {
        rect.overlaps(&self.rect())
    }
}

/// A non-terminal reward checkpoint. Inactive waypoints are never hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub active: bool,
}

impl Waypoint {
    pub fn new(x: f64, y: f64, size: f64) -> Self {
        Waypoint {
            x,
            y,
            size,
            active: true,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::square(self.x, self.y, self.size)
    }

    pub fn intersects(&self, rect: &Rect) -> bool {
        self.active && rect.overlaps(&self.rect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapModel {
    pub name: String,
    pub cols: u32,
    pub rows: u32,
    pub cell_size: f64,
    pub margin: f64,
    pub start: [f64; 2],
    pub obstacles: Vec<MapObject>,
    pub waypoints: Vec<Waypoint>,
    pub target: Option<MapObject>,
}

impl MapModel {
    /// An empty arena with the start in the top-left corner.
    pub fn new(cols: u32, rows: u32, cell_size: f64, margin: f64) -> Self {
        MapModel {
            name: String::from("unnamed"),
            cols,
            rows,
            cell_size,
            margin,
            start: [0.0, 0.0],
            obstacles: Vec::new(),
            waypoints: Vec::new(),
            target: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_start(mut self, x: f64, y: f64) -> Self {
        self.start = [x, y];
        self
    }

    pub fn with_obstacle(mut self, x: f64, y: f64, size: f64) -> Self {
        self.obstacles.push(MapObject::new(x, y, size));
        self
    }

    pub fn with_waypoint(mut self, x: f64, y: f64, size: f64) -> Self {
        self.waypoints.push(Waypoint::new(x, y, size));
        self
    }

    pub fn with_target(mut self, x: f64, y: f64, size: f64) -> Self {
        self.target = Some(MapObject::new(x, y, size));
        self
    }

    pub fn width(&self) -> f64 {
        self.cols as f64 * self.cell_size
    }

    pub fn height(&self) -> f64 {
        self.rows as f64 * self.cell_size
    }

    /// Number of coverage cells in the grid.
    pub fn cell_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// True when the rectangle lies inside the map minus its margin.
    pub fn in_bounds(&self, rect: &Rect) -> bool {
        rect.x >= self.margin
            && rect.y >= self.margin
            && rect.right() <= self.width() - self.margin
            && rect.bottom() <= self.height() - self.margin
    }

    pub fn collides_with_obstacle(&self, rect: &Rect) -> bool {
        self.obstacles.iter().any(|o| o.intersects(rect))
    }

    /// Rectangles visible to range sensors: every obstacle, then the target.
    pub fn sensed_rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.obstacles
            .iter()
            .map(MapObject::rect)
            .chain(self.target.iter().map(MapObject::rect))
    }

    /// Objects whose rectangle leaves the `[0, width] x [0, height]` area.
    pub fn out_of_area_objects(&self) -> usize {
        let (w, h) = (self.width(), self.height());
        let outside = |r: Rect| r.x < 0.0 || r.y < 0.0 || r.right() > w || r.bottom() > h;
        self.obstacles.iter().filter(|o| outside(o.rect())).count()
            + self.waypoints.iter().filter(|o| outside(o.rect())).count()
            + self.target.iter().filter(|o| outside(o.rect())).count()
    }
}
