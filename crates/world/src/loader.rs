//! Text map format: a `cols,rows,cellSize,margin` header followed by one
//! tagged directive per line.

use std::fmt::Write as _;
use std::path::Path;

use log::{debug, warn};

use crate::error::{MapParseError, Result};
use crate::map::{MapModel, MapObject, Waypoint};

const DEFAULT_TARGET_SIZE: f64 = 10.0;
const HEADER_FIELDS: [&str; 4] = ["cols", "rows", "cellSize", "margin"];

impl MapModel {
    /// Parses map text. Unknown tags, short lines and lines with
    /// non-numeric values are skipped; only a bad header is an error.
    pub fn parse(text: &str) -> std::result::Result<Self, MapParseError> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        let header = lines.next().ok_or(MapParseError::EmptyInput)?;
        let [cols, rows, cell_size, margin] = parse_header(header)?;

        let max = u32::MAX as f64;
        if !(cols >= 1.0 && rows >= 1.0 && cols <= max && rows <= max) {
            return Err(MapParseError::InvalidDimensions(format!(
                "{cols} x {rows} cells"
            )));
        }
        if !(cell_size > 0.0) || !cell_size.is_finite() || !margin.is_finite() {
            return Err(MapParseError::InvalidDimensions(format!(
                "cell size {cell_size}, margin {margin}"
            )));
        }

        let mut map = MapModel::new(cols as u32, rows as u32, cell_size, margin);
        for line in lines {
            let parts: Vec<&str> = line.split(',').map(str::trim).collect();
            if !apply_directive(&mut map, &parts) {
                debug!("Skipping map line {line:?}");
            }
        }

        let outside = map.out_of_area_objects();
        if outside > 0 {
            warn!("{outside} map object(s) extend beyond the {}x{} area", map.width(), map.height());
        }
        Ok(map)
    }

    /// Loads a map file, naming the map after the file stem.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("unnamed"));
        let map = MapModel::parse(&text)?.with_name(name);
        debug!(
            "Loaded map {} ({}x{} cells, {} obstacles, {} waypoints)",
            map.name,
            map.cols,
            map.rows,
            map.obstacles.len(),
            map.waypoints.len()
        );
        Ok(map)
    }

    /// Writes the map back to its text format.
    pub fn to_text(&self) -> String {
        let mut out = format!("{},{},{},{}\n", self.cols, self.rows, self.cell_size, self.margin);
        // Writing to a String cannot fail.
        let _ = writeln!(out, "start,{},{}", self.start[0], self.start[1]);
        if let Some(t) = &self.target {
            let _ = writeln!(out, "target,{},{},{}", t.x, t.y, t.size);
        }
        for w in &self.waypoints {
            let _ = writeln!(out, "waypoint,{},{},{}", w.x, w.y, w.size);
        }
        for o in &self.obstacles {
            let _ = writeln!(out, "obstacle,{},{},{}", o.x, o.y, o.size);
        }
        out
    }
}

fn parse_header(line: &str) -> std::result::Result<[f64; 4], MapParseError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let mut values = [0.0; 4];
    for (index, name) in HEADER_FIELDS.iter().enumerate() {
        let raw = fields
            .get(index)
            .filter(|f| !f.is_empty())
            .ok_or(MapParseError::MissingHeaderField { index })?;
        values[index] = raw
            .parse::<f64>()
            .map_err(|_| MapParseError::InvalidHeaderNumber {
                field: *name,
                value: raw.to_string(),
            })?;
    }
    Ok(values)
}

fn numbers(parts: &[&str]) -> Option<Vec<f64>> {
    parts.iter().map(|p| p.parse::<f64>().ok()).collect()
}

/// Applies one body line. Returns false when the line was skipped.
fn apply_directive(map: &mut MapModel, parts: &[&str]) -> bool {
    let Some((tag, args)) = parts.split_first() else {
        return false;
    };
    match (*tag, args.len()) {
        ("start", n) if n >= 2 => match numbers(&args[..2]) {
            Some(v) => {
                map.start = [v[0], v[1]];
                true
            }
            None => false,
        },
        ("target", n) if n >= 2 => {
            let size = match args.get(2).filter(|s| !s.is_empty()) {
                Some(raw) => match raw.parse::<f64>() {
                    Ok(size) => size,
                    Err(_) => return false,
                },
                None => DEFAULT_TARGET_SIZE,
            };
            match numbers(&args[..2]) {
                Some(v) => {
                    map.target = Some(MapObject::new(v[0], v[1], size));
                    true
                }
                None => false,
            }
        }
        ("waypoint", n) if n >= 3 => match numbers(&args[..3]) {
            Some(v) => {
                map.waypoints.push(Waypoint::new(v[0], v[1], v[2]));
                true
            }
            None => false,
        },
        ("obstacle", n) if n >= 3 => match numbers(&args[..3]) {
            Some(v) => {
                map.obstacles.push(MapObject::new(v[0], v[1], v[2]));
                true
            }
            None => false,
        },
        _ => false,
    }
}
