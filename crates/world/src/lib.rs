//! Arena description for the drive simulator.
//!
//! A map is a grid of `cols x rows` cells of `cell_size` units with a
//! driveable margin, a start position, square obstacles, one-shot waypoints
//! and an optional target. Maps are stored as plain comma-separated text:
//!
//! ```text
//! 20,15,40,10
//! start,380,300
//! target,700,80,20
//! waypoint,400,100,15
//! obstacle,200,200,40
//! ```

pub mod catalog;
pub mod error;
pub mod loader;
pub mod map;

pub use catalog::MapCatalog;
pub use error::{MapError, MapParseError, Result};
pub use map::{MapModel, MapObject, Waypoint};
