//! Simulated sensing for the drive simulator
//!
//! - `RangeSensor`: four distance rays cast from the car centre
//! - `CoverageTracker`: visited grid cells and the coverage ratio

pub mod coverage;
pub mod rays;

pub use coverage::*;
pub use rays::*;
