//! Shared simulation state, model traits, clock and geometry for the drive simulator.

pub mod clock;
pub mod geometry;
pub mod traits;

pub use clock::*;
pub use geometry::*;
pub use traits::*;
