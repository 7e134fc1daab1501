//! Car kinematics for the drive simulator
//!
//! This crate provides:
//! - Bicycle-model vehicle kinematics with move rejection on collision
//! - The conservative rotated-hitbox collision test
//! - Battery drain driven by motor rpm
//! - Discrete action decoding for trainers

pub mod battery;
pub mod collision;
pub mod commands;
pub mod vehicle;

pub use battery::*;
pub use collision::*;
pub use commands::*;
pub use vehicle::*;
