//! # KESTREL Shared Types
//!
//! Plain data shared between the simulation, the replication layer and the
//! transport:
//!
//! - Math types in the canonical network representation
//! - Entity identity handles
//! - Engine-wide tuning constants
//!
//! This crate must stay dependency-light: every other KESTREL crate links it.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod constants;
pub mod entity;
pub mod math;

pub use constants::{
    DEFAULT_GRID_CELL_SIZE, DEFAULT_SERVER_TICK_RATE, DEFAULT_SPATIAL_BIAS_X,
    DEFAULT_SPATIAL_BIAS_Y,
};
pub use entity::EntityId;
pub use math::{Vec2, Vec3};
