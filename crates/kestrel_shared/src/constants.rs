//! # Engine Tuning Constants
//!
//! Defaults shared by the server and the replication layer. Deployments
//! override these through the graph configuration file, not by editing
//! this module.

/// Server simulation tick rate (ticks per second).
///
/// Per-class replication periods are derived from this: a class that wants
/// 10 updates/second at a 30Hz server replicates every 3 ticks.
pub const DEFAULT_SERVER_TICK_RATE: f32 = 30.0;

/// Size of one spatial grid cell, in world units.
pub const DEFAULT_GRID_CELL_SIZE: f32 = 10_000.0;

/// Minimum X of the replicated world extent ("spatial bias").
pub const DEFAULT_SPATIAL_BIAS_X: f32 = -150_000.0;

/// Minimum Y of the replicated world extent ("spatial bias").
pub const DEFAULT_SPATIAL_BIAS_Y: f32 = -200_000.0;
