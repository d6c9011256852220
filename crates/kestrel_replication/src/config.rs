//! # Graph Configuration
//!
//! Startup tuning for the replication graph: grid geometry, rebuild
//! behavior, and the named per-class overrides that take precedence over
//! policy inference and parameter derivation.
//!
//! Parsed once from TOML at startup; never re-read.
//!
//! ```toml
//! grid_cell_size = 10000.0
//! spatial_bias_x = -150000.0
//! spatial_bias_y = -200000.0
//! disable_spatial_rebuilding = true
//!
//! [[policy_overrides]]
//! class = "ReplicationDebugActor"
//! policy = "NotRouted"
//!
//! [[parameter_overrides]]
//! class = "Pawn"
//! cull_distance_squared = 90000000000.0
//! ```

use crate::error::{GraphError, GraphResult};
use crate::policy::RoutingPolicy;
use kestrel_shared::constants::{
    DEFAULT_GRID_CELL_SIZE, DEFAULT_SPATIAL_BIAS_X, DEFAULT_SPATIAL_BIAS_Y,
};
use serde::Deserialize;

/// Forces a class (and its descendants, via ancestor fallback) onto a
/// routing policy, bypassing inference.
#[derive(Clone, Debug, Deserialize)]
pub struct PolicyOverride {
    /// Class name, resolved against the type registry at build time.
    pub class: String,
    /// The forced policy.
    pub policy: RoutingPolicy,
}

/// Hand-tuned replication parameters for a class and its descendants.
#[derive(Clone, Debug, Deserialize)]
pub struct ParameterOverride {
    /// Class name, resolved against the type registry at build time.
    pub class: String,
    /// Forced squared cull distance; falls back to the class's own
    /// registry default if omitted.
    #[serde(default)]
    pub cull_distance_squared: Option<f32>,
    /// Desired update frequency the period is derived from; a period of
    /// one tick if omitted.
    #[serde(default)]
    pub update_frequency: Option<f32>,
}

/// Replication graph configuration, loaded once at startup.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    /// Size of one grid cell, world units.
    pub grid_cell_size: f32,
    /// Minimum X of the replicated world extent.
    pub spatial_bias_x: f32,
    /// Minimum Y of the replicated world extent.
    pub spatial_bias_y: f32,
    /// Disables automatic grid-extent rebuilding (a performance/stability
    /// tradeoff; rebuilding adapts bounds to actor distribution but costs
    /// CPU).
    pub disable_spatial_rebuilding: bool,
    /// Class names exempt from triggering grid rebuilds.
    pub rebuild_blacklist: Vec<String>,
    /// Forced class → policy mappings, seeded before inference.
    pub policy_overrides: Vec<PolicyOverride>,
    /// Hand-tuned class parameters, never overwritten by derivation.
    pub parameter_overrides: Vec<ParameterOverride>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            grid_cell_size: DEFAULT_GRID_CELL_SIZE,
            spatial_bias_x: DEFAULT_SPATIAL_BIAS_X,
            spatial_bias_y: DEFAULT_SPATIAL_BIAS_Y,
            disable_spatial_rebuilding: true,
            rebuild_blacklist: Vec::new(),
            policy_overrides: Vec::new(),
            parameter_overrides: Vec::new(),
        }
    }
}

impl GraphConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::ConfigParse`] for malformed TOML and
    /// [`GraphError::InvalidConfig`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> GraphResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates ranges.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidConfig`] when the cell size is not a
    /// positive finite number or a bias is not finite.
    pub fn validate(&self) -> GraphResult<()> {
        if !(self.grid_cell_size.is_finite() && self.grid_cell_size > 0.0) {
            return Err(GraphError::InvalidConfig(format!(
                "grid_cell_size must be positive and finite, got {}",
                self.grid_cell_size
            )));
        }
        if !self.spatial_bias_x.is_finite() || !self.spatial_bias_y.is_finite() {
            return Err(GraphError::InvalidConfig(
                "spatial bias must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
