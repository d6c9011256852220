//! # Replication Graph
//!
//! Ties the pieces together: one-time initialization (classification,
//! parameter derivation, node construction) and the per-event routing
//! dispatcher.
//!
//! ## Initialization Contract
//!
//! [`ReplicationGraphBuilder::build`] consumes the builder and returns the
//! only handle able to route entities. Classification therefore runs to
//! completion before the first entity event can possibly arrive - the
//! "init before traffic" precondition is discharged by the type system,
//! not by convention.

use crate::classifier::{classify, ClassDiagnostics};
use crate::config::GraphConfig;
use crate::error::GraphResult;
use crate::nodes::{
    AlwaysRelevantNode, GatherPool, GraphNode, GridSpatializationNode, ViewerInfo,
};
use crate::params::{
    replication_period, ClassParameterTable, ClassParameters, ParameterTableBuilder,
};
use crate::policy::{ClassPolicyMap, RoutingPolicy};
use kestrel_reflect::{TypeId, TypeRegistry};
use kestrel_shared::{EntityId, Vec2, Vec3};

/// Pre-allocated gather list shelves: (capacity, count).
///
/// Sizes are a tuning knob covering the common gather magnitudes, not a
/// correctness constraint.
const PREALLOCATED_GATHER_LISTS: [(usize, usize); 4] = [(3, 12), (6, 12), (128, 12), (512, 12)];

/// Everything the dispatcher needs to know about one spawned entity.
///
/// Produced by the entity-lifecycle system; this crate never owns instance
/// lifetime.
#[derive(Clone, Copy, Debug)]
pub struct EntityInfo {
    /// The entity handle.
    pub entity: EntityId,
    /// The entity's type.
    pub type_id: TypeId,
    /// World position at the time of the event (meaningful when
    /// spatialized).
    pub position: Vec3,
}

/// Validated configuration, ready to build a graph.
#[derive(Debug)]
pub struct ReplicationGraphBuilder {
    config: GraphConfig,
}

impl ReplicationGraphBuilder {
    /// Accepts a configuration after validating it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GraphError::InvalidConfig`] for out-of-range
    /// values.
    pub fn new(config: GraphConfig) -> GraphResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Parses a TOML configuration and accepts it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GraphError::ConfigParse`] or
    /// [`crate::GraphError::InvalidConfig`].
    pub fn from_toml_str(text: &str) -> GraphResult<Self> {
        Ok(Self {
            config: GraphConfig::from_toml_str(text)?,
        })
    }

    /// Runs the one-time initialization and returns the routable graph.
    ///
    /// `server_tick_rate` comes from the transport collaborator (ticks
    /// per second) and drives per-class period derivation. Override class
    /// names that do not resolve against the registry are logged and
    /// skipped - a stale config entry must not take the server down.
    #[must_use]
    pub fn build(self, registry: &TypeRegistry, server_tick_rate: f32) -> ReplicationGraph {
        let config = self.config;

        // Resolve named policy overrides against the registry.
        let mut policy_overrides: Vec<(TypeId, RoutingPolicy)> = Vec::new();
        for entry in &config.policy_overrides {
            match registry.find(&entry.class) {
                Some(type_id) => policy_overrides.push((type_id, entry.policy)),
                None => tracing::warn!(class = %entry.class, "policy override for unknown class"),
            }
        }

        let classification = classify(registry, &policy_overrides);

        // Explicit parameter entries first; they also cover descendants.
        let mut parameters = ParameterTableBuilder::new();
        for entry in &config.parameter_overrides {
            let Some(type_id) = registry.find(&entry.class) else {
                tracing::warn!(class = %entry.class, "parameter override for unknown class");
                continue;
            };
            let replication_period_ticks = entry
                .update_frequency
                .map_or(1, |frequency| replication_period(server_tick_rate, frequency));
            // An omitted cull distance keeps the class's own default
            // rather than zeroing a spatialized class out of view.
            let cull_distance_squared = entry.cull_distance_squared.unwrap_or_else(|| {
                registry
                    .defaults_of(type_id)
                    .map_or(0.0, |defaults| defaults.cull_distance_squared)
            });
            parameters.set_explicit(
                type_id,
                ClassParameters {
                    cull_distance_squared,
                    replication_period_ticks,
                },
            );
        }
        parameters.derive_remaining(
            registry,
            &classification.diagnostics.replicated,
            &classification.policies,
            server_tick_rate,
        );
        let parameters = parameters.freeze();

        // Grid node.
        let mut grid = GridSpatializationNode::new(
            config.grid_cell_size,
            Vec2::new(config.spatial_bias_x, config.spatial_bias_y),
        );
        grid.set_rebuild_disabled(config.disable_spatial_rebuilding);
        for class in &config.rebuild_blacklist {
            match registry.find(class) {
                Some(type_id) => grid.add_rebuild_blacklist(type_id),
                None => tracing::warn!(class = %class, "rebuild blacklist names unknown class"),
            }
        }

        // Gather pools, warmed before the first connection exists.
        let mut gather_pool = GatherPool::new();
        for (capacity, count) in PREALLOCATED_GATHER_LISTS {
            gather_pool.preallocate(capacity, count);
        }

        tracing::info!(
            known_types = registry.len(),
            policy_entries = classification.policies.len(),
            parameter_entries = parameters.len(),
            cell_size = config.grid_cell_size,
            "replication graph initialized"
        );

        ReplicationGraph {
            policies: classification.policies,
            parameters,
            diagnostics: classification.diagnostics,
            grid,
            always_relevant: AlwaysRelevantNode::new(),
            gather_pool,
        }
    }
}

/// The initialized replication graph: frozen policy/parameter snapshots
/// plus the live interest nodes.
///
/// Read-many after construction; only node membership mutates at runtime,
/// and only on the simulation thread (the tick loop serializes entity
/// events).
#[derive(Debug)]
pub struct ReplicationGraph {
    policies: ClassPolicyMap,
    parameters: ClassParameterTable,
    diagnostics: ClassDiagnostics,
    grid: GridSpatializationNode,
    always_relevant: AlwaysRelevantNode,
    gather_pool: GatherPool,
}

impl ReplicationGraph {
    /// Resolves the routing policy for a type (ancestor fallback, default
    /// [`RoutingPolicy::NotRouted`]).
    #[must_use]
    pub fn policy_for(&self, registry: &TypeRegistry, type_id: TypeId) -> RoutingPolicy {
        self.policies.policy_for(registry, type_id)
    }

    /// Resolves replication parameters for a type (ancestor fallback,
    /// default zeroed).
    #[must_use]
    pub fn parameters_for(&self, registry: &TypeRegistry, type_id: TypeId) -> ClassParameters {
        self.parameters.parameters_for(registry, type_id)
    }

    /// The frozen policy map, for the interest-list runtime.
    #[must_use]
    pub fn policy_map(&self) -> &ClassPolicyMap {
        &self.policies
    }

    /// The frozen parameter table, for the interest-list runtime.
    #[must_use]
    pub fn parameter_table(&self) -> &ClassParameterTable {
        &self.parameters
    }

    /// Diagnostic class lists from the classification pass.
    #[must_use]
    pub fn diagnostics(&self) -> &ClassDiagnostics {
        &self.diagnostics
    }

    /// Routes a spawned entity into the node its policy selects.
    ///
    /// Unroutable entities (NotRouted, RelevantAllConnections, unmapped)
    /// are silently excluded - interest is opt-in by policy.
    pub fn on_entity_added(&mut self, registry: &TypeRegistry, info: &EntityInfo) {
        let policy = self.policies.policy_for(registry, info.type_id);
        tracing::debug!(entity = info.entity.raw(), ?policy, "entity added");
        match policy {
            RoutingPolicy::SpatializeStatic => self.grid.add_static(info),
            RoutingPolicy::SpatializeDynamic => self.grid.add_dynamic(info),
            RoutingPolicy::SpatializeDormancy => self.grid.add_dormancy(info),
            RoutingPolicy::NotRouted | RoutingPolicy::RelevantAllConnections => {}
        }
    }

    /// Removes a despawned entity from the node its policy selects.
    pub fn on_entity_removed(&mut self, registry: &TypeRegistry, info: &EntityInfo) {
        let policy = self.policies.policy_for(registry, info.type_id);
        tracing::debug!(entity = info.entity.raw(), ?policy, "entity removed");
        match policy {
            RoutingPolicy::SpatializeStatic => self.grid.remove_static(info.entity),
            RoutingPolicy::SpatializeDynamic => self.grid.remove_dynamic(info.entity),
            RoutingPolicy::SpatializeDormancy => self.grid.remove_dormancy(info.entity),
            RoutingPolicy::NotRouted | RoutingPolicy::RelevantAllConnections => {}
        }
    }

    /// Gathers every entity the registered nodes consider relevant to the
    /// viewer, using a pooled list. Return the list with
    /// [`ReplicationGraph::recycle`] when done.
    #[must_use]
    pub fn gather_relevant(&mut self, viewer: &ViewerInfo) -> Vec<EntityId> {
        let mut out = self.gather_pool.checkout(self.grid.membership_count());
        let nodes: [&dyn GraphNode; 2] = [&self.grid, &self.always_relevant];
        for node in nodes {
            node.gather_relevant(viewer, &mut out);
        }
        out
    }

    /// Returns a gather list to the pool.
    pub fn recycle(&mut self, list: Vec<EntityId>) {
        self.gather_pool.checkin(list);
    }

    /// The grid node, for position/dormancy upkeep by the lifecycle
    /// system.
    #[must_use]
    pub fn grid_node_mut(&mut self) -> &mut GridSpatializationNode {
        &mut self.grid
    }

    /// The grid node, read-only.
    #[must_use]
    pub fn grid_node(&self) -> &GridSpatializationNode {
        &self.grid
    }

    /// The always-relevant node, for init-time global registrations.
    #[must_use]
    pub fn always_relevant_node_mut(&mut self) -> &mut AlwaysRelevantNode {
        &mut self.always_relevant
    }

    /// The always-relevant node, read-only.
    #[must_use]
    pub fn always_relevant_node(&self) -> &AlwaysRelevantNode {
        &self.always_relevant
    }
}
