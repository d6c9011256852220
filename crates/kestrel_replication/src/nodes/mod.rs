//! # Graph Nodes
//!
//! The interest nodes entity instances are routed into. The per-tick
//! interest-list runtime queries every registered node once per connection;
//! nodes only answer "which entities might this viewer care about" -
//! prioritization and cadence live elsewhere.

pub mod actor_list;
pub mod grid;
pub mod pool;

pub use actor_list::AlwaysRelevantNode;
pub use grid::{GridSpatializationNode, SpatialMode};
pub use pool::GatherPool;

use kestrel_shared::{EntityId, Vec3};

/// The viewer a gather runs for: one connection's world position and the
/// radius it can be told about.
#[derive(Clone, Copy, Debug)]
pub struct ViewerInfo {
    /// The connection's view position.
    pub position: Vec3,
    /// Maximum interest radius, world units.
    pub view_radius: f32,
}

/// A node registered with the replication graph.
///
/// Implementations append candidate entities for the viewer; duplicates
/// across nodes are the caller's problem.
pub trait GraphNode {
    /// Human-readable node name, for logs.
    fn node_name(&self) -> &'static str;

    /// Appends every entity this node considers relevant to the viewer.
    fn gather_relevant(&self, viewer: &ViewerInfo, out: &mut Vec<EntityId>);
}
