//! # Always-Relevant Node
//!
//! A flat, unordered list of entities relevant to every connection
//! regardless of position. No spatial structure, no cadence logic.

use crate::nodes::{GraphNode, ViewerInfo};
use kestrel_shared::EntityId;

/// Global-interest node: every member is gathered for every viewer.
#[derive(Debug, Default)]
pub struct AlwaysRelevantNode {
    entities: Vec<EntityId>,
}

impl AlwaysRelevantNode {
    /// Creates an empty node.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity. Adding the same entity twice is a no-op.
    pub fn add(&mut self, entity: EntityId) {
        if !self.entities.contains(&entity) {
            self.entities.push(entity);
        }
    }

    /// Removes an entity. Removing an absent entity is a no-op.
    pub fn remove(&mut self, entity: EntityId) {
        if let Some(index) = self.entities.iter().position(|&e| e == entity) {
            self.entities.swap_remove(index);
        }
    }

    /// True if the entity is a member.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains(&entity)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True if the node is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterates over all members.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().copied()
    }
}

impl GraphNode for AlwaysRelevantNode {
    fn node_name(&self) -> &'static str {
        "always_relevant"
    }

    fn gather_relevant(&self, _viewer: &ViewerInfo, out: &mut Vec<EntityId>) {
        out.extend_from_slice(&self.entities);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_shared::Vec3;

    #[test]
    fn test_add_remove_membership() {
        let mut node = AlwaysRelevantNode::new();
        let a = EntityId::new(1);
        let b = EntityId::new(2);

        node.add(a);
        node.add(b);
        node.add(a); // duplicate, ignored
        assert_eq!(node.len(), 2);

        node.remove(a);
        assert!(!node.contains(a));
        assert!(node.contains(b));

        node.remove(a); // absent, ignored
        assert_eq!(node.len(), 1);
    }

    #[test]
    fn test_gather_ignores_viewer_position() {
        let mut node = AlwaysRelevantNode::new();
        node.add(EntityId::new(7));

        let viewer = ViewerInfo {
            position: Vec3::new(1.0e9, -1.0e9, 0.0),
            view_radius: 0.0,
        };
        let mut out = Vec::new();
        node.gather_relevant(&viewer, &mut out);
        assert_eq!(out, vec![EntityId::new(7)]);
    }
}
