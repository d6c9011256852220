//! # Routing Policies
//!
//! Every replicated entity type maps to exactly one routing policy, chosen
//! once at startup. The policy decides which graph node instances of that
//! type flow into when they spawn.

use kestrel_reflect::{TypeId, TypeRegistry};
use serde::Deserialize;
use std::collections::HashMap;

/// Interest-management strategy for an entity type.
///
/// Discriminants are ordered: everything at or above
/// [`RoutingPolicy::SpatializeStatic`] routes into the spatial grid, which
/// makes the spatialization check a single comparison.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[repr(u8)]
pub enum RoutingPolicy {
    /// Not routed anywhere. The default for unmapped types.
    #[default]
    NotRouted = 0,
    /// Relevant to every connection regardless of world position.
    RelevantAllConnections = 1,
    /// Grid-routed; cell membership never re-evaluated after insertion.
    SpatializeStatic = 2,
    /// Grid-routed; cell membership re-evaluated as the entity moves.
    SpatializeDynamic = 3,
    /// Grid-routed; behaves static while dormant, dynamic while awake.
    SpatializeDormancy = 4,
}

impl RoutingPolicy {
    /// True for the three grid-routed policies.
    #[inline]
    #[must_use]
    pub const fn is_spatialized(self) -> bool {
        self as u8 >= Self::SpatializeStatic as u8
    }
}

/// Write-once builder for [`ClassPolicyMap`].
///
/// Seeded with explicit configuration overrides, then filled by the
/// classification pass. [`PolicyMapBuilder::freeze`] consumes the builder,
/// so nothing can mutate the map after initialization completes.
#[derive(Debug, Default)]
pub struct PolicyMapBuilder {
    entries: HashMap<TypeId, RoutingPolicy>,
}

impl PolicyMapBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a type to a policy. First write wins is the caller's
    /// responsibility: the classifier checks [`PolicyMapBuilder::contains`]
    /// before deriving.
    pub fn set(&mut self, type_id: TypeId, policy: RoutingPolicy) {
        self.entries.insert(type_id, policy);
    }

    /// True if the type already has an explicit or derived mapping.
    #[must_use]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.entries.contains_key(&type_id)
    }

    /// Freezes the builder into an immutable policy map.
    #[must_use]
    pub fn freeze(self) -> ClassPolicyMap {
        ClassPolicyMap {
            entries: self.entries,
        }
    }
}

/// Immutable type → policy mapping, built once at startup.
///
/// Lookups fall back through the type's ancestor chain, so a subtype that
/// adds no replication-relevant behavior resolves to its ancestor's policy
/// without needing an entry of its own.
#[derive(Debug)]
pub struct ClassPolicyMap {
    entries: HashMap<TypeId, RoutingPolicy>,
}

impl ClassPolicyMap {
    /// Returns the direct entry for a type, without ancestor fallback.
    #[must_use]
    pub fn entry(&self, type_id: TypeId) -> Option<RoutingPolicy> {
        self.entries.get(&type_id).copied()
    }

    /// Resolves the policy for a type, walking the ancestor chain and
    /// defaulting to [`RoutingPolicy::NotRouted`]. Never errors.
    #[must_use]
    pub fn policy_for(&self, registry: &TypeRegistry, type_id: TypeId) -> RoutingPolicy {
        let mut current = Some(type_id);
        while let Some(id) = current {
            if let Some(policy) = self.entry(id) {
                return policy;
            }
            current = registry.parent_of(id);
        }
        RoutingPolicy::NotRouted
    }

    /// Number of explicit entries in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_reflect::TypeDescriptor;

    #[test]
    fn test_spatialized_ordering() {
        assert!(!RoutingPolicy::NotRouted.is_spatialized());
        assert!(!RoutingPolicy::RelevantAllConnections.is_spatialized());
        assert!(RoutingPolicy::SpatializeStatic.is_spatialized());
        assert!(RoutingPolicy::SpatializeDynamic.is_spatialized());
        assert!(RoutingPolicy::SpatializeDormancy.is_spatialized());
    }

    #[test]
    fn test_ancestor_fallback() {
        let mut registry = TypeRegistry::new();
        let parent = registry.register(TypeDescriptor::new("Parent"));
        let child = registry.register(TypeDescriptor::new("Child").with_parent(parent));

        let mut builder = PolicyMapBuilder::new();
        builder.set(parent, RoutingPolicy::SpatializeDynamic);
        let map = builder.freeze();

        assert_eq!(map.entry(child), None);
        assert_eq!(
            map.policy_for(&registry, child),
            RoutingPolicy::SpatializeDynamic
        );
    }

    #[test]
    fn test_unmapped_defaults_to_not_routed() {
        let mut registry = TypeRegistry::new();
        let loner = registry.register(TypeDescriptor::new("Loner"));
        let map = PolicyMapBuilder::new().freeze();
        assert_eq!(map.policy_for(&registry, loner), RoutingPolicy::NotRouted);
    }
}
