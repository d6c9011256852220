//! # Type Registry
//!
//! Stores one descriptor per known entity type and answers the three
//! questions the replication layer asks:
//!
//! - enumerate all known types
//! - read a type's default-instance replication attributes
//! - is type A a descendant of type B?

use std::collections::HashMap;

/// Handle to a registered entity type.
///
/// Indexes into the registry; stable for the lifetime of the process
/// (types are fixed at startup in this domain).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    /// Returns the raw index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Relevance flags read from a class's default instance.
///
/// These four flags fully determine routing-policy inference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelevanceFlags {
    /// Whether instances of this class replicate at all.
    pub replicated: bool,
    /// Relevant to every connection regardless of position.
    pub always_relevant: bool,
    /// Only sent to the owning connection.
    pub only_relevant_to_owner: bool,
    /// Uses the owner's relevancy instead of its own.
    pub owner_relevancy: bool,
}

impl RelevanceFlags {
    /// Flags for an ordinary spatially-relevant replicated class.
    #[must_use]
    pub const fn replicated() -> Self {
        Self {
            replicated: true,
            always_relevant: false,
            only_relevant_to_owner: false,
            owner_relevancy: false,
        }
    }

    /// Flags for a globally-relevant replicated class.
    #[must_use]
    pub const fn always_relevant() -> Self {
        Self {
            replicated: true,
            always_relevant: true,
            only_relevant_to_owner: false,
            owner_relevancy: false,
        }
    }
}

/// Replication attributes of a class's default instance.
///
/// Absent entirely for types that have no default instance (abstract
/// scaffolding in the simulation's hierarchy) - consumers skip those.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReplicationDefaults {
    /// The four relevance flags.
    pub flags: RelevanceFlags,
    /// Squared cull distance, world units squared.
    pub cull_distance_squared: f32,
    /// Desired update frequency, updates per second.
    pub update_frequency: f32,
}

impl ReplicationDefaults {
    /// Defaults for a replicated class with the given cull distance and
    /// update frequency.
    #[must_use]
    pub const fn new(flags: RelevanceFlags, cull_distance_squared: f32, update_frequency: f32) -> Self {
        Self {
            flags,
            cull_distance_squared,
            update_frequency,
        }
    }
}

/// One known entity type: name, parent link, default-instance attributes.
#[derive(Clone, Debug)]
pub struct TypeDescriptor {
    /// Class name, unique within the registry.
    pub name: String,
    /// Immediate parent type, if any.
    pub parent: Option<TypeId>,
    /// Default-instance attributes, if the class has a default instance.
    pub defaults: Option<ReplicationDefaults>,
}

impl TypeDescriptor {
    /// Creates a root descriptor with no parent and no default instance.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            defaults: None,
        }
    }

    /// Sets the parent type.
    #[must_use]
    pub fn with_parent(mut self, parent: TypeId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Sets the default-instance attributes.
    #[must_use]
    pub fn with_defaults(mut self, defaults: ReplicationDefaults) -> Self {
        self.defaults = Some(defaults);
        self
    }
}

/// All entity types known to the server.
///
/// Populated once at startup by the lifecycle system, read-only afterwards.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: Vec<TypeDescriptor>,
    by_name: HashMap<String, TypeId>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type and returns its handle.
    ///
    /// A parent handle that does not resolve to an already-registered type
    /// is dropped: the type is stored with no parent. Parent links
    /// therefore always point at earlier entries, which keeps ancestor
    /// walks finite.
    pub fn register(&mut self, mut descriptor: TypeDescriptor) -> TypeId {
        if let Some(parent) = descriptor.parent {
            if parent.0 as usize >= self.types.len() {
                descriptor.parent = None;
            }
        }
        let id = TypeId(u32::try_from(self.types.len()).unwrap_or(u32::MAX));
        self.by_name.insert(descriptor.name.clone(), id);
        self.types.push(descriptor);
        id
    }

    /// Looks up a descriptor by handle.
    #[must_use]
    pub fn get(&self, id: TypeId) -> Option<&TypeDescriptor> {
        self.types.get(id.0 as usize)
    }

    /// Looks up a type handle by class name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Returns a type's immediate parent, if any.
    #[must_use]
    pub fn parent_of(&self, id: TypeId) -> Option<TypeId> {
        self.get(id).and_then(|d| d.parent)
    }

    /// Returns a type's default-instance attributes, if any.
    #[must_use]
    pub fn defaults_of(&self, id: TypeId) -> Option<&ReplicationDefaults> {
        self.get(id).and_then(|d| d.defaults.as_ref())
    }

    /// Tests whether `descendant` is `ancestor` or inherits from it.
    ///
    /// Inclusive of self: every type is a descendant of itself. This is
    /// what lets an explicitly-configured class cover itself as well as
    /// its subtypes.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: TypeId, ancestor: TypeId) -> bool {
        let mut current = Some(descendant);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent_of(id);
        }
        false
    }

    /// Iterates over all registered types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeDescriptor)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, d)| (TypeId(u32::try_from(i).unwrap_or(u32::MAX)), d))
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
