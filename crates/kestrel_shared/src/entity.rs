//! # Entity Identity
//!
//! Entity instances are owned by the simulation's lifecycle system; the
//! replication layer only ever holds opaque handles to them.

/// Opaque handle to a live entity instance.
///
/// The replication layer never creates or destroys entities - it receives
/// handles through spawn/despawn notifications and forgets them on removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates an entity handle from a raw id.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Null/invalid entity handle.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this handle is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}
