//! # Gather List Pool
//!
//! Pre-allocated working lists for interest-list construction. The per-tick
//! gather borrows a list, fills it, and returns it - no per-tick heap
//! allocation once the pool is warm.
//!
//! Shelf capacities are a tuning knob, not a correctness constraint: a
//! checkout that misses every shelf falls back to a fresh allocation.

use kestrel_shared::EntityId;

#[derive(Debug)]
struct Shelf {
    capacity: usize,
    lists: Vec<Vec<EntityId>>,
}

/// Pool of reusable entity lists, grouped by capacity.
#[derive(Debug, Default)]
pub struct GatherPool {
    shelves: Vec<Shelf>,
}

impl GatherPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocates `count` lists of `capacity` entries each.
    ///
    /// Shelves stay sorted by capacity so checkouts take the smallest
    /// sufficient list.
    pub fn preallocate(&mut self, capacity: usize, count: usize) {
        let lists = (0..count).map(|_| Vec::with_capacity(capacity)).collect();
        self.shelves.push(Shelf { capacity, lists });
        self.shelves.sort_by_key(|s| s.capacity);
    }

    /// Borrows a list with at least `min_capacity` entries of headroom.
    ///
    /// Falls back to a fresh allocation when no shelf can serve the
    /// request.
    #[must_use]
    pub fn checkout(&mut self, min_capacity: usize) -> Vec<EntityId> {
        for shelf in &mut self.shelves {
            if shelf.capacity >= min_capacity {
                if let Some(list) = shelf.lists.pop() {
                    return list;
                }
            }
        }
        Vec::with_capacity(min_capacity)
    }

    /// Returns a borrowed list to the pool.
    ///
    /// The list is cleared and shelved by its capacity; lists smaller than
    /// every shelf are dropped.
    pub fn checkin(&mut self, mut list: Vec<EntityId>) {
        list.clear();
        let capacity = list.capacity();
        // Largest shelf whose capacity the list satisfies.
        if let Some(shelf) = self
            .shelves
            .iter_mut()
            .rev()
            .find(|s| s.capacity <= capacity)
        {
            shelf.lists.push(list);
        }
    }

    /// Total number of lists currently shelved.
    #[must_use]
    pub fn available(&self) -> usize {
        self.shelves.iter().map(|s| s.lists.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_prefers_smallest_sufficient_shelf() {
        let mut pool = GatherPool::new();
        pool.preallocate(128, 2);
        pool.preallocate(6, 2);

        let list = pool.checkout(4);
        assert!(list.capacity() >= 6);
        assert!(list.capacity() < 128);
    }

    #[test]
    fn test_checkout_falls_back_to_allocation() {
        let mut pool = GatherPool::new();
        pool.preallocate(6, 1);

        let big = pool.checkout(512);
        assert!(big.capacity() >= 512);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn test_checkin_reshelves_cleared_list() {
        let mut pool = GatherPool::new();
        pool.preallocate(6, 1);

        let mut list = pool.checkout(4);
        assert_eq!(pool.available(), 0);

        list.push(EntityId::new(1));
        pool.checkin(list);
        assert_eq!(pool.available(), 1);

        let again = pool.checkout(4);
        assert!(again.is_empty());
    }
}
