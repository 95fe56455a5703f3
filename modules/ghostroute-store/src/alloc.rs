//! Collision-free `event_order` allocation for appended batches.

/// Hands out `base + 1, base + 2, ...` where `base` is the partition's
/// current maximum order. Strictly increasing and gapless within a batch.
///
/// Precondition: no concurrent writer is appending to the same partition.
/// Concurrent appends need external serialization; the store's unique index
/// turns a lost race into `DuplicateOrder` rather than silent reordering.
#[derive(Debug)]
pub struct OrderAllocator {
    last: i32,
}

impl OrderAllocator {
    /// Seed from `EventStore::next_order_seed` for the target partition.
    pub fn new(seed: i32) -> Self {
        Self { last: seed }
    }

    /// The next order value, consuming it.
    pub fn next(&mut self) -> i32 {
        self.last += 1;
        self.last
    }

    /// Highest value issued so far (or the seed, before any allocation).
    pub fn last(&self) -> i32 {
        self.last
    }
}
