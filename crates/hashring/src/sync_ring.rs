//! Thread-safe ring wrapper.

use std::sync::RwLock;

use crate::error::RingError;
use crate::ring::Ring;

/// A [`Ring`] behind a `RwLock`.
///
/// Lookups take the read lock and run concurrently. Inserts and removals
/// take the write lock for every replica of the owner, so a lookup never
/// sees an owner half added or half removed.
#[derive(Debug)]
pub struct SyncRing {
    ring: RwLock<Ring>,
}

impl SyncRing {
    /// Create an empty ring with `replication` virtual nodes per owner.
    pub fn new(replication: usize) -> Result<Self, RingError> {
        Ring::new(replication).map(Self::from_ring)
    }

    /// Wrap an existing ring.
    pub fn from_ring(ring: Ring) -> Self {
        Self {
            ring: RwLock::new(ring),
        }
    }

    /// See [`Ring::insert`].
    pub fn insert(&self, owner: &str) -> Result<(), RingError> {
        self.ring.write().expect("lock poisoned").insert(owner)
    }

    /// See [`Ring::insert_checked`].
    pub fn insert_checked(&self, owner: &str) -> Result<(), RingError> {
        self.ring.write().expect("lock poisoned").insert_checked(owner)
    }

    /// See [`Ring::remove`].
    pub fn remove(&self, owner: &str) -> usize {
        self.ring.write().expect("lock poisoned").remove(owner)
    }

    /// See [`Ring::find`].
    pub fn find<K: AsRef<[u8]>>(&self, key: K) -> Result<String, RingError> {
        let ring = self.ring.read().expect("lock poisoned");
        ring.find(key).map(str::to_string)
    }

    /// See [`Ring::find_n`].
    pub fn find_n<K: AsRef<[u8]>>(&self, key: K, n: usize) -> Result<Vec<String>, RingError> {
        let ring = self.ring.read().expect("lock poisoned");
        let owners = ring.find_n(key, n)?;
        Ok(owners.into_iter().map(str::to_string).collect())
    }

    /// Whether any replica of `owner` is on the ring.
    pub fn contains_owner(&self, owner: &str) -> bool {
        self.ring.read().expect("lock poisoned").contains_owner(owner)
    }

    /// Total number of occupied positions.
    pub fn len(&self) -> usize {
        self.ring.read().expect("lock poisoned").len()
    }

    /// Whether the ring has no positions.
    pub fn is_empty(&self) -> bool {
        self.ring.read().expect("lock poisoned").is_empty()
    }

    /// Number of distinct owners.
    pub fn owner_count(&self) -> usize {
        self.ring.read().expect("lock poisoned").owner_count()
    }

    /// Virtual nodes per owner.
    pub fn replication(&self) -> usize {
        self.ring.read().expect("lock poisoned").replication()
    }

    /// Copy the current ring state for lock-free reads.
    pub fn snapshot(&self) -> Ring {
        self.ring.read().expect("lock poisoned").clone()
    }

    /// Unwrap the inner ring.
    pub fn into_inner(self) -> Ring {
        self.ring.into_inner().expect("lock poisoned")
    }
}

impl From<Ring> for SyncRing {
    fn from(ring: Ring) -> Self {
        Self::from_ring(ring)
    }
}
