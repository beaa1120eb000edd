//! Consistent hashing ring implementation.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, trace, warn};

use crate::error::RingError;
use crate::hash::{checksum, replica_position};

/// A key whose owner differs between two ring states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// The key that must move.
    pub key: String,
    /// The owner the key resolved to in the old ring.
    pub from: String,
    /// The owner the key resolves to in the new ring.
    pub to: String,
}

/// Consistent hashing ring mapping keys to owners.
///
/// Each owner occupies `replication` positions on a `u32` ring, one per
/// virtual node. A key resolves to the owner of the first position at or
/// after the key's checksum, wrapping around to the lowest position.
///
/// `Ring` is not synchronized: mutation needs `&mut self`. Share it across
/// threads with [`SyncRing`](crate::SyncRing) or the
/// [`service`](crate::service) task.
#[derive(Debug, Clone)]
pub struct Ring {
    /// Occupied positions, strictly ascending.
    positions: Vec<u32>,
    /// Position -> owner. Always has exactly the keys in `positions`.
    owner_of: HashMap<u32, String>,
    /// Virtual nodes per owner.
    replication: usize,
}

impl Ring {
    /// Create a new empty ring with `replication` virtual nodes per owner.
    ///
    /// Fails with [`RingError::InvalidConfiguration`] if `replication` is 0.
    pub fn new(replication: usize) -> Result<Self, RingError> {
        if replication < 1 {
            return Err(RingError::InvalidConfiguration { replication });
        }
        Ok(Self {
            positions: Vec::new(),
            owner_of: HashMap::new(),
            replication,
        })
    }

    /// Add `owner` to the ring, one position per replica.
    ///
    /// Replicas are inserted in index order. If a replica lands on an
    /// occupied position the call stops with [`RingError::Collision`] and
    /// replicas inserted before it stay in the ring. Use
    /// [`insert_checked`](Self::insert_checked) to avoid partial inserts.
    pub fn insert(&mut self, owner: &str) -> Result<(), RingError> {
        for index in 1..=self.replication {
            let position = replica_position(owner, index);
            if let Err(e) = self.insert_position(owner, position) {
                warn!(owner, index, position, "collision while adding owner to ring");
                return Err(e);
            }
        }
        debug!(owner, replication = self.replication, "added owner to ring");
        Ok(())
    }

    /// Add `owner` only if every one of its replica positions is free.
    ///
    /// On collision nothing is modified.
    pub fn insert_checked(&mut self, owner: &str) -> Result<(), RingError> {
        let positions: Vec<u32> = (1..=self.replication)
            .map(|index| replica_position(owner, index))
            .collect();

        if let Some(position) = self.first_conflict(&positions) {
            warn!(owner, position, "collision while adding owner to ring");
            return Err(RingError::Collision {
                owner: owner.to_string(),
                position,
            });
        }

        for position in positions {
            self.insert_position(owner, position)?;
        }
        debug!(owner, replication = self.replication, "added owner to ring");
        Ok(())
    }

    /// Remove every replica position held by `owner`.
    ///
    /// Replicas that are absent, or whose position is held by a different
    /// owner, are skipped. A position is only deleted when it maps to
    /// `owner`, not merely because it matches a replica's checksum.
    /// Returns the number of positions removed.
    pub fn remove(&mut self, owner: &str) -> usize {
        let mut removed = 0;
        for index in 1..=self.replication {
            let position = replica_position(owner, index);
            match self.owner_of.get(&position) {
                Some(held_by) if held_by == owner => {
                    self.owner_of.remove(&position);
                    if let Ok(i) = self.positions.binary_search(&position) {
                        self.positions.remove(i);
                    }
                    removed += 1;
                }
                Some(held_by) => {
                    trace!(owner, index, position, %held_by, "replica position held by another owner");
                }
                None => {
                    trace!(owner, index, "replica not found");
                }
            }
        }
        if removed > 0 {
            debug!(owner, removed, "removed owner from ring");
        }
        removed
    }

    /// Resolve `key` to its owner.
    ///
    /// Returns the owner of the first position `>=` the key's checksum, or
    /// of the lowest position if the checksum is past the end of the ring.
    pub fn find<K: AsRef<[u8]>>(&self, key: K) -> Result<&str, RingError> {
        let i = self.successor(checksum(key.as_ref()))?;
        self.owner_of_position(self.positions[i])
    }

    /// Resolve `key` to up to `n` distinct owners.
    ///
    /// Walks clockwise from the key's successor position. The first entry is
    /// always [`find`](Self::find)'s answer. If fewer than `n` owners exist,
    /// returns all of them.
    pub fn find_n<K: AsRef<[u8]>>(&self, key: K, n: usize) -> Result<Vec<&str>, RingError> {
        let start = self.successor(checksum(key.as_ref()))?;
        let mut owners: Vec<&str> = Vec::with_capacity(n.min(self.positions.len()));
        if n == 0 {
            return Ok(owners);
        }

        let (before, after) = self.positions.split_at(start);
        for &position in after.iter().chain(before) {
            let owner = self.owner_of_position(position)?;
            if !owners.contains(&owner) {
                owners.push(owner);
                if owners.len() == n {
                    break;
                }
            }
        }
        Ok(owners)
    }

    /// Compute which keys change owner between two ring states.
    ///
    /// Keys that cannot be resolved in either ring are skipped.
    pub fn diff<S: AsRef<str>>(old: &Ring, new: &Ring, keys: &[S]) -> Vec<Migration> {
        keys.iter()
            .filter_map(|key| {
                let key = key.as_ref();
                let from = old.find(key).ok()?;
                let to = new.find(key).ok()?;
                (from != to).then(|| Migration {
                    key: key.to_string(),
                    from: from.to_string(),
                    to: to.to_string(),
                })
            })
            .collect()
    }

    /// Virtual nodes per owner.
    pub fn replication(&self) -> usize {
        self.replication
    }

    /// Total number of occupied positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the ring has no positions.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// All occupied positions in ascending order.
    pub fn positions(&self) -> &[u32] {
        &self.positions
    }

    /// The owner holding `position`, if any.
    pub fn owner_at(&self, position: u32) -> Option<&str> {
        self.owner_of.get(&position).map(String::as_str)
    }

    /// Distinct owners on the ring, sorted.
    pub fn owners(&self) -> Vec<&str> {
        self.owner_of
            .values()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of distinct owners on the ring.
    pub fn owner_count(&self) -> usize {
        self.owners().len()
    }

    /// Whether any replica of `owner` is on the ring.
    pub fn contains_owner(&self, owner: &str) -> bool {
        (1..=self.replication)
            .any(|index| self.owner_at(replica_position(owner, index)) == Some(owner))
    }

    /// First of `positions` that is already on the ring or repeats an
    /// earlier entry.
    fn first_conflict(&self, positions: &[u32]) -> Option<u32> {
        let mut pending = BTreeSet::new();
        positions
            .iter()
            .copied()
            .find(|&position| self.owner_of.contains_key(&position) || !pending.insert(position))
    }

    /// Insert one position, keeping `positions` sorted.
    fn insert_position(&mut self, owner: &str, position: u32) -> Result<(), RingError> {
        match self.positions.binary_search(&position) {
            Ok(_) => Err(RingError::Collision {
                owner: owner.to_string(),
                position,
            }),
            Err(i) => {
                self.positions.insert(i, position);
                self.owner_of.insert(position, owner.to_string());
                Ok(())
            }
        }
    }

    /// Index of the first position `>= hash`, wrapping to 0.
    fn successor(&self, hash: u32) -> Result<usize, RingError> {
        if self.positions.is_empty() {
            return Err(RingError::EmptyRing);
        }
        let i = self.positions.partition_point(|&p| p < hash);
        Ok(if i == self.positions.len() { 0 } else { i })
    }

    fn owner_of_position(&self, position: u32) -> Result<&str, RingError> {
        self.owner_at(position)
            .ok_or(RingError::InternalConsistency { position })
    }
}
