//! Hash ring.
//!
//! A frozen list of active shard ids in ascending `shard_index` order.
//! Placement is `hash mod len`; the list must not change for the duration
//! of one routing decision, which the planner guarantees by building a
//! fresh ring per statement.

use uuid::Uuid;

use super::hasher::HashValue;

/// Stable map from hash values to shard ids.
#[derive(Debug, Clone)]
pub struct Ring {
    shards: Vec<Uuid>,
}

impl Ring {
    pub fn new(shards: Vec<Uuid>) -> Self {
        Self { shards }
    }

    /// Number of shards on the ring.
    pub fn len(&self) -> usize {
        self.shards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    /// Map one hash to its shard. `None` on an empty ring.
    pub fn locate(&self, hash: HashValue) -> Option<Uuid> {
        if self.shards.is_empty() {
            return None;
        }
        let position = (hash % self.shards.len() as u64) as usize;
        Some(self.shards[position])
    }

    /// Map many hashes, deduplicated, preserving first-occurrence order.
    pub fn locate_shards(&self, hashes: &[HashValue]) -> Vec<Uuid> {
        let mut result: Vec<Uuid> = Vec::with_capacity(hashes.len());
        for hash in hashes {
            let Some(shard) = self.locate(*hash) else {
                continue;
            };
            if !result.contains(&shard) {
                result.push(shard);
            }
        }
        result
    }
}
