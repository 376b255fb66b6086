//! A shard-striped concurrent accumulator map.
//!
//! The key space is partitioned across a fixed number of independently locked
//! shards; a key always routes to the same shard, so concurrent increments on
//! the same key serialize through that shard's mutex and are never lost, while
//! increments on keys in different shards do not contend at all.
//!
//! The map only guarantees per-shard mutual exclusion. Phase ordering is the
//! caller's job: do not call [`ConcurrentMap::erase`] or
//! [`ConcurrentMap::snapshot`] while increments for the same logical batch are
//! still in flight.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::ops::AddAssign;

use parking_lot::Mutex;

pub struct ConcurrentMap<K, V> {
    shards: Vec<Mutex<HashMap<K, V>>>,
}

impl<K, V> ConcurrentMap<K, V>
where
    K: Eq + Hash + Ord + Clone,
    V: Default + AddAssign + Clone,
{
    /// Creates a map striped over `shard_count` locks.
    ///
    /// # Panics
    /// Panics if `shard_count` is zero.
    pub fn new(shard_count: usize) -> Self {
        assert!(shard_count > 0, "shard count must be positive");
        Self {
            shards: (0..shard_count).map(|_| Mutex::new(HashMap::new())).collect(),
        }
    }

    fn shard_for(&self, key: &K) -> &Mutex<HashMap<K, V>> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % self.shards.len()]
    }

    /// Adds `delta` to the value stored under `key`, starting from the
    /// default value if the key is absent. Only the key's shard is locked.
    pub fn increment(&self, key: K, delta: V) {
        let mut shard = self.shard_for(&key).lock();
        *shard.entry(key).or_default() += delta;
    }

    /// Removes `key` from the map if present.
    pub fn erase(&self, key: &K) {
        self.shard_for(key).lock().remove(key);
    }

    /// Merges all shards into one ordered map, locking each shard in turn.
    pub fn snapshot(&self) -> BTreeMap<K, V> {
        let mut merged = BTreeMap::new();
        for shard in &self.shards {
            for (key, value) in shard.lock().iter() {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }
}
