// Partitioned in-process cache storage

use crate::cache::models::{CacheEntry, StoredResponse};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Named, isolated key-value stores mapping request identities to stored
/// responses. Partitions exist independently; deleting one never touches
/// another. All handles share the same underlying store (cheap to clone).
///
/// Writes are last-write-wins per identity; concurrent request handlers
/// mostly write to identities unique to themselves, so no coordination
/// beyond the lock is needed.
#[derive(Debug, Clone, Default)]
pub struct CacheStorage {
    partitions: Arc<RwLock<HashMap<String, Partition>>>,
    seq: Arc<AtomicU64>,
}

#[derive(Debug, Default)]
struct Partition {
    entries: HashMap<String, CacheEntry>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a partition exists.
    pub async fn open(&self, name: &str) {
        let mut partitions = self.partitions.write().await;
        partitions.entry(name.to_string()).or_default();
    }

    /// Names of all currently existing partitions.
    pub async fn partition_names(&self) -> Vec<String> {
        self.partitions.read().await.keys().cloned().collect()
    }

    /// Delete an entire partition. Returns whether it existed.
    pub async fn delete_partition(&self, name: &str) -> bool {
        self.partitions.write().await.remove(name).is_some()
    }

    /// Look up the stored response for an identity, if any.
    pub async fn match_entry(&self, partition: &str, identity: &str) -> Option<StoredResponse> {
        let partitions = self.partitions.read().await;
        partitions
            .get(partition)?
            .entries
            .get(identity)
            .map(|entry| entry.response.clone())
    }

    /// Store a response under an identity, creating the partition if needed.
    /// Overwriting re-sequences the entry to the back of insertion order.
    pub async fn put(&self, partition: &str, identity: &str, response: StoredResponse) {
        let entry = CacheEntry {
            response,
            inserted_at: Utc::now(),
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
        };
        let mut partitions = self.partitions.write().await;
        partitions
            .entry(partition.to_string())
            .or_default()
            .entries
            .insert(identity.to_string(), entry);
    }

    /// Remove a single entry. Returns whether it existed.
    pub async fn delete_entry(&self, partition: &str, identity: &str) -> bool {
        let mut partitions = self.partitions.write().await;
        match partitions.get_mut(partition) {
            Some(p) => p.entries.remove(identity).is_some(),
            None => false,
        }
    }

    pub async fn entry_count(&self, partition: &str) -> usize {
        let partitions = self.partitions.read().await;
        partitions.get(partition).map_or(0, |p| p.entries.len())
    }

    /// Entry identities ordered oldest-inserted first. This is insertion
    /// order, not access order: lookups do not reorder entries.
    pub async fn identities_by_insertion(&self, partition: &str) -> Vec<String> {
        let partitions = self.partitions.read().await;
        let Some(p) = partitions.get(partition) else {
            return Vec::new();
        };
        let mut entries: Vec<(&String, u64)> =
            p.entries.iter().map(|(id, e)| (id, e.seq)).collect();
        entries.sort_by_key(|(_, seq)| *seq);
        debug!(partition, count = entries.len(), "enumerated partition");
        entries.into_iter().map(|(id, _)| id.clone()).collect()
    }
}
