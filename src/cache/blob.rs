//! Bounded blob cache for fetched avatars.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::BlobCacheConfig;

/// Sentinel index for "no node".
const NIL: usize = usize::MAX;

/// A single cached blob, linked into the recency list by slot index.
struct Node {
    key: String,
    blob: Arc<[u8]>,
    prev: usize,
    next: usize,
}

/// Snapshot of cache counters, mostly for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlobCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
    pub bytes: u64,
}

/// Arena-backed recency list plus key index.
///
/// Nodes live in `slots` and are linked by index; `head` is the
/// least-recently-used entry and `tail` the most-recently-used one.
struct Inner {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    head: usize,
    tail: usize,
    total_bytes: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl Inner {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: NIL,
            tail: NIL,
            total_bytes: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    fn node(&self, slot: usize) -> &Node {
        self.slots[slot].as_ref().expect("linked slot is occupied")
    }

    fn node_mut(&mut self, slot: usize) -> &mut Node {
        self.slots[slot].as_mut().expect("linked slot is occupied")
    }

    /// Unlink a slot from the recency list without freeing it.
    fn detach(&mut self, slot: usize) {
        let (prev, next) = {
            let node = self.node(slot);
            (node.prev, node.next)
        };

        if prev == NIL {
            self.head = next;
        } else {
            self.node_mut(prev).next = next;
        }

        if next == NIL {
            self.tail = prev;
        } else {
            self.node_mut(next).prev = prev;
        }

        let node = self.node_mut(slot);
        node.prev = NIL;
        node.next = NIL;
    }

    /// Link a detached slot at the MRU end.
    fn attach_tail(&mut self, slot: usize) {
        let old_tail = self.tail;
        {
            let node = self.node_mut(slot);
            node.prev = old_tail;
            node.next = NIL;
        }
        if old_tail == NIL {
            self.head = slot;
        } else {
            self.node_mut(old_tail).next = slot;
        }
        self.tail = slot;
    }

    fn insert(&mut self, key: String, blob: Arc<[u8]>) {
        self.total_bytes += blob.len() as u64;
        let node = Node {
            key: key.clone(),
            blob,
            prev: NIL,
            next: NIL,
        };

        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        self.index.insert(key, slot);
        self.attach_tail(slot);
    }

    /// Remove a slot entirely and return its node.
    fn take(&mut self, slot: usize) -> Node {
        self.detach(slot);
        let node = self.slots[slot].take().expect("linked slot is occupied");
        self.free.push(slot);
        self.index.remove(&node.key);
        self.total_bytes -= node.blob.len() as u64;
        node
    }

    fn evict_lru(&mut self) {
        if self.head == NIL {
            return;
        }
        let node = self.take(self.head);
        self.evictions += 1;
        debug!(
            "Evicted avatar for {} ({} bytes)",
            node.key,
            node.blob.len()
        );
    }

    fn clear(&mut self) -> usize {
        let count = self.index.len();
        self.slots.clear();
        self.free.clear();
        self.index.clear();
        self.head = NIL;
        self.tail = NIL;
        self.total_bytes = 0;
        count
    }
}

/// Key → blob store bounded by both entry count and total bytes.
///
/// Reads promote the entry to most-recently-used, writes evict from the
/// least-recently-used end until both limits hold. Cloning is cheap and
/// shares the same underlying store.
///
/// A blob that alone exceeds `max_bytes` is still admitted; it evicts every
/// other entry and then sits in the cache by itself.
#[derive(Clone)]
pub struct BoundedBlobCache {
    inner: Arc<Mutex<Inner>>,
    max_entries: i64,
    max_bytes: u64,
}

impl BoundedBlobCache {
    /// Create a cache with the given limits. `max_entries <= 0` disables it.
    pub fn new(config: BlobCacheConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::new())),
            max_entries: config.max_entries,
            max_bytes: config.max_bytes,
        }
    }

    /// Whether the cache stores anything at all.
    pub fn is_enabled(&self) -> bool {
        self.max_entries > 0
    }

    /// Look up a blob and mark it most-recently-used.
    pub fn get(&self, key: &str) -> Option<Arc<[u8]>> {
        let mut inner = self.inner.lock();
        match inner.index.get(key).copied() {
            Some(slot) => {
                inner.hits += 1;
                inner.detach(slot);
                inner.attach_tail(slot);
                Some(Arc::clone(&inner.node(slot).blob))
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    /// Check for a key without touching its recency.
    #[allow(dead_code)]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().index.contains_key(key)
    }

    /// Store a blob, evicting LRU entries until both limits allow it.
    pub fn put(&self, key: impl Into<String>, blob: impl Into<Arc<[u8]>>) {
        if !self.is_enabled() {
            return;
        }

        let key = key.into();
        let blob = blob.into();
        let incoming = blob.len() as u64;
        let max_entries = self.max_entries as usize;

        let mut inner = self.inner.lock();

        if let Some(slot) = inner.index.get(&key).copied() {
            inner.take(slot);
        }

        while inner.index.len() >= max_entries {
            inner.evict_lru();
        }

        while !inner.index.is_empty() && inner.total_bytes + incoming > self.max_bytes {
            inner.evict_lru();
        }

        inner.insert(key, blob);
    }

    /// Drop a single entry. Returns whether it was present.
    #[allow(dead_code)]
    pub fn remove(&self, key: &str) -> bool {
        let mut inner = self.inner.lock();
        match inner.index.get(key).copied() {
            Some(slot) => {
                inner.take(slot);
                true
            }
            None => false,
        }
    }

    /// Empty the cache and return how many entries it held.
    #[allow(dead_code)]
    pub fn clear(&self) -> usize {
        self.inner.lock().clear()
    }

    /// Number of stored entries.
    #[allow(dead_code)]
    pub fn count(&self) -> usize {
        self.inner.lock().index.len()
    }

    /// Sum of all stored blob lengths.
    #[allow(dead_code)]
    pub fn total_bytes(&self) -> u64 {
        self.inner.lock().total_bytes
    }

    pub fn stats(&self) -> BlobCacheStats {
        let inner = self.inner.lock();
        BlobCacheStats {
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            entries: inner.index.len(),
            bytes: inner.total_bytes,
        }
    }

    /// Keys from least- to most-recently-used.
    #[cfg(test)]
    fn keys_lru_order(&self) -> Vec<String> {
        let inner = self.inner.lock();
        let mut keys = Vec::with_capacity(inner.index.len());
        let mut cursor = inner.head;
        while cursor != NIL {
            let node = inner.node(cursor);
            keys.push(node.key.clone());
            cursor = node.next;
        }
        keys
    }
}

impl std::fmt::Debug for BoundedBlobCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("BoundedBlobCache")
            .field("max_entries", &self.max_entries)
            .field("max_bytes", &self.max_bytes)
            .field("entries", &inner.index.len())
            .field("total_bytes", &inner.total_bytes)
            .finish()
    }
}
