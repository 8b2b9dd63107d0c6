//! In-memory cache of materialized `Ready` results, keyed by poll handle.
//!
//! Signed sample URLs expire a few minutes after a job finishes. With the
//! cache enabled, a handle that was already observed `Ready` is answered
//! from memory, so polling it again after expiry still succeeds. Entries
//! are evicted oldest-first once `capacity` is reached.

use std::collections::{HashMap, VecDeque};

use colca_core::job::ReadyAsset;
use tokio::sync::Mutex;

pub struct ReadyCache {
    capacity: usize,
    inner: Mutex<CacheInner>,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, ReadyAsset>,
    order: VecDeque<String>,
}

impl ReadyCache {
    /// Create a cache holding at most `capacity` results (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(CacheInner::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn get(&self, poll_handle: &str) -> Option<ReadyAsset> {
        self.inner.lock().await.entries.get(poll_handle).cloned()
    }

    pub async fn insert(&self, poll_handle: &str, ready: ReadyAsset) {
        let mut inner = self.inner.lock().await;
        if inner
            .entries
            .insert(poll_handle.to_string(), ready)
            .is_none()
        {
            inner.order.push_back(poll_handle.to_string());
        }
        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
                tracing::debug!(poll_handle = %oldest, "Evicted cached ready result");
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }
}
