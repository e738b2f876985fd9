//! Promise cache: one [`Task`] per key for the lifetime of the loader.
//!
//! The only sanctioned ways to replace an entry are [`PromiseCache::update`]
//! (declare something as already loaded, or force a different outcome) and
//! [`PromiseCache::remove`] (allow a later resolve to fetch again).

use crate::error::{LoaderError, Result};
use crate::task::{Deferred, Task};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashMap;
use tracing::{debug, info};

/// Outcome of [`PromiseCache::get_or_reserve`]
#[derive(Debug)]
pub enum CacheSlot {
    /// Somebody already owns this key; share their task
    Existing(Task),
    /// The caller now owns this key and must settle the deferred
    Reserved(Deferred),
}

impl CacheSlot {
    /// The task for this key, whichever way it was obtained
    pub fn task(&self) -> Task {
        match self {
            CacheSlot::Existing(task) => task.clone(),
            CacheSlot::Reserved(deferred) => deferred.task(),
        }
    }
}

#[derive(Debug, Default)]
pub struct PromiseCache {
    tasks: DashMap<String, Task>,
}

impl PromiseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Task> {
        self.tasks.get(key).map(|task| task.value().clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.tasks.contains_key(key)
    }

    /// Store a new pending task under `key`.
    ///
    /// Reserving a key that already has a task is a caller bug and is
    /// reported as [`LoaderError::AlreadyReserved`].
    pub fn reserve(&self, key: &str) -> Result<Deferred> {
        match self.get_or_reserve(key) {
            CacheSlot::Reserved(deferred) => Ok(deferred),
            CacheSlot::Existing(_) => Err(LoaderError::AlreadyReserved {
                key: key.to_string(),
            }),
        }
    }

    /// Return the existing task for `key` or atomically reserve a new one
    pub fn get_or_reserve(&self, key: &str) -> CacheSlot {
        match self.tasks.entry(key.to_string()) {
            Entry::Occupied(occupied) => CacheSlot::Existing(occupied.get().clone()),
            Entry::Vacant(vacant) => {
                let deferred = Deferred::new(Some(key.to_string()));
                vacant.insert(deferred.task());
                debug!(key = %key, task_id = %deferred.task().id(), "📌 Task reserved");
                CacheSlot::Reserved(deferred)
            }
        }
    }

    /// Merge externally supplied tasks, overwriting same-keyed entries
    pub fn update<I, K>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, Task)>,
        K: Into<String>,
    {
        let mut count = 0usize;
        for (key, task) in entries {
            self.tasks.insert(key.into(), task);
            count += 1;
        }
        info!(updated = count, total = self.tasks.len(), "🗂️ Promise cache updated");
    }

    /// Declare `key` as loaded without fetching it
    pub fn mark_loaded(&self, key: impl Into<String>) {
        self.update([(key.into(), Task::resolved(None))]);
    }

    /// Forget `key` so the next resolve starts over
    pub fn remove(&self, key: &str) -> Option<Task> {
        self.tasks.remove(key).map(|(_, task)| task)
    }

    /// Copy of the full mapping
    pub fn snapshot(&self) -> HashMap<String, Task> {
        self.tasks
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
