//! Query cache with tag-based invalidation.
//!
//! DESIGN
//! ======
//! GET responses are cached by request path as raw JSON, together with the
//! tags they provide. A successful mutation invalidates tags, which drops
//! every cached entry they match:
//!
//! - a kind-wide tag (`Tag::kind`) matches every entry of that kind;
//! - an id tag (`Tag::list`, `Tag::item`) matches entries providing the
//!   same kind and id.
//!
//! Entries older than `keep_for` read as misses. The cache never refetches
//! on its own; callers (the API client, the poller) decide when to fetch.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use uuid::Uuid;

const LIST_ID: &str = "LIST";

/// Entity families that cache entries can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    User,
    Mentor,
    Buddy,
    Task,
    Dashboard,
    Curriculum,
    Progress,
    Submission,
    Feedback,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    pub kind: TagKind,
    pub id: Option<String>,
}

impl Tag {
    /// Matches everything of `kind` when invalidating.
    #[must_use]
    pub fn kind(kind: TagKind) -> Self {
        Self { kind, id: None }
    }

    /// The collection of `kind`.
    #[must_use]
    pub fn list(kind: TagKind) -> Self {
        Self { kind, id: Some(LIST_ID.to_string()) }
    }

    /// A single entity of `kind`.
    #[must_use]
    pub fn item(kind: TagKind, id: Uuid) -> Self {
        Self { kind, id: Some(id.to_string()) }
    }

    /// Whether invalidating `self` drops an entry that provided `provided`.
    #[must_use]
    pub fn invalidates(&self, provided: &Tag) -> bool {
        self.kind == provided.kind && (self.id.is_none() || self.id == provided.id)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{:?}:{id}", self.kind),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

struct Entry {
    value: serde_json::Value,
    tags: Vec<Tag>,
    fetched_at: Instant,
}

pub struct QueryCache {
    entries: Mutex<HashMap<String, Entry>>,
    keep_for: Duration,
}

impl QueryCache {
    #[must_use]
    pub fn new(keep_for: Duration) -> Self {
        Self { entries: Mutex::new(HashMap::new()), keep_for }
    }

    /// Fresh cached value for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at(&self, key: &str, now: Instant) -> Option<serde_json::Value> {
        let mut entries = self.lock();
        let fresh = entries.get(key).map(|e| now.saturating_duration_since(e.fetched_at) < self.keep_for)?;
        if !fresh {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|e| e.value.clone())
    }

    pub fn insert(&self, key: &str, value: serde_json::Value, tags: Vec<Tag>) {
        self.insert_at(key, value, tags, Instant::now());
    }

    pub(crate) fn insert_at(&self, key: &str, value: serde_json::Value, tags: Vec<Tag>, now: Instant) {
        self.lock().insert(key.to_string(), Entry { value, tags, fetched_at: now });
    }

    /// Drop every entry matched by any of `tags`. Returns how many were dropped.
    pub fn invalidate(&self, tags: &[Tag]) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.tags.iter().any(|provided| tags.iter().any(|t| t.invalidates(provided))));
        let dropped = before - entries.len();
        if dropped > 0 {
            let tags: Vec<String> = tags.iter().map(ToString::to_string).collect();
            tracing::debug!(dropped, tags = ?tags, "cache invalidated");
        }
        dropped
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        // A poisoned map only loses cached reads; keep serving.
        self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
