use matcher::{Category, Matcher};

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// A matcher plus the id it is registered under.
///
/// The id is the matcher's own when it declares one, otherwise assigned
/// from a monotonic counter at registration. Equality of matchers is by id.
#[derive(Clone)]
pub struct RegisteredMatcher {
    pub id: String,
    pub matcher: Arc<dyn Matcher>,
}

impl std::fmt::Debug for RegisteredMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredMatcher")
            .field("id", &self.id)
            .field("kind", &self.matcher.kind())
            .finish()
    }
}

/// The mutable matcher registry.
///
/// Reads vastly outnumber writes, so entries sit behind a `RwLock`; each
/// check takes one snapshot of the `Arc` handles under the read lock and
/// never looks back. Removing a matcher therefore only affects checks that
/// start afterwards.
pub(crate) struct MatcherRegistry {
    entries: RwLock<Vec<RegisteredMatcher>>,
    next_id: AtomicU64,
}

impl MatcherRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register a matcher and return its effective id.
    ///
    /// Re-adding a matcher (same declared id, or the very same instance) is
    /// a no-op that returns the existing id.
    pub fn add(&self, new: Arc<dyn Matcher>) -> String {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(existing) = entries
            .iter()
            .find(|entry| Arc::ptr_eq(&entry.matcher, &new))
        {
            return existing.id.clone();
        }

        let id = match new.id() {
            Some(id) => {
                if let Some(existing) = entries.iter().find(|entry| entry.id == id) {
                    return existing.id.clone();
                }
                id
            }
            None => format!("matcher-{}", self.next_id.fetch_add(1, Ordering::Relaxed)),
        };

        entries.push(RegisteredMatcher {
            id: id.clone(),
            matcher: new,
        });
        id
    }

    /// Remove a matcher by id. Returns whether anything was removed.
    pub fn remove_by_id(&self, id: &str) -> bool {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        entries.len() != before
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    /// Clone the current entries; the snapshot a check operates on.
    pub fn snapshot(&self) -> Vec<RegisteredMatcher> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Union of the categories of every registered matcher.
    pub fn categories(&self) -> HashSet<Category> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .flat_map(|entry| entry.matcher.categories())
            .collect()
    }
}
