use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

use crate::db::Scope;

/// Pluggable store for the recursive class-lookup results.
///
/// Payloads are opaque strings (the checkers use JSON); a `get` miss simply
/// means the lookup is recomputed, so any implementation may drop entries
/// at will and detection output never depends on cache contents.
pub trait LookupCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: String, ttl: Option<Duration>);
}

/// Cache that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl LookupCache for NoopCache {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn put(&self, _key: &str, _value: String, _ttl: Option<Duration>) {}
}

/// In-process cache with optional per-entry expiry.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

#[derive(Debug)]
struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LookupCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some(entry) => {
                if entry.expires_at.is_some_and(|at| at <= Instant::now()) {
                    entries.remove(key);
                    None
                } else {
                    Some(entry.value.clone())
                }
            }
            None => None,
        }
    }

    fn put(&self, key: &str, value: String, ttl: Option<Duration>) {
        if let Ok(mut entries) = self.entries.lock() {
            let expires_at = ttl.map(|ttl| Instant::now() + ttl);
            entries.insert(key.to_string(), MemoryEntry { value, expires_at });
        }
    }
}

/// Cache key for one recursive class lookup.
///
/// The snapshot identity is hashed so keys stay shareable regardless of how
/// unwieldy the database path is; `kind` names the entity family and the
/// scope filter is encoded by ordinal so differently-filtered lookups never
/// collide.
pub fn class_lookup_key(
    identity: &str,
    kind: &str,
    class_id: i64,
    scopes: Option<&[Scope]>,
) -> String {
    let digest = Sha256::digest(identity.as_bytes());
    let scope_part = match scopes {
        None => String::from("all"),
        Some(scopes) => scopes
            .iter()
            .map(|scope| scope.ordinal().to_string())
            .collect::<Vec<_>>()
            .join("-"),
    };
    format!("{digest:x}:{kind}[{class_id}]_scopes[{scope_part}]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_cache_round_trips() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("a"), None);
        cache.put("a", "payload".to_string(), None);
        assert_eq!(cache.get("a").as_deref(), Some("payload"));
    }

    #[test]
    fn expired_entries_behave_like_misses() {
        let cache = MemoryCache::new();
        cache.put("a", "payload".to_string(), Some(Duration::from_secs(0)));
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn keys_separate_snapshots_kinds_and_scope_filters() {
        let covered = [Scope::Public, Scope::Protected];
        let base = class_lookup_key("db-one", "methods", 7, Some(&covered));
        assert!(base.ends_with(":methods[7]_scopes[3-2]"));
        assert_ne!(base, class_lookup_key("db-two", "methods", 7, Some(&covered)));
        assert_ne!(base, class_lookup_key("db-one", "properties", 7, Some(&covered)));
        assert_ne!(base, class_lookup_key("db-one", "methods", 7, None));
    }
}
