//! Process-wide cache of fetched entities
//!
//! Entries are keyed by entity kind and either the list or a single id.
//! Mutations never overwrite entries; they invalidate them so the next read
//! goes back to the backend.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::api::EntityKind;

/// Which slice of an entity family an entry holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheScope {
    List,
    Entity(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: EntityKind,
    pub scope: CacheScope,
}

impl CacheKey {
    pub const fn list(kind: EntityKind) -> Self {
        Self {
            kind,
            scope: CacheScope::List,
        }
    }

    pub const fn entity(kind: EntityKind, id: u64) -> Self {
        Self {
            kind,
            scope: CacheScope::Entity(id),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            CacheScope::List => write!(f, "{}:list", self.kind),
            CacheScope::Entity(id) => write!(f, "{}:{}", self.kind, id),
        }
    }
}

type Entry = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, Entry>,
    /// Bumped by `invalidate`; a fetch that saw an older value must not store its result
    generations: HashMap<CacheKey, u64>,
    /// Bumped by `invalidate_kind`
    kind_generations: HashMap<EntityKind, u64>,
}

impl CacheState {
    fn generation(&self, key: &CacheKey) -> (u64, u64) {
        (
            self.kind_generations.get(&key.kind).copied().unwrap_or(0),
            self.generations.get(key).copied().unwrap_or(0),
        )
    }
}

/// Shared handle to the cache; clones see the same entries
#[derive(Clone, Default)]
pub struct QueryCache {
    state: Arc<Mutex<CacheState>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached value for `key`, if present and of type `T`
    pub fn get<T>(&self, key: &CacheKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let entry = self.state().entries.get(key).cloned()?;
        entry.downcast_ref::<T>().cloned()
    }

    pub fn put<T>(&self, key: CacheKey, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.state().entries.insert(key, Arc::new(value));
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.state().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().entries.is_empty()
    }

    /// Drop one entry; returns whether anything was cached under `key`.
    /// Fetches already in flight for `key` will not store their results.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        let removed = {
            let mut state = self.state();
            *state.generations.entry(*key).or_insert(0) += 1;
            state.entries.remove(key).is_some()
        };
        debug!("Invalidated cache key {} (was cached: {})", key, removed);
        removed
    }

    /// Drop the list entry and every single-entity entry of `kind`
    pub fn invalidate_kind(&self, kind: EntityKind) {
        {
            let mut state = self.state();
            *state.kind_generations.entry(kind).or_insert(0) += 1;
            state.entries.retain(|key, _| key.kind != kind);
        }
        debug!("Invalidated all cache entries for {}", kind);
    }

    /// Serve `key` from the cache, or run `fetch` and remember its result.
    ///
    /// The result is returned but not stored when `key` was invalidated while
    /// `fetch` was running, since it may predate the mutation that caused it.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: CacheKey, fetch: F) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(&key) {
            debug!("Cache hit for {}", key);
            return Ok(hit);
        }

        debug!("Cache miss for {}", key);
        let started = self.state().generation(&key);
        let value = fetch().await?;

        let mut state = self.state();
        if state.generation(&key) == started {
            state.entries.insert(key, Arc::new(value.clone()));
        } else {
            debug!("Not caching {}: invalidated during fetch", key);
        }
        Ok(value)
    }
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self.state().entries.keys().map(|k| k.to_string()).collect();
        f.debug_struct("QueryCache").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_or_fetch_uses_cache_until_invalidated() {
        let cache = QueryCache::new();
        let key = CacheKey::list(EntityKind::Travel);
        let mut fetches = 0;

        for _ in 0..2 {
            let value: Result<Vec<u32>, ()> = cache
                .get_or_fetch(key, || {
                    fetches += 1;
                    async { Ok(vec![1, 2, 3]) }
                })
                .await;
            assert_eq!(value.unwrap(), vec![1, 2, 3]);
        }
        assert_eq!(fetches, 1);

        assert!(cache.invalidate(&key));
        assert!(!cache.invalidate(&key));

        let value: Result<Vec<u32>, ()> = cache
            .get_or_fetch(key, || {
                fetches += 1;
                async { Ok(vec![4]) }
            })
            .await;
        assert_eq!(value.unwrap(), vec![4]);
        assert_eq!(fetches, 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = QueryCache::new();
        let key = CacheKey::entity(EntityKind::Driver, 9);
        let value: Result<String, &str> = cache.get_or_fetch(key, || async { Err("boom") }).await;
        assert_eq!(value, Err("boom"));
        assert!(!cache.contains(&key));
    }

    #[test]
    fn test_invalidate_kind_keeps_other_kinds() {
        let cache = QueryCache::new();
        cache.put(CacheKey::list(EntityKind::Travel), vec![1u64]);
        cache.put(CacheKey::entity(EntityKind::Travel, 1), 1u64);
        cache.put(CacheKey::list(EntityKind::Driver), vec![2u64]);

        cache.invalidate_kind(EntityKind::Travel);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get::<Vec<u64>>(&CacheKey::list(EntityKind::Driver)), Some(vec![2]));
        assert_eq!(cache.get::<Vec<u64>>(&CacheKey::list(EntityKind::Travel)), None);
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = QueryCache::new();
        let other = cache.clone();
        other.put(CacheKey::entity(EntityKind::Travel, 3), "three".to_string());
        assert_eq!(
            cache.get::<String>(&CacheKey::entity(EntityKind::Travel, 3)),
            Some("three".to_string())
        );
        assert_eq!(CacheKey::entity(EntityKind::Travel, 3).to_string(), "travel:3");
    }

    #[tokio::test]
    async fn test_fetch_overlapping_invalidation_is_not_stored() {
        let cache = QueryCache::new();
        let key = CacheKey::list(EntityKind::Travel);
        let (started, fetching) = tokio::sync::oneshot::channel::<()>();
        let (release, released) = tokio::sync::oneshot::channel::<Vec<String>>();

        let reader = cache.clone();
        let read = tokio::spawn(async move {
            reader
                .get_or_fetch(key, || async move {
                    started.send(()).unwrap();
                    Ok::<_, ()>(released.await.unwrap())
                })
                .await
        });
        fetching.await.unwrap();

        cache.invalidate(&key);
        release.send(vec!["before update".to_string()]).unwrap();

        assert_eq!(read.await.unwrap(), Ok(vec!["before update".to_string()]));
        assert_eq!(cache.get::<Vec<String>>(&key), None);
    }

    #[tokio::test]
    async fn test_kind_invalidation_covers_entity_fetch_in_flight() {
        let cache = QueryCache::new();
        let key = CacheKey::entity(EntityKind::Driver, 4);
        let (started, fetching) = tokio::sync::oneshot::channel::<()>();
        let (release, released) = tokio::sync::oneshot::channel::<String>();

        let reader = cache.clone();
        let read = tokio::spawn(async move {
            reader
                .get_or_fetch(key, || async move {
                    started.send(()).unwrap();
                    Ok::<_, ()>(released.await.unwrap())
                })
                .await
        });
        fetching.await.unwrap();

        cache.invalidate_kind(EntityKind::Driver);
        release.send("Budi".to_string()).unwrap();
        read.await.unwrap().unwrap();

        assert!(!cache.contains(&key));
    }
}
