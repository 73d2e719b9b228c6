use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};

/// Partitions of the derived-value cache.
///
/// Each namespace can be evicted independently; the mapping from mutating
/// operations to evicted namespaces lives in
/// [`crate::services::invalidation::Invalidation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheNamespace {
    MovieById,
    MovieByTitle,
    AllMovies,
    TopMovies,
    RatingById,
    AllRatings,
    RatingsByMovie,
    UserById,
    AllUsers,
    UsersByRole,
    UsersByPreference,
    AllRecommendations,
    RecommendationByUser,
}

impl CacheNamespace {
    /// Key prefix for the namespace. Keyed entries live at `{prefix}:{entry}`,
    /// whole-namespace values at the bare prefix.
    pub fn prefix(&self) -> &'static str {
        match self {
            CacheNamespace::MovieById => "movie",
            CacheNamespace::MovieByTitle => "movie_title",
            CacheNamespace::AllMovies => "all_movies",
            CacheNamespace::TopMovies => "top_movies",
            CacheNamespace::RatingById => "rating",
            CacheNamespace::AllRatings => "all_ratings",
            CacheNamespace::RatingsByMovie => "movie_ratings",
            CacheNamespace::UserById => "user",
            CacheNamespace::AllUsers => "all_users",
            CacheNamespace::UsersByRole => "users_by_role",
            CacheNamespace::UsersByPreference => "users_by_pref",
            CacheNamespace::AllRecommendations => "all_recommendations",
            CacheNamespace::RecommendationByUser => "recommendation",
        }
    }
}

impl Display for CacheNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// A namespace plus an optional entry within it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: CacheNamespace,
    entry: Option<String>,
}

impl CacheKey {
    /// Key for a single entry within a namespace
    pub fn keyed(namespace: CacheNamespace, entry: impl ToString) -> Self {
        Self {
            namespace,
            entry: Some(entry.to_string()),
        }
    }

    /// Key covering a whole namespace
    pub fn whole(namespace: CacheNamespace) -> Self {
        Self {
            namespace,
            entry: None,
        }
    }

    pub fn namespace(&self) -> CacheNamespace {
        self.namespace
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.entry {
            Some(entry) => write!(f, "{}:{}", self.namespace.prefix(), entry),
            None => write!(f, "{}", self.namespace.prefix()),
        }
    }
}

/// Storage seam for the derived-value cache.
///
/// Works on serialized strings; [`Cache`] adds typing on top. The production
/// backend is [`super::RedisBackend`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn read(&self, key: &str) -> AppResult<Option<String>>;
    async fn write(&self, key: &str, value: String, ttl_seconds: u64) -> AppResult<()>;
    async fn remove(&self, key: &str) -> AppResult<()>;
    /// Removes every entry stored under `{prefix}:...`
    async fn remove_prefix(&self, prefix: &str) -> AppResult<()>;
}

/// Derived-value cache with per-namespace bulk eviction and per-key TTL
#[derive(Clone)]
pub struct Cache {
    backend: Arc<dyn CacheBackend>,
    ttl_seconds: u64,
}

impl Cache {
    pub fn new(backend: Arc<dyn CacheBackend>, ttl_seconds: u64) -> Self {
        Self {
            backend,
            ttl_seconds,
        }
    }

    /// Retrieves a value from the cache by key
    ///
    /// If the key exists, the value is deserialized and returned.
    /// If the key does not exist, `None` is returned.
    pub async fn get<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let cached = self.backend.read(&key.to_string()).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Stores a value in the cache under the configured TTL
    pub async fn put<T: serde::Serialize>(&self, key: &CacheKey, value: &T) -> AppResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(format!("Cache serialization error: {}", e)))?;
        self.backend
            .write(&key.to_string(), json, self.ttl_seconds)
            .await
    }

    /// Evicts a single entry, or a whole namespace when the key has no entry
    pub async fn evict(&self, key: &CacheKey) -> AppResult<()> {
        match key.entry {
            Some(_) => self.backend.remove(&key.to_string()).await,
            None => {
                self.backend.remove(key.namespace.prefix()).await?;
                self.backend.remove_prefix(key.namespace.prefix()).await
            }
        }
    }
}

/// In-process cache backend for tests and single-node deployments.
///
/// Entries never expire; eviction is the only way out.
#[derive(Default)]
pub struct InMemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

#[async_trait]
impl CacheBackend for InMemoryBackend {
    async fn read(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: String, _ttl_seconds: u64) -> AppResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn remove_prefix(&self, prefix: &str) -> AppResult<()> {
        let qualified = format!("{}:", prefix);
        self.entries
            .write()
            .await
            .retain(|key, _| !key.starts_with(&qualified));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display_keyed() {
        let key = CacheKey::keyed(CacheNamespace::MovieById, "abc-123");
        assert_eq!(format!("{}", key), "movie:abc-123");
    }

    #[test]
    fn test_cache_key_display_whole_namespace() {
        let key = CacheKey::whole(CacheNamespace::AllMovies);
        assert_eq!(format!("{}", key), "all_movies");
    }

    #[test]
    fn test_namespace_prefixes_do_not_shadow_each_other() {
        let namespaces = [
            CacheNamespace::MovieById,
            CacheNamespace::MovieByTitle,
            CacheNamespace::AllMovies,
            CacheNamespace::TopMovies,
            CacheNamespace::RatingById,
            CacheNamespace::AllRatings,
            CacheNamespace::RatingsByMovie,
            CacheNamespace::UserById,
            CacheNamespace::AllUsers,
            CacheNamespace::UsersByRole,
            CacheNamespace::UsersByPreference,
            CacheNamespace::AllRecommendations,
            CacheNamespace::RecommendationByUser,
        ];

        for a in &namespaces {
            for b in &namespaces {
                if a != b {
                    let qualified = format!("{}:", a.prefix());
                    assert!(
                        !b.prefix().starts_with(&qualified),
                        "{} shadows {}",
                        a.prefix(),
                        b.prefix()
                    );
                    assert_ne!(a.prefix(), b.prefix());
                }
            }
        }
    }

    #[tokio::test]
    async fn test_cache_roundtrip() {
        let cache = Cache::new(Arc::new(InMemoryBackend::default()), 60);
        let key = CacheKey::keyed(CacheNamespace::MovieById, "m1");

        let miss: Option<Vec<String>> = cache.get(&key).await.unwrap();
        assert_eq!(miss, None);

        let value = vec!["item1".to_string(), "item2".to_string()];
        cache.put(&key, &value).await.unwrap();

        let hit: Option<Vec<String>> = cache.get(&key).await.unwrap();
        assert_eq!(hit, Some(value));
    }

    #[tokio::test]
    async fn test_evict_single_entry() {
        let cache = Cache::new(Arc::new(InMemoryBackend::default()), 60);
        let key = CacheKey::keyed(CacheNamespace::MovieById, "m1");
        let other = CacheKey::keyed(CacheNamespace::MovieById, "m2");

        cache.put(&key, &"a".to_string()).await.unwrap();
        cache.put(&other, &"b".to_string()).await.unwrap();

        cache.evict(&key).await.unwrap();

        let gone: Option<String> = cache.get(&key).await.unwrap();
        let kept: Option<String> = cache.get(&other).await.unwrap();
        assert_eq!(gone, None);
        assert_eq!(kept, Some("b".to_string()));
    }

    #[tokio::test]
    async fn test_evict_whole_namespace_spares_others() {
        let cache = Cache::new(Arc::new(InMemoryBackend::default()), 60);
        let movie = CacheKey::keyed(CacheNamespace::MovieById, "m1");
        let all_movies = CacheKey::whole(CacheNamespace::AllMovies);
        let rating = CacheKey::keyed(CacheNamespace::RatingById, "r1");

        cache.put(&movie, &"a".to_string()).await.unwrap();
        cache.put(&all_movies, &"b".to_string()).await.unwrap();
        cache.put(&rating, &"c".to_string()).await.unwrap();

        cache.evict(&CacheKey::whole(CacheNamespace::MovieById)).await.unwrap();
        cache.evict(&all_movies).await.unwrap();

        let movie_gone: Option<String> = cache.get(&movie).await.unwrap();
        let all_gone: Option<String> = cache.get(&all_movies).await.unwrap();
        let rating_kept: Option<String> = cache.get(&rating).await.unwrap();
        assert_eq!(movie_gone, None);
        assert_eq!(all_gone, None);
        assert_eq!(rating_kept, Some("c".to_string()));
    }
}
