use uuid::Uuid;

use crate::db::{Cache, CacheKey, CacheNamespace};

/// A state-changing operation that derived-value caches depend on.
///
/// [`Invalidation::evictions`] is the one place where namespace coverage is
/// defined for every mutating operation; nothing else in the crate decides
/// what to evict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    /// Catalog entry created, updated, or deleted. `None` covers batch
    /// writes, evicting the whole per-movie namespace.
    MovieWrite { movie_id: Option<Uuid> },
    /// Aggregated average pushed into the catalog
    ScorePush { movie_id: Uuid },
    /// Rating created, updated, or deleted
    RatingWrite {
        rating_id: Option<Uuid>,
        movie_id: Option<Uuid>,
    },
    /// Account created, updated, or deleted
    UserWrite { user_id: Option<Uuid> },
    /// Recommendation lists regenerated for the given users
    RecommendationRebuild { user_ids: Vec<Uuid> },
}

impl Invalidation {
    /// The eviction table: cache keys removed for each operation
    pub fn evictions(&self) -> Vec<CacheKey> {
        match self {
            Invalidation::MovieWrite { movie_id } => vec![
                entry_or_whole(CacheNamespace::MovieById, movie_id),
                CacheKey::whole(CacheNamespace::MovieByTitle),
                CacheKey::whole(CacheNamespace::AllMovies),
                CacheKey::whole(CacheNamespace::TopMovies),
            ],
            Invalidation::ScorePush { movie_id } => vec![
                CacheKey::keyed(CacheNamespace::MovieById, movie_id),
                CacheKey::whole(CacheNamespace::MovieByTitle),
                CacheKey::whole(CacheNamespace::AllMovies),
                CacheKey::whole(CacheNamespace::TopMovies),
            ],
            Invalidation::RatingWrite {
                rating_id,
                movie_id,
            } => vec![
                entry_or_whole(CacheNamespace::RatingById, rating_id),
                CacheKey::whole(CacheNamespace::AllRatings),
                entry_or_whole(CacheNamespace::RatingsByMovie, movie_id),
            ],
            Invalidation::UserWrite { user_id } => vec![
                entry_or_whole(CacheNamespace::UserById, user_id),
                CacheKey::whole(CacheNamespace::AllUsers),
                CacheKey::whole(CacheNamespace::UsersByRole),
                CacheKey::whole(CacheNamespace::UsersByPreference),
            ],
            Invalidation::RecommendationRebuild { user_ids } => {
                let mut keys = vec![CacheKey::whole(CacheNamespace::AllRecommendations)];
                keys.extend(
                    user_ids
                        .iter()
                        .map(|id| CacheKey::keyed(CacheNamespace::RecommendationByUser, id)),
                );
                keys
            }
        }
    }
}

fn entry_or_whole(namespace: CacheNamespace, id: &Option<Uuid>) -> CacheKey {
    match id {
        Some(id) => CacheKey::keyed(namespace, id),
        None => CacheKey::whole(namespace),
    }
}

/// Applies the eviction table after the write it protects has completed.
///
/// Eviction runs synchronously relative to the caller but its failures are
/// logged and swallowed; a write that already happened is never rolled back
/// because the cache could not be cleaned.
#[derive(Clone)]
pub struct InvalidationCoordinator {
    cache: Cache,
}

impl InvalidationCoordinator {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    pub async fn apply(&self, invalidation: Invalidation) {
        for key in invalidation.evictions() {
            if let Err(e) = self.cache.evict(&key).await {
                tracing::warn!(key = %key, error = %e, "Cache eviction failed");
            }
        }
    }
}
