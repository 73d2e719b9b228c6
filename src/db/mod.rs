pub mod cache;
pub mod memory;
pub mod redis;
pub mod stores;

pub use cache::Cache;
pub use cache::CacheBackend;
pub use cache::CacheKey;
pub use cache::CacheNamespace;
pub use cache::InMemoryBackend;
pub use memory::{
    InMemoryCatalogStore, InMemoryRatingStore, InMemoryRecommendationStore, InMemoryUserStore,
};
pub use redis::create_redis_client;
pub use redis::RedisBackend;
pub use stores::{CatalogStore, RatingStore, RecommendationStore, UserStore};

#[cfg(test)]
pub use cache::MockCacheBackend;
#[cfg(test)]
pub use stores::{MockCatalogStore, MockRatingStore, MockRecommendationStore, MockUserStore};
