use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Movie, Rating, Recommendation, User};

/// Durable keyed storage for catalog entries.
///
/// Implemented in-process by [`super::InMemoryCatalogStore`]; the collaborator
/// contract consumed by the derived-value pipelines is the narrower
/// [`crate::clients::CatalogClient`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert(&self, movie: Movie) -> AppResult<Movie>;
    async fn get_by_id(&self, movie_id: Uuid) -> AppResult<Movie>;
    async fn get_by_title(&self, title: &str) -> AppResult<Movie>;
    async fn get_all(&self) -> AppResult<Vec<Movie>>;
    async fn update(&self, movie: Movie) -> AppResult<Movie>;
    /// Writes the derived average; the only path that may touch it
    async fn update_score(&self, movie_id: Uuid, average: f64) -> AppResult<Movie>;
    async fn delete(&self, movie_id: Uuid) -> AppResult<()>;
}

/// Durable keyed storage for ratings
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingStore: Send + Sync {
    async fn insert(&self, rating: Rating) -> AppResult<Rating>;
    async fn insert_many(&self, ratings: Vec<Rating>) -> AppResult<Vec<Rating>>;
    async fn get_by_id(&self, rating_id: Uuid) -> AppResult<Rating>;
    async fn get_all(&self) -> AppResult<Vec<Rating>>;
    async fn find_by_movie_id(&self, movie_id: Uuid) -> AppResult<Vec<Rating>>;
    async fn update(&self, rating: Rating) -> AppResult<Rating>;
    async fn delete(&self, rating_id: Uuid) -> AppResult<()>;
}

/// Durable keyed storage for accounts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_many(&self, users: Vec<User>) -> AppResult<Vec<User>>;
    async fn get_by_id(&self, user_id: Uuid) -> AppResult<User>;
    async fn get_all(&self) -> AppResult<Vec<User>>;
    async fn update(&self, user: User) -> AppResult<User>;
    async fn delete(&self, user_id: Uuid) -> AppResult<()>;
}

/// Durable storage for generated recommendation lists.
///
/// Lists are keyed by user id; `upsert` replaces any previous list for the
/// same user, so at most one record per user exists.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    async fn upsert(&self, recommendation: Recommendation) -> AppResult<Recommendation>;
    async fn get_all(&self) -> AppResult<Vec<Recommendation>>;
    async fn find_by_user_id(&self, user_id: Uuid) -> AppResult<Recommendation>;
}
