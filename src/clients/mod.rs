use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::Movie;

pub mod catalog;

pub use catalog::HttpCatalogClient;

/// Catalog collaborator contract.
///
/// This is the seam the aggregation, recommendation, and view pipelines
/// call through. In a single-process deployment the embedded
/// [`crate::services::CatalogService`] implements it directly; when the
/// catalog collection is owned by another deployment the
/// [`HttpCatalogClient`] does.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch one catalog entry
    async fn get_by_id(&self, movie_id: Uuid) -> AppResult<Movie>;

    /// Fetch the full catalog snapshot
    async fn get_all(&self) -> AppResult<Vec<Movie>>;

    /// Push an aggregated average into the catalog
    async fn update_score(&self, movie_id: Uuid, average: f64) -> AppResult<Movie>;
}
