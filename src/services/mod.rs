use std::future::Future;
use std::time::Duration;

use crate::error::{AppError, AppResult};

pub mod catalog;
pub mod invalidation;
pub mod ratings;
pub mod recommendations;
pub mod users;
pub mod views;

pub use catalog::CatalogService;
pub use invalidation::{Invalidation, InvalidationCoordinator};
pub use ratings::RatingService;
pub use recommendations::RecommendationService;
pub use users::UserService;
pub use views::ViewResolver;

/// Bounds a collaborator call and tags failures with call context.
///
/// Client-visible outcomes (not found, invalid input) pass through
/// unchanged; transport errors and timer expiry surface as recoverable
/// collaborator failures so the caller can retry or accept staleness.
pub(crate) async fn bounded_call<T, F>(limit: Duration, context: &str, call: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e @ AppError::NotFound(_))) | Ok(Err(e @ AppError::InvalidInput(_))) => Err(e),
        Ok(Err(e)) => Err(AppError::Collaborator(format!("{}: {}", context, e))),
        Err(_) => Err(AppError::Collaborator(format!(
            "{}: timed out after {}ms",
            context,
            limit.as_millis()
        ))),
    }
}
