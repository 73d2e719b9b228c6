use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::cached;
use crate::clients::CatalogClient;
use crate::db::{Cache, CacheKey, CacheNamespace, RatingStore};
use crate::error::{AppError, AppResult};
use crate::models::{NewRating, Rating, RatingAverage, RatingUpdate};
use crate::services::bounded_call;
use crate::services::invalidation::{Invalidation, InvalidationCoordinator};

/// Rating CRUD plus the score-aggregation pipeline.
///
/// Aggregation recomputes a movie's mean score from its stored ratings and
/// pushes the result to the catalog collaborator. There is no lock around
/// the read-aggregate-push sequence; two concurrent submissions for the same
/// movie can each miss the other's rating and the last push wins until the
/// next aggregation run.
#[derive(Clone)]
pub struct RatingService {
    store: Arc<dyn RatingStore>,
    catalog: Arc<dyn CatalogClient>,
    cache: Cache,
    invalidation: InvalidationCoordinator,
    collaborator_timeout: Duration,
}

impl RatingService {
    pub fn new(
        store: Arc<dyn RatingStore>,
        catalog: Arc<dyn CatalogClient>,
        cache: Cache,
        invalidation: InvalidationCoordinator,
        collaborator_timeout: Duration,
    ) -> Self {
        Self {
            store,
            catalog,
            cache,
            invalidation,
            collaborator_timeout,
        }
    }

    /// Batch insert for administrative loads; does not re-aggregate
    pub async fn create_ratings(&self, ratings: Vec<NewRating>) -> AppResult<Vec<Rating>> {
        if ratings.is_empty() {
            return Err(AppError::InvalidInput(
                "The rating list cannot be empty".to_string(),
            ));
        }

        let ratings = ratings.into_iter().map(Rating::new).collect();
        let created = self.store.insert_many(ratings).await?;

        self.invalidation
            .apply(Invalidation::RatingWrite {
                rating_id: None,
                movie_id: None,
            })
            .await;

        Ok(created)
    }

    /// Persists one rating, then recomputes and pushes the movie's average.
    ///
    /// The rating write stands even when the push fails; the returned error
    /// then tells the caller the catalog average is stale until the next
    /// aggregation run for the movie.
    pub async fn submit_rating(&self, new_rating: NewRating) -> AppResult<RatingAverage> {
        let rating = self.store.insert(Rating::new(new_rating)).await?;

        self.invalidation
            .apply(Invalidation::RatingWrite {
                rating_id: Some(rating.id),
                movie_id: Some(rating.movie_id),
            })
            .await;

        let average_score = self.aggregate_for_movie(rating.movie_id).await?;

        tracing::info!(
            movie_id = %rating.movie_id,
            average = average_score,
            "Rating submitted and average pushed"
        );

        Ok(RatingAverage {
            movie_id: rating.movie_id,
            average_score,
        })
    }

    /// Recomputes the mean of all stored ratings for the movie and pushes it
    /// to the catalog. An empty rating set pushes 0.0.
    ///
    /// The pushed value reflects ratings visible when the fetch ran; ratings
    /// landing concurrently are picked up by their own aggregation runs.
    pub async fn aggregate_for_movie(&self, movie_id: Uuid) -> AppResult<f64> {
        let ratings = self.store.find_by_movie_id(movie_id).await?;
        let average = mean_score(&ratings);

        bounded_call(
            self.collaborator_timeout,
            &format!("score push for movie {}", movie_id),
            self.catalog.update_score(movie_id, average),
        )
        .await?;

        Ok(average)
    }

    pub async fn find_by_id(&self, rating_id: Uuid) -> AppResult<Rating> {
        let key = CacheKey::keyed(CacheNamespace::RatingById, rating_id);
        cached!(self.cache, key, async { self.store.get_by_id(rating_id).await })
    }

    pub async fn find_all(&self) -> AppResult<Vec<Rating>> {
        let key = CacheKey::whole(CacheNamespace::AllRatings);
        cached!(self.cache, key, async { self.store.get_all().await })
    }

    /// Ratings for one movie; the movie must exist in the catalog
    pub async fn find_by_movie(&self, movie_id: Uuid) -> AppResult<Vec<Rating>> {
        let key = CacheKey::keyed(CacheNamespace::RatingsByMovie, movie_id);
        cached!(self.cache, key, async {
            bounded_call(
                self.collaborator_timeout,
                &format!("catalog lookup for movie {}", movie_id),
                self.catalog.get_by_id(movie_id),
            )
            .await?;
            self.store.find_by_movie_id(movie_id).await
        })
    }

    /// Updates score or comment, then re-aggregates the movie
    pub async fn update_rating(&self, rating_id: Uuid, update: RatingUpdate) -> AppResult<Rating> {
        let mut rating = self.store.get_by_id(rating_id).await?;
        rating.apply(update);
        let saved = self.store.update(rating).await?;

        self.invalidation
            .apply(Invalidation::RatingWrite {
                rating_id: Some(rating_id),
                movie_id: Some(saved.movie_id),
            })
            .await;

        self.aggregate_for_movie(saved.movie_id).await?;
        Ok(saved)
    }

    /// Removes a rating, resolved by its own id, then re-aggregates the
    /// movie it scored
    pub async fn delete_rating(&self, rating_id: Uuid) -> AppResult<()> {
        let rating = self.store.get_by_id(rating_id).await?;
        self.store.delete(rating_id).await?;

        self.invalidation
            .apply(Invalidation::RatingWrite {
                rating_id: Some(rating_id),
                movie_id: Some(rating.movie_id),
            })
            .await;

        self.aggregate_for_movie(rating.movie_id).await?;
        Ok(())
    }
}

/// Mean of the numeric score values; 0.0 for an empty set
fn mean_score(ratings: &[Rating]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: f64 = ratings.iter().map(|r| f64::from(r.score.value())).sum();
    sum / ratings.len() as f64
}
