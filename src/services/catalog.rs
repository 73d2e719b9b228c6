use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::cached;
use crate::clients::CatalogClient;
use crate::db::{Cache, CacheKey, CacheNamespace, CatalogStore};
use crate::error::{AppError, AppResult};
use crate::models::{Genre, Movie, MovieUpdate, NewMovie};
use crate::services::invalidation::{Invalidation, InvalidationCoordinator};

/// Owns the movie collection and its derived average scores.
///
/// All reads go through the derived-value cache; every write runs the
/// invalidation table after it completes.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    cache: Cache,
    invalidation: InvalidationCoordinator,
}

impl CatalogService {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        cache: Cache,
        invalidation: InvalidationCoordinator,
    ) -> Self {
        Self {
            store,
            cache,
            invalidation,
        }
    }

    /// Creates catalog entries; averages start at zero until ratings arrive
    pub async fn create_movies(&self, movies: Vec<NewMovie>) -> AppResult<Vec<Movie>> {
        if movies.is_empty() {
            return Err(AppError::InvalidInput(
                "The catalog list cannot be empty".to_string(),
            ));
        }

        let mut created = Vec::with_capacity(movies.len());
        for new in movies {
            created.push(self.store.insert(Movie::new(new)).await?);
        }

        self.invalidation
            .apply(Invalidation::MovieWrite { movie_id: None })
            .await;

        tracing::info!(count = created.len(), "Created catalog entries");
        Ok(created)
    }

    pub async fn find_by_id(&self, movie_id: Uuid) -> AppResult<Movie> {
        let key = CacheKey::keyed(CacheNamespace::MovieById, movie_id);
        cached!(self.cache, key, async { self.store.get_by_id(movie_id).await })
    }

    pub async fn find_all(&self) -> AppResult<Vec<Movie>> {
        let key = CacheKey::whole(CacheNamespace::AllMovies);
        cached!(self.cache, key, async { self.store.get_all().await })
    }

    pub async fn find_by_title(&self, title: &str) -> AppResult<Movie> {
        let key = CacheKey::keyed(CacheNamespace::MovieByTitle, title);
        cached!(self.cache, key, async { self.store.get_by_title(title).await })
    }

    /// Applies a partial update. The derived average is not part of the
    /// update surface; only the aggregation push can change it.
    pub async fn update_movie(&self, movie_id: Uuid, update: MovieUpdate) -> AppResult<Movie> {
        let mut movie = self.store.get_by_id(movie_id).await?;
        movie.apply(update);
        let saved = self.store.update(movie).await?;

        self.invalidation
            .apply(Invalidation::MovieWrite {
                movie_id: Some(movie_id),
            })
            .await;

        Ok(saved)
    }

    pub async fn delete_movie(&self, movie_id: Uuid) -> AppResult<()> {
        self.store.get_by_id(movie_id).await?;
        self.store.delete(movie_id).await?;

        self.invalidation
            .apply(Invalidation::MovieWrite {
                movie_id: Some(movie_id),
            })
            .await;

        Ok(())
    }

    /// Movies whose genre is in the requested set
    pub async fn find_by_genres(&self, genres: Vec<Genre>) -> AppResult<Vec<Movie>> {
        let wanted: HashSet<Genre> = genres.into_iter().collect();
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .filter(|movie| wanted.contains(&movie.genre))
            .collect())
    }

    /// The three best-rated movies, unscored entries last
    pub async fn top_rated(&self) -> AppResult<Vec<Movie>> {
        let key = CacheKey::whole(CacheNamespace::TopMovies);
        cached!(self.cache, key, async {
            let mut movies = self.store.get_all().await?;
            movies.sort_by(|a, b| compare_scores_desc(a.rating_average, b.rating_average));
            movies.truncate(3);
            Ok::<_, AppError>(movies)
        })
    }

    /// Aggregation push target; the only writer of the derived average
    pub async fn update_score(&self, movie_id: Uuid, average: f64) -> AppResult<Movie> {
        let updated = self.store.update_score(movie_id, average).await?;

        self.invalidation
            .apply(Invalidation::ScorePush { movie_id })
            .await;

        tracing::debug!(movie_id = %movie_id, average, "Catalog score updated");
        Ok(updated)
    }
}

/// Descending by score, entries without a score last
pub(crate) fn compare_scores_desc(a: Option<f64>, b: Option<f64>) -> std::cmp::Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
}

#[async_trait]
impl CatalogClient for CatalogService {
    async fn get_by_id(&self, movie_id: Uuid) -> AppResult<Movie> {
        self.find_by_id(movie_id).await
    }

    async fn get_all(&self) -> AppResult<Vec<Movie>> {
        self.find_all().await
    }

    async fn update_score(&self, movie_id: Uuid, average: f64) -> AppResult<Movie> {
        CatalogService::update_score(self, movie_id, average).await
    }
}
