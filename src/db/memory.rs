use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::stores::{CatalogStore, RatingStore, RecommendationStore, UserStore};
use crate::error::{AppError, AppResult};
use crate::models::{Movie, Rating, Recommendation, User};

/// In-process catalog storage.
///
/// Entries iterate in insertion order, which downstream consumers rely on
/// for stable tie-breaking.
#[derive(Default)]
pub struct InMemoryCatalogStore {
    movies: RwLock<IndexMap<Uuid, Movie>>,
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn insert(&self, movie: Movie) -> AppResult<Movie> {
        self.movies.write().await.insert(movie.id, movie.clone());
        Ok(movie)
    }

    async fn get_by_id(&self, movie_id: Uuid) -> AppResult<Movie> {
        self.movies
            .read()
            .await
            .get(&movie_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", movie_id)))
    }

    async fn get_by_title(&self, title: &str) -> AppResult<Movie> {
        self.movies
            .read()
            .await
            .values()
            .find(|movie| movie.title == title)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Movie '{}' not found", title)))
    }

    async fn get_all(&self) -> AppResult<Vec<Movie>> {
        Ok(self.movies.read().await.values().cloned().collect())
    }

    async fn update(&self, movie: Movie) -> AppResult<Movie> {
        let mut movies = self.movies.write().await;
        if !movies.contains_key(&movie.id) {
            return Err(AppError::NotFound(format!("Movie {} not found", movie.id)));
        }
        movies.insert(movie.id, movie.clone());
        Ok(movie)
    }

    async fn update_score(&self, movie_id: Uuid, average: f64) -> AppResult<Movie> {
        let mut movies = self.movies.write().await;
        let movie = movies
            .get_mut(&movie_id)
            .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", movie_id)))?;
        movie.rating_average = Some(average);
        Ok(movie.clone())
    }

    async fn delete(&self, movie_id: Uuid) -> AppResult<()> {
        self.movies
            .write()
            .await
            .shift_remove(&movie_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", movie_id)))
    }
}

/// In-process rating storage
#[derive(Default)]
pub struct InMemoryRatingStore {
    ratings: RwLock<IndexMap<Uuid, Rating>>,
}

#[async_trait]
impl RatingStore for InMemoryRatingStore {
    async fn insert(&self, rating: Rating) -> AppResult<Rating> {
        self.ratings.write().await.insert(rating.id, rating.clone());
        Ok(rating)
    }

    async fn insert_many(&self, ratings: Vec<Rating>) -> AppResult<Vec<Rating>> {
        let mut stored = self.ratings.write().await;
        for rating in &ratings {
            stored.insert(rating.id, rating.clone());
        }
        Ok(ratings)
    }

    async fn get_by_id(&self, rating_id: Uuid) -> AppResult<Rating> {
        self.ratings
            .read()
            .await
            .get(&rating_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Rating {} not found", rating_id)))
    }

    async fn get_all(&self) -> AppResult<Vec<Rating>> {
        Ok(self.ratings.read().await.values().cloned().collect())
    }

    async fn find_by_movie_id(&self, movie_id: Uuid) -> AppResult<Vec<Rating>> {
        Ok(self
            .ratings
            .read()
            .await
            .values()
            .filter(|rating| rating.movie_id == movie_id)
            .cloned()
            .collect())
    }

    async fn update(&self, rating: Rating) -> AppResult<Rating> {
        let mut ratings = self.ratings.write().await;
        if !ratings.contains_key(&rating.id) {
            return Err(AppError::NotFound(format!("Rating {} not found", rating.id)));
        }
        ratings.insert(rating.id, rating.clone());
        Ok(rating)
    }

    async fn delete(&self, rating_id: Uuid) -> AppResult<()> {
        self.ratings
            .write()
            .await
            .shift_remove(&rating_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Rating {} not found", rating_id)))
    }
}

/// In-process account storage; enforces unique emails
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<IndexMap<Uuid, User>>,
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert_many(&self, users: Vec<User>) -> AppResult<Vec<User>> {
        let mut stored = self.users.write().await;
        for user in &users {
            if stored.values().any(|existing| existing.email == user.email) {
                return Err(AppError::InvalidInput(format!(
                    "Email already in use: {}",
                    user.email
                )));
            }
        }
        for user in &users {
            stored.insert(user.id, user.clone());
        }
        Ok(users)
    }

    async fn get_by_id(&self, user_id: Uuid) -> AppResult<User> {
        self.users
            .read()
            .await
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    async fn get_all(&self) -> AppResult<Vec<User>> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(AppError::NotFound(format!("User {} not found", user.id)));
        }
        if users
            .values()
            .any(|existing| existing.id != user.id && existing.email == user.email)
        {
            return Err(AppError::InvalidInput(format!(
                "Email already in use: {}",
                user.email
            )));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, user_id: Uuid) -> AppResult<()> {
        self.users
            .write()
            .await
            .shift_remove(&user_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }
}

/// In-process recommendation storage, one list per user
#[derive(Default)]
pub struct InMemoryRecommendationStore {
    recommendations: RwLock<IndexMap<Uuid, Recommendation>>,
}

#[async_trait]
impl RecommendationStore for InMemoryRecommendationStore {
    async fn upsert(&self, recommendation: Recommendation) -> AppResult<Recommendation> {
        self.recommendations
            .write()
            .await
            .insert(recommendation.user_id, recommendation.clone());
        Ok(recommendation)
    }

    async fn get_all(&self) -> AppResult<Vec<Recommendation>> {
        Ok(self
            .recommendations
            .read()
            .await
            .values()
            .cloned()
            .collect())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> AppResult<Recommendation> {
        self.recommendations
            .read()
            .await
            .get(&user_id)
            .cloned()
            .ok_or_else(|| {
                AppError::NotFound(format!("Recommendation for user {} not found", user_id))
            })
    }
}
