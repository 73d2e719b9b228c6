use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Genre, Movie};

/// Denormalized copy of catalog fields taken at generation time.
///
/// The copy goes stale the moment the catalog changes; readers that need
/// live fields must join back against the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedMovie {
    pub movie_id: Uuid,
    pub title: String,
    pub description: String,
    pub rating_average: Option<f64>,
    pub genre: Genre,
}

impl From<&Movie> for RecommendedMovie {
    fn from(movie: &Movie) -> Self {
        Self {
            movie_id: movie.id,
            title: movie.title.clone(),
            description: movie.description.clone(),
            rating_average: movie.rating_average,
            genre: movie.genre,
        }
    }
}

/// Ranked per-user recommendation list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub user_id: Uuid,
    pub recommended_movies: Vec<RecommendedMovie>,
    pub generated_at: DateTime<Utc>,
}
