use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::clients::CatalogClient;
use crate::db::{RecommendationStore, UserStore};
use crate::error::{AppError, AppResult};
use crate::models::{Movie, User};
use crate::services::bounded_call;

/// Answers cross-entity queries by joining stored recommendation lists
/// against live catalog and user data.
///
/// Recommendation records contribute set membership only; every score,
/// title, or genre in a result comes from the current catalog, never from
/// the possibly-stale snapshots inside the lists. The join product is
/// recomputed on every call and never cached, so these reads never
/// invalidate anything.
#[derive(Clone)]
pub struct ViewResolver {
    recommendations: Arc<dyn RecommendationStore>,
    users: Arc<dyn UserStore>,
    catalog: Arc<dyn CatalogClient>,
    collaborator_timeout: Duration,
}

impl ViewResolver {
    pub fn new(
        recommendations: Arc<dyn RecommendationStore>,
        users: Arc<dyn UserStore>,
        catalog: Arc<dyn CatalogClient>,
        collaborator_timeout: Duration,
    ) -> Self {
        Self {
            recommendations,
            users,
            catalog,
            collaborator_timeout,
        }
    }

    /// Users whose recommendation list contains the movie.
    ///
    /// Fails with a not-found when no stored recommendation references the
    /// movie at all.
    pub async fn users_who_recommend(&self, movie_id: Uuid) -> AppResult<Vec<User>> {
        let recommendations = self.recommendations.get_all().await?;

        let recommenders: HashSet<Uuid> = recommendations
            .iter()
            .filter(|recommendation| {
                recommendation
                    .recommended_movies
                    .iter()
                    .any(|entry| entry.movie_id == movie_id)
            })
            .map(|recommendation| recommendation.user_id)
            .collect();

        if recommenders.is_empty() {
            return Err(AppError::NotFound(format!(
                "No recommendation references movie {}",
                movie_id
            )));
        }

        let users = bounded_call(
            self.collaborator_timeout,
            "user snapshot fetch",
            self.users.get_all(),
        )
        .await?;

        Ok(users
            .into_iter()
            .filter(|user| recommenders.contains(&user.id))
            .collect())
    }

    /// Recommended movies whose current catalog score is at least
    /// `min_score`.
    ///
    /// Unscored catalog entries never qualify. An empty result is a valid
    /// answer, not an error.
    pub async fn recommended_at_or_above(&self, min_score: f64) -> AppResult<Vec<Movie>> {
        let movies = bounded_call(
            self.collaborator_timeout,
            "catalog snapshot fetch",
            self.catalog.get_all(),
        )
        .await?;

        let qualifying: Vec<Movie> = movies
            .into_iter()
            .filter(|movie| {
                movie
                    .rating_average
                    .map(|score| score >= min_score)
                    .unwrap_or(false)
            })
            .collect();

        let recommended: HashSet<Uuid> = self
            .recommendations
            .get_all()
            .await?
            .iter()
            .flat_map(|recommendation| &recommendation.recommended_movies)
            .map(|entry| entry.movie_id)
            .collect();

        Ok(qualifying
            .into_iter()
            .filter(|movie| recommended.contains(&movie.id))
            .collect())
    }
}
