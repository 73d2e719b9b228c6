use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::cached;
use crate::clients::CatalogClient;
use crate::db::{Cache, CacheKey, CacheNamespace, RecommendationStore, UserStore};
use crate::error::AppResult;
use crate::models::{Genre, Movie, Recommendation, RecommendedMovie, User};
use crate::services::bounded_call;
use crate::services::catalog::compare_scores_desc;
use crate::services::invalidation::{Invalidation, InvalidationCoordinator};

/// Builds ranked per-user recommendation lists from user preferences and the
/// live catalog.
///
/// A build run works on the user and catalog snapshots taken at call time;
/// mutations landing mid-run may or may not be reflected. Entries are stored
/// as denormalized snapshots, so a list goes stale the moment the catalog
/// changes.
#[derive(Clone)]
pub struct RecommendationService {
    store: Arc<dyn RecommendationStore>,
    users: Arc<dyn UserStore>,
    catalog: Arc<dyn CatalogClient>,
    cache: Cache,
    invalidation: InvalidationCoordinator,
    collaborator_timeout: Duration,
}

impl RecommendationService {
    pub fn new(
        store: Arc<dyn RecommendationStore>,
        users: Arc<dyn UserStore>,
        catalog: Arc<dyn CatalogClient>,
        cache: Cache,
        invalidation: InvalidationCoordinator,
        collaborator_timeout: Duration,
    ) -> Self {
        Self {
            store,
            users,
            catalog,
            cache,
            invalidation,
            collaborator_timeout,
        }
    }

    /// Regenerates the recommendation list of every user.
    ///
    /// Each user's previous list is replaced, not appended to. Users whose
    /// preferences match nothing still get a record with an empty list, and
    /// the result follows the order of the user snapshot.
    pub async fn build_for_all_users(&self) -> AppResult<Vec<Recommendation>> {
        let users = bounded_call(
            self.collaborator_timeout,
            "user snapshot fetch",
            self.users.get_all(),
        )
        .await?;

        let movies = bounded_call(
            self.collaborator_timeout,
            "catalog snapshot fetch",
            self.catalog.get_all(),
        )
        .await?;

        let mut built = Vec::with_capacity(users.len());
        for user in &users {
            let recommendation = Recommendation {
                user_id: user.id,
                recommended_movies: rank_matches(user, &movies),
                generated_at: Utc::now(),
            };
            built.push(self.store.upsert(recommendation).await?);
        }

        self.invalidation
            .apply(Invalidation::RecommendationRebuild {
                user_ids: built.iter().map(|rec| rec.user_id).collect(),
            })
            .await;

        tracing::info!(
            users = built.len(),
            catalog_size = movies.len(),
            "Recommendation lists rebuilt"
        );

        Ok(built)
    }

    pub async fn find_all(&self) -> AppResult<Vec<Recommendation>> {
        let key = CacheKey::whole(CacheNamespace::AllRecommendations);
        cached!(self.cache, key, async { self.store.get_all().await })
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> AppResult<Recommendation> {
        let key = CacheKey::keyed(CacheNamespace::RecommendationByUser, user_id);
        cached!(self.cache, key, async {
            self.store.find_by_user_id(user_id).await
        })
    }
}

/// Catalog entries matching the user's preferences, best score first.
///
/// The sort is stable: ties and unscored entries keep their catalog
/// snapshot order.
fn rank_matches(user: &User, movies: &[Movie]) -> Vec<RecommendedMovie> {
    let wanted: HashSet<Genre> = user
        .preferences
        .iter()
        .filter_map(|tag| tag.parse::<Genre>().ok())
        .collect();

    let mut matches: Vec<&Movie> = movies
        .iter()
        .filter(|movie| wanted.contains(&movie.genre))
        .collect();
    matches.sort_by(|a, b| compare_scores_desc(a.rating_average, b.rating_average));

    matches.into_iter().map(RecommendedMovie::from).collect()
}
