use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Catalog
        .route("/catalog", get(handlers::get_catalog))
        .route("/catalog", post(handlers::create_movies))
        .route("/catalog/top", get(handlers::top_movies))
        .route("/catalog/genre", get(handlers::movies_by_genre))
        .route("/catalog/title/:title", get(handlers::movie_by_title))
        .route("/catalog/score", put(handlers::update_score))
        .route("/catalog/:movie_id", get(handlers::get_movie))
        .route("/catalog/:movie_id", put(handlers::update_movie))
        .route("/catalog/:movie_id", delete(handlers::delete_movie))
        // Ratings
        .route("/ratings", get(handlers::get_ratings))
        .route("/ratings", post(handlers::create_ratings))
        .route("/ratings/submit", post(handlers::submit_rating))
        .route("/ratings/movie/:movie_id", get(handlers::ratings_by_movie))
        .route(
            "/ratings/movie/:movie_id/aggregate",
            post(handlers::aggregate_movie),
        )
        .route("/ratings/:rating_id", get(handlers::get_rating))
        .route("/ratings/:rating_id", put(handlers::update_rating))
        .route("/ratings/:rating_id", delete(handlers::delete_rating))
        // Users
        .route("/users", get(handlers::get_users))
        .route("/users", post(handlers::create_users))
        .route("/users/roles/count", get(handlers::count_users_by_role))
        .route("/users/role/:role", get(handlers::users_by_role))
        .route("/users/preferences", get(handlers::users_by_preferences))
        .route("/users/:user_id", get(handlers::get_user))
        .route("/users/:user_id", put(handlers::update_user))
        .route("/users/:user_id", delete(handlers::delete_user))
        // Recommendations
        .route("/recommendations", get(handlers::get_recommendations))
        .route("/recommendations", post(handlers::build_recommendations))
        .route(
            "/recommendations/user/:user_id",
            get(handlers::recommendation_by_user),
        )
        .route(
            "/recommendations/movie/:movie_id/users",
            get(handlers::users_by_recommended_movie),
        )
        .route(
            "/recommendations/score/:min_score",
            get(handlers::recommendations_by_min_score),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
