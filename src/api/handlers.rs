use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    Genre, Movie, MovieUpdate, NewMovie, NewRating, NewUser, Rating, RatingAverage, RatingUpdate,
    Recommendation, Role, RoleCount, ScoreUpdate, User, UserUpdate,
};

use super::AppState;

// Request types

/// Comma-separated genre filter, e.g. `?genres=action,comedy`
#[derive(Debug, Deserialize)]
pub struct GenreQuery {
    pub genres: String,
}

/// Comma-separated preference tags, e.g. `?tags=action,drama`
#[derive(Debug, Deserialize)]
pub struct PreferenceQuery {
    pub tags: String,
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

pub async fn get_catalog(State(state): State<AppState>) -> AppResult<Json<Vec<Movie>>> {
    Ok(Json(state.catalog.find_all().await?))
}

pub async fn create_movies(
    State(state): State<AppState>,
    Json(request): Json<Vec<NewMovie>>,
) -> AppResult<(StatusCode, Json<Vec<Movie>>)> {
    let created = state.catalog.create_movies(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<Uuid>,
) -> AppResult<Json<Movie>> {
    Ok(Json(state.catalog.find_by_id(movie_id).await?))
}

pub async fn update_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<Uuid>,
    Json(request): Json<MovieUpdate>,
) -> AppResult<Json<Movie>> {
    Ok(Json(state.catalog.update_movie(movie_id, request).await?))
}

pub async fn delete_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.catalog.delete_movie(movie_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn movie_by_title(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> AppResult<Json<Movie>> {
    Ok(Json(state.catalog.find_by_title(&title).await?))
}

pub async fn movies_by_genre(
    State(state): State<AppState>,
    Query(query): Query<GenreQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    let genres = split_csv(&query.genres)
        .iter()
        .map(|raw| raw.parse::<Genre>())
        .collect::<AppResult<Vec<Genre>>>()?;

    if genres.is_empty() {
        return Err(AppError::InvalidInput(
            "At least one genre is required".to_string(),
        ));
    }

    Ok(Json(state.catalog.find_by_genres(genres).await?))
}

pub async fn top_movies(State(state): State<AppState>) -> AppResult<Json<Vec<Movie>>> {
    Ok(Json(state.catalog.top_rated().await?))
}

/// Score push target used by the aggregation pipeline of a remote deployment
pub async fn update_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreUpdate>,
) -> AppResult<Json<Movie>> {
    Ok(Json(
        state
            .catalog
            .update_score(request.movie_id, request.rating_average)
            .await?,
    ))
}

pub async fn get_ratings(State(state): State<AppState>) -> AppResult<Json<Vec<Rating>>> {
    Ok(Json(state.ratings.find_all().await?))
}

pub async fn create_ratings(
    State(state): State<AppState>,
    Json(request): Json<Vec<NewRating>>,
) -> AppResult<(StatusCode, Json<Vec<Rating>>)> {
    let created = state.ratings.create_ratings(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Persists one rating and pushes the movie's fresh average to the catalog
pub async fn submit_rating(
    State(state): State<AppState>,
    Json(request): Json<NewRating>,
) -> AppResult<(StatusCode, Json<RatingAverage>)> {
    let average = state.ratings.submit_rating(request).await?;
    Ok((StatusCode::CREATED, Json(average)))
}

pub async fn get_rating(
    State(state): State<AppState>,
    Path(rating_id): Path<Uuid>,
) -> AppResult<Json<Rating>> {
    Ok(Json(state.ratings.find_by_id(rating_id).await?))
}

pub async fn ratings_by_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<Uuid>,
) -> AppResult<Json<Vec<Rating>>> {
    Ok(Json(state.ratings.find_by_movie(movie_id).await?))
}

/// Re-runs aggregation for a movie without submitting a new rating
pub async fn aggregate_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<Uuid>,
) -> AppResult<Json<RatingAverage>> {
    let average_score = state.ratings.aggregate_for_movie(movie_id).await?;
    Ok(Json(RatingAverage {
        movie_id,
        average_score,
    }))
}

pub async fn update_rating(
    State(state): State<AppState>,
    Path(rating_id): Path<Uuid>,
    Json(request): Json<RatingUpdate>,
) -> AppResult<Json<Rating>> {
    Ok(Json(state.ratings.update_rating(rating_id, request).await?))
}

pub async fn delete_rating(
    State(state): State<AppState>,
    Path(rating_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.ratings.delete_rating(rating_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.find_all().await?))
}

pub async fn create_users(
    State(state): State<AppState>,
    Json(request): Json<Vec<NewUser>>,
) -> AppResult<(StatusCode, Json<Vec<User>>)> {
    let created = state.users.create_users(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.find_by_id(user_id).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UserUpdate>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.update_user(user_id, request).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.users.delete_user(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn users_by_role(
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> AppResult<Json<Vec<User>>> {
    let role = role.parse::<Role>()?;
    Ok(Json(state.users.find_by_role(role).await?))
}

pub async fn users_by_preferences(
    State(state): State<AppState>,
    Query(query): Query<PreferenceQuery>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(
        state.users.find_by_preferences(split_csv(&query.tags)).await?,
    ))
}

pub async fn count_users_by_role(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<RoleCount>>> {
    Ok(Json(state.users.count_by_role().await?))
}

pub async fn get_recommendations(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Recommendation>>> {
    Ok(Json(state.recommendations.find_all().await?))
}

/// Regenerates every user's recommendation list from the live catalog
pub async fn build_recommendations(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<Vec<Recommendation>>)> {
    let built = state.recommendations.build_for_all_users().await?;
    Ok((StatusCode::CREATED, Json(built)))
}

pub async fn recommendation_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Recommendation>> {
    Ok(Json(state.recommendations.find_by_user(user_id).await?))
}

pub async fn users_by_recommended_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<Uuid>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.views.users_who_recommend(movie_id).await?))
}

pub async fn recommendations_by_min_score(
    State(state): State<AppState>,
    Path(min_score): Path<f64>,
) -> AppResult<Json<Vec<Movie>>> {
    Ok(Json(state.views.recommended_at_or_above(min_score).await?))
}
