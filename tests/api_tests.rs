use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use serde_json::json;

use cinerec::api::{create_router, AppState};
use cinerec::clients::CatalogClient;
use cinerec::db::{
    Cache, InMemoryBackend, InMemoryCatalogStore, InMemoryRatingStore,
    InMemoryRecommendationStore, InMemoryUserStore,
};
use cinerec::services::{
    CatalogService, InvalidationCoordinator, RatingService, RecommendationService, UserService,
    ViewResolver,
};

fn create_test_server() -> TestServer {
    let cache = Cache::new(Arc::new(InMemoryBackend::default()), 300);
    let invalidation = InvalidationCoordinator::new(cache.clone());
    let timeout = Duration::from_millis(500);

    let user_store = Arc::new(InMemoryUserStore::default());
    let recommendation_store = Arc::new(InMemoryRecommendationStore::default());

    let catalog = CatalogService::new(
        Arc::new(InMemoryCatalogStore::default()),
        cache.clone(),
        invalidation.clone(),
    );
    let catalog_client: Arc<dyn CatalogClient> = Arc::new(catalog.clone());

    let ratings = RatingService::new(
        Arc::new(InMemoryRatingStore::default()),
        catalog_client.clone(),
        cache.clone(),
        invalidation.clone(),
        timeout,
    );
    let users = UserService::new(user_store.clone(), cache.clone(), invalidation.clone());
    let recommendations = RecommendationService::new(
        recommendation_store.clone(),
        user_store.clone(),
        catalog_client.clone(),
        cache,
        invalidation,
        timeout,
    );
    let views = ViewResolver::new(recommendation_store, user_store, catalog_client, timeout);

    let state = AppState {
        catalog,
        ratings,
        users,
        recommendations,
        views,
    };

    TestServer::new(create_router(state)).unwrap()
}

async fn create_movie(server: &TestServer, title: &str, genre: &str) -> serde_json::Value {
    let response = server
        .post("/catalog")
        .json(&json!([{
            "title": title,
            "genre": genre,
            "release_year": 2020,
            "description": format!("{} description", title)
        }]))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let created: Vec<serde_json::Value> = response.json();
    created[0].clone()
}

async fn create_user(server: &TestServer, email: &str, preferences: &[&str]) -> serde_json::Value {
    let response = server
        .post("/users")
        .json(&json!([{
            "email": email,
            "preferences": preferences,
            "role": "user"
        }]))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let created: Vec<serde_json::Value> = response.json();
    created[0].clone()
}

async fn set_score(server: &TestServer, movie_id: &str, average: f64) {
    let response = server
        .put("/catalog/score")
        .json(&json!({
            "movie_id": movie_id,
            "rating_average": average
        }))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_create_and_get_movie() {
    let server = create_test_server();

    let movie = create_movie(&server, "Heat", "action").await;
    assert_eq!(movie["title"], "Heat");
    assert_eq!(movie["rating_average"], 0.0);

    let movie_id = movie["id"].as_str().unwrap();
    let response = server.get(&format!("/catalog/{}", movie_id)).await;
    response.assert_status_ok();
    let fetched: serde_json::Value = response.json();
    assert_eq!(fetched["title"], "Heat");

    let response = server.get("/catalog").await;
    response.assert_status_ok();
    let all: Vec<serde_json::Value> = response.json();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_create_movies_rejects_empty_batch() {
    let server = create_test_server();
    let response = server.post("/catalog").json(&json!([])).await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_missing_movie_returns_not_found() {
    let server = create_test_server();
    let response = server
        .get("/catalog/00000000-0000-0000-0000-000000000000")
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rating_submission_updates_catalog_average() {
    let server = create_test_server();
    let movie = create_movie(&server, "M1", "action").await;
    let movie_id = movie["id"].as_str().unwrap();
    let user = create_user(&server, "u1@example.com", &["ACTION"]).await;
    let user_id = user["id"].as_str().unwrap();

    // ratings of 3, 4, and 5 stars
    for score in ["three_stars", "four_stars"] {
        let response = server
            .post("/ratings/submit")
            .json(&json!({
                "movie_id": movie_id,
                "user_id": user_id,
                "score": score,
                "comment": null
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
    }

    let response = server
        .post("/ratings/submit")
        .json(&json!({
            "movie_id": movie_id,
            "user_id": user_id,
            "score": "five_stars",
            "comment": "great"
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let average: serde_json::Value = response.json();
    assert_eq!(average["average_score"], 4.0);

    // the catalog read path observes the pushed average
    let response = server.get(&format!("/catalog/{}", movie_id)).await;
    let fetched: serde_json::Value = response.json();
    assert_eq!(fetched["rating_average"], 4.0);
}

#[tokio::test]
async fn test_rating_delete_reaggregates() {
    let server = create_test_server();
    let movie = create_movie(&server, "M1", "action").await;
    let movie_id = movie["id"].as_str().unwrap();
    let user = create_user(&server, "u1@example.com", &["ACTION"]).await;
    let user_id = user["id"].as_str().unwrap();

    for score in ["one_star", "five_stars"] {
        server
            .post("/ratings/submit")
            .json(&json!({
                "movie_id": movie_id,
                "user_id": user_id,
                "score": score,
                "comment": null
            }))
            .await;
    }

    let response = server.get("/ratings").await;
    let ratings: Vec<serde_json::Value> = response.json();
    let one_star = ratings
        .iter()
        .find(|r| r["score"] == "one_star")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = server.delete(&format!("/ratings/{}", one_star)).await;
    response.assert_status(axum::http::StatusCode::NO_CONTENT);

    let response = server.get(&format!("/catalog/{}", movie_id)).await;
    let fetched: serde_json::Value = response.json();
    assert_eq!(fetched["rating_average"], 5.0);
}

#[tokio::test]
async fn test_create_user_with_unknown_preference_is_rejected() {
    let server = create_test_server();
    let response = server
        .post("/users")
        .json(&json!([{
            "email": "a@example.com",
            "preferences": ["WESTERN"],
            "role": "user"
        }]))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);

    // no side effect happened
    let response = server.get("/users").await;
    let users: Vec<serde_json::Value> = response.json();
    assert!(users.is_empty());
}

#[tokio::test]
async fn test_recommendation_flow_ranks_by_score() {
    let server = create_test_server();

    let m1 = create_movie(&server, "M1", "action").await;
    let m2 = create_movie(&server, "M2", "animation").await;
    let m3 = create_movie(&server, "M3", "drama").await;
    set_score(&server, m1["id"].as_str().unwrap(), 3.5).await;
    set_score(&server, m2["id"].as_str().unwrap(), 4.5).await;
    set_score(&server, m3["id"].as_str().unwrap(), 4.8).await;

    let u1 = create_user(&server, "u1@example.com", &["ACTION", "ANIMATION"]).await;
    let u1_id = u1["id"].as_str().unwrap();

    let response = server.post("/recommendations").await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let built: Vec<serde_json::Value> = response.json();
    assert_eq!(built.len(), 1);

    let response = server.get(&format!("/recommendations/user/{}", u1_id)).await;
    response.assert_status_ok();
    let recommendation: serde_json::Value = response.json();
    let titles: Vec<&str> = recommendation["recommended_movies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["M2", "M1"]);
}

#[tokio::test]
async fn test_rebuild_keeps_one_recommendation_per_user() {
    let server = create_test_server();
    create_movie(&server, "M1", "action").await;
    create_user(&server, "u1@example.com", &["ACTION"]).await;

    server.post("/recommendations").await;
    server.post("/recommendations").await;

    let response = server.get("/recommendations").await;
    let all: Vec<serde_json::Value> = response.json();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_users_by_recommended_movie() {
    let server = create_test_server();

    let m1 = create_movie(&server, "M1", "action").await;
    let m1_id = m1["id"].as_str().unwrap();
    set_score(&server, m1_id, 4.0).await;

    create_user(&server, "u1@example.com", &["ACTION"]).await;
    create_user(&server, "u2@example.com", &["DRAMA"]).await;
    server.post("/recommendations").await;

    let response = server
        .get(&format!("/recommendations/movie/{}/users", m1_id))
        .await;
    response.assert_status_ok();
    let users: Vec<serde_json::Value> = response.json();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "u1@example.com");
}

#[tokio::test]
async fn test_users_by_unreferenced_movie_is_not_found() {
    let server = create_test_server();
    create_movie(&server, "M1", "action").await;
    create_user(&server, "u1@example.com", &["DRAMA"]).await;
    server.post("/recommendations").await;

    // M9 exists nowhere in any recommendation list
    let response = server
        .get("/recommendations/movie/11111111-1111-1111-1111-111111111111/users")
        .await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_recommendations_by_min_score_uses_live_catalog() {
    let server = create_test_server();

    let m1 = create_movie(&server, "M1", "action").await;
    let m2 = create_movie(&server, "M2", "animation").await;
    let m3 = create_movie(&server, "M3", "drama").await;
    let m1_id = m1["id"].as_str().unwrap();
    let m2_id = m2["id"].as_str().unwrap();
    set_score(&server, m1_id, 3.5).await;
    set_score(&server, m2_id, 4.5).await;
    set_score(&server, m3["id"].as_str().unwrap(), 4.8).await;

    // u1's preferences cover M1 and M2 only; M3 stays unrecommended
    create_user(&server, "u1@example.com", &["ACTION", "ANIMATION"]).await;
    server.post("/recommendations").await;

    let response = server.get("/recommendations/score/4.0").await;
    response.assert_status_ok();
    let movies: Vec<serde_json::Value> = response.json();
    let titles: Vec<&str> = movies
        .iter()
        .map(|m| m["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["M2"]);

    // raising M1's live score pulls it into the view without a rebuild
    set_score(&server, m1_id, 4.2).await;
    let response = server.get("/recommendations/score/4.0").await;
    let movies: Vec<serde_json::Value> = response.json();
    assert_eq!(movies.len(), 2);

    // nothing qualifies at 5.0: empty list, not an error
    let response = server.get("/recommendations/score/5.0").await;
    response.assert_status_ok();
    let movies: Vec<serde_json::Value> = response.json();
    assert!(movies.is_empty());
}

#[tokio::test]
async fn test_top_movies_reflect_score_pushes() {
    let server = create_test_server();

    let m1 = create_movie(&server, "A", "action").await;
    let m2 = create_movie(&server, "B", "drama").await;
    let m3 = create_movie(&server, "C", "comedy").await;
    let m4 = create_movie(&server, "D", "horror").await;

    // warm the cached view, then push scores over it
    server.get("/catalog/top").await;

    set_score(&server, m1["id"].as_str().unwrap(), 2.0).await;
    set_score(&server, m2["id"].as_str().unwrap(), 4.8).await;
    set_score(&server, m3["id"].as_str().unwrap(), 3.9).await;
    set_score(&server, m4["id"].as_str().unwrap(), 4.1).await;

    let response = server.get("/catalog/top").await;
    response.assert_status_ok();
    let top: Vec<serde_json::Value> = response.json();
    let titles: Vec<&str> = top.iter().map(|m| m["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["B", "D", "C"]);
}

#[tokio::test]
async fn test_users_by_role_and_count() {
    let server = create_test_server();
    create_user(&server, "a@example.com", &[]).await;
    create_user(&server, "b@example.com", &[]).await;

    let response = server.get("/users/role/user").await;
    response.assert_status_ok();
    let users: Vec<serde_json::Value> = response.json();
    assert_eq!(users.len(), 2);

    let response = server.get("/users/role/admin").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);

    let response = server.get("/users/roles/count").await;
    response.assert_status_ok();
    let counts: Vec<serde_json::Value> = response.json();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0]["role"], "user");
    assert_eq!(counts[0]["amount"], 2);
}
