use std::sync::Arc;

use cinerec::api::{create_router, AppState};
use cinerec::clients::{CatalogClient, HttpCatalogClient};
use cinerec::config::Config;
use cinerec::db::{
    create_redis_client, Cache, InMemoryCatalogStore, InMemoryRatingStore,
    InMemoryRecommendationStore, InMemoryUserStore, RedisBackend,
};
use cinerec::services::{
    CatalogService, InvalidationCoordinator, RatingService, RecommendationService, UserService,
    ViewResolver,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;

    // Derived-value cache, shared by every service
    let redis_client = create_redis_client(&config.redis_url)?;
    let cache = Cache::new(
        Arc::new(RedisBackend::new(redis_client)),
        config.cache_ttl_seconds,
    );
    let invalidation = InvalidationCoordinator::new(cache.clone());

    // Entity stores
    let rating_store = Arc::new(InMemoryRatingStore::default());
    let user_store = Arc::new(InMemoryUserStore::default());
    let recommendation_store = Arc::new(InMemoryRecommendationStore::default());

    let catalog = CatalogService::new(
        Arc::new(InMemoryCatalogStore::default()),
        cache.clone(),
        invalidation.clone(),
    );

    // The catalog collaborator is either the embedded service or a remote
    // deployment reached over HTTP
    let catalog_client: Arc<dyn CatalogClient> = match &config.catalog_service_url {
        Some(url) => {
            tracing::info!(url = %url, "Using remote catalog service");
            Arc::new(HttpCatalogClient::new(
                url.clone(),
                config.collaborator_timeout(),
            )?)
        }
        None => Arc::new(catalog.clone()),
    };

    let ratings = RatingService::new(
        rating_store,
        catalog_client.clone(),
        cache.clone(),
        invalidation.clone(),
        config.collaborator_timeout(),
    );

    let users = UserService::new(user_store.clone(), cache.clone(), invalidation.clone());

    let recommendations = RecommendationService::new(
        recommendation_store.clone(),
        user_store.clone(),
        catalog_client.clone(),
        cache.clone(),
        invalidation.clone(),
        config.collaborator_timeout(),
    );

    let views = ViewResolver::new(
        recommendation_store,
        user_store,
        catalog_client,
        config.collaborator_timeout(),
    );

    let state = AppState {
        catalog,
        ratings,
        users,
        recommendations,
        views,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
