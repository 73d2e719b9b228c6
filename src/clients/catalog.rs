use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use uuid::Uuid;

use crate::clients::CatalogClient;
use crate::error::{AppError, AppResult};
use crate::models::{Movie, ScoreUpdate};

/// HTTP client for a remotely-deployed catalog service.
///
/// Every request carries an explicit timeout; expiry and transport failures
/// surface as recoverable collaborator errors, not-found responses keep
/// their client-visible meaning.
pub struct HttpCatalogClient {
    http_client: HttpClient,
    base_url: String,
}

impl HttpCatalogClient {
    pub fn new(base_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        context: &str,
    ) -> AppResult<T> {
        if response.status() == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::NotFound(format!("{}: {}", context, body)));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Collaborator(format!(
                "{}: catalog service returned status {}: {}",
                context, status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Collaborator(format!("{}: {}", context, e)))
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn get_by_id(&self, movie_id: Uuid) -> AppResult<Movie> {
        let context = format!("catalog fetch for movie {}", movie_id);
        let url = format!("{}/catalog/{}", self.base_url, movie_id);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Collaborator(format!("{}: {}", context, e)))?;

        Self::decode(response, &context).await
    }

    async fn get_all(&self) -> AppResult<Vec<Movie>> {
        let url = format!("{}/catalog", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Collaborator(format!("catalog snapshot fetch: {}", e)))?;

        Self::decode(response, "catalog snapshot fetch").await
    }

    async fn update_score(&self, movie_id: Uuid, average: f64) -> AppResult<Movie> {
        let context = format!("score push for movie {}", movie_id);
        let url = format!("{}/catalog/score", self.base_url);
        let payload = ScoreUpdate {
            movie_id,
            rating_average: average,
        };

        let response = self
            .http_client
            .put(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Collaborator(format!("{}: {}", context, e)))?;

        Self::decode(response, &context).await
    }
}
