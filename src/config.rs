use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Redis connection URL for the derived-value cache
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Base URL of a remote catalog service; when unset the embedded
    /// catalog collection is used
    #[serde(default)]
    pub catalog_service_url: Option<String>,

    /// Lifetime of cached derived values, in seconds
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,

    /// Upper bound for a single collaborator call, in milliseconds
    #[serde(default = "default_collaborator_timeout_ms")]
    pub collaborator_timeout_ms: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_cache_ttl_seconds() -> u64 {
    300
}

fn default_collaborator_timeout_ms() -> u64 {
    2000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Collaborator timeout as a [`std::time::Duration`]
    pub fn collaborator_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.collaborator_timeout_ms)
    }
}
