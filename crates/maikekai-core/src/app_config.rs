use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Place identifier the external reviews provider is queried with.
    pub google_place_id: Option<String>,
    /// Provider credential. Only the proxy endpoint reads this.
    pub google_places_api_key: Option<String>,
    /// Base URL of the server-side intermediary that injects the credential.
    pub reviews_proxy_url: String,
    pub http_timeout_secs: u64,
    pub review_cache_ttl_secs: u64,
    pub carousel_interval_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("google_place_id", &self.google_place_id)
            .field(
                "google_places_api_key",
                &self.google_places_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("reviews_proxy_url", &self.reviews_proxy_url)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("review_cache_ttl_secs", &self.review_cache_ttl_secs)
            .field("carousel_interval_ms", &self.carousel_interval_ms)
            .finish()
    }
}
