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
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub google_maps_api_key: Option<String>,
    pub sendgrid_api_key: Option<String>,
    pub sendgrid_sender: String,
    pub firestore_project_id: Option<String>,
    pub firestore_api_key: Option<String>,
    pub profile_max_retries: u32,
    pub profile_retry_backoff_ms: u64,
    /// Bearer tokens accepted by the protected routes.
    pub api_keys: Vec<String>,
    pub rate_limit_per_minute: usize,
}

impl AppConfig {
    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self.env, Environment::Development)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field(
                "google_maps_api_key",
                &self.google_maps_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "sendgrid_api_key",
                &self.sendgrid_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("sendgrid_sender", &self.sendgrid_sender)
            .field("firestore_project_id", &self.firestore_project_id)
            .field(
                "firestore_api_key",
                &self.firestore_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("profile_max_retries", &self.profile_max_retries)
            .field("profile_retry_backoff_ms", &self.profile_retry_backoff_ms)
            .field("api_keys", &format!("[{} redacted]", self.api_keys.len()))
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}
