use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid user id: {0}")]
    InvalidUserId(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),
}
