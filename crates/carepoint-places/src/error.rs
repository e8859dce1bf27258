use thiserror::Error;

/// Errors returned by the place-search pipeline and its Google Maps client.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// The caller's request is missing or has malformed fields.
    #[error("{0}")]
    InvalidRequest(String),

    /// The keyword looked like an address but the geocoder found no match.
    #[error("Could not find the address: {0}")]
    AddressNotFound(String),

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Google returned a status other than `OK`/`ZERO_RESULTS`.
    #[error("Google Maps API error {status}: {}", message.as_deref().unwrap_or("no message"))]
    Api {
        status: String,
        message: Option<String>,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),
}

impl PlacesError {
    /// `true` when the failure is the caller's to fix.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_) | Self::AddressNotFound(_))
    }
}
