use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    /// The caller's message is missing fields or has a bad recipient.
    #[error("{0}")]
    InvalidMessage(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// SendGrid answered with a non-2xx status.
    #[error("SendGrid API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),
}

impl MailError {
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidMessage(_))
    }
}
