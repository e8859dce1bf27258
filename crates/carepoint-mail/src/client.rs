use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::MailError;
use crate::types::{EmailMessage, MailReceipt, SendGridPayload};

const DEFAULT_BASE_URL: &str = "https://api.sendgrid.com/";
const SEND_PATH: &str = "v3/mail/send";
const MESSAGE_ID_HEADER: &str = "x-message-id";

/// Longest slice of an error body kept in [`MailError::Api`].
const MAX_ERROR_BODY: usize = 512;

/// SendGrid v3 mail client. The sender address is fixed per client.
#[derive(Debug, Clone)]
pub struct SendGridClient {
    client: Client,
    api_key: String,
    sender: String,
    base_url: Url,
}

impl SendGridClient {
    /// # Errors
    ///
    /// Returns [`MailError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        api_key: &str,
        sender: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, MailError> {
        Self::with_base_url(api_key, sender, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`MailError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        sender: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, MailError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalised).map_err(|_| MailError::InvalidBaseUrl(base_url.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            sender: sender.to_owned(),
            base_url,
        })
    }

    #[must_use]
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Sends one message.
    ///
    /// # Errors
    ///
    /// - [`MailError::Http`] on network failure.
    /// - [`MailError::Api`] when SendGrid rejects the message.
    pub async fn send(&self, message: &EmailMessage) -> Result<MailReceipt, MailError> {
        let url = self
            .base_url
            .join(SEND_PATH)
            .map_err(|_| MailError::InvalidBaseUrl(self.base_url.to_string()))?;
        let payload = SendGridPayload::new(message, &self.sender);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            tracing::warn!(status = status.as_u16(), "sendgrid rejected message");
            return Err(MailError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let message_id = response
            .headers()
            .get(MESSAGE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        tracing::info!(
            message_id = message_id.as_deref().unwrap_or(""),
            has_attachment = message.attachment.is_some(),
            "email accepted by sendgrid"
        );

        Ok(MailReceipt { message_id })
    }
}
