//! Minimal Firestore REST client for reading user profile documents.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::SessionError;
use crate::profile::{FirestoreDocument, UserProfile};

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/";
const USERS_COLLECTION: &str = "users";

/// Firestore document ids are at most 1500 bytes; auth uids are far shorter.
const MAX_USER_ID_LEN: usize = 128;

#[derive(Debug, Clone)]
pub struct FirestoreClient {
    client: Client,
    project_id: String,
    api_key: Option<String>,
    base_url: Url,
}

impl FirestoreClient {
    /// # Errors
    ///
    /// Returns [`SessionError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        project_id: &str,
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, SessionError> {
        Self::with_base_url(project_id, api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`SessionError::InvalidBaseUrl`] if `base_url` does not
    /// parse or cannot carry a path.
    pub fn with_base_url(
        project_id: &str,
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, SessionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised)
            .map_err(|_| SessionError::InvalidBaseUrl(base_url.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(SessionError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self {
            client,
            project_id: project_id.to_owned(),
            api_key: api_key.map(str::to_owned),
            base_url: parsed,
        })
    }

    /// Fetches `users/{uid}`. A missing document is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidUserId`] if `uid` is not a usable document id.
    /// - [`SessionError::Http`] on network failure or a non-2xx status other
    ///   than 404.
    /// - [`SessionError::Deserialize`] if the document is malformed.
    pub async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, SessionError> {
        validate_user_id(uid)?;
        let url = self.document_url(uid)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(uid, "no profile document");
            return Ok(None);
        }

        let response = response
            .error_for_status()
            .map_err(reqwest::Error::without_url)?;
        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        let doc: FirestoreDocument =
            serde_json::from_str(&body).map_err(|e| SessionError::Deserialize {
                context: format!("users/{uid}"),
                source: e,
            })?;

        Ok(Some(UserProfile::from_document(&doc)))
    }

    fn document_url(&self, uid: &str) -> Result<Url, SessionError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| SessionError::InvalidBaseUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().extend([
                "v1",
                "projects",
                self.project_id.as_str(),
                "databases",
                "(default)",
                "documents",
                USERS_COLLECTION,
                uid,
            ]);
        }
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }
}

/// Rejects ids that would escape the `users` collection or are not valid
/// document ids.
pub(crate) fn validate_user_id(uid: &str) -> Result<(), SessionError> {
    let valid = !uid.is_empty()
        && uid.len() <= MAX_USER_ID_LEN
        && uid != "."
        && uid != ".."
        && !uid.contains('/')
        && !uid.chars().any(char::is_control);
    if valid {
        Ok(())
    } else {
        Err(SessionError::InvalidUserId(uid.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_url_has_project_and_key() {
        let client =
            FirestoreClient::with_base_url("demo", Some("fb-key"), 5, "ua", "https://fs.example.com")
                .unwrap();
        let url = client.document_url("abc123").unwrap();
        assert_eq!(
            url.as_str(),
            "https://fs.example.com/v1/projects/demo/databases/(default)/documents/users/abc123?key=fb-key"
        );
    }

    #[test]
    fn document_url_without_key_has_no_query() {
        let client =
            FirestoreClient::with_base_url("demo", None, 5, "ua", "http://127.0.0.1:1/proxy")
                .unwrap();
        let url = client.document_url("u1").unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:1/proxy/v1/projects/demo/databases/(default)/documents/users/u1"
        );
    }

    #[test]
    fn user_id_validation() {
        assert!(validate_user_id("Xy12AbCd").is_ok());
        assert!(validate_user_id("").is_err());
        assert!(validate_user_id("..").is_err());
        assert!(validate_user_id("a/b").is_err());
        assert!(validate_user_id(&"x".repeat(MAX_USER_ID_LEN + 1)).is_err());
    }
}
