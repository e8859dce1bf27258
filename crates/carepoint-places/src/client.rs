//! HTTP client for the Google Maps Geocoding and Places web services.
//!
//! Wraps `reqwest` with API key handling and typed decoding of the
//! `{"status": ..., "results": [...]}` envelope. No retries: a failing call
//! is reported to the caller, which decides whether it is fatal.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::PlacesError;
use crate::types::{Coordinates, GeocodeResult, GeocodedAddress, RawPlace, StatusEnvelope};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/";

const GEOCODE_PATH: &str = "maps/api/geocode/json";
const TEXT_SEARCH_PATH: &str = "maps/api/place/textsearch/json";
const NEARBY_SEARCH_PATH: &str = "maps/api/place/nearbysearch/json";

const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

/// Client for the Google Maps web services.
///
/// Use [`PlacesClient::new`] for production or
/// [`PlacesClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl PlacesClient {
    /// Creates a client pointed at `maps.googleapis.com`.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`PlacesError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalised).map_err(|_| PlacesError::InvalidBaseUrl(base_url.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Geocodes a free-text address and returns the first match.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::AddressNotFound`] on any non-`OK` status or an empty
    ///   result set.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the body is not the expected shape.
    pub async fn geocode(&self, address: &str) -> Result<GeocodedAddress, PlacesError> {
        let url = self.build_url(GEOCODE_PATH, &[("address", address)])?;
        let envelope: StatusEnvelope<GeocodeResult> =
            self.request_json(&url, &format!("geocode(address={address})")).await?;

        if envelope.status != STATUS_OK {
            tracing::warn!(
                status = %envelope.status,
                message = envelope.error_message.as_deref().unwrap_or(""),
                "geocoder returned no usable match"
            );
            return Err(PlacesError::AddressNotFound(address.to_string()));
        }

        let first = envelope
            .results
            .into_iter()
            .next()
            .ok_or_else(|| PlacesError::AddressNotFound(address.to_string()))?;

        Ok(GeocodedAddress {
            coordinates: first.geometry.location,
            formatted_address: first.formatted_address,
        })
    }

    /// Runs a Places Text Search biased to `origin` within `radius_meters`.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Api`] on a status other than `OK`/`ZERO_RESULTS`.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the envelope is malformed.
    pub async fn text_search(
        &self,
        query: &str,
        origin: Coordinates,
        radius_meters: u32,
    ) -> Result<Vec<RawPlace>, PlacesError> {
        let location = format_location(origin);
        let radius = radius_meters.to_string();
        let url = self.build_url(
            TEXT_SEARCH_PATH,
            &[("query", query), ("location", &location), ("radius", &radius)],
        )?;
        self.search(&url, &format!("textsearch(query={query})"))
            .await
    }

    /// Runs a Places Nearby Search for one Google place type.
    ///
    /// # Errors
    ///
    /// Same as [`PlacesClient::text_search`].
    pub async fn nearby_search(
        &self,
        place_type: &str,
        origin: Coordinates,
        radius_meters: u32,
    ) -> Result<Vec<RawPlace>, PlacesError> {
        let location = format_location(origin);
        let radius = radius_meters.to_string();
        let url = self.build_url(
            NEARBY_SEARCH_PATH,
            &[("type", place_type), ("location", &location), ("radius", &radius)],
        )?;
        self.search(&url, &format!("nearbysearch(type={place_type})"))
            .await
    }

    /// Decodes a search envelope, skipping individual places that do not
    /// match [`RawPlace`].
    async fn search(&self, url: &Url, context: &str) -> Result<Vec<RawPlace>, PlacesError> {
        let envelope: StatusEnvelope<serde_json::Value> = self.request_json(url, context).await?;

        match envelope.status.as_str() {
            STATUS_OK => {}
            STATUS_ZERO_RESULTS => return Ok(Vec::new()),
            _ => {
                return Err(PlacesError::Api {
                    status: envelope.status,
                    message: envelope.error_message,
                })
            }
        }

        let places = envelope
            .results
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<RawPlace>(value) {
                Ok(place) => Some(place),
                Err(e) => {
                    tracing::debug!(context, error = %e, "skipping malformed place");
                    None
                }
            })
            .collect();
        Ok(places)
    }

    /// Builds the request URL with the API key and percent-encoded parameters.
    fn build_url(&self, path: &str, extra: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|_| PlacesError::InvalidBaseUrl(self.base_url.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// Sends a GET request, asserts a 2xx status, and decodes the body.
    ///
    /// `context` is used in error messages instead of the URL so the API key
    /// never ends up in logs.
    async fn request_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, PlacesError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let response = response
            .error_for_status()
            .map_err(reqwest::Error::without_url)?;
        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

fn format_location(origin: Coordinates) -> String {
    format!("{},{}", origin.lat, origin.lng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> PlacesClient {
        PlacesClient::with_base_url("test-key", 30, "carepoint-test", base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn build_url_appends_path_and_key() {
        let client = test_client("https://maps.example.com");
        let url = client
            .build_url(GEOCODE_PATH, &[("address", "1 Pitt St")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://maps.example.com/maps/api/geocode/json?address=1+Pitt+St&key=test-key"
        );
    }

    #[test]
    fn build_url_keeps_base_path_prefix() {
        let client = test_client("http://127.0.0.1:9999/proxy/");
        let url = client.build_url(TEXT_SEARCH_PATH, &[]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9999/proxy/maps/api/place/textsearch/json?key=test-key"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = PlacesClient::with_base_url("k", 5, "ua", "not a url").unwrap_err();
        assert!(matches!(err, PlacesError::InvalidBaseUrl(_)));
    }

    #[test]
    fn location_is_lat_comma_lng() {
        let s = format_location(Coordinates {
            lat: -33.5,
            lng: 151.25,
        });
        assert_eq!(s, "-33.5,151.25");
    }
}
