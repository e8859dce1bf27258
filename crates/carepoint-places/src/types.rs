//! Google Maps response types and the normalized service records built from
//! them.
//!
//! Google wraps every Places and Geocoding response in a `{"status": "OK",
//! "results": [...]}` envelope. Places that fail to deserialize on their own
//! are skipped by the client rather than failing the whole response.

use serde::{Deserialize, Serialize};

use crate::error::PlacesError;
use crate::pipeline::{DEFAULT_RADIUS_METERS, MAX_RADIUS_METERS};

// ---------------------------------------------------------------------------
// Google Maps wire types
// ---------------------------------------------------------------------------

/// Envelope shared by Text Search, Nearby Search and Geocoding responses.
#[derive(Debug, Deserialize)]
pub struct StatusEnvelope<T> {
    pub status: String,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Returns `None` unless both values are finite and on the globe.
    #[must_use]
    pub fn checked(lat: f64, lng: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        valid.then_some(Self { lat, lng })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceGeometry {
    pub location: Coordinates,
}

/// One place as returned by Text Search or Nearby Search.
///
/// Text Search fills `formatted_address`; Nearby Search fills `vicinity`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlace {
    pub place_id: String,
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
    pub geometry: PlaceGeometry,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub international_phone_number: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: Option<String>,
    pub geometry: PlaceGeometry,
}

/// The first geocoder match for an address-like keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedAddress {
    pub coordinates: Coordinates,
    pub formatted_address: Option<String>,
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A closed latitude/longitude rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// A validated search request.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub keyword: String,
    pub origin: Option<Coordinates>,
    pub radius_meters: u32,
    pub bounds: Option<Bounds>,
}

impl SearchRequest {
    /// Validates raw request fields.
    ///
    /// Coordinates count as present only when both are given and on the
    /// globe. The radius defaults to [`DEFAULT_RADIUS_METERS`] and is clamped
    /// to `1..=MAX_RADIUS_METERS`.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::InvalidRequest`] when the keyword is blank,
    /// when neither usable coordinates nor bounds are supplied, or when the
    /// bounds are inverted.
    pub fn new(
        keyword: Option<&str>,
        lat: Option<f64>,
        lng: Option<f64>,
        radius: Option<f64>,
        bounds: Option<Bounds>,
    ) -> Result<Self, PlacesError> {
        let keyword = keyword.map(str::trim).unwrap_or_default();
        if keyword.is_empty() {
            return Err(PlacesError::InvalidRequest(
                "Keyword is required".to_string(),
            ));
        }

        let origin = match (lat, lng) {
            (Some(lat), Some(lng)) => Coordinates::checked(lat, lng),
            _ => None,
        };

        if let Some(b) = bounds {
            if !b.is_valid() {
                return Err(PlacesError::InvalidRequest(
                    "Bounds must satisfy south <= north and west <= east".to_string(),
                ));
            }
        }

        if origin.is_none() && bounds.is_none() {
            return Err(PlacesError::InvalidRequest(
                "Valid user coordinates or bounds are required".to_string(),
            ));
        }

        let radius_meters = radius
            .filter(|r| r.is_finite() && *r > 0.0)
            .map_or(DEFAULT_RADIUS_METERS, |r| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let rounded = r.round().min(f64::from(MAX_RADIUS_METERS)) as u32;
                rounded.max(1)
            });

        Ok(Self {
            keyword: keyword.to_string(),
            origin,
            radius_meters,
            bounds,
        })
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Service subtype, in classification priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Emergency,
    Counseling,
    Therapy,
    Youth,
    Education,
    Support,
}

impl ServiceType {
    /// Display label shown alongside the service.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ServiceType::Emergency => "Emergency Services",
            ServiceType::Counseling => "Counseling & Psychology",
            ServiceType::Therapy => "Therapy Services",
            ServiceType::Youth => "Youth Services",
            ServiceType::Education => "Education & Training",
            ServiceType::Support => "Support Services",
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ServiceType::Emergency => "emergency",
            ServiceType::Counseling => "counseling",
            ServiceType::Therapy => "therapy",
            ServiceType::Youth => "youth",
            ServiceType::Education => "education",
            ServiceType::Support => "support",
        };
        f.write_str(name)
    }
}

/// A normalized, de-duplicated service location.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    /// Google `place_id`; the de-duplication key.
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub category: &'static str,
    pub address: String,
    pub coordinates: Coordinates,
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub rating: f64,
    pub is_emergency: bool,
    /// Set by the distance ranker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// Where the search was centred.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchLocation {
    pub lat: f64,
    pub lng: f64,
    /// The caller's keyword, when it was geocoded as an address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
}

impl SearchLocation {
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// Result of one [`crate::search_services`] call.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub services: Vec<ServiceRecord>,
    pub search_location: SearchLocation,
    pub search_radius: u32,
    pub bounds: Option<Bounds>,
}
