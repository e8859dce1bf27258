//! Mental-health service search over the Google Maps Places and Geocoding
//! APIs.
//!
//! [`search_services`] runs the whole request: optional geocoding of an
//! address-like keyword, a concurrent fan-out of text and category searches,
//! classification and de-duplication of the raw places, an optional bounds
//! filter, and a distance sort from the search origin.

pub mod address;
pub mod classify;
pub mod client;
pub mod error;
pub mod geo;
pub mod normalize;
pub mod pipeline;
pub mod types;

pub use address::is_address_like;
pub use client::PlacesClient;
pub use error::PlacesError;
pub use pipeline::{search_services, DEFAULT_RADIUS_METERS, MAX_RADIUS_METERS};
pub use types::{
    Bounds, Coordinates, GeocodedAddress, RawPlace, SearchLocation, SearchOutcome, SearchRequest,
    ServiceRecord, ServiceType,
};
