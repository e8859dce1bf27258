//! Place-search orchestration.

use futures::future::join_all;

use crate::address::is_address_like;
use crate::client::PlacesClient;
use crate::error::PlacesError;
use crate::geo::{rank_by_distance, retain_within_bounds};
use crate::normalize::dedupe_and_normalize;
use crate::types::{Coordinates, RawPlace, SearchLocation, SearchOutcome, SearchRequest};

pub const DEFAULT_RADIUS_METERS: u32 = 3000;

/// Largest radius the Places API accepts.
pub const MAX_RADIUS_METERS: u32 = 50_000;

/// Appended to the keyword to form one text search each.
pub const SEARCH_SUFFIXES: [&str; 5] = [
    "mental health",
    "psychologist",
    "counseling",
    "therapy",
    "psychiatrist",
];

/// Google place type used for the single category search.
pub const CATEGORY_PLACE_TYPE: &str = "health";

/// Run the full service search for one request.
///
/// 1. Geocode the keyword when it looks like an address (fatal on failure).
/// 2. Fan out every text-search variant plus the category search concurrently.
/// 3. Classify and de-duplicate the concatenated results in input order.
/// 4. Apply the bounds filter, if any.
/// 5. Rank by distance from the search origin.
///
/// # Errors
///
/// Returns [`PlacesError::AddressNotFound`] or a transport error from the
/// geocoding step. Failures of individual search variants are logged and
/// skipped; when every variant fails the outcome simply has no services.
pub async fn search_services(
    client: &PlacesClient,
    request: &SearchRequest,
) -> Result<SearchOutcome, PlacesError> {
    let (search_location, search_term) = if is_address_like(&request.keyword) {
        tracing::debug!(keyword = %request.keyword, "keyword looks like an address; geocoding");
        let geocoded = client.geocode(&request.keyword).await?;
        let location = SearchLocation {
            lat: geocoded.coordinates.lat,
            lng: geocoded.coordinates.lng,
            address: Some(request.keyword.clone()),
            formatted_address: geocoded.formatted_address,
        };
        (location, "")
    } else {
        let origin = resolve_origin(request)?;
        let location = SearchLocation {
            lat: origin.lat,
            lng: origin.lng,
            address: None,
            formatted_address: None,
        };
        (location, request.keyword.as_str())
    };

    let origin = search_location.coordinates();
    let radius = resolve_radius(request, search_location.address.is_some());

    let raw = fan_out(client, search_term, origin, radius).await;
    let raw_count = raw.len();

    let mut services = dedupe_and_normalize(&raw);
    if let Some(bounds) = &request.bounds {
        retain_within_bounds(&mut services, bounds);
    }
    rank_by_distance(&mut services, origin);

    tracing::info!(
        keyword = %request.keyword,
        raw_count,
        service_count = services.len(),
        radius,
        "service search complete"
    );

    Ok(SearchOutcome {
        services,
        search_location,
        search_radius: radius,
        bounds: request.bounds,
    })
}

/// Query strings for the text-search variants, in fixed order.
#[must_use]
pub fn query_variants(term: &str) -> Vec<String> {
    let term = term.trim();
    SEARCH_SUFFIXES
        .iter()
        .map(|suffix| {
            if term.is_empty() {
                (*suffix).to_string()
            } else {
                format!("{term} {suffix}")
            }
        })
        .collect()
}

/// User coordinates win over the bounds centre.
fn resolve_origin(request: &SearchRequest) -> Result<Coordinates, PlacesError> {
    request
        .origin
        .or_else(|| request.bounds.map(|b| b.center()))
        .ok_or_else(|| {
            PlacesError::InvalidRequest("Valid user coordinates or bounds are required".to_string())
        })
}

/// With bounds and no user coordinates, widen the radius to reach the corners.
///
/// A geocoded origin is not the bounds centre, so the requested radius stands.
fn resolve_radius(request: &SearchRequest, geocoded: bool) -> u32 {
    match (request.origin, request.bounds) {
        (None, Some(bounds)) if !geocoded => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let covering = bounds
                .half_diagonal_meters()
                .ceil()
                .min(f64::from(MAX_RADIUS_METERS)) as u32;
            request.radius_meters.max(covering)
        }
        _ => request.radius_meters,
    }
}

/// Issues every search concurrently and waits for all of them.
///
/// Results are concatenated in variant order with the category search last.
/// A failed variant contributes nothing.
async fn fan_out(
    client: &PlacesClient,
    term: &str,
    origin: Coordinates,
    radius: u32,
) -> Vec<RawPlace> {
    let variants = query_variants(term);
    let text_searches = variants.iter().map(|query| async move {
        (
            query.as_str(),
            client.text_search(query, origin, radius).await,
        )
    });

    let (text_results, category_result) = tokio::join!(
        join_all(text_searches),
        client.nearby_search(CATEGORY_PLACE_TYPE, origin, radius)
    );

    let mut raw = Vec::new();
    for (query, result) in text_results {
        match result {
            Ok(places) => {
                tracing::debug!(query, count = places.len(), "text search variant returned");
                raw.extend(places);
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "text search variant failed");
            }
        }
    }

    match category_result {
        Ok(places) => {
            tracing::debug!(
                place_type = CATEGORY_PLACE_TYPE,
                count = places.len(),
                "category search returned"
            );
            raw.extend(places);
        }
        Err(e) => {
            tracing::warn!(place_type = CATEGORY_PLACE_TYPE, error = %e, "category search failed");
        }
    }

    raw
}
