//! De-duplication and normalization of raw places into service records.

use std::collections::HashSet;

use crate::classify::{classify_service_type, is_relevant};
use crate::types::{RawPlace, ServiceRecord, ServiceType};

const MISSING_ADDRESS: &str = "Address not available";

/// Builds a [`ServiceRecord`] from one relevant place.
#[must_use]
pub fn normalize_place(place: &RawPlace) -> ServiceRecord {
    let service_type = classify_service_type(&place.name);
    let address = non_blank(place.formatted_address.as_deref())
        .or_else(|| non_blank(place.vicinity.as_deref()))
        .unwrap_or(MISSING_ADDRESS)
        .to_string();
    let phone = place
        .formatted_phone_number
        .clone()
        .or_else(|| place.international_phone_number.clone());

    ServiceRecord {
        id: place.place_id.clone(),
        name: place.name.clone(),
        service_type,
        category: service_type.label(),
        address,
        coordinates: place.geometry.location,
        phone,
        website: place.website.clone(),
        rating: place.rating.unwrap_or(0.0),
        is_emergency: service_type == ServiceType::Emergency,
        distance_km: None,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Single pass over `places` in input order.
///
/// The first occurrence of each `place_id` decides whether the id is kept;
/// later occurrences are skipped even when the first one was not relevant.
#[must_use]
pub fn dedupe_and_normalize(places: &[RawPlace]) -> Vec<ServiceRecord> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(places.len());
    let mut services = Vec::new();

    for place in places {
        if !seen.insert(place.place_id.as_str()) {
            continue;
        }
        if !is_relevant(place) {
            tracing::trace!(place_id = %place.place_id, name = %place.name, "dropping unrelated place");
            continue;
        }
        services.push(normalize_place(place));
    }

    services
}
