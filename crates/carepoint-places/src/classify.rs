//! Relevance filter and service-type classification for raw places.
//!
//! All matching is case-insensitive substring matching on the place name,
//! plus an allow-list check on Google's category tags. A name that matches
//! several keyword sets takes the first set in [`TYPE_RULES`] order.

use crate::types::{RawPlace, ServiceType};

/// Google place types treated as health services.
pub const HEALTH_PLACE_TYPES: &[&str] = &["health", "hospital", "doctor"];

/// Name fragments that mark a place as mental-health related.
pub const MENTAL_HEALTH_KEYWORDS: &[&str] = &[
    "mental",
    "psych",
    "counsel",
    "therap",
    "wellbeing",
    "well-being",
    "headspace",
    "lifeline",
    "beyond blue",
    "crisis",
    "anxiety",
    "depression",
    "trauma",
    "support",
];

/// Priority-ordered classification rules. `Support` is the fallback and has
/// no keywords of its own.
pub const TYPE_RULES: &[(ServiceType, &[&str])] = &[
    (
        ServiceType::Emergency,
        &["emergency", "crisis", "hospital", "lifeline", "24/7", "urgent"],
    ),
    (
        ServiceType::Counseling,
        &["counsel", "psycholog", "psychiatr"],
    ),
    (
        ServiceType::Therapy,
        &["therap", "rehab", "wellness", "wellbeing"],
    ),
    (
        ServiceType::Youth,
        &["youth", "headspace", "teen", "adolescent", "student", "kids"],
    ),
    (
        ServiceType::Education,
        &["education", "training", "school", "university", "college", "workshop"],
    ),
];

#[must_use]
pub fn is_health_type(place: &RawPlace) -> bool {
    place
        .types
        .iter()
        .any(|t| HEALTH_PLACE_TYPES.contains(&t.as_str()))
}

#[must_use]
pub fn has_mental_health_keyword(name: &str) -> bool {
    let lower = name.to_lowercase();
    MENTAL_HEALTH_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// A place is kept when it has a health category tag or a keyword match.
#[must_use]
pub fn is_relevant(place: &RawPlace) -> bool {
    is_health_type(place) || has_mental_health_keyword(&place.name)
}

/// Assigns exactly one service type from the place name.
#[must_use]
pub fn classify_service_type(name: &str) -> ServiceType {
    let lower = name.to_lowercase();
    TYPE_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map_or(ServiceType::Support, |(service_type, _)| *service_type)
}
