//! Decides whether a search keyword is a postal address that should be
//! geocoded into the search origin.

use std::sync::LazyLock;

use regex::Regex;

/// House number, optional street name words, then a street-type token.
static STREET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b\d+[a-z]?\s+(?:[a-z'.-]+\s+)*?(?:street|st|road|rd|avenue|ave|drive|dr|lane|ln|place|pl|court|ct|crescent|cres|parade|pde|terrace|tce|boulevard|blvd|highway|hwy|way|close|cl)\b",
    )
    .expect("valid street regex")
});

static POSTCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}\b").expect("valid postcode regex"));

/// Australian state and territory codes. Case-sensitive so ordinary words
/// such as "act" or "was" do not match.
static REGION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:NSW|VIC|QLD|SA|WA|TAS|NT|ACT)\b").expect("valid region regex")
});

/// Rules are evaluated in order; the first match decides.
static ADDRESS_RULES: LazyLock<[(&'static str, &'static Regex); 3]> = LazyLock::new(|| {
    [
        ("street", &*STREET_RE),
        ("postcode", &*POSTCODE_RE),
        ("region", &*REGION_RE),
    ]
});

/// Name of the first address rule that matches `query`, if any.
#[must_use]
pub fn matching_address_rule(query: &str) -> Option<&'static str> {
    ADDRESS_RULES
        .iter()
        .find(|(_, re)| re.is_match(query))
        .map(|(name, _)| *name)
}

/// `true` when `query` looks like a postal address.
#[must_use]
pub fn is_address_like(query: &str) -> bool {
    matching_address_rule(query).is_some()
}
