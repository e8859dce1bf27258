//! Input hygiene helpers shared by handlers that echo user text to third
//! parties.

use std::sync::LazyLock;

use regex::Regex;

/// Longest email address accepted by [`is_valid_email`].
pub const MAX_EMAIL_LEN: usize = 100;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static JS_SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript:").expect("valid scheme regex"));
static EVENT_HANDLER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)on\w+\s*=").expect("valid handler regex"));

/// Escape the characters that are significant in HTML text and attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            other => out.push(other),
        }
    }
    out
}

/// Strip markup, `javascript:` schemes and inline event handlers, then trim.
#[must_use]
pub fn sanitize_input(input: &str) -> String {
    let without_tags = TAG_RE.replace_all(input, "");
    let without_scheme = JS_SCHEME_RE.replace_all(&without_tags, "");
    let without_handlers = EVENT_HANDLER_RE.replace_all(&without_scheme, "");
    without_handlers.trim().to_string()
}

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LEN && EMAIL_RE.is_match(email)
}
