//! Utility functions and helpers.

pub mod http;

use url::form_urlencoded;

/// Accept a single path segment taken from user input.
///
/// Rejects empty names, `.`/`..`, and anything containing a separator or NUL.
pub fn validate_segment(segment: &str) -> Option<&str> {
    let invalid = segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\', '\0']);
    (!invalid).then_some(segment)
}

/// Join `/`-separated relative path segments, skipping empty ones.
pub fn join_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    segments
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Percent-encode a value for use in a query string.
pub fn encode_query_value(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Same-origin locator of a post served by the local API.
pub fn post_api_url(name: &str) -> String {
    format!("/api/post?name={}", encode_query_value(name))
}

/// Same-origin download link of a challenge's solution archive.
pub fn download_api_url(ctf: &str, name: &str) -> String {
    format!(
        "/api/download?ctf={}&name={}",
        encode_query_value(ctf),
        encode_query_value(name)
    )
}
