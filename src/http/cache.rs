//! HTTP cache validation module
//!
//! `ETag` generation and `If-None-Match` matching for downloads.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Strong `ETag` for a file body, e.g. `"1f40-9c2e0a1b7d3f4e21"`
///
/// The length prefix keeps tags of differently sized files apart even
/// when their hashes collide.
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}-{:x}\"", content.len(), hasher.finish())
}

/// Whether `If-None-Match` matches `etag` and a 304 should be sent
///
/// Accepts a list of tags, the `*` wildcard and weak (`W/`) tags, which
/// compare weakly as RFC 9110 requires for `If-None-Match`.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    let Some(header) = if_none_match else {
        return false;
    };
    let etag = etag.trim_start_matches("W/");
    header.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.trim_start_matches("W/") == etag
    })
}
