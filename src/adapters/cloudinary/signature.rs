//! Request signing for the upload API.
//!
//! Parameters are sorted by name, joined as `key=value` pairs with `&`, the API secret is
//! appended, and the SHA-1 digest of the result is sent hex-encoded as `signature`.

use sha1::{Digest, Sha1};
use std::collections::BTreeMap;

/// Parameters that travel with the request but are never part of the signed string.
const UNSIGNED_PARAMS: &[&str] = &["file", "api_key", "resource_type", "cloud_name", "signature"];

pub fn string_to_sign(params: &BTreeMap<&str, String>) -> String {
    params
        .iter()
        .filter(|(key, value)| !UNSIGNED_PARAMS.contains(*key) && !value.is_empty())
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(string_to_sign(params).as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}
