//! Registered URI scheme allowlist.
//!
//! Intent filter schemes that appear on the official IANA URI scheme
//! registry are considered unproblematic; everything else is a custom
//! channel that any app could claim. Data is externalized to
//! `data/iana-schemes.json` and embedded at compile time via
//! `include_str!()`.

use serde::Deserialize;
use std::collections::HashSet;
use std::sync::LazyLock;

const SCHEMES_JSON: &str = include_str!("../data/iana-schemes.json");

/// JSON file wrapper.
#[derive(Debug, Deserialize)]
struct SchemeFile {
    schemes: Vec<String>,
}

static REGISTERED: LazyLock<HashSet<String>> = LazyLock::new(|| {
    let file: SchemeFile =
        serde_json::from_str(SCHEMES_JSON).expect("Failed to parse iana-schemes.json");
    file.schemes.into_iter().collect()
});

/// Check if a scheme is on the IANA registry.
///
/// Matching is exact: registry entries are lowercase, and a scheme
/// declared with different casing is treated as custom.
pub fn is_registered(scheme: &str) -> bool {
    REGISTERED.contains(scheme)
}
