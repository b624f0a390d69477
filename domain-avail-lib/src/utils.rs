//! Utility functions for name normalisation and batching.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // One DNS label: letters, digits and inner hyphens, at most 63 chars
    static ref LABEL_RE: Regex = Regex::new(r"^[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?$")
        .expect("label pattern is valid");
}

/// Split items into consecutive groups of at most `size` elements.
///
/// A `size` of zero is treated as one.
pub fn chunks<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    items.chunks(size.max(1)).map(|c| c.to_vec()).collect()
}

/// Check whether a base name is a single valid DNS label.
pub fn is_valid_label(name: &str) -> bool {
    LABEL_RE.is_match(name)
}

/// Clean up candidate names for one TLD.
///
/// Names are trimmed and lower-cased, a trailing `.{tld}` is stripped,
/// duplicates are removed keeping first occurrence, and names that are not
/// a valid label are dropped with a warning.
pub fn normalize_names(names: &[String], tld: &str) -> Vec<String> {
    let suffix = format!(".{}", tld.trim_start_matches('.').to_lowercase());
    let mut results: Vec<String> = Vec::new();

    for raw in names {
        let lowered = raw.trim().to_lowercase();
        if lowered.is_empty() {
            continue;
        }

        let name = lowered.strip_suffix(&suffix).unwrap_or(&lowered);
        if !is_valid_label(name) {
            tracing::warn!(name = %raw, tld, "dropping invalid domain name");
            continue;
        }
        if !results.iter().any(|existing| existing == name) {
            results.push(name.to_string());
        }
    }

    results
}
