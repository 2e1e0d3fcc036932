//! Numeric-segment version ordering.
//!
//! Versions are dot-separated runs of digits ("2", "2.4", "2.4.0.1"); missing
//! trailing segments count as zero, so "2.4" == "2.4.0". Anything else,
//! including pre-release suffixes and `v` prefixes, is not comparable.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareResult {
    Latest,
    Outdated,
    Newer,
    Invalid,
}

/// Parse a version string into its numeric segments.
///
/// Examples:
/// - "1" -> [1]
/// - "1.2.3" -> [1, 2, 3]
/// - "1.2.3-beta" -> None
pub fn parse_version(version: &str) -> Option<Vec<u64>> {
    let version = version.trim();
    if version.is_empty() {
        return None;
    }

    version
        .split('.')
        .map(|segment| {
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            segment.parse::<u64>().ok()
        })
        .collect()
}

fn compare_segments(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let left = a.get(i).copied().unwrap_or(0);
            let right = b.get(i).copied().unwrap_or(0);
            left.cmp(&right)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Compare the installed version against the version offered by the registry
pub fn compare_versions(current_version: &str, latest_version: &str) -> CompareResult {
    let (Some(current), Some(latest)) = (
        parse_version(current_version),
        parse_version(latest_version),
    ) else {
        return CompareResult::Invalid;
    };

    match compare_segments(&current, &latest) {
        Ordering::Less => CompareResult::Outdated,
        Ordering::Equal => CompareResult::Latest,
        Ordering::Greater => CompareResult::Newer,
    }
}

/// Whether `latest_version` is strictly newer than `current_version`.
/// Unparsable input is never newer.
pub fn is_newer(current_version: &str, latest_version: &str) -> bool {
    compare_versions(current_version, latest_version) == CompareResult::Outdated
}
