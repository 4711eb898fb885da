//! Semantic version parsing and ordering for release tags and client versions

use std::cmp::Ordering;

use semver::Version;

use crate::update::error::UpdateError;

/// Parse a version string, tolerating a single leading `v`.
///
/// The error carries the original, unstripped text.
///
/// Examples:
/// - "1.2.3" -> Version(1, 2, 3)
/// - "v1.2.3-beta.1" -> Version(1, 2, 3, pre: beta.1)
/// - "latest" -> InvalidVersion("latest")
pub fn parse_version(text: &str) -> Result<Version, UpdateError> {
    let stripped = text.strip_prefix('v').unwrap_or(text);
    Version::parse(stripped).map_err(|_| UpdateError::InvalidVersion(text.to_string()))
}

/// Compare by SemVer precedence: build metadata is ignored.
pub fn compare_precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre))
}

/// Whether `candidate` is strictly newer than `current`
pub fn is_newer(candidate: &Version, current: &Version) -> bool {
    compare_precedence(candidate, current) == Ordering::Greater
}
