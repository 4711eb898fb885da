//! RELEASES manifest rewriting
//!
//! A RELEASES file lists one package per line:
//!
//! ```text
//! <sha1> <file>.nupkg <size>
//! ```
//!
//! Package references are bare file names relative to the release. Clients
//! download them through this server, so they are replaced by absolute URLs.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// `<hash><sep><file>.nupkg<sep><size>`
static PACKAGE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^(\S+\s+)(\S+\.nupkg)(\s+\S+\s*)$")
        .case_insensitive(true)
        .build()
        .unwrap()
});

/// Replace every bare package reference with `url_for(file_name)`.
///
/// Hash and size fields, separators, line endings and non-package lines are kept as-is.
pub fn rewrite_manifest(manifest: &str, url_for: impl Fn(&str) -> String) -> String {
    manifest
        .split_inclusive('\n')
        .map(|line| {
            let (content, ending) = split_line_ending(line);

            match PACKAGE_LINE.captures(content) {
                Some(caps) if !caps[2].contains("://") => {
                    format!("{}{}{}{}", &caps[1], url_for(&caps[2]), &caps[3], ending)
                }
                _ => line.to_string(),
            }
        })
        .collect()
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "\n")
    } else {
        (line, "")
    }
}
