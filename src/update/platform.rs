//! Platform rules for selecting the downloadable asset of a release
//!
//! Rules are data: each supported platform maps to an ordered list of
//! [`AssetPredicate`]s plus the description shown when nothing matches.
//! Supporting another platform means registering another [`PlatformRule`].
//!
//! Built-in rules:
//! - darwin: `*{mac,darwin,osx}*.zip`, case-insensitive
//! - win32: name containing `win32-<arch>`, otherwise any `.exe`

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};

use crate::update::error::UpdateError;
use crate::update::types::Asset;

/// Target CPU architecture of the requesting client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Arch {
    #[default]
    X64,
    Ia32,
    Arm64,
}

impl Arch {
    pub const ALL: [Arch; 3] = [Arch::Ia32, Arch::X64, Arch::Arm64];

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::Ia32 => "ia32",
            Arch::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Arch::ALL
            .into_iter()
            .find(|arch| arch.as_str() == s)
            .ok_or_else(|| UpdateError::UnsupportedArch {
                arch: s.to_string(),
                supported: Arch::ALL.map(|arch| arch.as_str()).join(", "),
            })
    }
}

/// A single way an asset file name can satisfy a platform
#[derive(Debug, Clone)]
pub enum AssetPredicate {
    /// Case-insensitive glob supporting `*`, `?` and `{a,b}`
    Glob(Regex),
    /// Name contains `<prefix>-<arch>`
    ArchMarker(&'static str),
    /// Name ends with the suffix
    Suffix(&'static str),
}

impl AssetPredicate {
    pub fn glob(pattern: &str) -> Result<Self, regex::Error> {
        RegexBuilder::new(&glob_to_regex(pattern))
            .case_insensitive(true)
            .build()
            .map(AssetPredicate::Glob)
    }

    pub fn matches(&self, file_name: &str, arch: Arch) -> bool {
        match self {
            AssetPredicate::Glob(re) => re.is_match(file_name),
            AssetPredicate::ArchMarker(prefix) => {
                file_name.contains(&format!("{}-{}", prefix, arch))
            }
            AssetPredicate::Suffix(suffix) => file_name.ends_with(suffix),
        }
    }
}

/// Translate a glob into an anchored regular expression
fn glob_to_regex(pattern: &str) -> String {
    let mut re = String::from("^");
    let mut in_group = false;

    for c in pattern.chars() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            '{' => {
                in_group = true;
                re.push_str("(?:");
            }
            '}' if in_group => {
                in_group = false;
                re.push(')');
            }
            ',' if in_group => re.push('|'),
            other => re.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }

    re.push('$');
    re
}

/// Asset selection rule for one platform
#[derive(Debug, Clone)]
pub struct PlatformRule {
    predicates: Vec<AssetPredicate>,
    /// Expected asset pattern; `{arch}` is replaced by the requested architecture
    description: &'static str,
}

impl PlatformRule {
    pub fn new(predicates: Vec<AssetPredicate>, description: &'static str) -> Self {
        Self {
            predicates,
            description,
        }
    }

    /// Resolve the requested architecture; rules without an arch marker ignore it
    pub fn arch(&self, requested: Option<&str>) -> Result<Arch, UpdateError> {
        let uses_arch = self
            .predicates
            .iter()
            .any(|predicate| matches!(predicate, AssetPredicate::ArchMarker(_)));

        match requested {
            Some(text) if uses_arch => text.parse(),
            _ => Ok(Arch::default()),
        }
    }

    pub fn describe(&self, arch: Arch) -> String {
        self.description.replace("{arch}", arch.as_str())
    }

    /// First asset satisfying the earliest predicate, in the release's asset order
    pub fn select<'a>(&self, assets: &'a [Asset], arch: Arch) -> Option<&'a Asset> {
        self.predicates.iter().find_map(|predicate| {
            assets
                .iter()
                .find(|asset| predicate.matches(&asset.file_name, arch))
        })
    }
}

/// Registered platform rules in a stable order
#[derive(Debug, Clone)]
pub struct PlatformMatcher {
    rules: IndexMap<&'static str, PlatformRule>,
}

impl PlatformMatcher {
    pub fn new() -> Self {
        Self {
            rules: IndexMap::new(),
        }
    }

    pub fn with_rule(mut self, platform: &'static str, rule: PlatformRule) -> Self {
        self.rules.insert(platform, rule);
        self
    }

    /// Comma-separated list of supported platform keys
    pub fn supported(&self) -> String {
        self.rules.keys().copied().collect::<Vec<_>>().join(", ")
    }

    /// Looks up the rule registered for `platform`
    pub fn rule(&self, platform: &str) -> Result<&PlatformRule, UpdateError> {
        self.rules
            .get(platform)
            .ok_or_else(|| UpdateError::UnsupportedPlatform {
                platform: platform.to_string(),
                supported: self.supported(),
            })
    }

    /// Selects the asset of `assets` to serve for `platform`
    pub fn select<'a>(
        &self,
        platform: &str,
        arch: Arch,
        assets: &'a [Asset],
    ) -> Result<&'a Asset, UpdateError> {
        let rule = self.rule(platform)?;
        rule.select(assets, arch)
            .ok_or_else(|| UpdateError::NoMatchingAsset(rule.describe(arch)))
    }
}

impl Default for PlatformMatcher {
    fn default() -> Self {
        let darwin = AssetPredicate::glob("*{mac,darwin,osx}*.zip").expect("built-in glob is valid");

        Self::new()
            .with_rule(
                "darwin",
                PlatformRule::new(vec![darwin], "needs asset matching *{mac,darwin,osx}*.zip"),
            )
            .with_rule(
                "win32",
                PlatformRule::new(
                    vec![
                        AssetPredicate::ArchMarker("win32"),
                        AssetPredicate::Suffix(".exe"),
                    ],
                    "needs asset containing win32-{arch} or .exe",
                ),
            )
    }
}
