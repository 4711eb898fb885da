//! Common types shared by the update engine

use std::fmt;

use serde::{Deserialize, Serialize};

/// Repository identifier (`owner/name`), case-sensitive
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryId {
    pub owner: String,
    pub name: String,
}

impl RepositoryId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Cache key for the release list of this repository
    pub fn releases_key(&self) -> String {
        format!("releases:{}", self)
    }

    /// Cache key for the RELEASES manifest published under `tag`
    pub fn manifest_key(&self, tag: &str) -> String {
        format!("manifest:{}@{}", self, tag)
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A single downloadable file attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(rename = "name")]
    pub file_name: String,
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

/// A tagged release as reported by the upstream releases API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    #[serde(rename = "tag_name")]
    pub tag: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(rename = "body", default, deserialize_with = "null_as_empty")]
    pub notes: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// The upstream API reports missing names and bodies as `null`
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Update information returned to a client that is behind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Update {
    pub name: String,
    pub url: String,
    pub notes: String,
}

/// Outcome of an update check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateDecision {
    /// A newer release exists with an asset for the requested platform
    Available(Update),
    /// The client already runs the latest release
    UpToDate,
}
