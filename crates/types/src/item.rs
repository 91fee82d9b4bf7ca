//! Resolvable items as seen by the bridge

use crate::{Edition, ResolvableKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of an item in the engine pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub usize);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Session-local numeric repository id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoId(pub i64);

impl RepoId {
    /// Id passed to handlers when an item has no known repository.
    pub const UNKNOWN: i64 = -1;
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchCategory {
    Security,
    Recommended,
    Optional,
    Feature,
    Other,
}

/// Patch-specific attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchInfo {
    pub category: PatchCategory,
    /// The patch applies to the system and is not yet installed.
    pub needed: bool,
    pub interactive: bool,
    pub reboot_needed: bool,
    pub affects_pkg_manager: bool,
}

/// One installable or installed instance of a resolvable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvableItem {
    pub kind: ResolvableKind,
    pub name: String,
    pub edition: Edition,
    pub arch: String,
    pub summary: String,
    /// Present on the target system (as opposed to offered by a repository).
    pub installed: bool,
    pub repo: Option<RepoId>,
    /// Medium number within the repository, starting at 1.
    pub medium: u32,
    /// File name relative to the repository medium.
    pub location: String,
    pub download_size: u64,
    pub install_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<PatchInfo>,
}

impl ResolvableItem {
    /// Minimal item with empty metadata; mostly useful to engines and tests.
    #[must_use]
    pub fn new(kind: ResolvableKind, name: impl Into<String>, edition: &str) -> Self {
        Self {
            kind,
            name: name.into(),
            edition: Edition::parse(edition),
            arch: "noarch".to_string(),
            summary: String::new(),
            installed: false,
            repo: None,
            medium: 1,
            location: String::new(),
            download_size: 0,
            install_size: 0,
            patch: None,
        }
    }

    #[must_use]
    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = arch.into();
        self
    }

    #[must_use]
    pub fn installed(mut self) -> Self {
        self.installed = true;
        self.repo = None;
        self
    }

    #[must_use]
    pub fn from_repo(mut self, repo: RepoId, medium: u32) -> Self {
        self.installed = false;
        self.repo = Some(repo);
        self.medium = medium;
        self
    }

    #[must_use]
    pub fn with_patch(mut self, patch: PatchInfo) -> Self {
        self.patch = Some(patch);
        self
    }

    /// File name part of the location, as shown to handlers.
    #[must_use]
    pub fn location_filename(&self) -> &str {
        self.location
            .rsplit('/')
            .next()
            .unwrap_or(self.location.as_str())
    }
}
