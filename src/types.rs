//! Request and result types for name resolution
//!
//! A `ResolveRequest` can only be built through validation, so every value
//! that reaches the resolver is a bare file name that cannot escape a root.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use strum::{Display, EnumString};

use crate::error::{ResolverError, Result};

/// Separators rejected on every platform, regardless of the host's own.
const SEPARATORS: [char; 2] = ['/', '\\'];

/// Why a requested name was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum NameRejection {
    #[strum(to_string = "name is empty")]
    Empty,
    #[strum(to_string = "name contains a path separator")]
    PathSeparator,
    #[strum(to_string = "name contains a parent-directory reference")]
    ParentReference,
    #[strum(to_string = "name refers to the current directory")]
    CurrentDirectory,
    #[strum(to_string = "name contains a NUL byte")]
    NulByte,
}

/// A validated file name to look up under each candidate root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolveRequest {
    file_name: String,
}

impl ResolveRequest {
    /// Validate `name` and wrap it.
    ///
    /// Rejects empty names, names containing `/` or `\`, any `..`, the name
    /// `.`, and NUL bytes. No filesystem access happens here.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        match check_name(&name) {
            Some(reason) => Err(ResolverError::invalid_name(name, reason)),
            None => Ok(Self { file_name: name }),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl fmt::Display for ResolveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name)
    }
}

fn check_name(name: &str) -> Option<NameRejection> {
    if name.is_empty() {
        Some(NameRejection::Empty)
    } else if name.contains(&SEPARATORS[..]) {
        Some(NameRejection::PathSeparator)
    } else if name.contains("..") {
        Some(NameRejection::ParentReference)
    } else if name == "." {
        Some(NameRejection::CurrentDirectory)
    } else if name.contains('\0') {
        Some(NameRejection::NulByte)
    } else {
        None
    }
}

/// Outcome of probing one root that did not produce a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProbeStatus {
    /// Nothing exists at `root/name`
    Absent,
    /// The candidate could not be checked (permission denied, I/O failure)
    AccessError,
}

/// Diagnostic record for one searched root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootProbe {
    pub root: PathBuf,
    pub status: ProbeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl RootProbe {
    pub fn absent(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            status: ProbeStatus::Absent,
            detail: None,
        }
    }

    pub fn access_error(root: &Path, detail: impl Into<String>) -> Self {
        Self {
            root: root.to_path_buf(),
            status: ProbeStatus::AccessError,
            detail: Some(detail.into()),
        }
    }
}

/// Result of resolving one name against the configured roots
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveResult {
    /// First existing match, as an absolute path
    Found { path: PathBuf, root: PathBuf },
    /// No root held the name; one probe per searched root, in search order
    NotFound { searched: Vec<RootProbe> },
}

impl ResolveResult {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Found { path, .. } => Some(path),
            Self::NotFound { .. } => None,
        }
    }

    /// Roots that were searched without a match, in search order
    pub fn searched_roots(&self) -> Vec<&Path> {
        match self {
            Self::Found { .. } => Vec::new(),
            Self::NotFound { searched } => searched.iter().map(|p| p.root.as_path()).collect(),
        }
    }
}

/// Where the active root list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum RootsSource {
    /// `--root` flags
    Cli,
    /// `ASSET_RESOLVER_ROOTS`
    Env,
    /// `--config` JSON file
    File,
    /// Built-in on-device default
    Default,
}
