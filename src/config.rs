//! Resolver configuration
//!
//! Holds the ordered list of candidate roots. Where that list comes from
//! (flags, environment, config file, default) is handled in `config_file`.

use std::path::{Path, PathBuf};

use crate::error::{ResolverError, Result};

/// Ordered, immutable list of candidate root directories.
///
/// Order defines search priority: the first root is searched first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverConfig {
    roots: Vec<PathBuf>,
}

impl ResolverConfig {
    /// Build a configuration from roots in priority order.
    ///
    /// An empty list is valid and always resolves to `NotFound`. An empty or
    /// whitespace-only root entry is rejected since it would silently mean
    /// "current directory" (or a directory literally named with spaces).
    pub fn new<I, P>(roots: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let roots: Vec<PathBuf> = roots.into_iter().map(Into::into).collect();
        if let Some(idx) = roots.iter().position(|r| r.to_string_lossy().trim().is_empty()) {
            return Err(ResolverError::config(format!("root entry {} is empty", idx)));
        }
        Ok(Self { roots })
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.roots.iter().map(PathBuf::as_path)
    }
}
