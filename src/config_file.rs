//! Configuration file handling and root-list selection.
//!
//! The active root list is taken from the first source that provides one:
//!
//! 1. `--root` flags
//! 2. `ASSET_RESOLVER_ROOTS` environment variable (platform path list)
//! 3. `--config` JSON file
//! 4. The built-in on-device default

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::ResolverConfig;
use crate::types::RootsSource;

/// Environment variable holding a platform path list of roots
pub const ROOTS_ENV_VAR: &str = "ASSET_RESOLVER_ROOTS";

/// Location assets are pushed to with `adb push` on Android devices
pub const DEFAULT_ROOTS: &[&str] = &["/data/local/tmp/"];

/// Resolver configuration that can be saved/loaded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfigFile {
    /// Candidate roots in search order
    pub roots: Vec<String>,
}

impl ResolverConfigFile {
    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;

        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Applies the same root rules as `ResolverConfig::new`, so a value is
    /// accepted or rejected the same way from a file, a flag, or the env var.
    pub fn validate(&self) -> Result<()> {
        self.to_resolver_config().map(|_| ())
    }

    /// Convert into an immutable resolver configuration
    pub fn to_resolver_config(&self) -> Result<ResolverConfig> {
        Ok(ResolverConfig::new(&self.roots)?)
    }
}

/// The root list in effect and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootsSelection {
    pub config: ResolverConfig,
    pub source: RootsSource,
}

/// Select roots using the process environment for `ASSET_RESOLVER_ROOTS`.
pub fn select_roots(cli_roots: &[PathBuf], config_path: Option<&Path>) -> Result<RootsSelection> {
    select_roots_with_env(cli_roots, env::var_os(ROOTS_ENV_VAR), config_path)
}

/// Select roots with an explicit value standing in for `ASSET_RESOLVER_ROOTS`.
///
/// A blank env value is ignored, as are empty or whitespace-only entries
/// inside it. The config
/// file is only read when neither flags nor the env var supply roots.
pub fn select_roots_with_env(
    cli_roots: &[PathBuf],
    env_value: Option<OsString>,
    config_path: Option<&Path>,
) -> Result<RootsSelection> {
    if !cli_roots.is_empty() {
        debug!("Using {} root(s) from command line", cli_roots.len());
        return Ok(RootsSelection {
            config: ResolverConfig::new(cli_roots.iter().cloned())?,
            source: RootsSource::Cli,
        });
    }

    if let Some(value) = env_value {
        let roots: Vec<PathBuf> = env::split_paths(&value)
            .filter(|p| !p.to_string_lossy().trim().is_empty())
            .collect();
        if !roots.is_empty() {
            debug!("Using {} root(s) from {}", roots.len(), ROOTS_ENV_VAR);
            return Ok(RootsSelection {
                config: ResolverConfig::new(roots)?,
                source: RootsSource::Env,
            });
        }
    }

    if let Some(path) = config_path {
        let file = ResolverConfigFile::load_from_file(path)?;
        let config = file
            .to_resolver_config()
            .with_context(|| format!("Invalid configuration in {:?}", path))?;
        debug!("Using {} root(s) from {:?}", config.roots().len(), path);
        return Ok(RootsSelection {
            config,
            source: RootsSource::File,
        });
    }

    Ok(RootsSelection {
        config: ResolverConfig::new(DEFAULT_ROOTS.iter().copied())?,
        source: RootsSource::Default,
    })
}
