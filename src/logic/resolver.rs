//! Named asset resolver
//!
//! Looks a validated file name up under each configured root in order and
//! returns the first existing match.
//!
//! # Design
//!
//! - **First match wins**: roots are probed in configured order; the search
//!   stops at the first hit
//! - **Read-only**: one metadata call per root, no opens, no writes
//! - **Errors don't abort**: a root that cannot be checked is recorded as
//!   `access_error` and the search moves on
//!
//! # Probe Classification
//!
//! | `io::ErrorKind`  | Recorded as |
//! |------------------|-------------|
//! | `NotFound`       | `absent` |
//! | `NotADirectory`  | `absent` |
//! | anything else    | `access_error` |

use std::io;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::ResolverConfig;
use crate::error::Result;
use crate::types::{ResolveRequest, ResolveResult, RootProbe};

/// Filesystem existence check used by the resolver.
///
/// # Contract
///
/// - `probe()` returns `Ok(())` if something exists at `candidate`.
/// - It returns the underlying `io::Error` otherwise; the resolver decides
///   whether the error means "absent" or "could not check".
///
/// # Invariants
///
/// - Implementations must not create, open, or modify anything.
pub trait FileProbe {
    fn probe(&self, candidate: &Path) -> io::Result<()>;
}

/// Probe backed by `std::fs::metadata` (follows symlinks)
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileProbe;

impl FileProbe for StdFileProbe {
    fn probe(&self, candidate: &Path) -> io::Result<()> {
        std::fs::metadata(candidate).map(|_| ())
    }
}

impl<P: FileProbe + ?Sized> FileProbe for &P {
    fn probe(&self, candidate: &Path) -> io::Result<()> {
        (**self).probe(candidate)
    }
}

/// Resolve `request` against `config` using the real filesystem.
pub fn resolve(request: &ResolveRequest, config: &ResolverConfig) -> ResolveResult {
    resolve_with(request, config, &StdFileProbe)
}

/// Resolve `request` against `config` with a caller-supplied probe.
pub fn resolve_with<P: FileProbe + ?Sized>(
    request: &ResolveRequest,
    config: &ResolverConfig,
    probe: &P,
) -> ResolveResult {
    let mut searched = Vec::with_capacity(config.roots().len());

    for root in config.iter() {
        let candidate = root.join(request.file_name());
        match probe.probe(&candidate) {
            Ok(()) => match std::path::absolute(&candidate) {
                Ok(path) => {
                    debug!("Resolved {} to {}", request, path.display());
                    return ResolveResult::Found {
                        path,
                        root: root.to_path_buf(),
                    };
                }
                Err(e) => {
                    warn!("Cannot make {} absolute: {}", candidate.display(), e);
                    searched.push(RootProbe::access_error(root, e.to_string()));
                }
            },
            Err(e) if is_absent(&e) => {
                debug!("{} not under {}", request, root.display());
                searched.push(RootProbe::absent(root));
            }
            Err(e) => {
                warn!("Cannot check {}: {}", candidate.display(), e);
                searched.push(RootProbe::access_error(root, e.to_string()));
            }
        }
    }

    debug!("{} not found in {} root(s)", request, searched.len());
    ResolveResult::NotFound { searched }
}

fn is_absent(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

/// A resolver bound to one configuration for the life of the process.
///
/// Holds no mutable state, so a shared reference can serve any number of
/// callers concurrently.
#[derive(Debug, Clone)]
pub struct Resolver<P = StdFileProbe> {
    config: ResolverConfig,
    probe: P,
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            probe: StdFileProbe,
        }
    }
}

impl<P: FileProbe> Resolver<P> {
    pub fn with_probe(config: ResolverConfig, probe: P) -> Self {
        Self { config, probe }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve an already-validated request
    pub fn resolve(&self, request: &ResolveRequest) -> ResolveResult {
        resolve_with(request, &self.config, &self.probe)
    }

    /// Validate `name`, then resolve it.
    ///
    /// Returns `InvalidName` without touching the filesystem if the name is
    /// rejected.
    pub fn resolve_name(&self, name: &str) -> Result<ResolveResult> {
        let request = ResolveRequest::new(name)?;
        Ok(self.resolve(&request))
    }
}

// Shared across threads without locking.
const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResolverConfig>();
    assert_send_sync::<Resolver>();
};
