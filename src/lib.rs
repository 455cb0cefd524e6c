//! Asset Resolver Library
//!
//! Resolves a logical file name to the first existing file across an ordered
//! list of local root directories, and exposes that lookup over a method
//! channel for host applications.

pub mod channel;
pub mod cli;
pub mod config;
pub mod config_file;
pub mod error;
pub mod logic;
pub mod types;

// Re-export main types for convenience
pub use channel::{MethodCall, MethodOutcome, MethodReply, ResolveResponse, ServeStats, serve};
pub use config::ResolverConfig;
pub use config_file::{ResolverConfigFile, RootsSelection, select_roots};
pub use error::ResolverError;
pub use logic::resolver::{FileProbe, Resolver, StdFileProbe, resolve, resolve_with};
pub use types::{NameRejection, ProbeStatus, ResolveRequest, ResolveResult, RootProbe, RootsSource};
