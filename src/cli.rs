use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Asset Resolver - find a named asset across ordered local roots
#[derive(Parser, Debug)]
#[command(name = "asset-resolver")]
#[command(about = "Resolve a file name to its first match across ordered root directories")]
#[command(version)]
pub struct Cli {
    /// Candidate root directory, searched in the order given.
    ///
    /// Overrides ASSET_RESOLVER_ROOTS and --config when present.
    #[arg(short, long = "root", value_name = "DIR", global = true)]
    pub roots: Vec<PathBuf>,

    /// JSON configuration file with a "roots" list
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Log resolution details to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a file name and print its absolute path
    Resolve {
        /// File name to look up (no separators, no "..")
        name: String,
        /// Print {"found": .., "path": ..} instead of a bare path
        #[arg(long)]
        json: bool,
    },
    /// Serve line-delimited JSON method calls on stdin/stdout
    Serve,
    /// Show the effective roots in search order and where they came from
    Roots,
    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        file: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
