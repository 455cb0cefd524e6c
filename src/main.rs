//! Asset Resolver - Main entry point
//!
//! Thin binding of the resolver library to a command line and to a
//! line-delimited JSON channel on stdin/stdout.

use std::io::{self, BufWriter};

use anyhow::{Context, Result};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use asset_resolver::channel::{self, ResolveResponse};
use asset_resolver::cli::{Cli, Commands};
use asset_resolver::config_file::{self, ResolverConfigFile};
use asset_resolver::{ResolveResult, Resolver, ResolverError};

/// Exit code for a valid name with no match
const EXIT_NOT_FOUND: i32 = 1;
/// Exit code for a rejected name
const EXIT_INVALID_NAME: i32 = 2;

/// Initialize the logger with appropriate settings
///
/// Logs go to stderr; stdout carries command output and channel replies.
fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main application entry point
fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logger(cli.verbose);
    debug!("CLI arguments parsed: {:?}", cli);

    match cli.command {
        Commands::Validate { ref file } => {
            info!("Validating configuration file: {:?}", file);
            let result = ResolverConfigFile::load_from_file(file).and_then(|c| c.validate());
            match result {
                Ok(()) => println!("✓ Configuration file is valid: {}", file.display()),
                Err(e) => {
                    error!("Configuration validation failed: {:#}", e);
                    eprintln!("✗ Configuration validation failed: {:#}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Roots => {
            let selection = config_file::select_roots(&cli.roots, cli.config.as_deref())?;
            println!("# source: {}", selection.source);
            for root in selection.config.iter() {
                println!("{}", root.display());
            }
        }
        Commands::Resolve { ref name, json } => {
            let selection = config_file::select_roots(&cli.roots, cli.config.as_deref())?;
            info!(
                "Resolving {:?} across {} root(s) from {}",
                name,
                selection.config.roots().len(),
                selection.source
            );
            let resolver = Resolver::new(selection.config);
            run_resolve(&resolver, name, json)?;
        }
        Commands::Serve => {
            let selection = config_file::select_roots(&cli.roots, cli.config.as_deref())?;
            info!("Roots from {}", selection.source);
            let resolver = Resolver::new(selection.config);

            let stdin = io::stdin().lock();
            let stdout = BufWriter::new(io::stdout().lock());
            channel::serve(&resolver, stdin, stdout).context("Channel I/O failed")?;
        }
    }

    Ok(())
}

/// Resolve one name and report it, exiting non-zero on a miss or bad name
fn run_resolve(resolver: &Resolver, name: &str, json: bool) -> Result<()> {
    let result = match resolver.resolve_name(name) {
        Ok(result) => result,
        Err(e @ ResolverError::InvalidName { .. }) => {
            eprintln!("✗ {}", e);
            std::process::exit(EXIT_INVALID_NAME);
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        let response = ResolveResponse::try_from(&result)?;
        println!("{}", serde_json::to_string(&response)?);
    }

    match result {
        ResolveResult::Found { path, .. } => {
            if !json {
                println!("{}", path.display());
            }
        }
        ResolveResult::NotFound { searched } => {
            eprintln!("✗ {} not found", name);
            if searched.is_empty() {
                eprintln!("  (no roots configured)");
            }
            for probe in &searched {
                match &probe.detail {
                    Some(detail) => {
                        eprintln!("  {} ({}: {})", probe.root.display(), probe.status, detail)
                    }
                    None => eprintln!("  {} ({})", probe.root.display(), probe.status),
                }
            }
            std::process::exit(EXIT_NOT_FOUND);
        }
    }

    Ok(())
}
