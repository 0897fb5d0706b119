// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Orbit - AI gateway adapter host.
//!
//! This is the binary entry point: it loads the configuration, preloads
//! adapters, and applies configuration changes without a restart.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod report;
mod serve;
mod watch;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use orbit_config::{ConfigError, OrbitConfig};

/// Orbit - AI gateway adapter host.
#[derive(Parser, Debug)]
#[command(name = "orbit", version, about, long_about = None)]
struct Cli {
    /// Configuration file. Defaults to the XDG lookup (`./orbit.toml`,
    /// `~/.config/orbit/orbit.toml`, `/etc/orbit/orbit.toml`).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Preload adapters and hot-reload them when the configuration changes.
    Serve,
    /// Validate the configuration and print the adapter summary.
    Check,
    /// Show what reloading from OLD to NEW would change.
    Diff { old: PathBuf, new: PathBuf },
}

fn load(path: Option<&Path>) -> Result<OrbitConfig, Vec<ConfigError>> {
    match path {
        Some(path) => orbit_config::load_and_validate_path(path),
        None => orbit_config::load_and_validate(),
    }
}

fn load_or_exit(path: Option<&Path>) -> OrbitConfig {
    match load(path) {
        Ok(config) => config,
        Err(errors) => {
            orbit_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) => {
            let config = load_or_exit(cli.config.as_deref());
            if let Err(e) = serve::run_serve(config, cli.config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Check) => {
            let config = load_or_exit(cli.config.as_deref());
            print!("{}", report::render_check(&config));
        }
        Some(Commands::Diff { old, new }) => {
            let old = load_or_exit(Some(&old));
            let new = load_or_exit(Some(&new));
            print!("{}", report::render_diff(&old, &new));
        }
        None => {
            println!("orbit: use --help for available commands");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::parse_from(["orbit", "--config", "orbit.toml", "serve"]);
        assert_eq!(cli.config.as_deref(), Some(Path::new("orbit.toml")));
        assert!(matches!(cli.command, Some(Commands::Serve)));

        let cli = Cli::parse_from(["orbit", "diff", "old.toml", "new.toml"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Diff { ref old, .. }) if old == Path::new("old.toml")
        ));
    }

    #[test]
    fn missing_explicit_config_is_reported() {
        let errors = load(Some(Path::new("/nonexistent/orbit.toml"))).unwrap_err();
        assert!(!errors.is_empty());
    }
}
