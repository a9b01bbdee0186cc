//! cli
//!
//! Command-line interface layer for flatlayout.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Initialize logging
//! - Delegate to command handlers
//! - Does NOT move files directly
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to the
//! [`crate::engine`] for execution. All filesystem changes flow through
//! the engine's executor.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use crate::core::config::Config;
use crate::engine;
use anyhow::Result;

/// Initialize `env_logger` on stderr.
///
/// `RUST_LOG` is honored unless `--debug` or `--quiet` pins the level.
pub fn init_logging(debug: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // A second init (e.g. from tests) is harmless.
    let _ = builder.target(env_logger::Target::Stderr).try_init();
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run(cli: Cli) -> Result<()> {
    let config_interactive = match cli.interactive_override() {
        Some(_) => true,
        None => Config::load(None)
            .map(|loaded| loaded.config.interactive())
            .unwrap_or(true),
    };

    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        interactive: cli.interactive(config_interactive),
    };

    commands::dispatch(cli.command, &ctx)
}
