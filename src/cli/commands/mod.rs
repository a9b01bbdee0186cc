//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Calls the engine to execute the command
//! 3. Formats and displays output
//!
//! Handlers do NOT move files directly.

mod apply;
mod completion;
mod config_cmd;
mod plan;
mod root;
mod undo;

// Re-export command functions for testing and direct invocation
pub use apply::apply;
pub use completion::completion;
pub use config_cmd::{get as config_get, set as config_set, show as config_show};
pub use plan::plan;
pub use root::root;
pub use undo::undo;

use crate::cli::args::{Command, ConfigAction};
use crate::core::rewrite::KeepReason;
use crate::engine::{Context, Plan};
use crate::ui::output::{self, Verbosity};
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Root { args } => root::root(ctx, args.into()),
        Command::Plan { args, json } => plan::plan(ctx, args.into(), json),
        Command::Apply {
            args,
            dry_run,
            yes,
        } => apply::apply(ctx, args.into(), dry_run, yes),
        Command::Undo => undo::undo(ctx),
        Command::Config { action } => match action {
            ConfigAction::Show => config_cmd::show(ctx),
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}

fn verbosity(ctx: &Context) -> Verbosity {
    Verbosity::from_flags(ctx.quiet, ctx.debug)
}

/// Print the root line and per-reason counts of files left in place.
fn print_plan_summary(plan: &Plan, verbosity: Verbosity) {
    output::print(
        format!(
            "root: {} ({}), base dir: {}",
            output::format_root(&plan.root),
            plan.root_source,
            plan.base_dir
        ),
        verbosity,
    );

    const REASONS: [KeepReason; 4] = [
        KeepReason::NoNamespace,
        KeepReason::EmptyRoot,
        KeepReason::OutsideRoot,
        KeepReason::AlreadyInPlace,
    ];
    for reason in REASONS {
        let count = plan.skipped.iter().filter(|s| s.reason == reason).count();
        if count > 0 {
            output::print(format!("kept {} file(s): {}", count, reason), verbosity);
        }
    }
    if verbosity == Verbosity::Debug {
        for skipped in &plan.skipped {
            output::print(format!("  {} ({})", skipped.path, skipped.reason), verbosity);
        }
    }
}
