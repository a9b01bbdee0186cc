//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--interactive` / `--no-interactive`: Control prompts
//! - `--quiet` / `-q`: Minimal output

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::core::config::schema::Language;
use crate::engine::FlattenOverrides;

/// flat - Flatten redundant package directories in Kotlin and Java projects
#[derive(Parser, Debug)]
#[command(name = "flat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if flat was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable interactive prompts
    #[arg(long = "interactive", global = true, conflicts_with = "no_interactive")]
    pub interactive_flag: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Interactive mode as chosen by flags, if any flag decides it.
    ///
    /// Returns `Some(true)` for `--interactive`, `Some(false)` for
    /// `--no-interactive` or `--quiet`, and `None` otherwise.
    pub fn interactive_override(&self) -> Option<bool> {
        if self.interactive_flag {
            Some(true)
        } else if self.no_interactive || self.quiet {
            Some(false)
        } else {
            None
        }
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Flags win; otherwise `config_default` applies, and prompts are only
    /// shown when stdin is a terminal.
    pub fn interactive(&self, config_default: bool) -> bool {
        self.interactive_override()
            .unwrap_or_else(|| config_default && std::io::stdin().is_terminal())
    }
}

/// Flags that override flatten settings from config.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenArgs {
    /// Root package to strip, skipping discovery ("" moves nothing)
    #[arg(long, value_name = "PACKAGE")]
    pub root: Option<String>,

    /// Directory flattened files are placed under
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<String>,

    /// Language preset (kotlin, java)
    #[arg(long, value_name = "LANG")]
    pub language: Option<Language>,
}

impl From<FlattenArgs> for FlattenOverrides {
    fn from(args: FlattenArgs) -> Self {
        FlattenOverrides {
            root: args.root,
            base_dir: args.base_dir,
            language: args.language,
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the root package that would be stripped
    #[command(
        name = "root",
        long_about = "Show the root package that would be stripped.\n\n\
            Without --root or a configured root_package, the root is discovered as \
            the longest package prefix shared by every file that declares a package. \
            Files without a package declaration do not take part. If the packages \
            share no prefix, the root is empty and printed as <none>.",
        after_help = "\
WORKFLOW EXAMPLES:
    # See what would be stripped
    flat root

    # Inspect a Java project
    flat root --language java"
    )]
    Root {
        #[command(flatten)]
        args: FlattenArgs,
    },

    /// Preview the moves without touching any file
    #[command(
        name = "plan",
        long_about = "Preview the moves without touching any file.\n\n\
            Lists every file that would move, in order, followed by the directories \
            that would be pruned once empty. Files that stay are reported with the \
            reason they stay.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Human-readable preview
    flat plan

    # Machine-readable plan for scripting
    flat plan --json

    # Strip an explicit root instead of the discovered one
    flat plan --root com.example"
    )]
    Plan {
        #[command(flatten)]
        args: FlattenArgs,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Flatten the package directories
    #[command(
        name = "apply",
        long_about = "Flatten the package directories.\n\n\
            Shows the plan, asks for confirmation, then moves every file. Existing \
            files are never overwritten: if a destination is occupied, the apply \
            stops and every move made so far is rolled back. Each apply is journaled \
            under .flatlayout/ops and can be reverted with `flat undo`.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Review and confirm interactively
    flat apply

    # Non-interactive (CI, scripts)
    flat apply --yes

    # Show what would happen and stop
    flat apply --dry-run"
    )]
    Apply {
        #[command(flatten)]
        args: FlattenArgs,

        /// Show the plan without moving anything
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Revert the last apply
    #[command(
        name = "undo",
        long_about = "Revert the last apply.\n\n\
            Moves every file back to where it was, recreates pruned directories and \
            removes directories the apply created. An apply that was interrupted \
            is reverted before any completed one.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Changed your mind
    flat apply --yes
    flat undo"
    )]
    Undo,

    /// View or change configuration
    #[command(
        name = "config",
        after_help = "\
WORKFLOW EXAMPLES:
    # Show effective settings and where they come from
    flat config show

    # Pin the root package for this project
    flat config set root_package com.example

    # Use the Java preset
    flat config set language java"
    )]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts for tab-completion.\n\n\
            Outputs a completion script for the specified shell. Add the output \
            to your shell's configuration to enable tab-completion for flat commands.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    flat completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    flat completion zsh >> ~/.zshrc

    # Fish
    flat completion fish > ~/.config/fish/completions/flat.fish

    # PowerShell
    flat completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    #[command(alias = "list")]
    Show,
    /// Print one effective configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a project configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
