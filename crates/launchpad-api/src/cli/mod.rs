//! CLI command definitions for the `lpad` binary.
//!
//! Uses clap derive macros. Progress commands sit at the top level
//! (`lpad status`, `lpad next`), grouped resources use a noun-verb pattern
//! (`lpad task set`, `lpad content list`).

pub mod content;
pub mod progress;
pub mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Track workflow progress and run provisioning steps.
#[derive(Parser)]
#[command(name = "lpad", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Data directory (defaults to $LAUNCHPAD_DATA_DIR or ~/.launchpad).
    #[arg(long, global = true, env = "LAUNCHPAD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show progress for every section and task.
    Status,

    /// Show the first task that is not completed.
    Next,

    /// Update task progress.
    Task {
        #[command(subcommand)]
        action: TaskCommand,
    },

    /// Check whether a section can be entered.
    Navigate {
        /// Section id (e.g. "planning").
        section: String,
    },

    /// Reset every task to pending and clear generated content.
    Reset,

    /// List the configured steps and their execution waves.
    Steps,

    /// Run provisioning steps.
    Run {
        /// Step ids to run. Steps not listed are skipped.
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        steps: Vec<String>,

        /// Run every configured step.
        #[arg(long)]
        all: bool,
    },

    /// Manage generated content (list, add, show, update, remove, clear).
    Content {
        #[command(subcommand)]
        action: ContentCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Set the status of a task.
    Set {
        /// Section id.
        section: String,

        /// Task id within the section.
        task: String,

        /// pending, in-progress, completed or error.
        status: String,
    },
}

#[derive(Subcommand)]
pub enum ContentCommand {
    /// List generated content.
    #[command(alias = "ls")]
    List {
        /// Only show one type (sitemap, page-content, template).
        #[arg(long = "type")]
        content_type: Option<String>,
    },

    /// Add a content record.
    Add {
        /// sitemap, page-content or template.
        #[arg(long = "type")]
        content_type: String,

        #[arg(long)]
        title: String,

        /// Payload. Parsed as JSON when possible, stored as a string otherwise.
        #[arg(long)]
        content: String,

        /// Optional JSON object of metadata.
        #[arg(long)]
        metadata: Option<String>,
    },

    /// Show one content record.
    Show {
        id: String,
    },

    /// Patch fields of a content record.
    Update {
        id: String,

        #[arg(long = "type")]
        content_type: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,
    },

    /// Remove a content record.
    #[command(alias = "rm")]
    Remove {
        id: String,
    },

    /// Remove every content record.
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_requires_steps_or_all() {
        assert!(Cli::try_parse_from(["lpad", "run"]).is_err());
        assert!(Cli::try_parse_from(["lpad", "run", "--all"]).is_ok());
        assert!(Cli::try_parse_from(["lpad", "run", "copy_subdomain"]).is_ok());
        assert!(Cli::try_parse_from(["lpad", "run", "copy_subdomain", "--all"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["lpad", "status", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Status));
    }
}
