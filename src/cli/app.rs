//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use super::config_cmd::{self, ConfigCommands};
use super::output::{Output, OutputFormat};
use super::path::{self, PathCommands};
use super::task;
use crate::storage::{ConfigResolver, Environment, OsFileSystem, TaskRepository};

#[derive(Parser)]
#[command(name = "tick")]
#[command(author, version, about = "Work through markdown checklists one task at a time")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Complete the marked task and move the marker to the next one
    Next {
        /// Use the global task files even inside a project
        #[arg(long, short)]
        global: bool,
    },

    /// Uncheck completed tasks
    Reset {
        /// Files to reset (defaults to the primary task file)
        files: Vec<PathBuf>,

        /// Reset every configured task file
        #[arg(long, short, conflicts_with = "files")]
        all: bool,

        /// Use the global task files even inside a project
        #[arg(long, short)]
        global: bool,
    },

    /// Show task counts per file
    Stats {
        /// Use the global task files even inside a project
        #[arg(long, short)]
        global: bool,
    },

    /// Append a new task to the paste target
    Add {
        /// Task text
        #[arg(required = true)]
        text: Vec<String>,

        /// Use the global task files even inside a project
        #[arg(long, short)]
        global: bool,
    },

    /// Manage the task file list
    #[command(subcommand)]
    Path(PathCommands),

    /// Read and write configuration values
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Installs the stderr log subscriber
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug output.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = Output::new(cli.format);
    let env = Environment::detect()?;
    debug!(cwd = %env.cwd.display(), "tick starting");

    let fs = OsFileSystem;
    let mut resolver = ConfigResolver::new(&fs, env);
    let repo = TaskRepository::new(&fs);

    match cli.command {
        Commands::Next { global } => task::next(&output, &resolver, &repo, global)?,
        Commands::Reset { files, all, global } => {
            task::reset(&output, &resolver, &repo, &files, all, global)?
        }
        Commands::Stats { global } => task::stats(&output, &resolver, &repo, global)?,
        Commands::Add { text, global } => task::add(&output, &resolver, &repo, &text, global)?,
        Commands::Path(cmd) => path::run(cmd, &output, &mut resolver)?,
        Commands::Config(cmd) => config_cmd::run(cmd, &output, &mut resolver)?,
    }

    debug!("Command completed successfully");
    Ok(())
}
