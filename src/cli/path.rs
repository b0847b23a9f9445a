//! Task file path commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::storage::{ConfigResolver, Scope};

#[derive(Subcommand)]
pub enum PathCommands {
    /// Set the ordered list of task files
    ///
    /// Examples:
    ///   tick path set TODO.md docs/later.md      # Project list
    ///   tick path set --global ~/inbox.md        # Fallback list
    ///   tick path set TODO.md --paste inbox.md   # Add new tasks elsewhere
    Set {
        /// Task files, in the order they are worked through
        paths: Vec<String>,

        /// Write the global (user-level) configuration
        #[arg(long, short)]
        global: bool,

        /// File that receives new tasks (defaults to the first path)
        #[arg(long)]
        paste: Option<String>,
    },

    /// Show the task files in effect
    Show {
        /// Show the global configuration even inside a project
        #[arg(long, short)]
        global: bool,
    },
}

pub fn run(cmd: PathCommands, output: &Output, resolver: &mut ConfigResolver<'_>) -> Result<()> {
    match cmd {
        PathCommands::Set {
            paths,
            global,
            paste,
        } => set_paths(output, resolver, &paths, global, paste.as_deref()),
        PathCommands::Show { global } => show_paths(output, resolver, global),
    }
}

fn set_paths(
    output: &Output,
    resolver: &mut ConfigResolver<'_>,
    paths: &[String],
    global: bool,
    paste: Option<&str>,
) -> Result<()> {
    resolver.set_task_file_paths(paths, global, paste)?;

    let scope = Scope::from_global_flag(global);
    let config_path = resolver.config_path(scope);

    output.data(&serde_json::json!({
        "scope": scope,
        "config": config_path,
        "paths": resolver.task_file_paths(global),
        "paste": resolver.paste_target_path(global),
    }));
    output.success(&format!(
        "Saved {} task file(s) to {} configuration ({})",
        paths.len(),
        scope,
        config_path.display()
    ));

    Ok(())
}

fn show_paths(output: &Output, resolver: &ConfigResolver<'_>, global: bool) -> Result<()> {
    let scope = resolver.effective_scope(global);
    let config_path = resolver.config_path(scope);
    let paths = resolver.task_file_paths(global);
    let paste = resolver.paste_target_path(global);

    if output.is_json() {
        output.data(&serde_json::json!({
            "scope": scope,
            "config": config_path,
            "exists": resolver.has_document(scope),
            "paths": paths,
            "primary": resolver.primary_task_path(global),
            "paste": paste,
        }));
        return Ok(());
    }

    let origin = if resolver.has_document(scope) {
        config_path.display().to_string()
    } else {
        "defaults".to_string()
    };
    println!("Scope: {} ({})", scope, origin);
    println!();
    for (i, path) in paths.iter().enumerate() {
        println!("{:>3}. {}", i + 1, path.display());
    }
    println!();
    println!("Paste target: {}", paste.display());

    Ok(())
}
