//! Configuration value commands
//!
//! These read and write the `[updates]` table, which holds machine-level
//! values. They target the global document unless `--local` is given.

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::storage::{ConfigResolver, Scope};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Read a value from the [updates] table
    Get {
        /// Key, e.g. last_update_check_timestamp
        key: String,

        /// Read the project configuration instead of the global one
        #[arg(long)]
        local: bool,
    },

    /// Write a value into the [updates] table
    Set {
        /// Key, e.g. last_update_check_timestamp
        key: String,

        /// Value (JSON, falls back to a plain string)
        value: String,

        /// Write the project configuration instead of the global one
        #[arg(long)]
        local: bool,
    },
}

pub fn run(cmd: ConfigCommands, output: &Output, resolver: &mut ConfigResolver<'_>) -> Result<()> {
    match cmd {
        ConfigCommands::Get { key, local } => get_value(output, resolver, &key, scope_for(local)),
        ConfigCommands::Set { key, value, local } => {
            set_value(output, resolver, &key, &value, scope_for(local))
        }
    }
}

fn scope_for(local: bool) -> Scope {
    if local {
        Scope::Local
    } else {
        Scope::Global
    }
}

/// Parses a command-line value as JSON, falling back to a string
fn parse_value(raw: &str) -> toml::Value {
    serde_json::from_str::<serde_json::Value>(raw)
        .ok()
        .and_then(|json| toml::Value::try_from(json).ok())
        .unwrap_or_else(|| toml::Value::String(raw.to_string()))
}

fn get_value(output: &Output, resolver: &ConfigResolver<'_>, key: &str, scope: Scope) -> Result<()> {
    let value = resolver.update_value(scope, key);

    if output.is_json() {
        output.data(&serde_json::json!({
            "scope": scope,
            "key": key,
            "value": value,
        }));
    } else {
        match value {
            Some(value) => println!("{} = {}", key, value),
            None => println!("{} is not set in {} configuration", key, scope),
        }
    }

    Ok(())
}

fn set_value(
    output: &Output,
    resolver: &mut ConfigResolver<'_>,
    key: &str,
    raw: &str,
    scope: Scope,
) -> Result<()> {
    let value = parse_value(raw);
    resolver.set_update_value(scope, key, value.clone())?;

    output.data(&serde_json::json!({
        "scope": scope,
        "key": key,
        "value": value,
    }));
    output.success(&format!("Set {} = {} in {} configuration", key, value, scope));

    Ok(())
}
