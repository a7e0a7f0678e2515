mod presets_cmd;
mod saved_cmd;
mod search_cmd;

use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use codestream_filter::FilterConfig;
use codestream_filter::SavedFilterStore;
use codestream_filter::find_codestream_home;
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

pub use presets_cmd::PresetsCommand;
pub use saved_cmd::SavedCommand;
pub use search_cmd::OutputFormat;
pub use search_cmd::SearchCommand;

/// Search CodeStream issues, comments and reviews with the panel's filter syntax.
#[derive(Debug, Parser)]
#[command(name = "cs-search", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a filter query against a JSON dump of work items.
    Search(SearchCommand),

    /// Manage saved filters.
    #[command(subcommand)]
    Saved(SavedCommand),

    /// List the canned filters and the tag, repo and branch filters available for the data.
    Presets(PresetsCommand),
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Search(cmd) => search_cmd::run_search(cmd),
        Command::Saved(cmd) => saved_cmd::run_saved(cmd),
        Command::Presets(cmd) => presets_cmd::run_presets(cmd),
    }
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` overrides the `warn` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn saved_filter_store() -> Result<SavedFilterStore> {
    let home = find_codestream_home()?;
    let config = FilterConfig::load(&home)
        .with_context(|| format!("failed to load config from {}", home.display()))?;
    Ok(SavedFilterStore::new(config.saved_filters_path(&home)))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
