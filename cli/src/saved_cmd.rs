use anyhow::Result;
use clap::Subcommand;

use crate::print_json;
use crate::saved_filter_store;

#[derive(Debug, Subcommand)]
pub enum SavedCommand {
    /// Print saved filters with their indexes.
    List {
        /// Print the raw JSON list.
        #[arg(long = "json")]
        json: bool,
    },

    /// Save a query under a label.
    Save {
        #[arg(long = "label")]
        label: String,

        #[arg(value_name = "QUERY", num_args = 1.., trailing_var_arg = true)]
        query: Vec<String>,
    },

    /// Replace the query of the filter at INDEX, keeping or changing its label.
    Edit {
        index: usize,

        #[arg(long = "label")]
        label: Option<String>,

        #[arg(value_name = "QUERY", num_args = 1.., trailing_var_arg = true)]
        query: Vec<String>,
    },

    /// Change the label of the filter at INDEX.
    Rename { index: usize, label: String },

    /// Remove the filter at INDEX.
    Delete { index: usize },
}

pub(crate) fn run_saved(cmd: SavedCommand) -> Result<()> {
    let store = saved_filter_store()?;
    match cmd {
        SavedCommand::List { json } => {
            let filters = store.list()?;
            if json {
                return print_json(&filters);
            }
            if filters.is_empty() {
                println!("No saved filters yet.");
            }
            for (index, filter) in filters.iter().enumerate() {
                println!("{index}\t{}\t{}", filter.label, filter.q);
            }
        }
        SavedCommand::Save { label, query } => {
            let filter = store.save(&label, &query.join(" "))?;
            println!("saved '{}': {}", filter.label, filter.q);
        }
        SavedCommand::Edit {
            index,
            label,
            query,
        } => {
            let label = match label {
                Some(label) => label,
                None => store
                    .list()?
                    .get(index)
                    .map(|filter| filter.label.clone())
                    .unwrap_or_default(),
            };
            let filter = store.replace(index, &label, &query.join(" "))?;
            println!("updated '{}': {}", filter.label, filter.q);
        }
        SavedCommand::Rename { index, label } => {
            let filter = store.rename(index, &label)?;
            println!("renamed {index} to '{}'", filter.label);
        }
        SavedCommand::Delete { index } => {
            let filter = store.delete(index)?;
            println!("deleted '{}'", filter.label);
        }
    }
    Ok(())
}
