use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use codestream_filter::Directory;
use codestream_filter::FilterableSource;
use codestream_filter::PRESETS;
use codestream_filter::WorkItem;
use codestream_filter::branch_query;
use codestream_filter::repo_query;
use codestream_filter::tag_query;
use serde::Serialize;

use crate::print_json;
use crate::read_json;

#[derive(Debug, Parser)]
pub struct PresetsCommand {
    /// Directory JSON; adds one filter per team tag and repo.
    #[arg(long = "directory", value_name = "FILE")]
    pub directory: Option<PathBuf>,

    /// Work items JSON; adds one filter per branch the items touch.
    #[arg(long = "items", value_name = "FILE")]
    pub items: Option<PathBuf>,

    /// Print as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct PresetEntry {
    group: &'static str,
    label: String,
    query: String,
}

pub(crate) fn run_presets(cmd: PresetsCommand) -> Result<()> {
    let mut entries: Vec<PresetEntry> = PRESETS
        .iter()
        .map(|preset| PresetEntry {
            group: "filters",
            label: preset.label.to_string(),
            query: preset.query.to_string(),
        })
        .collect();

    if let Some(path) = &cmd.directory {
        let directory: Directory = read_json(path)?;
        entries.extend(directory.tags.iter().map(|tag| PresetEntry {
            group: "tags",
            label: if tag.label.is_empty() {
                tag.color.clone()
            } else {
                tag.label.clone()
            },
            query: tag_query(tag),
        }));
        let repos: BTreeSet<&str> = directory
            .repos
            .values()
            .map(|repo| repo.name.as_str())
            .collect();
        entries.extend(repos.into_iter().map(|name| PresetEntry {
            group: "repos",
            label: name.to_string(),
            query: repo_query(name),
        }));
    }

    if let Some(path) = &cmd.items {
        let items: Vec<WorkItem> = read_json(path)?;
        let branches: BTreeSet<&str> = items
            .iter()
            .flat_map(|item| item.filterable_fields().branches)
            .collect();
        entries.extend(branches.into_iter().map(|branch| PresetEntry {
            group: "branches",
            label: branch.to_string(),
            query: branch_query(branch),
        }));
    }

    if cmd.json {
        return print_json(&entries);
    }
    let mut group = "";
    for entry in &entries {
        if entry.group != group {
            group = entry.group;
            println!("{group}:");
        }
        println!("  {:<40} {}", entry.label, entry.query);
    }
    Ok(())
}
