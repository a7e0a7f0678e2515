use std::path::PathBuf;

use anyhow::Result;
use anyhow::anyhow;
use anyhow::bail;
use chrono::Local;
use chrono::NaiveDate;
use chrono::Utc;
use clap::Parser;
use clap::ValueEnum;
use codestream_filter::Bucket;
use codestream_filter::CompiledQuery;
use codestream_filter::Directory;
use codestream_filter::PartitionedResults;
use codestream_filter::WorkItem;
use codestream_filter::compile_on;
use codestream_filter::evaluate_in;
use serde::Serialize;
use tracing::debug;

use crate::print_json;
use crate::read_json;
use crate::saved_filter_store;

#[derive(Debug, Parser)]
pub struct SearchCommand {
    /// JSON array of work items, most recent first.
    #[arg(long = "items", value_name = "FILE")]
    pub items: PathBuf,

    /// JSON object with `usernames`, `repos` and `tags` lookups.
    #[arg(long = "directory", value_name = "FILE")]
    pub directory: Option<PathBuf>,

    /// Id of the user running the search.
    #[arg(long = "user-id")]
    pub user_id: String,

    /// Username that `@me` resolves to.
    #[arg(long = "username")]
    pub username: String,

    /// Run a saved filter instead of QUERY.
    #[arg(long = "saved", value_name = "LABEL", conflicts_with = "query")]
    pub saved: Option<String>,

    /// Resolve `today`/`yesterday` against this date instead of the local date.
    #[arg(long = "today", value_name = "YYYY-MM-DD")]
    pub today: Option<NaiveDate>,

    /// Compare calendar days in UTC instead of the local time zone.
    #[arg(long = "utc")]
    pub utc: bool,

    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Json)]
    pub output_format: OutputFormat,

    /// Filter query, e.g. `is:open author:@me login`.
    #[arg(value_name = "QUERY", num_args = 0.., trailing_var_arg = true)]
    pub query: Vec<String>,
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchReport<'a> {
    query: String,
    active_filters: String,
    results: PartitionedResults<&'a WorkItem>,
}

pub(crate) fn run_search(cmd: SearchCommand) -> Result<()> {
    let items: Vec<WorkItem> = read_json(&cmd.items)?;
    let directory: Directory = match &cmd.directory {
        Some(path) => read_json(path)?,
        None => Directory::default(),
    };
    let query = resolve_query(&cmd)?;
    let today = cmd.today.unwrap_or_else(|| current_day(cmd.utc));
    let compiled = compile_on(&query, &cmd.username, today);
    debug!(query = %query, compiled = %compiled, "running search");

    let results = if cmd.utc {
        evaluate_in(&items, &compiled, &directory, &cmd.user_id, Utc)
    } else {
        evaluate_in(&items, &compiled, &directory, &cmd.user_id, Local)
    };

    match cmd.output_format {
        OutputFormat::Json => print_json(&SearchReport {
            query,
            active_filters: compiled.to_string(),
            results,
        }),
        OutputFormat::Text => {
            print_text(&compiled, &results);
            Ok(())
        }
    }
}

/// Today in the same time zone the calendar-day clauses are compared in.
fn current_day(utc: bool) -> NaiveDate {
    if utc {
        Utc::now().date_naive()
    } else {
        Local::now().date_naive()
    }
}

fn resolve_query(cmd: &SearchCommand) -> Result<String> {
    let Some(label) = &cmd.saved else {
        return Ok(cmd.query.join(" "));
    };
    let store = saved_filter_store()?;
    let filter = store
        .find(label)?
        .ok_or_else(|| anyhow!("no saved filter named '{label}'"))?;
    if filter.q.trim().is_empty() {
        bail!("saved filter '{label}' has an empty query");
    }
    Ok(filter.q)
}

fn print_text(compiled: &CompiledQuery, results: &PartitionedResults<&WorkItem>) {
    if !compiled.is_empty() {
        println!("filters: {compiled}");
    }
    if results.is_empty() {
        println!("no results");
        return;
    }
    for (bucket, items) in results.iter() {
        if items.is_empty() {
            continue;
        }
        println!("{} ({})", bucket.label(), items.len());
        for item in items {
            println!("  {}", summarize(bucket, item));
        }
    }
    println!("{} results", results.total());
}

fn summarize(bucket: Bucket, item: &WorkItem) -> String {
    let headline = item
        .title
        .as_deref()
        .or(item.text.as_deref())
        .and_then(|text| text.lines().next())
        .unwrap_or("(untitled)");
    match bucket {
        Bucket::Recent => format!(
            "[{}] {} {headline} ({})",
            item.kind().as_str(),
            item.id,
            item.status
        ),
        _ => format!("[{}] {} {headline}", item.kind().as_str(), item.id),
    }
}
