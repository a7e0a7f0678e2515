/*!
# CodeStream Filter

Compiles the free-text search box of the CodeStream panel into structured clauses and partitions
work items (issues, comments, reviews) into display buckets.

## Query language

- `is:open`, `is:closed` match item status; `is:issue`, `is:comment`, `is:cr`/`is:review` match type
- `author:@me`, `assignee:@name`, `impacts:@name` match people (`@me` is the current user)
- `tag:bug`, `tag:"needs review"`, `no:tag` match team tags
- `branch:main`, `commit:abc123`, `repo:"my repo"` match code locations
- `updated:>2024-01-01`, `created:today`, `updated:yesterday` match dates
- anything left over is a case-insensitive substring search over title and text

## Architecture

```text
Query string
  └─> compile (regex extractors, in order)
        ├─> FilterClauses
        └─> residual text
              └─> evaluate (matcher, per item)
                    └─> PartitionedResults
                          ├─ waitingForMe
                          ├─ open
                          ├─ closed
                          └─ recent
```

`SearchSession` wraps the pipeline for interactive use: keystrokes are debounced and only the
latest query is evaluated.
*/

mod clause;
mod compiler;
mod config;
mod error;
mod fields;
mod matcher;
mod model;
mod partition;
mod presets;
mod saved;
mod session;

pub use clause::ClauseValue;
pub use clause::DateComparison;
pub use clause::DateRange;
pub use clause::FilterClauses;
pub use clause::StatusClause;
pub use compiler::CompiledQuery;
pub use compiler::compile;
pub use compiler::compile_on;
pub use config::CONFIG_FILENAME;
pub use config::FilterConfig;
pub use config::HOME_ENV_VAR;
pub use config::find_codestream_home;
pub use error::FilterError;
pub use error::Result;
pub use fields::FilterableFields;
pub use fields::FilterableSource;
pub use model::ChangesetCommit;
pub use model::CodemarkDetail;
pub use model::Directory;
pub use model::ItemDetail;
pub use model::ItemKind;
pub use model::ItemStatus;
pub use model::Marker;
pub use model::Repo;
pub use model::ReviewChangeset;
pub use model::ReviewDetail;
pub use model::TeamTag;
pub use model::WorkItem;
pub use partition::Bucket;
pub use partition::PartitionedResults;
pub use partition::evaluate;
pub use partition::evaluate_in;
pub use presets::FilterPreset;
pub use presets::PRESETS;
pub use presets::branch_query;
pub use presets::preset;
pub use presets::repo_query;
pub use presets::tag_query;
pub use saved::SavedFilter;
pub use saved::SavedFilterStore;
pub use session::SearchOutcome;
pub use session::SearchSession;
pub use session::SearchSnapshot;
