use std::path::PathBuf;

use thiserror::Error;

/// Failures from the stateful edges of the crate: saved-filter persistence and configuration.
/// Compiling and evaluating queries never fails.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("saved filters file {path} is corrupt: {source}")]
    CorruptSavedFilters {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize saved filters: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("saved filter query must not be empty")]
    EmptyQuery,

    #[error("no saved filter at index {index} (have {len})")]
    NoSuchSavedFilter { index: usize, len: usize },

    #[error("could not determine a home directory for codestream")]
    NoHomeDir,
}

pub type Result<T> = std::result::Result<T, FilterError>;
