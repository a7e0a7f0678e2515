use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::compiler::CompiledQuery;
use crate::compiler::compile;
use crate::error::FilterError;
use crate::error::Result;

/// A named query the user bookmarked from the search box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedFilter {
    pub label: String,
    pub q: String,
}

impl SavedFilter {
    pub fn new(label: impl Into<String>, q: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            q: q.into(),
        }
    }

    pub fn compile(&self, current_username: &str) -> CompiledQuery {
        compile(&self.q, current_username)
    }
}

/// Saved filters persisted as a JSON list in the user's preferences.
#[derive(Debug, Clone)]
pub struct SavedFilterStore {
    path: PathBuf,
}

impl SavedFilterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> Result<Vec<SavedFilter>> {
        self.read()
    }

    pub fn find(&self, label: &str) -> Result<Option<SavedFilter>> {
        Ok(self
            .read()?
            .into_iter()
            .find(|filter| filter.label == label))
    }

    /// Appends a new filter. Empty queries are not worth saving.
    pub fn save(&self, label: &str, q: &str) -> Result<SavedFilter> {
        let filter = non_empty(label, q)?;
        let mut filters = self.read()?;
        filters.push(filter.clone());
        self.write(&filters)?;
        debug!(label, "saved search filter");
        Ok(filter)
    }

    /// Overwrites the filter at `index`.
    pub fn replace(&self, index: usize, label: &str, q: &str) -> Result<SavedFilter> {
        let filter = non_empty(label, q)?;
        let mut filters = self.read()?;
        let len = filters.len();
        let slot = filters
            .get_mut(index)
            .ok_or(FilterError::NoSuchSavedFilter { index, len })?;
        *slot = filter.clone();
        self.write(&filters)?;
        Ok(filter)
    }

    /// Changes the label at `index`, keeping its query.
    pub fn rename(&self, index: usize, label: &str) -> Result<SavedFilter> {
        let filters = self.read()?;
        let Some(existing) = filters.get(index) else {
            return Err(FilterError::NoSuchSavedFilter {
                index,
                len: filters.len(),
            });
        };
        self.replace(index, label, &existing.q)
    }

    pub fn delete(&self, index: usize) -> Result<SavedFilter> {
        let mut filters = self.read()?;
        if index >= filters.len() {
            return Err(FilterError::NoSuchSavedFilter {
                index,
                len: filters.len(),
            });
        }
        let removed = filters.remove(index);
        self.write(&filters)?;
        debug!(label = removed.label, "deleted saved search filter");
        Ok(removed)
    }

    fn read(&self) -> Result<Vec<SavedFilter>> {
        match fs::read(&self.path) {
            Ok(data) => {
                serde_json::from_slice(&data).map_err(|source| FilterError::CorruptSavedFilters {
                    path: self.path.clone(),
                    source,
                })
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(FilterError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write(&self, filters: &[SavedFilter]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| FilterError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let data = serde_json::to_vec_pretty(filters)?;
        fs::write(&self.path, data).map_err(|source| FilterError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

fn non_empty(label: &str, q: &str) -> Result<SavedFilter> {
    if q.trim().is_empty() {
        return Err(FilterError::EmptyQuery);
    }
    Ok(SavedFilter::new(label, q))
}
