use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::error::FilterError;
use crate::error::Result;

pub const CONFIG_FILENAME: &str = "config.toml";
pub const HOME_ENV_VAR: &str = "CODESTREAM_HOME";

/// Settings for the search panel core, read from `config.toml` in the codestream home.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Quiet period before a changed query is evaluated.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Saved filters file, relative to the codestream home unless absolute.
    #[serde(default = "default_saved_filters_file")]
    pub saved_filters_file: PathBuf,
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_saved_filters_file() -> PathBuf {
    PathBuf::from("saved_filters.json")
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            saved_filters_file: default_saved_filters_file(),
        }
    }
}

impl FilterConfig {
    /// Loads `config.toml` from `home`. A missing file yields the defaults.
    pub fn load(home: &Path) -> Result<Self> {
        let path = home.join(CONFIG_FILENAME);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("no config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => return Err(FilterError::Read { path, source }),
        };
        let config: Self =
            toml::from_str(&raw).map_err(|source| FilterError::ConfigParse { path, source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.debounce_ms > 60_000 {
            return Err(FilterError::InvalidConfig(format!(
                "debounce_ms must be at most 60000, got {}",
                self.debounce_ms
            )));
        }
        if self.saved_filters_file.as_os_str().is_empty() {
            return Err(FilterError::InvalidConfig(
                "saved_filters_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn saved_filters_path(&self, home: &Path) -> PathBuf {
        if self.saved_filters_file.is_absolute() {
            self.saved_filters_file.clone()
        } else {
            home.join(&self.saved_filters_file)
        }
    }
}

/// `$CODESTREAM_HOME`, falling back to `~/.codestream`.
pub fn find_codestream_home() -> Result<PathBuf> {
    if let Some(value) = std::env::var_os(HOME_ENV_VAR)
        && !value.is_empty()
    {
        return Ok(PathBuf::from(value));
    }
    dirs::home_dir()
        .map(|home| home.join(".codestream"))
        .ok_or(FilterError::NoHomeDir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = FilterConfig::load(dir.path()).unwrap();
        assert_eq!(config, FilterConfig::default());
        assert_eq!(config.debounce(), Duration::from_millis(500));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "debounce_ms = 150\n").unwrap();
        let config = FilterConfig::load(dir.path()).unwrap();
        assert_eq!(config.debounce_ms, 150);
        assert_eq!(
            config.saved_filters_path(dir.path()),
            dir.path().join("saved_filters.json")
        );
    }

    #[test]
    fn oversized_debounce_is_rejected() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "debounce_ms = 90000\n").unwrap();
        let err = FilterConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, FilterError::InvalidConfig(_)));
    }

    #[test]
    fn malformed_toml_reports_path() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "debounce_ms = \"soon\"\n").unwrap();
        let err = FilterConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, FilterError::ConfigParse { .. }));
    }
}
