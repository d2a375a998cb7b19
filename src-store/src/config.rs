//! Store configuration
//!
//! Kept as `checkmarket.json` next to the database. Every field has a
//! default, so a missing file or a partial file is fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use checkmarket::sync::DEFAULT_CURRENCY_SYMBOL;
use checkmarket::SortKey;

use crate::repository::MEMORY_DB;

pub const CONFIG_FILE: &str = "checkmarket.json";
pub const DATA_DIR_ENV: &str = "CHECKMARKET_DATA_DIR";

/// Longest accepted undo window, one day
pub const MAX_UNDO_WINDOW_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file name inside the data directory, or `:memory:`
    pub db_file: String,
    /// Log directory, relative to the data directory unless absolute
    pub log_dir: String,
    pub currency_symbol: String,
    /// How long a deleted item can still be restored
    pub undo_window_secs: u64,
    /// Ordering used when a session starts
    pub default_sort: SortKey,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_file: "checkmarket.db".to_string(),
            log_dir: "logs".to_string(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            undo_window_secs: 3,
            default_sort: SortKey::Name,
        }
    }
}

impl StoreConfig {
    /// Config for tests and throwaway sessions
    pub fn in_memory() -> Self {
        Self {
            db_file: MEMORY_DB.to_string(),
            ..Self::default()
        }
    }

    pub fn db_path(&self, data_dir: &Path) -> PathBuf {
        if self.db_file == MEMORY_DB {
            PathBuf::from(MEMORY_DB)
        } else {
            data_dir.join(&self.db_file)
        }
    }

    pub fn log_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.log_dir)
    }

    /// Configured undo window, capped at [`MAX_UNDO_WINDOW_SECS`]
    pub fn undo_window(&self) -> chrono::Duration {
        let secs = self.undo_window_secs.min(MAX_UNDO_WINDOW_SECS);
        chrono::Duration::try_seconds(secs as i64).unwrap_or_else(chrono::Duration::zero)
    }
}

/// `CHECKMARKET_DATA_DIR` when set, `fallback` otherwise
pub fn data_dir(fallback: &Path) -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| fallback.to_path_buf())
}

/// Load config from `dir`, defaults when the file does not exist
pub fn load_config(dir: &Path) -> Result<StoreConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(StoreConfig::default());
    }
    let text = std::fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&text)?)
}

pub fn save_config(dir: &Path, config: &StoreConfig) -> Result<(), ConfigError> {
    std::fs::create_dir_all(dir)?;
    let text = serde_json::to_string_pretty(config)?;
    std::fs::write(dir.join(CONFIG_FILE), text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.currency_symbol, "€");
        assert_eq!(config.default_sort, SortKey::Name);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "undo_window_secs": 10, "default_sort": "category" }"#,
        )
        .unwrap();

        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.undo_window_secs, 10);
        assert_eq!(config.default_sort, SortKey::Category);
        assert_eq!(config.currency_symbol, "€");
        assert_eq!(config.db_file, "checkmarket.db");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "theme": "dark", "currency_symbol": "$" }"#,
        )
        .unwrap();

        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.currency_symbol, "$");
        assert_eq!(config.undo_window_secs, 3);
    }

    #[test]
    fn test_huge_undo_window_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "undo_window_secs": 100000000000000000 }"#,
        )
        .unwrap();

        let config = load_config(dir.path()).unwrap();
        let cap = chrono::Duration::seconds(MAX_UNDO_WINDOW_SECS as i64);
        assert_eq!(config.undo_window(), cap);

        let max = StoreConfig {
            undo_window_secs: u64::MAX,
            ..StoreConfig::default()
        };
        assert_eq!(max.undo_window(), cap);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();
        assert!(matches!(load_config(dir.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            currency_symbol: "$".to_string(),
            default_sort: SortKey::PurchasedStatus,
            ..StoreConfig::default()
        };
        save_config(dir.path(), &config).unwrap();
        assert_eq!(load_config(dir.path()).unwrap(), config);
    }

    #[test]
    fn test_paths() {
        let dir = Path::new("/data");
        let config = StoreConfig::default();
        assert_eq!(config.db_path(dir), PathBuf::from("/data/checkmarket.db"));
        assert_eq!(config.log_path(dir), PathBuf::from("/data/logs"));
        assert_eq!(StoreConfig::in_memory().db_path(dir), PathBuf::from(MEMORY_DB));
        assert_eq!(config.undo_window(), chrono::Duration::seconds(3));
    }
}
