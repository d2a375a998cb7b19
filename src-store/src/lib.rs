//! Checkmarket Backend
//!
//! Layered architecture:
//! - repository: Document store access, SQLite implementation and live feed
//! - commands: Write handlers for forms and engine intents
//! - session: Feed-to-engine glue for one open list
//! - config: Data directory layout and user settings

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

pub mod commands;
pub mod config;
pub mod error;
pub mod repository;
pub mod session;

pub use commands::{execute, save_item, PendingUndo, RawItemForm, SaveError, SaveOutcome};
pub use config::{load_config, save_config, ConfigError, StoreConfig};
pub use error::{StoreResult, UpstreamError};
pub use repository::{init_db, DbState, ItemRepository, OrderedRepository, Repository, Subscription};
pub use session::ListSession;

const APP_NAME: &str = "Checkmarket";

#[derive(Debug, Error)]
pub enum OpenError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] UpstreamError),
}

/// Everything a front end needs, opened from one data directory
pub struct Backend {
    pub config: StoreConfig,
    pub data_dir: PathBuf,
    pub db_state: DbState,
    pub repo: Arc<ItemRepository>,
}

impl Backend {
    /// Load config, start logging and open the database under `data_dir`.
    /// `CHECKMARKET_DATA_DIR` takes precedence when set.
    pub async fn open(data_dir: &Path) -> Result<Self, OpenError> {
        let data_dir = config::data_dir(data_dir);
        let config = load_config(&data_dir)?;

        if let Err(e) = init_logging(&data_dir, &config) {
            eprintln!("[{}] logging unavailable: {}", chrono::Local::now().format("%H:%M:%S%.3f"), e);
        }

        let db_state = init_db(&config.db_path(&data_dir))
            .await
            .inspect_err(|e| {
                let _ = rolling_logger::error(&format!("DB init failed: {}", e));
            })?;
        let _ = rolling_logger::info("DB init success");

        let repo = Arc::new(ItemRepository::new(db_state.connection()));
        Ok(Self {
            config,
            data_dir,
            db_state,
            repo,
        })
    }

    /// A fresh list session in the configured default order
    pub fn session(&self) -> ListSession {
        ListSession::new(self.repo.clone(), &self.config)
    }
}

/// Install the rolling file logger under the configured log directory
pub fn init_logging(data_dir: &Path, config: &StoreConfig) -> Result<(), rolling_logger::LoggerError> {
    rolling_logger::init_logger(config.log_path(data_dir), APP_NAME)
}
