//! List session
//!
//! Glue between the live feed and the engine. Each upstream snapshot is
//! ingested and projected; row actions and form saves go straight to the
//! repository and come back through the feed. Nothing is applied locally
//! ahead of the store.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use checkmarket::sync::format_amount;
use checkmarket::{ActionOutcome, Item, ListEngine, Projection, SortKey, SwipeAction};

use crate::commands::{execute, save_item, PendingUndo, RawItemForm, SaveError, SaveOutcome};
use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::repository::{ItemRepository, Subscription};

pub struct ListSession {
    engine: ListEngine,
    repo: Arc<ItemRepository>,
    subscription: Subscription,
    undo_window: Duration,
    currency_symbol: String,
}

impl ListSession {
    pub fn new(repo: Arc<ItemRepository>, config: &StoreConfig) -> Self {
        let subscription = repo.subscribe(config.default_sort);
        Self {
            engine: ListEngine::with_sort_key(config.default_sort),
            repo,
            subscription,
            undo_window: config.undo_window(),
            currency_symbol: config.currency_symbol.clone(),
        }
    }

    pub fn engine(&self) -> &ListEngine {
        &self.engine
    }

    /// Wait for the next snapshot and project it.
    /// Failed reads are logged and skipped; `None` once the feed ends.
    pub async fn next_projection(&mut self) -> Option<Projection> {
        loop {
            match self.subscription.next().await? {
                Ok(items) => {
                    self.engine.ingest_snapshot(items);
                    return Some(self.engine.project());
                }
                Err(e) => warn!(error = %e, "snapshot read failed, keeping current view"),
            }
        }
    }

    /// Re-query upstream in the new order and re-project what is held now
    pub fn set_sort_key(&mut self, key: SortKey) -> Projection {
        self.engine.set_sort_key(key);
        self.subscription = self.repo.subscribe(key);
        self.engine.project()
    }

    pub fn set_filter_query(&mut self, query: Option<&str>) -> Projection {
        self.engine.set_filter_query(query);
        self.engine.project()
    }

    /// Run a row action. Deletes hand back the undo they can be reverted with.
    pub async fn swipe(&self, action: SwipeAction) -> StoreResult<Option<PendingUndo>> {
        let outcome = self.engine.dispatch(&action)?;
        match outcome {
            ActionOutcome::Write(command) => {
                execute(&self.repo, command)
                    .await
                    .inspect_err(|e| warn!(id = action.id(), error = %e, "row action failed"))?;
                Ok(None)
            }
            ActionOutcome::UndoableDelete { delete, restore } => {
                execute(&self.repo, delete.into())
                    .await
                    .inspect_err(|e| warn!(id = action.id(), error = %e, "delete failed"))?;
                Ok(Some(PendingUndo::new(restore, self.undo_window, Utc::now())))
            }
        }
    }

    /// Restore a deleted item. `false` when the window already closed.
    pub async fn undo(&self, pending: PendingUndo) -> StoreResult<bool> {
        let Some(restore) = pending.take(Utc::now()) else {
            info!("undo window closed");
            return Ok(false);
        };
        let id = restore.item.id.clone();
        execute(&self.repo, restore.into())
            .await
            .inspect_err(|e| warn!(id = %id, error = %e, "restore failed"))?;
        info!(id = %id, "item restored");
        Ok(true)
    }

    pub async fn save(&self, editing: Option<&Item>, form: &RawItemForm) -> Result<SaveOutcome, SaveError> {
        save_item(&self.repo, editing, form).await
    }

    /// Amount with the configured currency symbol
    pub fn format_amount(&self, value: f64) -> String {
        format_amount(value, &self.currency_symbol)
    }
}
