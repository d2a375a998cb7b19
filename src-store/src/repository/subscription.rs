//! Live snapshot feed
//!
//! Mirrors a realtime listener: the first `next()` delivers the current
//! listing at once, later calls wait for a write and deliver the complete
//! listing again. Writes that land while a listing is read are coalesced
//! into the next delivery.

use std::sync::Weak;
use tokio::sync::watch;

use checkmarket::{Item, SortKey};

use super::item_repo::ItemRepository;
use super::traits::OrderedRepository;
use crate::error::StoreResult;

pub struct Subscription {
    repo: Weak<ItemRepository>,
    changes: watch::Receiver<u64>,
    key: SortKey,
    primed: bool,
}

impl Subscription {
    pub(super) fn new(repo: Weak<ItemRepository>, changes: watch::Receiver<u64>, key: SortKey) -> Self {
        Self {
            repo,
            changes,
            key,
            primed: false,
        }
    }

    pub fn sort_key(&self) -> SortKey {
        self.key
    }

    /// Next full snapshot, `None` once the repository is gone
    pub async fn next(&mut self) -> Option<StoreResult<Vec<Item>>> {
        if self.primed {
            self.changes.changed().await.ok()?;
        }
        self.primed = true;
        self.changes.borrow_and_update();

        let repo = self.repo.upgrade()?;
        Some(repo.list_ordered(self.key).await)
    }
}
