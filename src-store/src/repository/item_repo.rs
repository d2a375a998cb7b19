//! Item Repository Implementation
//!
//! SQLite-backed implementation of Repository<Item> and OrderedRepository<Item>.
//! Every successful write bumps a change counter that live subscriptions watch.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use checkmarket::{decode_document, DomainError, Item, ItemPatch, SortKey};

use super::subscription::Subscription;
use super::traits::{OrderedRepository, Repository};
use crate::error::{StoreResult, UpstreamError};

const ID_LEN: usize = 20;

static ID_SEQ: AtomicU64 = AtomicU64::new(0);

/// SQLite implementation of Item repository
pub struct ItemRepository {
    conn: Arc<Mutex<Connection>>,
    changes: watch::Sender<u64>,
}

impl ItemRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        let (changes, _) = watch::channel(0);
        Self { conn, changes }
    }

    /// Live full-snapshot feed in the given order.
    /// The feed ends once the repository is dropped.
    pub fn subscribe(self: &Arc<Self>, key: SortKey) -> Subscription {
        Subscription::new(Arc::downgrade(self), self.changes.subscribe(), key)
    }

    /// Merge `patch` into the stored document
    pub async fn update(&self, id: &str, patch: &ItemPatch) -> StoreResult<Item> {
        let updated = {
            let conn = self.conn.lock().await;
            let mut item = read_document(&conn, id)?.ok_or_else(|| UpstreamError::not_found(id))?;
            patch.apply(&mut item);
            write_document(&conn, &item)?;
            item
        };
        self.notify();
        info!(id, "item updated");
        Ok(updated)
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version = version.wrapping_add(1));
    }
}

/// Fresh opaque document id
fn next_id() -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let seq = ID_SEQ.fetch_add(1, Ordering::Relaxed);
    let mut hasher = blake3::Hasher::new();
    hasher.update(&nanos.to_le_bytes());
    hasher.update(&seq.to_le_bytes());
    hasher.update(&std::process::id().to_le_bytes());
    let hex = hasher.finalize().to_hex();
    hex.as_str()[..ID_LEN].to_string()
}

fn read_document(conn: &Connection, id: &str) -> StoreResult<Option<Item>> {
    let data: Option<String> = conn
        .query_row("SELECT data FROM items WHERE id = ?1", params![id], |row| row.get(0))
        .optional()?;
    match data {
        Some(data) => {
            let body: Value = serde_json::from_str(&data)?;
            Ok(Some(decode_document(id, &body)?))
        }
        None => Ok(None),
    }
}

/// Upsert the full document body
fn write_document(conn: &Connection, item: &Item) -> StoreResult<()> {
    let data = serde_json::to_string(&Value::Object(item.to_document()))?;
    conn.execute(
        "INSERT INTO items (id, data, updated_at) VALUES (?1, ?2, strftime('%s', 'now'))
         ON CONFLICT(id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
        params![item.id, data],
    )?;
    Ok(())
}

/// Decode every row, skipping documents that no longer decode
fn read_listing(conn: &Connection, sql: &str) -> StoreResult<Vec<Item>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

    let mut items = Vec::new();
    for row in rows {
        let (id, data) = row?;
        let decoded = serde_json::from_str::<Value>(&data)
            .map_err(UpstreamError::from)
            .and_then(|body| decode_document(&id, &body).map_err(UpstreamError::from));
        match decoded {
            Ok(item) => items.push(item),
            Err(e) => warn!(id = %id, error = %e, "skipping malformed document"),
        }
    }
    Ok(items)
}

#[async_trait]
impl Repository<Item> for ItemRepository {
    async fn create(&self, entity: &Item) -> StoreResult<String> {
        let item = Item {
            id: next_id(),
            ..entity.clone()
        };
        {
            let conn = self.conn.lock().await;
            write_document(&conn, &item)?;
        }
        self.notify();
        info!(id = %item.id, name = %item.name, "item created");
        Ok(item.id)
    }

    async fn find_by_id(&self, id: &String) -> StoreResult<Option<Item>> {
        let conn = self.conn.lock().await;
        read_document(&conn, id)
    }

    async fn list(&self) -> StoreResult<Vec<Item>> {
        let conn = self.conn.lock().await;
        read_listing(&conn, "SELECT id, data FROM items ORDER BY id ASC")
    }

    async fn replace(&self, entity: &Item) -> StoreResult<()> {
        if !entity.is_saved() {
            return Err(DomainError::InvalidInput("cannot replace an item without id".to_string()).into());
        }
        {
            let conn = self.conn.lock().await;
            write_document(&conn, entity)?;
        }
        self.notify();
        info!(id = %entity.id, "item replaced");
        Ok(())
    }

    async fn delete(&self, id: &String) -> StoreResult<()> {
        let removed = {
            let conn = self.conn.lock().await;
            conn.execute("DELETE FROM items WHERE id = ?1", params![id])?
        };
        if removed > 0 {
            self.notify();
            info!(id = %id, "item deleted");
        }
        Ok(())
    }
}

#[async_trait]
impl OrderedRepository<Item> for ItemRepository {
    async fn list_ordered(&self, key: SortKey) -> StoreResult<Vec<Item>> {
        let sql = format!(
            "SELECT id, data FROM items ORDER BY json_extract(data, '$.{}') ASC, id ASC",
            key.field()
        );
        let conn = self.conn.lock().await;
        read_listing(&conn, &sql)
    }
}
