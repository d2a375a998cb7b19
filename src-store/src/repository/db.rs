//! Database Connection and Setup
//!
//! Opens the SQLite document table and runs migrations.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::StoreResult;

pub const MEMORY_DB: &str = ":memory:";

/// Database state wrapper
#[derive(Clone)]
pub struct DbState {
    pub conn: Arc<Mutex<Connection>>,
    pub path: PathBuf,
}

impl DbState {
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }
}

/// Initialize database with path. `:memory:` opens a private in-memory database.
pub async fn init_db(db_path: &Path) -> StoreResult<DbState> {
    let conn = if db_path == Path::new(MEMORY_DB) {
        Connection::open_in_memory()?
    } else {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Connection::open(db_path)?
    };

    run_migrations(&conn)?;
    info!(path = %db_path.display(), "database ready");

    Ok(DbState {
        conn: Arc::new(Mutex::new(conn)),
        path: db_path.to_path_buf(),
    })
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> StoreResult<()> {
    // One row per document; the body is the JSON object without the id
    conn.execute(
        "CREATE TABLE IF NOT EXISTS items (
            id TEXT PRIMARY KEY,
            data TEXT NOT NULL,
            created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        )",
        [],
    )?;

    // Added after the first schema shipped
    if !column_exists(conn, "items", "updated_at")? {
        conn.execute(
            "ALTER TABLE items ADD COLUMN updated_at INTEGER NOT NULL DEFAULT 0",
            [],
        )?;
    }

    // Indexes backing the three list orderings
    for field in ["name", "category", "purchased"] {
        conn.execute(
            &format!(
                "CREATE INDEX IF NOT EXISTS idx_items_{field} ON items(json_extract(data, '$.{field}'), id)"
            ),
            [],
        )?;
    }

    Ok(())
}
