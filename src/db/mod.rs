mod from_row;
mod schema;
pub mod queries;

pub use schema::init_db;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

use crate::engine::Engine;
use crate::error::Result;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Injected handle to the persistent store.
///
/// Every logical operation checks out its own connection and returns it
/// when done; nothing holds a connection across requests.
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
}

impl Store {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }
}

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub engine: Arc<Engine>,
    /// Hostname embedded in connection info handed to technicians
    pub server_domain: String,
    /// Static bearer key guarding the admin API (None = open)
    pub admin_api_key: Option<String>,
    pub downloads_path: PathBuf,
}

pub fn create_pool(database_path: &str) -> std::result::Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path).with_init(|conn| {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
    });
    Pool::builder()
        .max_size(10)
        .connection_timeout(Duration::from_secs(10))
        .build(manager)
}
