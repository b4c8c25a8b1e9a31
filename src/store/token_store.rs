//! SQLite-backed token cache

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::error::{Error, Result};

/// Key the WeGene bearer token lives under
pub const ACCESS_TOKEN_KEY: &str = "wegene_access_token";

/// Lifetime of a freshly issued access token
pub const TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Durable key-value cache holding the WeGene access token.
///
/// Writes are visible to every holder of the store immediately; the
/// callback listener and the tools share one instance.
pub struct TokenStore {
    conn: Mutex<Connection>,
}

impl TokenStore {
    /// Open or create the store at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::from_connection(Connection::open(path)?)
    }

    /// Non-persistent store, mostly for tests
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at INTEGER
            );
            "#,
        )?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Other("token store lock poisoned".into()))
    }

    /// Store the access token, replacing any previous one
    pub fn set_token(&self, token: &str, ttl: Duration) -> Result<()> {
        self.set(ACCESS_TOKEN_KEY, token, ttl)
    }

    /// Current access token, if one is stored and not expired
    pub fn get_token(&self) -> Result<Option<String>> {
        self.get(ACCESS_TOKEN_KEY)
    }

    /// Forget the access token
    pub fn delete_token(&self) -> Result<()> {
        self.delete(ACCESS_TOKEN_KEY)
    }

    pub fn has_token(&self) -> Result<bool> {
        Ok(self.get_token()?.is_some())
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let conn = self.conn()?;
        let expires_at = Utc::now().timestamp() + ttl.as_secs() as i64;

        conn.execute(
            r#"
            INSERT INTO kv (key, value, expires_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                expires_at = excluded.expires_at
            "#,
            params![key, value, expires_at],
        )?;

        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;

        let row: Option<(String, Option<i64>)> = conn
            .query_row(
                "SELECT value, expires_at FROM kv WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((_, Some(expires_at))) if expires_at <= Utc::now().timestamp() => {
                conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value)),
            None => Ok(None),
        }
    }

    fn delete(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}
