use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;
use tracing::{debug, info};

use crate::version::error::StoreError;

/// Key-value store with optional per-entry expiry.
///
/// Backs both the registry response cache and the host's persisted options.
/// Implementations must make a single `get`/`set`/`delete` atomic.
#[cfg_attr(test, automock)]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value for `key`, or `None` if missing or expired
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Stores `value` under `key`. `None` ttl means the entry never expires.
    fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<(), StoreError>;

    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Source of the current time in milliseconds since UNIX epoch
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Schema migrations
/// Each version contains a list of SQL statements to execute
const MIGRATIONS: &[&[&str]] = &[
    // v1: index for purging expired entries
    &["CREATE INDEX IF NOT EXISTS idx_entries_expires_at ON entries(expires_at)"],
];

/// SQLite-backed [`KeyValueStore`]
pub struct SqliteStore {
    conn: Mutex<Connection>,
    clock: Clock,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        Self::open_with_clock(db_path, Arc::new(current_timestamp_ms))
    }

    /// Open the store with a custom time source
    pub fn open_with_clock(db_path: &Path, clock: Clock) -> Result<Self, StoreError> {
        info!("Initializing store database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let store = Self {
            conn: Mutex::new(conn),
            clock,
        };

        store.create_schema()?;
        info!("Store initialized successfully");

        Ok(store)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn create_schema(&self) -> Result<(), StoreError> {
        debug!("Creating database schema");

        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at INTEGER
            )
            "#,
            [],
        )?;

        Self::apply_migrations(&conn)?;

        debug!("Database schema created successfully");
        Ok(())
    }

    /// Apply pending migrations based on user_version pragma
    fn apply_migrations(conn: &Connection) -> Result<(), StoreError> {
        let current_version: i32 =
            conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        for (i, statements) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i32;
            if version > current_version {
                for sql in *statements {
                    conn.execute(sql, [])?;
                }
                debug!("Applied migration v{}", version);
            }
        }

        let target_version = MIGRATIONS.len() as i32;
        if target_version > current_version {
            conn.pragma_update(None, "user_version", target_version)?;
            debug!("Updated schema version to v{}", target_version);
        }

        Ok(())
    }

    /// Delete every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = (self.clock)();
        let conn = self.lock_conn()?;

        let removed = conn.execute(
            "DELETE FROM entries WHERE expires_at IS NOT NULL AND expires_at <= ?1",
            [now],
        )?;

        if removed > 0 {
            debug!("Purged {} expired entries", removed);
        }
        Ok(removed)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let now = (self.clock)();
        let conn = self.lock_conn()?;

        let row: Option<(String, Option<i64>)> = conn
            .query_row(
                "SELECT value, expires_at FROM entries WHERE key = ?1",
                [key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((value, expires_at)) = row else {
            return Ok(None);
        };

        if expires_at.is_some_and(|expires_at| expires_at <= now) {
            debug!("Entry {} expired, removing", key);
            conn.execute("DELETE FROM entries WHERE key = ?1", [key])?;
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&value)?))
    }

    fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<(), StoreError> {
        let expires_at = ttl.map(|ttl| (self.clock)() + ttl.as_millis() as i64);
        let value = serde_json::to_string(value)?;

        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO entries (key, value, expires_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at
            "#,
            (key, value, expires_at),
        )?;

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let conn = self.lock_conn()?;
        conn.execute("DELETE FROM entries WHERE key = ?1", [key])?;
        Ok(())
    }
}

/// Get current timestamp in milliseconds since UNIX epoch
fn current_timestamp_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicI64, Ordering};
    use tempfile::TempDir;

    fn manual_clock(start: i64) -> (Arc<AtomicI64>, Clock) {
        let now = Arc::new(AtomicI64::new(start));
        let handle = now.clone();
        (now, Arc::new(move || handle.load(Ordering::SeqCst)))
    }

    #[test]
    fn set_then_get_returns_value() {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteStore::open(&temp_dir.path().join("test.db")).unwrap();

        store
            .set("cau_acme-tool", &json!({"new_version": "2.4.0"}), None)
            .unwrap();

        assert_eq!(
            store.get("cau_acme-tool").unwrap(),
            Some(json!({"new_version": "2.4.0"}))
        );
    }

    #[test]
    fn get_returns_none_for_missing_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteStore::open(&temp_dir.path().join("test.db")).unwrap();

        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn set_overwrites_existing_value_and_expiry() {
        let temp_dir = TempDir::new().unwrap();
        let (now, clock) = manual_clock(1_000);
        let store = SqliteStore::open_with_clock(&temp_dir.path().join("test.db"), clock).unwrap();

        store
            .set("key", &json!(1), Some(Duration::from_secs(1)))
            .unwrap();
        store.set("key", &json!(2), None).unwrap();
        now.store(1_000_000, Ordering::SeqCst);

        assert_eq!(store.get("key").unwrap(), Some(json!(2)));
    }

    #[test]
    fn get_honors_ttl() {
        let temp_dir = TempDir::new().unwrap();
        let (now, clock) = manual_clock(1_000);
        let store = SqliteStore::open_with_clock(&temp_dir.path().join("test.db"), clock).unwrap();

        store
            .set("key", &json!("value"), Some(Duration::from_secs(150)))
            .unwrap();

        now.store(1_000 + 149_999, Ordering::SeqCst);
        assert_eq!(store.get("key").unwrap(), Some(json!("value")));

        now.store(1_000 + 150_000, Ordering::SeqCst);
        assert_eq!(store.get("key").unwrap(), None);
    }

    #[test]
    fn delete_removes_entry() {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteStore::open(&temp_dir.path().join("test.db")).unwrap();

        store.set("key", &json!(true), None).unwrap();
        store.delete("key").unwrap();

        assert_eq!(store.get("key").unwrap(), None);
        // Deleting a missing key is not an error
        store.delete("key").unwrap();
    }

    #[test]
    fn purge_expired_removes_only_expired_entries() {
        let temp_dir = TempDir::new().unwrap();
        let (now, clock) = manual_clock(0);
        let store = SqliteStore::open_with_clock(&temp_dir.path().join("test.db"), clock).unwrap();

        store
            .set("short", &json!(1), Some(Duration::from_secs(10)))
            .unwrap();
        store
            .set("long", &json!(2), Some(Duration::from_secs(1000)))
            .unwrap();
        store.set("forever", &json!(3), None).unwrap();

        now.store(60_000, Ordering::SeqCst);
        let removed = store.purge_expired().unwrap();

        assert_eq!(removed, 1);
        assert_eq!(store.get("long").unwrap(), Some(json!(2)));
        assert_eq!(store.get("forever").unwrap(), Some(json!(3)));
    }

    #[test]
    fn reopening_keeps_entries_and_schema_version() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        {
            let store = SqliteStore::open(&db_path).unwrap();
            store.set("cau_cleaned_legacy_transient", &json!(true), None).unwrap();
        }

        let store = SqliteStore::open(&db_path).unwrap();
        assert_eq!(
            store.get("cau_cleaned_legacy_transient").unwrap(),
            Some(json!(true))
        );

        let conn = store.lock_conn().unwrap();
        let version: i32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, MIGRATIONS.len() as i32);
    }
}
