// 🗄️ Entry Store - whole collection persisted as one value under a fixed key
// Get / replace-all only. Each write bumps a revision so writers can detect
// that someone else wrote in between their read and their write.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::entry::Entry;
use crate::error::StoreError;

/// Key under which the collection is stored
pub const ENTRIES_KEY: &str = "adspend-entries";

pub type Result<T> = std::result::Result<T, StoreError>;

/// Collection as read from the store, tagged with its revision
/// Revision 0 means the key has never been written
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub entries: Vec<Entry>,
    pub revision: u64,
}

/// Key-value backend holding the entry collection
pub trait EntryStore: Send + Sync {
    /// Current collection and revision (empty collection if never written)
    fn snapshot(&self) -> Result<Snapshot>;

    /// Replace the collection only if the stored revision still equals
    /// `expected_revision`. Returns false when another writer got there first.
    fn compare_and_swap(&self, expected_revision: u64, entries: &[Entry]) -> Result<bool>;

    /// Unconditional replace-all
    fn write(&self, entries: &[Entry]) -> Result<()>;

    /// Persisted collection, or empty if never initialized
    fn read(&self) -> Result<Vec<Entry>> {
        Ok(self.snapshot()?.entries)
    }
}

impl<T: EntryStore + ?Sized> EntryStore for Box<T> {
    fn snapshot(&self) -> Result<Snapshot> {
        (**self).snapshot()
    }

    fn compare_and_swap(&self, expected_revision: u64, entries: &[Entry]) -> Result<bool> {
        (**self).compare_and_swap(expected_revision, entries)
    }

    fn write(&self, entries: &[Entry]) -> Result<()> {
        (**self).write(entries)
    }
}

// ============================================================================
// SQLITE BACKEND
// ============================================================================

/// SQLite-backed key-value store
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        // Enable WAL mode for crash recovery
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        setup_kv_table(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

pub fn setup_kv_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            revision INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

impl EntryStore for SqliteStore {
    fn snapshot(&self) -> Result<Snapshot> {
        let conn = self.lock()?;
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT value, revision FROM kv_store WHERE key = ?1",
                params![ENTRIES_KEY],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((value, revision)) => Ok(Snapshot {
                entries: serde_json::from_str(&value)?,
                revision: revision as u64,
            }),
            None => Ok(Snapshot::default()),
        }
    }

    fn compare_and_swap(&self, expected_revision: u64, entries: &[Entry]) -> Result<bool> {
        let value = serde_json::to_string(entries)?;
        let now = Utc::now().to_rfc3339();
        let conn = self.lock()?;

        let changed = if expected_revision == 0 {
            conn.execute(
                "INSERT INTO kv_store (key, value, revision, updated_at)
                 VALUES (?1, ?2, 1, ?3)
                 ON CONFLICT(key) DO NOTHING",
                params![ENTRIES_KEY, value, now],
            )?
        } else {
            conn.execute(
                "UPDATE kv_store
                 SET value = ?2, revision = revision + 1, updated_at = ?3
                 WHERE key = ?1 AND revision = ?4",
                params![ENTRIES_KEY, value, now, expected_revision as i64],
            )?
        };

        debug!(
            expected_revision,
            entries = entries.len(),
            applied = (changed == 1),
            "compare-and-swap on entry collection"
        );
        Ok(changed == 1)
    }

    fn write(&self, entries: &[Entry]) -> Result<()> {
        let value = serde_json::to_string(entries)?;
        let now = Utc::now().to_rfc3339();
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv_store (key, value, revision, updated_at)
             VALUES (?1, ?2, 1, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                revision = kv_store.revision + 1,
                updated_at = excluded.updated_at",
            params![ENTRIES_KEY, value, now],
        )?;
        debug!(entries = entries.len(), "replaced entry collection");
        Ok(())
    }
}

// ============================================================================
// IN-MEMORY BACKEND
// ============================================================================

/// Process-local store. Keeps the serialized value so decoding behaves the
/// same as the SQLite backend.
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<(String, u64)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with a raw stored value (useful for exercising decode failures)
    pub fn with_raw_value(value: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some((value.into(), 1))),
        }
    }
}

impl EntryStore for MemoryStore {
    fn snapshot(&self) -> Result<Snapshot> {
        let slot = self.slot.lock().map_err(|_| StoreError::Poisoned)?;
        match slot.as_ref() {
            Some((value, revision)) => Ok(Snapshot {
                entries: serde_json::from_str(value)?,
                revision: *revision,
            }),
            None => Ok(Snapshot::default()),
        }
    }

    fn compare_and_swap(&self, expected_revision: u64, entries: &[Entry]) -> Result<bool> {
        let value = serde_json::to_string(entries)?;
        let mut slot = self.slot.lock().map_err(|_| StoreError::Poisoned)?;
        let current = slot.as_ref().map(|(_, rev)| *rev).unwrap_or(0);
        if current != expected_revision {
            return Ok(false);
        }
        *slot = Some((value, current + 1));
        Ok(true)
    }

    fn write(&self, entries: &[Entry]) -> Result<()> {
        let value = serde_json::to_string(entries)?;
        let mut slot = self.slot.lock().map_err(|_| StoreError::Poisoned)?;
        let next = slot.as_ref().map(|(_, rev)| *rev).unwrap_or(0) + 1;
        *slot = Some((value, next));
        Ok(())
    }
}
