use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use contracts::{Quest, UserDocument, UserStats};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{error, warn};

#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    Serde(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::Serde(err) => write!(f, "serde error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

/// Raw per-key document operations. `store_progress` writes quests and
/// stats in a single atomic step; boolean results report whether the
/// document existed.
pub trait DocumentBackend: Send + Sync {
    fn fetch(&self, email: &str) -> Result<Option<UserDocument>, StoreError>;
    fn insert_if_absent(&self, document: &UserDocument) -> Result<(), StoreError>;
    fn store_quests(&self, email: &str, quests: &[Quest]) -> Result<bool, StoreError>;
    fn store_progress(
        &self,
        email: &str,
        quests: &[Quest],
        stats: &UserStats,
    ) -> Result<bool, StoreError>;
}

#[derive(Debug)]
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let backend = Self {
            conn: Mutex::new(conn),
        };
        backend.migrate()?;
        Ok(backend)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn().execute(
            "CREATE TABLE IF NOT EXISTS users (
                email TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                stats_json TEXT NOT NULL,
                quests_json TEXT NOT NULL
             )",
            [],
        )?;
        Ok(())
    }
}

impl DocumentBackend for SqliteBackend {
    fn fetch(&self, email: &str) -> Result<Option<UserDocument>, StoreError> {
        let row = self
            .conn()
            .query_row(
                "SELECT name, created_at, stats_json, quests_json
                 FROM users WHERE email = ?1",
                params![email],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((name, created_at, stats_json, quests_json)) = row else {
            return Ok(None);
        };

        Ok(Some(UserDocument {
            email: email.to_string(),
            name,
            created_at,
            stats: serde_json::from_str(&stats_json)?,
            quests: serde_json::from_str(&quests_json)?,
        }))
    }

    fn insert_if_absent(&self, document: &UserDocument) -> Result<(), StoreError> {
        let stats_json = serde_json::to_string(&document.stats)?;
        let quests_json = serde_json::to_string(&document.quests)?;
        self.conn().execute(
            "INSERT OR IGNORE INTO users (email, name, created_at, stats_json, quests_json)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                document.email.as_str(),
                document.name.as_str(),
                document.created_at.as_str(),
                stats_json,
                quests_json,
            ],
        )?;
        Ok(())
    }

    fn store_quests(&self, email: &str, quests: &[Quest]) -> Result<bool, StoreError> {
        let quests_json = serde_json::to_string(quests)?;
        let changed = self.conn().execute(
            "UPDATE users SET quests_json = ?2 WHERE email = ?1",
            params![email, quests_json],
        )?;
        Ok(changed > 0)
    }

    fn store_progress(
        &self,
        email: &str,
        quests: &[Quest],
        stats: &UserStats,
    ) -> Result<bool, StoreError> {
        let quests_json = serde_json::to_string(quests)?;
        let stats_json = serde_json::to_string(stats)?;
        // One statement, so a completed quest and its reward land together.
        let changed = self.conn().execute(
            "UPDATE users SET quests_json = ?2, stats_json = ?3 WHERE email = ?1",
            params![email, quests_json, stats_json],
        )?;
        Ok(changed > 0)
    }
}

/// Non-persistent fallback used when no sqlite store is configured or it
/// cannot be opened. Data lives for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    documents: Mutex<HashMap<String, UserDocument>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, HashMap<String, UserDocument>> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentBackend for MemoryBackend {
    fn fetch(&self, email: &str) -> Result<Option<UserDocument>, StoreError> {
        Ok(self.guard().get(email).cloned())
    }

    fn insert_if_absent(&self, document: &UserDocument) -> Result<(), StoreError> {
        self.guard()
            .entry(document.email.clone())
            .or_insert_with(|| document.clone());
        Ok(())
    }

    fn store_quests(&self, email: &str, quests: &[Quest]) -> Result<bool, StoreError> {
        let mut documents = self.guard();
        let Some(document) = documents.get_mut(email) else {
            return Ok(false);
        };
        document.quests = quests.to_vec();
        Ok(true)
    }

    fn store_progress(
        &self,
        email: &str,
        quests: &[Quest],
        stats: &UserStats,
    ) -> Result<bool, StoreError> {
        let mut documents = self.guard();
        let Some(document) = documents.get_mut(email) else {
            return Ok(false);
        };
        document.quests = quests.to_vec();
        document.stats = *stats;
        Ok(true)
    }
}

pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// The injected document store handed to the router at startup. Owns the
/// degrade-to-default policy: reads never fail the caller, writes report
/// success as a boolean, and internal errors are logged here.
#[derive(Clone)]
pub struct Documents {
    backend: Arc<dyn DocumentBackend>,
}

impl Documents {
    /// Open the sqlite-backed store, or fall back to the in-memory store
    /// so the product stays usable without persistence.
    pub fn open(path: impl AsRef<Path>) -> Self {
        match SqliteBackend::open(&path) {
            Ok(backend) => Self {
                backend: Arc::new(backend),
            },
            Err(err) => {
                warn!(
                    "sqlite store at {} unavailable ({err}), using in-memory documents",
                    path.as_ref().display()
                );
                Self::in_memory()
            }
        }
    }

    pub fn in_memory() -> Self {
        Self {
            backend: Arc::new(MemoryBackend::new()),
        }
    }

    /// Raw fetch for callers that must tell an absent document apart from
    /// an unreachable store.
    pub fn load(&self, email: &str) -> Result<Option<UserDocument>, StoreError> {
        self.backend.fetch(email)
    }

    /// The stored document, or a synthesized first-run default. Never
    /// fails the caller.
    pub fn get_document(&self, email: &str) -> UserDocument {
        match self.backend.fetch(email) {
            Ok(Some(document)) => document,
            Ok(None) => UserDocument::new(email, "", now_rfc3339()),
            Err(err) => {
                warn!("reading document for {email} failed ({err}), serving default");
                UserDocument::new(email, "", now_rfc3339())
            }
        }
    }

    /// Create the document if absent; a repeat call is a no-op. Returns
    /// whether the store accepted the write.
    pub fn create_document(&self, email: &str, name: &str) -> bool {
        let document = UserDocument::new(email, name, now_rfc3339());
        match self.backend.insert_if_absent(&document) {
            Ok(()) => true,
            Err(err) => {
                error!("creating document for {email} failed: {err}");
                false
            }
        }
    }

    /// Wholesale quests replacement. False when the document is absent or
    /// the store errored.
    pub fn update_quests(&self, email: &str, quests: &[Quest]) -> bool {
        match self.backend.store_quests(email, quests) {
            Ok(existed) => existed,
            Err(err) => {
                error!("updating quests for {email} failed: {err}");
                false
            }
        }
    }

    /// Atomic quests+stats write used when a completion awards progression.
    pub fn update_progress(&self, email: &str, quests: &[Quest], stats: &UserStats) -> bool {
        match self.backend.store_progress(email, quests, stats) {
            Ok(existed) => existed,
            Err(err) => {
                error!("updating progress for {email} failed: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::default_daily_quest;

    fn backend_contract(backend: &dyn DocumentBackend) {
        let document = UserDocument::new("hunter@example.com", "Hunter", "2026-01-01T00:00:00Z");

        assert!(backend.fetch("hunter@example.com").expect("fetch").is_none());
        assert!(!backend
            .store_quests("hunter@example.com", &document.quests)
            .expect("update missing"));

        backend.insert_if_absent(&document).expect("insert");
        let stored = backend
            .fetch("hunter@example.com")
            .expect("fetch")
            .expect("present");
        assert_eq!(stored, document);

        // A second insert must not clobber accumulated progress.
        let mut quests = stored.quests.clone();
        quests[0].tasks[0].current = 42.0;
        let stats = UserStats {
            exp: 50,
            ..stored.stats
        };
        assert!(backend
            .store_progress("hunter@example.com", &quests, &stats)
            .expect("store progress"));
        backend.insert_if_absent(&document).expect("reinsert");

        let after = backend
            .fetch("hunter@example.com")
            .expect("fetch")
            .expect("present");
        assert_eq!(after.quests[0].tasks[0].current, 42.0);
        assert_eq!(after.stats.exp, 50);
    }

    #[test]
    fn memory_backend_honors_the_contract() {
        backend_contract(&MemoryBackend::new());
    }

    #[test]
    fn sqlite_backend_honors_the_contract() {
        let path = std::env::temp_dir().join(format!(
            "arise_store_contract_{}.sqlite",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let backend = SqliteBackend::open(&path).expect("open sqlite");
        backend_contract(&backend);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn sqlite_documents_survive_reopen() {
        let path = std::env::temp_dir().join(format!(
            "arise_store_reopen_{}.sqlite",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        {
            let documents = Documents::open(&path);
            assert!(documents.create_document("solo@example.com", "Solo"));
        }
        let documents = Documents::open(&path);
        let stored = documents
            .load("solo@example.com")
            .expect("load")
            .expect("present");
        assert_eq!(stored.name, "Solo");
        assert_eq!(stored.quests, vec![default_daily_quest()]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unreachable_store_degrades_to_memory() {
        let documents = Documents::open("/nonexistent/dir/arise.sqlite");
        assert!(documents.create_document("demo@example.com", "Demo"));
        let document = documents.get_document("demo@example.com");
        assert_eq!(document.name, "Demo");
    }

    #[test]
    fn get_document_synthesizes_a_default_for_unknown_users() {
        let documents = Documents::in_memory();
        let document = documents.get_document("new@example.com");
        assert_eq!(document.email, "new@example.com");
        assert_eq!(document.stats.level, 1);
        assert_eq!(document.quests, vec![default_daily_quest()]);
        // Synthesized, not stored.
        assert!(documents.load("new@example.com").expect("load").is_none());
    }
}
