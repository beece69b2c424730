use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{HistoryEntry, HistoryError, HistoryRecord, HistoryRepository};

/// SQLite-backed history. One connection, serialised behind a mutex.
pub struct SqliteHistoryRepository {
    conn: Mutex<Connection>,
}

impl SqliteHistoryRepository {
    /// Open (creating parent directories) and migrate a database file.
    pub fn open(path: &Path) -> Result<Self, HistoryError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_memory() -> Result<Self, HistoryError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, HistoryError> {
        conn.execute_batch("PRAGMA journal_mode=DELETE;")?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, HistoryError> {
        self.conn.lock().map_err(|_| HistoryError::LockPoisoned)
    }
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), HistoryError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![(
        1,
        include_str!("../../resources/migrations/001_history.sql"),
    )];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running history migration v{version}");
            conn.execute_batch(sql)
                .map_err(|e| HistoryError::MigrationFailed {
                    version,
                    reason: e.to_string(),
                })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet)
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, i64>(0)
    })
    .unwrap_or(0)
}

impl HistoryRepository for SqliteHistoryRepository {
    fn get(&self, user_id: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, recorded_at, payload FROM history_entries
             WHERE user_id = ?1 ORDER BY recorded_at DESC, rowid DESC",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, DateTime<Utc>>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, recorded_at, payload) = row?;
            let parsed_id = Uuid::parse_str(&id).map_err(|e| HistoryError::CorruptRow {
                id: id.clone(),
                reason: e.to_string(),
            })?;
            let record: HistoryRecord = serde_json::from_str(&payload)?;
            entries.push(HistoryEntry {
                id: parsed_id,
                user_id: user_id.to_string(),
                recorded_at,
                record,
            });
        }
        Ok(entries)
    }

    fn put(&self, entry: &HistoryEntry) -> Result<(), HistoryError> {
        let payload = serde_json::to_string(&entry.record)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO history_entries (id, user_id, kind, recorded_at, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.id.to_string(),
                entry.user_id,
                entry.record.kind(),
                entry.recorded_at,
                payload,
            ],
        )?;
        tracing::debug!(kind = entry.record.kind(), "History entry stored");
        Ok(())
    }

    fn delete(&self, user_id: &str, entry_id: &Uuid) -> Result<bool, HistoryError> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM history_entries WHERE user_id = ?1 AND id = ?2",
            params![user_id, entry_id.to_string()],
        )?;
        Ok(removed > 0)
    }

    fn clear(&self, user_id: &str) -> Result<usize, HistoryError> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM history_entries WHERE user_id = ?1",
            params![user_id],
        )?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::models::MoodLevel;

    #[test]
    fn sqlite_repository_contract() {
        let repo = SqliteHistoryRepository::open_memory().unwrap();
        exercise_repository(&repo);
    }

    #[test]
    fn migration_idempotent() {
        let repo = SqliteHistoryRepository::open_memory().unwrap();
        let conn = repo.conn().unwrap();
        assert!(run_migrations(&conn).is_ok());
        assert_eq!(get_current_version(&conn), 1);
    }

    #[test]
    fn file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.db");
        let entry = mood_entry("carol", MoodLevel::Okay, 1);

        {
            let repo = SqliteHistoryRepository::open(&path).unwrap();
            repo.put(&entry).unwrap();
        }

        let repo = SqliteHistoryRepository::open(&path).unwrap();
        let stored = repo.get("carol").unwrap();
        assert_eq!(stored, vec![entry]);
    }

    #[test]
    fn corrupt_payload_is_reported() {
        let repo = SqliteHistoryRepository::open_memory().unwrap();
        repo.conn()
            .unwrap()
            .execute(
                "INSERT INTO history_entries (id, user_id, kind, recorded_at, payload)
                 VALUES (?1, 'dave', 'mood', ?2, '{not json')",
                params![Uuid::new_v4().to_string(), Utc::now()],
            )
            .unwrap();

        assert!(matches!(
            repo.get("dave"),
            Err(HistoryError::Serialization(_))
        ));
    }
}
