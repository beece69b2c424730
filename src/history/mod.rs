//! Per-user persistence of analysis results and mood check-ins.
//!
//! The analysis engine never touches this; callers inject a repository and
//! store what they choose to keep.

pub mod memory;
pub mod sqlite;

pub use memory::*;
pub use sqlite::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AnalysisRequest, AnalysisResult, MoodEntry};

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Corrupt history row {id}: {reason}")]
    CorruptRow { id: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("History store lock poisoned")]
    LockPoisoned,
}

/// What a history entry holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryRecord {
    SymptomCheck {
        request: AnalysisRequest,
        result: AnalysisResult,
    },
    Mood(MoodEntry),
}

impl HistoryRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SymptomCheck { .. } => "symptom_check",
            Self::Mood(_) => "mood",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub user_id: String,
    pub recorded_at: DateTime<Utc>,
    pub record: HistoryRecord,
}

impl HistoryEntry {
    pub fn new(user_id: &str, record: HistoryRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            recorded_at: Utc::now(),
            record,
        }
    }

    pub fn symptom_check(user_id: &str, request: AnalysisRequest, result: AnalysisResult) -> Self {
        Self::new(user_id, HistoryRecord::SymptomCheck { request, result })
    }

    pub fn mood(user_id: &str, entry: MoodEntry) -> Self {
        let recorded_at = entry.recorded_at;
        Self {
            recorded_at,
            ..Self::new(user_id, HistoryRecord::Mood(entry))
        }
    }

    pub fn as_mood(&self) -> Option<&MoodEntry> {
        match &self.record {
            HistoryRecord::Mood(entry) => Some(entry),
            HistoryRecord::SymptomCheck { .. } => None,
        }
    }
}

/// Document-store style history keyed by user id.
pub trait HistoryRepository: Send + Sync {
    /// All entries for a user, newest first.
    fn get(&self, user_id: &str) -> Result<Vec<HistoryEntry>, HistoryError>;

    /// Insert or replace an entry (keyed by entry id).
    fn put(&self, entry: &HistoryEntry) -> Result<(), HistoryError>;

    /// Remove one entry. Returns whether anything was deleted.
    fn delete(&self, user_id: &str, entry_id: &Uuid) -> Result<bool, HistoryError>;

    /// Remove every entry for a user. Returns the number removed.
    fn clear(&self, user_id: &str) -> Result<usize, HistoryError>;

    /// Mood check-ins for a user, newest first.
    fn moods(&self, user_id: &str) -> Result<Vec<MoodEntry>, HistoryError> {
        Ok(self
            .get(user_id)?
            .iter()
            .filter_map(|e| e.as_mood().cloned())
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::models::{
        BodyArea, Condition, MoodLevel, Remedy, RemedyKind, Severity, SeverityLevel,
        SymptomDuration,
    };

    pub fn symptom_entry(user_id: &str) -> HistoryEntry {
        let request = AnalysisRequest::new(
            vec!["Headache".into()],
            vec![BodyArea::Head],
            SymptomDuration::Hours,
            Severity::new(2).unwrap(),
        );
        let result = AnalysisResult {
            conditions: vec![Condition {
                name: "Migraine".into(),
                confidence: 61,
                description: "d".into(),
                severity: SeverityLevel::Mild,
            }],
            remedies: vec![Remedy::new(RemedyKind::Home, "Rest", "d")],
        };
        HistoryEntry::symptom_check(user_id, request, result)
    }

    pub fn mood_entry(user_id: &str, level: MoodLevel, minutes_ago: i64) -> HistoryEntry {
        let mut entry = MoodEntry::new(level, None);
        entry.recorded_at = Utc::now() - chrono::Duration::minutes(minutes_ago);
        HistoryEntry::mood(user_id, entry)
    }

    /// Behaviour every repository must share.
    pub fn exercise_repository(repo: &dyn HistoryRepository) {
        let older = mood_entry("alice", MoodLevel::Low, 30);
        let newer = symptom_entry("alice");
        let other = mood_entry("bob", MoodLevel::Great, 5);

        repo.put(&older).unwrap();
        repo.put(&newer).unwrap();
        repo.put(&other).unwrap();

        let alice = repo.get("alice").unwrap();
        assert_eq!(alice.len(), 2);
        assert_eq!(alice[0].id, newer.id, "newest first");
        assert_eq!(alice[1], older);

        assert_eq!(repo.moods("alice").unwrap().len(), 1);
        assert!(repo.get("nobody").unwrap().is_empty());

        // put with an existing id replaces
        let mut replaced = older.clone();
        replaced.record = HistoryRecord::Mood(MoodEntry {
            level: MoodLevel::Good,
            note: Some("better".into()),
            recorded_at: older.recorded_at,
        });
        repo.put(&replaced).unwrap();
        let alice = repo.get("alice").unwrap();
        assert_eq!(alice.len(), 2);
        assert_eq!(alice[1].as_mood().unwrap().level, MoodLevel::Good);

        // delete is scoped to the owning user
        assert!(!repo.delete("bob", &newer.id).unwrap());
        assert!(repo.delete("alice", &newer.id).unwrap());
        assert!(!repo.delete("alice", &newer.id).unwrap());

        assert_eq!(repo.clear("alice").unwrap(), 1);
        assert!(repo.get("alice").unwrap().is_empty());
        assert_eq!(repo.get("bob").unwrap().len(), 1);
    }
}
