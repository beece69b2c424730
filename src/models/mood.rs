use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::MoodLevel;

/// One mood check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub level: MoodLevel,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl MoodEntry {
    pub fn new(level: MoodLevel, note: Option<String>) -> Self {
        Self {
            level,
            note,
            recorded_at: Utc::now(),
        }
    }
}
