use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use super::{HistoryEntry, HistoryError, HistoryRepository};

/// Process-local history, for tests and ephemeral sessions.
#[derive(Default)]
pub struct InMemoryHistoryRepository {
    entries: Mutex<HashMap<String, Vec<HistoryEntry>>>,
}

impl InMemoryHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<HistoryEntry>>>, HistoryError> {
        self.entries.lock().map_err(|_| HistoryError::LockPoisoned)
    }
}

impl HistoryRepository for InMemoryHistoryRepository {
    fn get(&self, user_id: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
        let mut entries = self
            .entries()?
            .get(user_id)
            .cloned()
            .unwrap_or_default();
        // Stable sort keeps later inserts first among equal timestamps.
        entries.reverse();
        entries.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(entries)
    }

    fn put(&self, entry: &HistoryEntry) -> Result<(), HistoryError> {
        let mut all = self.entries()?;
        let user = all.entry(entry.user_id.clone()).or_default();
        match user.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry.clone(),
            None => user.push(entry.clone()),
        }
        Ok(())
    }

    fn delete(&self, user_id: &str, entry_id: &Uuid) -> Result<bool, HistoryError> {
        let mut all = self.entries()?;
        let Some(user) = all.get_mut(user_id) else {
            return Ok(false);
        };
        let before = user.len();
        user.retain(|e| e.id != *entry_id);
        Ok(user.len() != before)
    }

    fn clear(&self, user_id: &str) -> Result<usize, HistoryError> {
        Ok(self
            .entries()?
            .remove(user_id)
            .map(|entries| entries.len())
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn memory_repository_contract() {
        exercise_repository(&InMemoryHistoryRepository::new());
    }
}
