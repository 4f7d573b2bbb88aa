use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use crate::domain::{DomainError, IntakeRecord};
use crate::ports::{IntakeStore, StoredIntake};

/// Process-local intake store, mainly for tests and demos.
#[derive(Default)]
pub struct InMemoryIntakeStore {
    records: RwLock<Vec<(StoredIntake, IntakeRecord)>>,
}

impl InMemoryIntakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a stored record by id.
    pub fn get(&self, id: i64) -> Option<IntakeRecord> {
        self.records
            .read()
            .iter()
            .find(|(stored, _)| stored.id == id)
            .map(|(_, record)| record.clone())
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl IntakeStore for InMemoryIntakeStore {
    async fn persist(&self, record: IntakeRecord) -> Result<StoredIntake, DomainError> {
        let mut records = self.records.write();
        let stored = StoredIntake {
            id: records.len() as i64 + 1,
            created_at: Utc::now(),
        };
        records.push((stored, record));

        debug!(id = stored.id, "Intake kept in memory");
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Classification;

    fn record(text: &str) -> IntakeRecord {
        IntakeRecord {
            canonical_text: text.to_string(),
            entities: vec![],
            classification: Classification::new("general inquiry", 0.5),
        }
    }

    #[tokio::test]
    async fn test_ids_increase() {
        let store = InMemoryIntakeStore::new();
        assert!(store.is_empty());

        let first = store.persist(record("one")).await.unwrap();
        let second = store.persist(record("two")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(second.created_at >= first.created_at);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(2).unwrap().canonical_text, "two");
        assert!(store.get(3).is_none());
    }
}
