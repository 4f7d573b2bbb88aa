use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, IntakeRecord};

/// Metadata assigned by the store when a record is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredIntake {
    pub id: i64,
    pub created_at: DateTime<Utc>,
}

/// Port for persisting finished intake records.
///
/// The record is handed over by value; the pipeline keeps no copy.
#[async_trait]
pub trait IntakeStore: Send + Sync {
    async fn persist(&self, record: IntakeRecord) -> Result<StoredIntake, DomainError>;
}
