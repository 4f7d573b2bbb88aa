use async_trait::async_trait;

use crate::domain::{DomainError, RawScore};

/// Ranked output of a zero-shot classifier.
///
/// `labels` and `scores` are parallel and ordered by descending score.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ZeroShotOutput {
    pub labels: Vec<String>,
    pub scores: Vec<RawScore>,
}

/// Port for zero-shot text classification.
#[async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
    ) -> Result<ZeroShotOutput, DomainError>;
}
