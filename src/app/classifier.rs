use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::config::ClassificationConfig;
use crate::domain::{Classification, RawScore};
use crate::ports::ZeroShotClassifier;

/// Assigns canonical text to one of a fixed, ordered set of problem categories.
pub struct ProblemClassifier {
    classifier: Arc<dyn ZeroShotClassifier>,
    candidate_labels: Vec<String>,
    unknown_label: String,
}

impl ProblemClassifier {
    pub fn new(classifier: Arc<dyn ZeroShotClassifier>, config: &ClassificationConfig) -> Self {
        Self {
            classifier,
            candidate_labels: config.candidate_labels.clone(),
            unknown_label: config.unknown_label.clone(),
        }
    }

    pub fn candidate_labels(&self) -> &[String] {
        &self.candidate_labels
    }

    fn unknown(&self) -> Classification {
        Classification::new(self.unknown_label.clone(), 0.0)
    }

    /// Classify `text`, taking the top-ranked candidate.
    ///
    /// Blank text is reported as unknown without consulting the classifier,
    /// and so is any classifier failure.
    pub async fn classify(&self, text: &str) -> Classification {
        if text.trim().is_empty() {
            return self.unknown();
        }

        let output = match self.classifier.classify(text, &self.candidate_labels).await {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, "Classification failed, reporting unknown category");
                return self.unknown();
            }
        };

        let Some(label) = output.labels.first() else {
            warn!("Classifier returned no labels, reporting unknown category");
            return self.unknown();
        };

        let confidence = output
            .scores
            .first()
            .unwrap_or(&RawScore::Missing)
            .coerce_or_zero();

        debug!(label = %label, confidence, "Problem classified");
        Classification::new(label.clone(), confidence)
    }
}
