use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::app::{EntityExtractor, ProblemClassifier, TranscriptionResolver};
use crate::domain::config::IntakeConfig;
use crate::domain::{DomainError, IntakeRecord, IntakeSubmission, MediaBlob, Modality, TextFragment};
use crate::ports::{DocumentTextExtractor, MediaStager, StagedMedia};

/// Merges per-modality text into one canonical document and derives the
/// structured record from it.
pub struct IntakeAggregator {
    resolver: TranscriptionResolver,
    ocr: Arc<dyn DocumentTextExtractor>,
    stager: Arc<dyn MediaStager>,
    entities: EntityExtractor,
    classifier: ProblemClassifier,
    config: IntakeConfig,
}

impl IntakeAggregator {
    pub fn new(
        resolver: TranscriptionResolver,
        ocr: Arc<dyn DocumentTextExtractor>,
        stager: Arc<dyn MediaStager>,
        entities: EntityExtractor,
        classifier: ProblemClassifier,
        config: IntakeConfig,
    ) -> Self {
        Self {
            resolver,
            ocr,
            stager,
            entities,
            classifier,
            config,
        }
    }

    /// Build the intake record for one submission.
    ///
    /// Fails with `NoInputProvided` when nothing was submitted and with
    /// `EmptyExtractionResult` when every submitted modality produced blank
    /// text. Every other fault degrades the affected modality to empty text.
    pub async fn aggregate(&self, submission: &IntakeSubmission) -> Result<IntakeRecord, DomainError> {
        if submission.is_empty() {
            return Err(DomainError::NoInputProvided);
        }

        // Independent branches; the join order below does not depend on which finishes first.
        let (audio, image) = tokio::join!(
            self.audio_fragment(submission.audio.as_ref(), submission.preferred_language.as_deref()),
            self.image_fragment(submission.image.as_ref()),
        );

        let mut fragments = Vec::with_capacity(3);
        if let Some(text) = &submission.text {
            fragments.push(TextFragment::new(Modality::Text, text.as_str()));
        }
        fragments.extend(audio);
        fragments.extend(image);

        let canonical_text = self.join(fragments);
        if canonical_text.is_empty() {
            info!("All submitted inputs produced blank text");
            return Err(DomainError::EmptyExtractionResult);
        }

        let entities = self.entities.extract(&canonical_text).await;
        let classification = self.classifier.classify(&canonical_text).await;

        info!(
            text_len = canonical_text.len(),
            entities = entities.len(),
            category = %classification.label,
            confidence = classification.confidence_score,
            "Intake aggregated"
        );

        Ok(IntakeRecord {
            canonical_text,
            entities,
            classification,
        })
    }

    /// Join non-blank fragments in the configured source order.
    fn join(&self, fragments: Vec<TextFragment>) -> String {
        let mut parts = Vec::with_capacity(fragments.len());
        for modality in &self.config.fragment_order {
            for fragment in fragments.iter().filter(|f| f.source == *modality) {
                if fragment.is_blank() {
                    debug!(source = %fragment.source, "Dropping blank fragment");
                    continue;
                }
                parts.push(fragment.content.trim());
            }
        }
        parts.join(self.config.separator.as_str())
    }

    async fn audio_fragment(
        &self,
        audio: Option<&MediaBlob>,
        preferred_language: Option<&str>,
    ) -> Option<TextFragment> {
        let blob = audio?;
        if blob.is_empty() {
            return Some(TextFragment::new(Modality::Audio, ""));
        }

        info!(
            bytes = blob.len(),
            file_name = ?blob.file_name(),
            content_type = ?blob.content_type(),
            "Received audio"
        );

        let staged = match self.stager.stage(blob, &self.config.audio_suffix) {
            Ok(staged) => staged,
            Err(e) => {
                warn!(error = %e, "Could not stage audio, skipping transcription");
                return Some(TextFragment::new(Modality::Audio, ""));
            }
        };

        let result = self.resolver.resolve(staged.path(), preferred_language).await;
        release(staged, Modality::Audio);

        let text = result.unwrap_or_else(|e| {
            warn!(error = %e, "Transcription failed, continuing without audio text");
            String::new()
        });
        Some(TextFragment::new(Modality::Audio, text))
    }

    async fn image_fragment(&self, image: Option<&MediaBlob>) -> Option<TextFragment> {
        let blob = image?;
        if blob.is_empty() {
            return Some(TextFragment::new(Modality::Image, ""));
        }

        let suffix = blob.staging_suffix(&self.config.image_suffix);
        let staged = match self.stager.stage(blob, &suffix) {
            Ok(staged) => staged,
            Err(e) => {
                warn!(error = %e, "Could not stage image, skipping text extraction");
                return Some(TextFragment::new(Modality::Image, ""));
            }
        };

        let result = self.ocr.extract(staged.path()).await;
        release(staged, Modality::Image);

        let text = result.unwrap_or_else(|e| {
            warn!(error = %e, "Document text extraction failed, continuing without image text");
            String::new()
        });
        Some(TextFragment::new(Modality::Image, text))
    }
}

fn release(staged: Box<dyn StagedMedia>, source: Modality) {
    if let Err(e) = staged.release() {
        warn!(source = %source, error = %e, "Staged media was not removed cleanly");
    }
}
