use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

use crate::adapters::{
    HfNerTagger, HfZeroShotClassifier, PrivacyGuard, TempMediaStager, TomlConfigStore,
};
use crate::app::{
    EntityExtractor, IntakeAggregator, ProblemClassifier, TranscriptionResolver,
};
use crate::domain::{AppConfig, DomainError, IntakeRecord, IntakeSubmission};
use crate::infrastructure::init_logging;
use crate::ports::{
    ConfigStore, DocumentTextExtractor, IntakeStore, MediaStager, NamedEntityTagger,
    SpeechTranscriber, StoredIntake, ZeroShotClassifier,
};

/// Model-backed collaborators, constructed once and shared by every request.
#[derive(Clone)]
pub struct Capabilities {
    pub transcriber: Arc<dyn SpeechTranscriber>,
    pub tagger: Arc<dyn NamedEntityTagger>,
    pub classifier: Arc<dyn ZeroShotClassifier>,
    pub ocr: Arc<dyn DocumentTextExtractor>,
    pub store: Arc<dyn IntakeStore>,
}

impl Capabilities {
    /// Tagging and classification served by the configured inference servers,
    /// reached through a single privacy-guarded HTTP client.
    pub fn with_inference_servers(
        config: &AppConfig,
        transcriber: Arc<dyn SpeechTranscriber>,
        ocr: Arc<dyn DocumentTextExtractor>,
        store: Arc<dyn IntakeStore>,
    ) -> Result<Self, DomainError> {
        let http = Arc::new(PrivacyGuard::new(
            &config.privacy,
            Duration::from_secs(config.inference.timeout_secs),
        )?);

        Ok(Self {
            transcriber,
            tagger: Arc::new(HfNerTagger::new(http.clone(), config.inference.ner_url.as_str())),
            classifier: Arc::new(HfZeroShotClassifier::new(
                http,
                config.inference.zero_shot_url.as_str(),
            )),
            ocr,
            store,
        })
    }
}

/// A persisted intake.
#[derive(Debug, Clone)]
pub struct IntakeReceipt {
    pub record: IntakeRecord,
    pub stored: StoredIntake,
}

/// Application controller that wires configuration, logging and the intake pipeline.
pub struct AppController {
    config: AppConfig,
    aggregator: IntakeAggregator,
    store: Arc<dyn IntakeStore>,
    _log_guard: Option<WorkerGuard>,
}

impl AppController {
    /// Initialize from the on-disk configuration.
    /// This loads (or creates) the config file and sets up logging.
    pub fn bootstrap(capabilities: Capabilities) -> Result<Self, DomainError> {
        // Step 1: Initialize config store
        let config_store = TomlConfigStore::new()?;

        // Step 2: Load configuration
        let config = config_store.load()?;

        // Step 3: Initialize logging
        let log_guard = init_logging(&config_store.logs_dir(), &config.logging)?;

        info!("Arogya starting up");

        let mut controller = Self::new(config, capabilities)?;
        controller._log_guard = log_guard;
        Ok(controller)
    }

    /// Build the pipeline from an explicit configuration.
    pub fn new(config: AppConfig, capabilities: Capabilities) -> Result<Self, DomainError> {
        let stager: Arc<dyn MediaStager> = match &config.intake.staging_dir {
            Some(dir) => Arc::new(TempMediaStager::in_dir(dir)),
            None => Arc::new(TempMediaStager::new()),
        };
        Self::with_stager(config, capabilities, stager)
    }

    /// Build the pipeline with a custom media stager.
    pub fn with_stager(
        config: AppConfig,
        capabilities: Capabilities,
        stager: Arc<dyn MediaStager>,
    ) -> Result<Self, DomainError> {
        config.validate()?;

        let aggregator = IntakeAggregator::new(
            TranscriptionResolver::from_config(capabilities.transcriber, &config.transcription),
            capabilities.ocr,
            stager,
            EntityExtractor::new(capabilities.tagger),
            ProblemClassifier::new(capabilities.classifier, &config.classification),
            config.intake.clone(),
        );

        info!(
            candidate_labels = config.classification.candidate_labels.len(),
            min_retry_chars = config.transcription.min_retry_chars,
            "AppController initialized"
        );

        Ok(Self {
            config,
            aggregator,
            store: capabilities.store,
            _log_guard: None,
        })
    }

    /// Get the active configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run one intake through the pipeline and persist the result.
    ///
    /// Nothing is persisted when the pipeline fails.
    pub async fn submit_intake(
        &self,
        mut submission: IntakeSubmission,
    ) -> Result<IntakeReceipt, DomainError> {
        if submission.preferred_language.is_none() {
            submission.preferred_language = self.config.transcription.preferred_language.clone();
        }

        let record = self.aggregator.aggregate(&submission).await?;
        drop(submission);

        let stored = self.store.persist(record.clone()).await.map_err(|e| {
            error!(error = %e, "Failed to persist intake");
            e
        })?;

        info!(id = stored.id, "Intake stored");
        Ok(IntakeReceipt { record, stored })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::{ScriptedTranscriber, Step, StubClassifier, StubOcr, StubStore, StubTagger};
    use crate::domain::{MediaBlob, RawScore};

    fn capabilities(store: Arc<StubStore>, transcriber: Arc<ScriptedTranscriber>) -> Capabilities {
        Capabilities {
            transcriber,
            tagger: Arc::new(StubTagger::new(vec![])),
            classifier: Arc::new(StubClassifier::new(
                &["gastrointestinal (stomach issue, digestion)"],
                vec![RawScore::F64(0.66)],
            )),
            ocr: Arc::new(StubOcr::new("")),
            store,
        }
    }

    fn config() -> AppConfig {
        let mut config = AppConfig::new();
        config.intake.staging_dir = Some(std::env::temp_dir().join("arogya_controller_test"));
        config
    }

    #[tokio::test]
    async fn test_submit_persists_record() {
        let store = Arc::new(StubStore::default());
        let controller = AppController::new(
            config(),
            capabilities(store.clone(), Arc::new(ScriptedTranscriber::new(vec![]))),
        )
        .unwrap();

        let receipt = controller
            .submit_intake(IntakeSubmission::new().with_text("stomach pain after meals"))
            .await
            .unwrap();

        assert_eq!(receipt.stored.id, 1);
        assert_eq!(store.records(), vec![receipt.record.clone()]);
        assert_eq!(
            receipt.record.classification.label,
            "gastrointestinal (stomach issue, digestion)"
        );
    }

    #[tokio::test]
    async fn test_failed_intake_persists_nothing() {
        let store = Arc::new(StubStore::default());
        let controller = AppController::new(
            config(),
            capabilities(store.clone(), Arc::new(ScriptedTranscriber::new(vec![]))),
        )
        .unwrap();

        let result = controller.submit_intake(IntakeSubmission::new()).await;
        assert!(matches!(result, Err(DomainError::NoInputProvided)));
        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_is_surfaced() {
        let controller = AppController::new(
            config(),
            capabilities(
                Arc::new(StubStore::failing()),
                Arc::new(ScriptedTranscriber::new(vec![])),
            ),
        )
        .unwrap();

        let result = controller
            .submit_intake(IntakeSubmission::new().with_text("rash"))
            .await;
        assert!(matches!(result, Err(DomainError::Storage(_))));
    }

    #[tokio::test]
    async fn test_configured_preferred_language_applies() {
        let transcriber = Arc::new(ScriptedTranscriber::new(vec![Step::ok("ulti", Some("hi"))]));
        let mut config = config();
        config.transcription.preferred_language = Some("hi".to_string());

        let controller = AppController::new(
            config,
            capabilities(Arc::new(StubStore::default()), transcriber.clone()),
        )
        .unwrap();

        controller
            .submit_intake(IntakeSubmission::new().with_audio(MediaBlob::new(vec![1, 2])))
            .await
            .unwrap();

        assert_eq!(transcriber.hints(), vec![Some("hi".to_string())]);
    }

    #[tokio::test]
    async fn test_inference_server_capabilities_respect_privacy() {
        let mut config = config();
        config.inference.ner_url = "https://ner.example.com/tag".to_string();

        let capabilities = Capabilities::with_inference_servers(
            &config,
            Arc::new(ScriptedTranscriber::new(vec![])),
            Arc::new(StubOcr::new("")),
            Arc::new(StubStore::default()),
        )
        .unwrap();

        let result = capabilities.tagger.tag("fever").await;
        assert!(matches!(result, Err(DomainError::Tagging(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = config();
        config.classification.candidate_labels.clear();

        let result = AppController::new(
            config,
            capabilities(
                Arc::new(StubStore::default()),
                Arc::new(ScriptedTranscriber::new(vec![])),
            ),
        );
        assert!(matches!(result, Err(DomainError::Config(_))));
    }
}
