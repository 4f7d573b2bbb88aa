use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Modality};

/// Privacy-related configuration for the inference HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyConfig {
    /// When true, only loopback hosts are reachable (default: true).
    pub local_only: bool,
    /// Allowed domains when local_only is false.
    pub allowed_domains: Vec<String>,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            local_only: true,
            allowed_domains: Self::default_allowed_domains(),
        }
    }
}

impl PrivacyConfig {
    /// Default allowed domains for hosted inference.
    pub fn default_allowed_domains() -> Vec<String> {
        vec![
            "huggingface.co".to_string(),
            "api-inference.huggingface.co".to_string(),
        ]
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Enable file logging with rotation.
    pub file_logging: bool,
    /// Maximum number of log files to keep.
    pub max_files: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: true,
            max_files: 7,
        }
    }
}

/// Transcription and language-fallback configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Language forced for every request unless the request names its own.
    /// None means auto-detect with fallback.
    pub preferred_language: Option<String>,
    /// Detected languages that trigger a forced retry in `retry_language`.
    /// Undetected or "unknown" languages always trigger it.
    pub retry_languages: Vec<String>,
    /// Language the retry is forced to.
    pub retry_language: String,
    /// The retry wins only if its trimmed text is longer than this many characters.
    /// Empirical value; calibrate against real recordings.
    pub min_retry_chars: usize,
    /// Whisper model file, used by the whisper backend.
    pub model_path: Option<PathBuf>,
    /// Number of inference threads (0 = auto).
    pub threads: u32,
    /// Detected language -> language to re-transcribe with.
    pub language_remap: BTreeMap<String, String>,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        let language_remap = [("ur", "hi"), ("pa", "hi"), ("hi", "hi"), ("en", "en")]
            .into_iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();

        Self {
            preferred_language: None,
            retry_languages: vec!["ur".to_string(), "pa".to_string(), "hi".to_string()],
            retry_language: "hi".to_string(),
            min_retry_chars: 2,
            model_path: None,
            threads: 0,
            language_remap,
        }
    }
}

/// Zero-shot classification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Ordered candidate labels offered to the classifier.
    pub candidate_labels: Vec<String>,
    /// Label reported for blank text or when classification is unavailable.
    pub unknown_label: String,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            candidate_labels: Self::default_candidate_labels(),
            unknown_label: "unknown".to_string(),
        }
    }
}

impl ClassificationConfig {
    /// Six clinical categories plus a general-inquiry catch-all.
    pub fn default_candidate_labels() -> Vec<String> {
        vec![
            "dermatology (skin issue)".to_string(),
            "influenza (flu, cold, fever)".to_string(),
            "inflammatory (body pain, joint pain, swelling)".to_string(),
            "gastrointestinal (stomach issue, digestion)".to_string(),
            "respiratory (breathing issue, cough)".to_string(),
            "general inquiry".to_string(),
        ]
    }
}

/// Intake merge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Order fragments are joined in, regardless of completion order.
    pub fragment_order: Vec<Modality>,
    /// Separator placed between fragments.
    pub separator: String,
    /// Suffix for staged audio files.
    pub audio_suffix: String,
    /// Suffix for staged images when the upload has no usable extension.
    pub image_suffix: String,
    /// Directory for request-scoped staging files (None = OS temp dir).
    pub staging_dir: Option<PathBuf>,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            fragment_order: Modality::ALL.to_vec(),
            separator: " ".to_string(),
            audio_suffix: ".wav".to_string(),
            image_suffix: ".png".to_string(),
            staging_dir: None,
        }
    }
}

/// Endpoints of the NER and zero-shot inference servers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub ner_url: String,
    pub zero_shot_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            ner_url: "http://127.0.0.1:8080/ner".to_string(),
            zero_shot_url: "http://127.0.0.1:8080/zero-shot".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub transcription: TranscriptionConfig,
    pub classification: ClassificationConfig,
    pub intake: IntakeConfig,
    pub privacy: PrivacyConfig,
    pub inference: InferenceConfig,
}

impl AppConfig {
    /// Create a new AppConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), DomainError> {
        let order = &self.intake.fragment_order;
        if order.len() != Modality::ALL.len()
            || !Modality::ALL.iter().all(|m| order.contains(m))
        {
            return Err(DomainError::Config(format!(
                "intake.fragment_order must name text, audio and image exactly once, got {:?}",
                order
            )));
        }

        if self.classification.candidate_labels.is_empty() {
            return Err(DomainError::Config(
                "classification.candidate_labels must not be empty".to_string(),
            ));
        }

        if self.transcription.retry_language.trim().is_empty() {
            return Err(DomainError::Config(
                "transcription.retry_language must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.classification.candidate_labels.len(), 6);
        assert_eq!(config.classification.candidate_labels[5], "general inquiry");
        assert_eq!(
            config.intake.fragment_order,
            vec![Modality::Text, Modality::Audio, Modality::Image]
        );
    }

    #[test]
    fn test_default_language_remap() {
        let config = TranscriptionConfig::default();
        assert_eq!(config.language_remap.get("ur").map(String::as_str), Some("hi"));
        assert_eq!(config.language_remap.get("pa").map(String::as_str), Some("hi"));
        assert_eq!(config.language_remap.get("en").map(String::as_str), Some("en"));
        assert!(config.language_remap.get("fr").is_none());
        assert_eq!(config.min_retry_chars, 2);
    }

    #[test]
    fn test_duplicate_fragment_order_rejected() {
        let mut config = AppConfig::new();
        config.intake.fragment_order = vec![Modality::Text, Modality::Text, Modality::Image];
        assert!(matches!(config.validate(), Err(DomainError::Config(_))));
    }

    #[test]
    fn test_empty_labels_rejected() {
        let mut config = AppConfig::new();
        config.classification.candidate_labels.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [transcription]
            min_retry_chars = 4

            [intake]
            fragment_order = ["image", "text", "audio"]
            "#,
        )
        .unwrap();

        assert_eq!(config.transcription.min_retry_chars, 4);
        assert_eq!(config.transcription.retry_language, "hi");
        assert_eq!(config.intake.fragment_order[0], Modality::Image);
        assert_eq!(config.intake.separator, " ");
        assert!(config.validate().is_ok());
    }
}
