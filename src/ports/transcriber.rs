use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Configuration for one transcription call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscribeConfig {
    /// Target language (ISO 639-1 code, e.g., "hi", "en").
    /// None for auto-detection.
    pub language: Option<String>,
    /// Number of threads to use (0 = backend default).
    pub threads: u32,
}

impl TranscribeConfig {
    /// Auto-detect the spoken language.
    pub fn auto() -> Self {
        Self::default()
    }

    /// Force the given language.
    pub fn forced(language: impl Into<String>) -> Self {
        Self {
            language: Some(language.into()),
            ..Self::default()
        }
    }
}

/// Result of a transcription.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptionResult {
    /// Transcribed text.
    pub text: String,
    /// Detected language (ISO 639-1 code).
    pub detected_language: Option<String>,
    /// Transcription duration in milliseconds.
    pub duration_ms: u64,
}

/// Port for speech-to-text.
///
/// Implementations are loaded once and shared across concurrent requests.
#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    /// Transcribe a staged audio file.
    async fn transcribe(
        &self,
        audio: &Path,
        config: &TranscribeConfig,
    ) -> Result<TranscriptionResult, DomainError>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}
