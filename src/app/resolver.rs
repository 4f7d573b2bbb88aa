use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::config::TranscriptionConfig;
use crate::domain::{DomainError, TranscriptAttempt};
use crate::ports::{SpeechTranscriber, TranscribeConfig};

/// Language code reported when detection produced nothing usable.
const UNKNOWN_LANGUAGE: &str = "unknown";

/// Language fallback policy applied after auto-detection.
#[derive(Debug, Clone)]
pub struct FallbackPolicy {
    /// Detected languages that trigger the forced retry.
    pub retry_languages: Vec<String>,
    /// Language the retry is forced to.
    pub retry_language: String,
    /// Retry text must be strictly longer than this (in characters) to win.
    pub min_retry_chars: usize,
    /// Detected language -> language for the final re-transcription.
    pub remap: BTreeMap<String, String>,
}

impl From<&TranscriptionConfig> for FallbackPolicy {
    fn from(config: &TranscriptionConfig) -> Self {
        Self {
            retry_languages: config.retry_languages.clone(),
            retry_language: config.retry_language.clone(),
            min_retry_chars: config.min_retry_chars,
            remap: config.language_remap.clone(),
        }
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::from(&TranscriptionConfig::default())
    }
}

impl FallbackPolicy {
    fn wants_retry(&self, detected: Option<&str>) -> bool {
        match detected {
            None => true,
            Some(code) => {
                code == UNKNOWN_LANGUAGE || self.retry_languages.iter().any(|l| l == code)
            }
        }
    }

    fn remap_target(&self, detected: Option<&str>) -> Option<&str> {
        let code = detected?;
        self.remap
            .get(code)
            .map(String::as_str)
            .filter(|target| *target != code)
    }
}

/// Turns one audio recording into the most useful transcript.
///
/// At most three capability calls are made per recording: auto-detect,
/// a forced retry for commonly confused languages, and a remapped re-run.
pub struct TranscriptionResolver {
    transcriber: Arc<dyn SpeechTranscriber>,
    policy: FallbackPolicy,
    threads: u32,
}

impl TranscriptionResolver {
    pub fn new(transcriber: Arc<dyn SpeechTranscriber>, policy: FallbackPolicy) -> Self {
        Self {
            transcriber,
            policy,
            threads: 0,
        }
    }

    pub fn from_config(transcriber: Arc<dyn SpeechTranscriber>, config: &TranscriptionConfig) -> Self {
        Self {
            transcriber,
            policy: FallbackPolicy::from(config),
            threads: config.threads,
        }
    }

    pub fn policy(&self) -> &FallbackPolicy {
        &self.policy
    }

    /// Resolve the transcript for a staged recording.
    ///
    /// With `preferred_language` the capability runs once in that language and
    /// its failure is returned as `DomainError::Transcription`. On the
    /// auto-detect path every capability failure degrades instead.
    pub async fn resolve(
        &self,
        audio: &Path,
        preferred_language: Option<&str>,
    ) -> Result<String, DomainError> {
        if let Some(language) = preferred_language.filter(|l| !l.trim().is_empty()) {
            debug!(language, "Transcribing with preferred language");
            let attempt = self.attempt(audio, Some(language)).await.map_err(|e| match e {
                DomainError::Transcription(_) => e,
                other => DomainError::Transcription(other.to_string()),
            })?;
            return Ok(attempt.text);
        }

        let initial = match self.attempt(audio, None).await {
            Ok(attempt) => attempt,
            Err(e) => {
                warn!(
                    backend = self.transcriber.name(),
                    error = %e,
                    "Auto-detect transcription failed, continuing without audio text"
                );
                return Ok(String::new());
            }
        };

        let detected = initial.detected_language.as_deref();
        info!(detected_language = ?detected, "Auto-detected language");

        if self.policy.wants_retry(detected) {
            let retry_language = self.policy.retry_language.as_str();
            match self.attempt(audio, Some(retry_language)).await {
                Ok(retry) => {
                    let text = retry.text.trim();
                    if text.chars().count() > self.policy.min_retry_chars {
                        info!(
                            language = retry_language,
                            text_len = text.len(),
                            "Forced retry produced usable text"
                        );
                        return Ok(text.to_string());
                    }
                    debug!(language = retry_language, "Forced retry text too short");
                }
                Err(e) => {
                    warn!(language = retry_language, error = %e, "Forced retry failed");
                }
            }
        }

        if let Some(target) = self.policy.remap_target(detected) {
            info!(from = ?detected, to = target, "Re-transcribing with remapped language");
            match self.attempt(audio, Some(target)).await {
                Ok(remapped) => return Ok(remapped.text.trim().to_string()),
                Err(e) => {
                    warn!(
                        language = target,
                        error = %e,
                        "Remapped transcription failed, continuing without audio text"
                    );
                    return Ok(String::new());
                }
            }
        }

        Ok(initial.text.trim().to_string())
    }

    async fn attempt(
        &self,
        audio: &Path,
        language: Option<&str>,
    ) -> Result<TranscriptAttempt, DomainError> {
        let config = TranscribeConfig {
            language: language.map(str::to_string),
            threads: self.threads,
        };
        let result = self.transcriber.transcribe(audio, &config).await?;

        Ok(TranscriptAttempt {
            language_hint: config.language,
            text: result.text,
            detected_language: result
                .detected_language
                .filter(|code| !code.trim().is_empty()),
        })
    }
}
