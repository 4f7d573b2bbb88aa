use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use hound::{SampleFormat, WavReader};
use parking_lot::RwLock;
use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::domain::DomainError;
use crate::ports::{SpeechTranscriber, TranscribeConfig, TranscriptionResult};

const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Speech transcriber using whisper.cpp via whisper-rs.
///
/// Staged audio must be a 16 kHz WAV file; stereo input is downmixed.
pub struct WhisperCppTranscriber {
    context: RwLock<Option<Arc<WhisperContext>>>,
    threads: u32,
}

impl WhisperCppTranscriber {
    /// Create a new WhisperCppTranscriber.
    ///
    /// 0 threads means auto-detect (cores - 1).
    pub fn new(threads: u32) -> Self {
        let actual_threads = if threads == 0 {
            std::thread::available_parallelism()
                .map(|p| std::cmp::max(1, p.get() as u32 - 1))
                .unwrap_or(1)
        } else {
            threads
        };

        info!(threads = actual_threads, "WhisperCppTranscriber created");

        Self {
            context: RwLock::new(None),
            threads: actual_threads,
        }
    }

    pub fn is_model_loaded(&self) -> bool {
        self.context.read().is_some()
    }

    pub async fn load_model(&self, path: &Path) -> Result<(), DomainError> {
        if !path.exists() {
            return Err(DomainError::ModelNotFound(
                path.to_string_lossy().to_string(),
            ));
        }

        info!(path = ?path, "Loading whisper model");

        let path_str = path.to_string_lossy().to_string();
        let ctx = tokio::task::spawn_blocking(move || {
            WhisperContext::new_with_params(&path_str, WhisperContextParameters::default())
                .map_err(|e| DomainError::Whisper(format!("Failed to load model: {}", e)))
        })
        .await
        .map_err(|e| DomainError::Whisper(format!("Task join error: {}", e)))??;

        *self.context.write() = Some(Arc::new(ctx));

        info!(path = ?path, "Whisper model loaded successfully");
        Ok(())
    }

    /// Convert i16 samples to f32 (whisper expects f32 samples in range [-1, 1]).
    fn convert_samples(samples: &[i16]) -> Vec<f32> {
        samples.iter().map(|&s| s as f32 / 32768.0).collect()
    }

    fn downmix(samples: Vec<f32>, channels: u16) -> Vec<f32> {
        if channels <= 1 {
            return samples;
        }
        samples
            .chunks(channels as usize)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    }

    fn read_wav(path: &Path) -> Result<Vec<f32>, DomainError> {
        let reader = WavReader::open(path)
            .map_err(|e| DomainError::Transcription(format!("Cannot read audio: {}", e)))?;
        let spec = reader.spec();

        if spec.sample_rate != WHISPER_SAMPLE_RATE {
            return Err(DomainError::Transcription(format!(
                "Expected 16kHz audio, got {}Hz",
                spec.sample_rate
            )));
        }

        let samples = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Float, _) => reader
                .into_samples::<f32>()
                .collect::<Result<Vec<_>, _>>(),
            (SampleFormat::Int, 16) => reader
                .into_samples::<i16>()
                .collect::<Result<Vec<_>, _>>()
                .map(|s| Self::convert_samples(&s)),
            (SampleFormat::Int, bits) => {
                let scale = (1i64 << (bits.saturating_sub(1))) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<Vec<_>, _>>()
            }
        }
        .map_err(|e| DomainError::Transcription(format!("Corrupt audio samples: {}", e)))?;

        Ok(Self::downmix(samples, spec.channels))
    }
}

#[async_trait]
impl SpeechTranscriber for WhisperCppTranscriber {
    async fn transcribe(
        &self,
        audio: &Path,
        config: &TranscribeConfig,
    ) -> Result<TranscriptionResult, DomainError> {
        let context = self.context.read().clone();
        let ctx = context.ok_or_else(|| DomainError::Whisper("No model loaded".to_string()))?;

        let threads = if config.threads > 0 {
            config.threads
        } else {
            self.threads
        };

        let start = std::time::Instant::now();

        let language = config.language.clone();
        let audio: PathBuf = audio.to_path_buf();
        let (text, detected_language) = tokio::task::spawn_blocking(move || {
            let samples = Self::read_wav(&audio)?;
            if samples.is_empty() {
                return Ok::<_, DomainError>((String::new(), None));
            }

            debug!(
                samples = samples.len(),
                threads,
                language = ?language,
                "Starting transcription"
            );

            let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
            params.set_n_threads(threads as i32);
            params.set_print_progress(false);
            params.set_print_realtime(false);
            params.set_print_timestamps(false);
            params.set_language(Some(language.as_deref().unwrap_or("auto")));

            let mut state = ctx.create_state().map_err(|e| {
                DomainError::Whisper(format!("Failed to create whisper state: {}", e))
            })?;

            state.full(params, &samples).map_err(|e| {
                DomainError::Transcription(format!("Transcription failed: {}", e))
            })?;

            let num_segments = state.full_n_segments().map_err(|e| {
                DomainError::Whisper(format!("Failed to get segment count: {}", e))
            })?;

            let mut text = String::new();
            for i in 0..num_segments {
                if let Ok(segment_text) = state.full_get_segment_text(i) {
                    text.push_str(&segment_text);
                }
            }

            let detected_language = state
                .full_lang_id_from_state()
                .ok()
                .and_then(|id| whisper_rs::get_lang_str(id).map(|s| s.to_string()));

            Ok((text, detected_language))
        })
        .await
        .map_err(|e| DomainError::Whisper(format!("Task join error: {}", e)))??;

        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            text_len = text.len(),
            duration_ms,
            detected_language = ?detected_language,
            "Transcription complete"
        );

        Ok(TranscriptionResult {
            text,
            detected_language,
            duration_ms,
        })
    }

    fn name(&self) -> &str {
        "whisper.cpp"
    }
}
