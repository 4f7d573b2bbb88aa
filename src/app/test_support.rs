//! Deterministic capability stubs shared by the unit tests.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{DomainError, IntakeRecord, RawScore};
use crate::ports::{
    DocumentTextExtractor, IntakeStore, NamedEntityTagger, SpeechTranscriber, StoredIntake,
    TaggedToken, TranscribeConfig, TranscriptionResult, ZeroShotClassifier, ZeroShotOutput,
};

/// One scripted transcriber response.
pub enum Step {
    Ok(TranscriptionResult),
    Fail,
}

impl Step {
    pub fn ok(text: &str, detected: Option<&str>) -> Self {
        Step::Ok(TranscriptionResult {
            text: text.to_string(),
            detected_language: detected.map(str::to_string),
            duration_ms: 0,
        })
    }

    pub fn fail() -> Self {
        Step::Fail
    }
}

/// Replays scripted results in order and records every language hint.
pub struct ScriptedTranscriber {
    steps: Mutex<VecDeque<Step>>,
    hints: Mutex<Vec<Option<String>>>,
    paths: Mutex<Vec<PathBuf>>,
}

impl ScriptedTranscriber {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            hints: Mutex::new(Vec::new()),
            paths: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.hints.lock().len()
    }

    pub fn hints(&self) -> Vec<Option<String>> {
        self.hints.lock().clone()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.paths.lock().clone()
    }
}

#[async_trait]
impl SpeechTranscriber for ScriptedTranscriber {
    async fn transcribe(
        &self,
        audio: &Path,
        config: &TranscribeConfig,
    ) -> Result<TranscriptionResult, DomainError> {
        self.hints.lock().push(config.language.clone());
        self.paths.lock().push(audio.to_path_buf());

        match self.steps.lock().pop_front() {
            Some(Step::Ok(result)) => Ok(result),
            Some(Step::Fail) => Err(DomainError::Whisper("scripted failure".to_string())),
            None => Err(DomainError::Whisper("script exhausted".to_string())),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Returns fixed tokens and records the texts it was asked to tag.
pub struct StubTagger {
    tokens: Result<Vec<TaggedToken>, String>,
    inputs: Mutex<Vec<String>>,
}

impl StubTagger {
    pub fn new(tokens: Vec<TaggedToken>) -> Self {
        Self {
            tokens: Ok(tokens),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            tokens: Err("tagger offline".to_string()),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().clone()
    }
}

#[async_trait]
impl NamedEntityTagger for StubTagger {
    async fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, DomainError> {
        self.inputs.lock().push(text.to_string());
        self.tokens.clone().map_err(DomainError::Tagging)
    }
}

/// Ranks labels with fixed scores and counts invocations.
pub struct StubClassifier {
    output: Result<ZeroShotOutput, String>,
    calls: AtomicUsize,
    inputs: Mutex<Vec<(String, Vec<String>)>>,
}

impl StubClassifier {
    pub fn new(labels: &[&str], scores: Vec<RawScore>) -> Self {
        Self {
            output: Ok(ZeroShotOutput {
                labels: labels.iter().map(|l| l.to_string()).collect(),
                scores,
            }),
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            output: Err("classifier offline".to_string()),
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inputs(&self) -> Vec<(String, Vec<String>)> {
        self.inputs.lock().clone()
    }
}

#[async_trait]
impl ZeroShotClassifier for StubClassifier {
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
    ) -> Result<ZeroShotOutput, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs
            .lock()
            .push((text.to_string(), candidate_labels.to_vec()));
        self.output.clone().map_err(DomainError::Classification)
    }
}

/// OCR stub returning fixed text and remembering the staged paths it saw.
pub struct StubOcr {
    text: Result<String, String>,
    paths: Mutex<Vec<PathBuf>>,
}

impl StubOcr {
    pub fn new(text: &str) -> Self {
        Self {
            text: Ok(text.to_string()),
            paths: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            text: Err("unreadable image".to_string()),
            paths: Mutex::new(Vec::new()),
        }
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.paths.lock().clone()
    }
}

#[async_trait]
impl DocumentTextExtractor for StubOcr {
    async fn extract(&self, image: &Path) -> Result<String, DomainError> {
        assert!(image.exists(), "image must be staged during extraction");
        self.paths.lock().push(image.to_path_buf());
        self.text.clone().map_err(DomainError::Ocr)
    }
}

/// Store stub that keeps records in memory.
#[derive(Default)]
pub struct StubStore {
    records: Mutex<Vec<IntakeRecord>>,
    fail: bool,
}

impl StubStore {
    pub fn failing() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn records(&self) -> Vec<IntakeRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl IntakeStore for StubStore {
    async fn persist(&self, record: IntakeRecord) -> Result<StoredIntake, DomainError> {
        if self.fail {
            return Err(DomainError::Storage("database unavailable".to_string()));
        }
        let mut records = self.records.lock();
        records.push(record);
        Ok(StoredIntake {
            id: records.len() as i64,
            created_at: chrono::Utc::now(),
        })
    }
}
