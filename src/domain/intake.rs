use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::MediaBlob;

/// Input channel a piece of text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Text typed by the patient.
    Text,
    /// Spoken audio, transcribed.
    Audio,
    /// Photographed or scanned document, read by OCR.
    Image,
}

impl Modality {
    pub const ALL: [Modality; 3] = [Modality::Text, Modality::Audio, Modality::Image];

    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Text => "text",
            Modality::Audio => "audio",
            Modality::Image => "image",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Text produced by a single modality handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    pub source: Modality,
    pub content: String,
}

impl TextFragment {
    pub fn new(source: Modality, content: impl Into<String>) -> Self {
        Self {
            source,
            content: content.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// One invocation of the speech capability. Never leaves the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptAttempt {
    /// Language the capability was forced to, `None` for auto-detection.
    pub language_hint: Option<String>,
    pub text: String,
    /// Language the capability reported (ISO 639-1 code).
    pub detected_language: Option<String>,
}

/// A recognized biomedical span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    /// Entity group, e.g. `Sign_symptom`, `Biological_structure`, `Medication`.
    pub group: String,
    pub confidence_score: f32,
    /// Character offsets into the canonical text, when the tagger reports them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
}

/// Best-matching problem category for a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub confidence_score: f32,
}

impl Classification {
    pub fn new(label: impl Into<String>, confidence_score: f32) -> Self {
        Self {
            label: label.into(),
            confidence_score,
        }
    }
}

/// The structured result of one intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeRecord {
    /// Merged text from all modalities. Never blank.
    pub canonical_text: String,
    pub entities: Vec<Entity>,
    pub classification: Classification,
}

/// Everything a caller submits for one intake. Every modality is optional.
#[derive(Debug, Clone, Default)]
pub struct IntakeSubmission {
    pub text: Option<String>,
    pub audio: Option<MediaBlob>,
    pub image: Option<MediaBlob>,
    /// Force transcription to this language instead of auto-detecting.
    pub preferred_language: Option<String>,
}

impl IntakeSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_audio(mut self, audio: MediaBlob) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn with_image(mut self, image: MediaBlob) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_preferred_language(mut self, language: impl Into<String>) -> Self {
        self.preferred_language = Some(language.into());
        self
    }

    /// True when no modality was supplied at all. An empty text field counts
    /// as not supplied; whitespace-only text does not.
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().map_or(true, str::is_empty)
            && self.audio.is_none()
            && self.image.is_none()
    }
}
