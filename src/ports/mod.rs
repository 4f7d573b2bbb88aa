pub mod classifier;
pub mod config;
pub mod http;
pub mod ocr;
pub mod staging;
pub mod store;
pub mod tagger;
pub mod transcriber;

pub use classifier::{ZeroShotClassifier, ZeroShotOutput};
pub use config::ConfigStore;
pub use http::HttpClient;
pub use ocr::DocumentTextExtractor;
pub use staging::{MediaStager, StagedMedia};
pub use store::{IntakeStore, StoredIntake};
pub use tagger::{NamedEntityTagger, TaggedToken};
pub use transcriber::{SpeechTranscriber, TranscribeConfig, TranscriptionResult};
