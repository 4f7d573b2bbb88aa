pub mod config_store;
pub mod hf_inference;
pub mod jsonl_store;
pub mod memory_store;
pub mod privacy_guard;
pub mod staging;
#[cfg(feature = "whisper")]
pub mod whisper_cpp;

pub use config_store::TomlConfigStore;
pub use hf_inference::{HfNerTagger, HfZeroShotClassifier};
pub use jsonl_store::JsonlIntakeStore;
pub use memory_store::InMemoryIntakeStore;
pub use privacy_guard::PrivacyGuard;
pub use staging::{TempMediaStager, TempStagedMedia};
#[cfg(feature = "whisper")]
pub use whisper_cpp::WhisperCppTranscriber;
