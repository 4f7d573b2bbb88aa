pub mod confidence;
pub mod config;
pub mod error;
pub mod intake;
pub mod media;

pub use confidence::{ConfidenceError, RawScore};
pub use config::AppConfig;
pub use error::DomainError;
pub use intake::{
    Classification, Entity, IntakeRecord, IntakeSubmission, Modality, TextFragment,
    TranscriptAttempt,
};
pub use media::MediaBlob;
