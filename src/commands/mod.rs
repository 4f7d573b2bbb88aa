use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::app::AppController;
use crate::domain::{AppConfig, DomainError, Entity, IntakeSubmission, MediaBlob};

const SUCCESS_MESSAGE: &str = "Patient query processed and stored successfully.";

/// An uploaded audio or image file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl From<UploadedFile> for MediaBlob {
    fn from(file: UploadedFile) -> Self {
        let mut blob = MediaBlob::new(file.bytes);
        if let Some(name) = file.file_name {
            blob = blob.with_file_name(name);
        }
        if let Some(content_type) = file.content_type {
            blob = blob.with_content_type(content_type);
        }
        blob
    }
}

/// Intake request as received from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntakeRequest {
    pub text_input: Option<String>,
    pub audio_file: Option<UploadedFile>,
    pub image_file: Option<UploadedFile>,
    /// Forces the transcription language (ISO 639-1 code).
    pub preferred_language: Option<String>,
}

impl From<IntakeRequest> for IntakeSubmission {
    fn from(request: IntakeRequest) -> Self {
        IntakeSubmission {
            text: request.text_input,
            audio: request.audio_file.map(MediaBlob::from),
            image: request.image_file.map(MediaBlob::from),
            preferred_language: request.preferred_language,
        }
    }
}

/// Result of a stored intake.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeResponse {
    pub message: String,
    pub database_record_id: i64,
    pub timestamp: DateTime<Utc>,
    pub problem_category: String,
    pub category_confidence: f32,
    pub extracted_symptoms: Vec<Entity>,
    pub full_text: String,
}

/// Whether a failed request was the caller's fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorStatus {
    ClientError,
    ServerError,
}

/// A single descriptive error returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandError {
    pub status: ErrorStatus,
    pub detail: String,
}

impl From<DomainError> for CommandError {
    fn from(error: DomainError) -> Self {
        let status = if error.is_client_error() {
            ErrorStatus::ClientError
        } else {
            ErrorStatus::ServerError
        };
        Self {
            status,
            detail: error.to_string(),
        }
    }
}

/// Get the current application configuration.
pub fn get_config(controller: &AppController) -> AppConfig {
    controller.config().clone()
}

/// Process one patient intake and store the result.
pub async fn process_intake(
    controller: &AppController,
    request: IntakeRequest,
) -> Result<IntakeResponse, CommandError> {
    let receipt = controller
        .submit_intake(request.into())
        .await
        .map_err(|e| {
            warn!(error = %e, "Intake rejected");
            CommandError::from(e)
        })?;

    let record = receipt.record;
    Ok(IntakeResponse {
        message: SUCCESS_MESSAGE.to_string(),
        database_record_id: receipt.stored.id,
        timestamp: receipt.stored.created_at,
        problem_category: record.classification.label,
        category_confidence: record.classification.confidence_score,
        extracted_symptoms: record.entities,
        full_text: record.canonical_text,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::adapters::InMemoryIntakeStore;
    use crate::app::test_support::{ScriptedTranscriber, StubClassifier, StubOcr, StubTagger};
    use crate::app::Capabilities;
    use crate::domain::RawScore;
    use crate::ports::TaggedToken;

    fn controller(ocr: &str) -> AppController {
        let mut config = AppConfig::new();
        config.intake.staging_dir = Some(std::env::temp_dir());
        AppController::new(
            config,
            Capabilities {
                transcriber: Arc::new(ScriptedTranscriber::new(vec![])),
                tagger: Arc::new(StubTagger::new(vec![
                    TaggedToken::new("itching", "Sign_symptom", 0.9f32).with_span(3, 10),
                ])),
                classifier: Arc::new(StubClassifier::new(
                    &["dermatology (skin issue)"],
                    vec![RawScore::Text("0.75".to_string())],
                )),
                ocr: Arc::new(StubOcr::new(ocr)),
                store: Arc::new(InMemoryIntakeStore::new()),
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_process_intake_success() {
        let controller = controller("");
        let request = IntakeRequest {
            text_input: Some("my itching arm".to_string()),
            ..IntakeRequest::default()
        };

        let response = process_intake(&controller, request).await.unwrap();

        assert_eq!(response.message, SUCCESS_MESSAGE);
        assert_eq!(response.database_record_id, 1);
        assert_eq!(response.problem_category, "dermatology (skin issue)");
        assert!((response.category_confidence - 0.75).abs() < 1e-6);
        assert_eq!(response.full_text, "my itching arm");
        assert_eq!(response.extracted_symptoms.len(), 1);
        assert_eq!(response.extracted_symptoms[0].text, "itching");
    }

    #[tokio::test]
    async fn test_no_input_is_client_error() {
        let controller = controller("");
        let error = process_intake(&controller, IntakeRequest::default())
            .await
            .unwrap_err();

        assert_eq!(error.status, ErrorStatus::ClientError);
        assert_eq!(error.detail, "No input provided.");
    }

    #[tokio::test]
    async fn test_empty_text_field_reports_no_input() {
        let controller = controller("");
        let request = IntakeRequest {
            text_input: Some(String::new()),
            ..IntakeRequest::default()
        };

        let error = process_intake(&controller, request).await.unwrap_err();
        assert_eq!(error.status, ErrorStatus::ClientError);
        assert_eq!(error.detail, "No input provided.");
    }

    #[tokio::test]
    async fn test_blank_image_is_client_error() {
        let controller = controller("   ");
        let request = IntakeRequest {
            image_file: Some(UploadedFile {
                file_name: Some("scan.JPG".to_string()),
                content_type: Some("image/jpeg".to_string()),
                bytes: vec![0xff, 0xd8],
            }),
            ..IntakeRequest::default()
        };

        let error = process_intake(&controller, request).await.unwrap_err();
        assert_eq!(error.status, ErrorStatus::ClientError);
        assert_eq!(error.detail, "Could not extract text from inputs.");
    }

    #[test]
    fn test_storage_error_is_server_error() {
        let error = CommandError::from(DomainError::Storage("disk full".to_string()));
        assert_eq!(error.status, ErrorStatus::ServerError);
    }

    #[test]
    fn test_request_deserializes_with_missing_fields() {
        let request: IntakeRequest =
            serde_json::from_str(r#"{"text_input": "fever", "preferred_language": "hi"}"#).unwrap();
        let submission = IntakeSubmission::from(request);

        assert_eq!(submission.text.as_deref(), Some("fever"));
        assert!(submission.audio.is_none());
        assert_eq!(submission.preferred_language.as_deref(), Some("hi"));
    }

    #[test]
    fn test_get_config_returns_active_config() {
        let controller = controller("");
        assert_eq!(get_config(&controller).intake.separator, " ");
    }
}
