use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{DomainError, RawScore};
use crate::ports::{HttpClient, NamedEntityTagger, TaggedToken, ZeroShotClassifier, ZeroShotOutput};

#[derive(Debug, Serialize)]
struct NerParameters {
    aggregation_strategy: &'static str,
}

#[derive(Debug, Serialize)]
struct NerRequest<'a> {
    inputs: &'a str,
    parameters: NerParameters,
}

/// One span of a token-classification response.
/// Aggregating servers report `entity_group`, raw ones report `entity`.
#[derive(Debug, Deserialize)]
struct NerSpan {
    #[serde(alias = "entity")]
    entity_group: String,
    word: String,
    #[serde(default)]
    score: serde_json::Value,
    start: Option<usize>,
    end: Option<usize>,
}

impl From<NerSpan> for TaggedToken {
    fn from(span: NerSpan) -> Self {
        TaggedToken {
            text: span.word,
            group: span.entity_group,
            score: RawScore::from_json(&span.score),
            start: span.start,
            end: span.end,
        }
    }
}

fn parse_ner(value: serde_json::Value) -> Result<Vec<TaggedToken>, DomainError> {
    let spans: Vec<NerSpan> = serde_json::from_value(value)
        .map_err(|e| DomainError::Tagging(format!("Unexpected NER response: {}", e)))?;
    Ok(spans.into_iter().map(TaggedToken::from).collect())
}

/// Biomedical NER served by a token-classification inference endpoint.
pub struct HfNerTagger<H: HttpClient> {
    http: Arc<H>,
    url: String,
}

impl<H: HttpClient> HfNerTagger<H> {
    pub fn new(http: Arc<H>, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl<H: HttpClient> NamedEntityTagger for HfNerTagger<H> {
    async fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, DomainError> {
        let request = NerRequest {
            inputs: text,
            parameters: NerParameters {
                aggregation_strategy: "simple",
            },
        };
        let value: serde_json::Value = self
            .http
            .post_json(&self.url, &request)
            .await
            .map_err(|e| DomainError::Tagging(e.to_string()))?;

        let tokens = parse_ner(value)?;
        debug!(count = tokens.len(), "NER response parsed");
        Ok(tokens)
    }
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [String],
}

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Deserialize)]
struct ZeroShotResponse {
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    scores: Vec<serde_json::Value>,
}

fn parse_zero_shot(value: serde_json::Value) -> Result<ZeroShotOutput, DomainError> {
    let response: ZeroShotResponse = serde_json::from_value(value)
        .map_err(|e| DomainError::Classification(format!("Unexpected zero-shot response: {}", e)))?;
    Ok(ZeroShotOutput {
        labels: response.labels,
        scores: response.scores.iter().map(RawScore::from_json).collect(),
    })
}

/// Zero-shot classification served by an NLI inference endpoint.
pub struct HfZeroShotClassifier<H: HttpClient> {
    http: Arc<H>,
    url: String,
}

impl<H: HttpClient> HfZeroShotClassifier<H> {
    pub fn new(http: Arc<H>, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl<H: HttpClient> ZeroShotClassifier for HfZeroShotClassifier<H> {
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
    ) -> Result<ZeroShotOutput, DomainError> {
        let request = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters { candidate_labels },
        };
        let value: serde_json::Value = self
            .http
            .post_json(&self.url, &request)
            .await
            .map_err(|e| DomainError::Classification(e.to_string()))?;

        parse_zero_shot(value)
    }
}
