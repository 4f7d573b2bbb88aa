use async_trait::async_trait;

use crate::domain::{DomainError, RawScore};

/// A span reported by a named-entity tagger.
///
/// `group` may carry a `B-`/`I-` prefix and `text` may be a `##` word piece
/// when the tagger does not aggregate on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedToken {
    pub text: String,
    pub group: String,
    pub score: RawScore,
    /// Character offsets into the tagged text.
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl TaggedToken {
    pub fn new(text: impl Into<String>, group: impl Into<String>, score: impl Into<RawScore>) -> Self {
        Self {
            text: text.into(),
            group: group.into(),
            score: score.into(),
            start: None,
            end: None,
        }
    }

    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }
}

/// Port for biomedical named-entity recognition.
#[async_trait]
pub trait NamedEntityTagger: Send + Sync {
    async fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, DomainError>;
}
