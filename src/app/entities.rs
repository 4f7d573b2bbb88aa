use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{Entity, RawScore};
use crate::ports::{NamedEntityTagger, TaggedToken};

const WORD_PIECE_PREFIX: &str = "##";

/// Extracts biomedical entities from canonical text.
pub struct EntityExtractor {
    tagger: Arc<dyn NamedEntityTagger>,
}

impl EntityExtractor {
    pub fn new(tagger: Arc<dyn NamedEntityTagger>) -> Self {
        Self { tagger }
    }

    /// Tag `text` and merge sub-token spans into whole entities.
    ///
    /// Blank text never reaches the tagger. A tagger failure yields no entities.
    pub async fn extract(&self, text: &str) -> Vec<Entity> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let tokens = match self.tagger.tag(text).await {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(error = %e, "Entity tagging failed, continuing without entities");
                return Vec::new();
            }
        };

        let entities = aggregate_simple(text, &tokens);
        debug!(
            tokens = tokens.len(),
            entities = entities.len(),
            "Entities extracted"
        );
        entities
    }
}

/// Split `B-X` / `I-X` tags into (is_continuation, group).
fn split_tag(tag: &str) -> (bool, &str) {
    if let Some(group) = tag.strip_prefix("I-") {
        (true, group)
    } else if let Some(group) = tag.strip_prefix("B-") {
        (false, group)
    } else {
        (false, tag)
    }
}

struct Pending<'a> {
    group: &'a str,
    pieces: Vec<&'a TaggedToken>,
}

impl Pending<'_> {
    fn finish(self, source: &str) -> Entity {
        let start = self.pieces.first().and_then(|t| t.start);
        let end = self.pieces.last().and_then(|t| t.end);

        let text = match (start, end) {
            (Some(s), Some(e)) if s < e => char_slice(source, s, e).map(|t| t.trim().to_string()),
            _ => None,
        }
        .unwrap_or_else(|| join_pieces(&self.pieces));

        let scores: Vec<f32> = self.pieces.iter().map(|t| t.score.coerce_or_zero()).collect();
        let mean = scores.iter().sum::<f32>() / scores.len().max(1) as f32;

        Entity {
            text,
            group: self.group.to_string(),
            confidence_score: RawScore::F32(mean).coerce_or_zero(),
            start,
            end,
        }
    }
}

/// Slice `source` by character offsets, the unit taggers report spans in.
fn char_slice(source: &str, start: usize, end: usize) -> Option<&str> {
    let byte_at = |pos: usize| {
        source
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(source.len()))
            .nth(pos)
    };
    source.get(byte_at(start)?..byte_at(end)?)
}

fn join_pieces(pieces: &[&TaggedToken]) -> String {
    let mut text = String::new();
    for piece in pieces {
        match piece.text.strip_prefix(WORD_PIECE_PREFIX) {
            Some(rest) => text.push_str(rest),
            None => {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(piece.text.trim());
            }
        }
    }
    text
}

/// Merge adjacent tokens of one entity group, mirroring the "simple"
/// aggregation strategy of token-classification pipelines.
///
/// A token continues the open entity when its group matches and it is either
/// `I-` tagged or a `##` word piece. Anything else opens a new entity.
fn aggregate_simple(source: &str, tokens: &[TaggedToken]) -> Vec<Entity> {
    let mut entities = Vec::new();
    let mut current: Option<Pending<'_>> = None;

    for token in tokens {
        let (continuation, group) = split_tag(&token.group);
        let word_piece = token.text.starts_with(WORD_PIECE_PREFIX);

        if let Some(open) = current
            .as_mut()
            .filter(|open| open.group == group && (continuation || word_piece))
        {
            open.pieces.push(token);
            continue;
        }

        if let Some(done) = current.take() {
            entities.push(done.finish(source));
        }
        current = Some(Pending {
            group,
            pieces: vec![token],
        });
    }

    if let Some(done) = current {
        entities.push(done.finish(source));
    }

    entities
}
