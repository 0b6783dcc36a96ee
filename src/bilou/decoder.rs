use crate::bilou::{split_tag, Prefix, TagLabel, TaggedToken};
use crate::error::ResolutionError;
use crate::token::Token;
use serde::{Deserialize, Serialize};
use std::{borrow::Borrow, fmt::Display};
use tracing::trace;

/// An entity read back from a sequence of tags, located by character offsets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DecodedEntity {
    /// The category, such as `"PER"`. Taken as is from the tags.
    pub category: String,
    /// Offset of the first character of the entity.
    pub position: usize,
    /// Number of characters from the first to the last token, gaps included.
    pub length: usize,
}

impl DecodedEntity {
    pub fn new<S: Into<String>>(category: S, position: usize, length: usize) -> Self {
        DecodedEntity {
            category: category.into(),
            position,
            length,
        }
    }
}

/// Formatted as a line of a submission: `<category> <position> <length>`.
impl Display for DecodedEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.category, self.position, self.length)
    }
}

/// The entity being read. Only the offsets of its first and last tokens matter.
#[derive(Debug, Clone, PartialEq)]
struct PartialEntity {
    category: String,
    position: usize,
    end: usize,
}

impl PartialEntity {
    fn new(category: &str, token: &Token) -> Self {
        PartialEntity {
            category: String::from(category),
            position: token.position,
            end: token.end(),
        }
    }

    fn push(&mut self, token: &Token) {
        self.end = token.end();
    }

    fn into_decoded(self) -> DecodedEntity {
        let length = self.end.saturating_sub(self.position);
        DecodedEntity::new(self.category, self.position, length)
    }
}

/// State machine reading BILOU tags from left to right.
///
/// The decoder never rejects a sequence because of the order of its prefixes: a category change
/// inside an entity, a `B` never closed or an `L` without a `B` are repaired by closing the
/// entity in progress and starting a new one. Only a tag whose first char is not one of
/// `O`, `B`, `I`, `L` or `U` is an error.
#[derive(Debug, Default)]
pub struct BilouDecoder {
    in_progress: Option<PartialEntity>,
    decoded: Vec<DecodedEntity>,
}

impl BilouDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the next tag of the sequence and its token.
    pub fn feed(&mut self, tag: &str, token: &Token) -> Result<(), ResolutionError> {
        let (prefix, category) = split_tag(tag)?;
        match prefix {
            Prefix::O => self.on_outside(),
            Prefix::B | Prefix::I => self.on_begin_or_inside(category, token),
            Prefix::L => self.on_last(category, token),
            Prefix::U => self.on_unit(category, token),
        }
        Ok(())
    }

    /// Closes the entity in progress, if any.
    pub fn on_outside(&mut self) {
        self.flush();
    }

    /// Continues the entity in progress when it has the same category. Starts a new entity
    /// otherwise, closing the one in progress.
    pub fn on_begin_or_inside(&mut self, category: &str, token: &Token) {
        match self.continuing(category) {
            Some(entity) => entity.push(token),
            None => {
                self.flush();
                self.in_progress = Some(PartialEntity::new(category, token));
            }
        }
    }

    /// Closes the entity in progress with this token when it has the same category. Otherwise the
    /// entity in progress is closed without it and the token becomes an entity of its own.
    pub fn on_last(&mut self, category: &str, token: &Token) {
        match self.continuing(category) {
            Some(entity) => {
                entity.push(token);
                self.flush();
            }
            None => self.on_unit(category, token),
        }
    }

    /// Closes the entity in progress and emits the token as an entity of its own.
    pub fn on_unit(&mut self, category: &str, token: &Token) {
        self.flush();
        self.in_progress = Some(PartialEntity::new(category, token));
        self.flush();
    }

    /// Closes the entity still in progress and returns every entity read.
    pub fn finish(mut self) -> Vec<DecodedEntity> {
        self.flush();
        self.decoded
    }

    /// The entity in progress, if it has this category.
    fn continuing(&mut self, category: &str) -> Option<&mut PartialEntity> {
        self.in_progress
            .as_mut()
            .filter(|entity| entity.category == category)
    }

    fn flush(&mut self) {
        if let Some(entity) = self.in_progress.take() {
            let decoded = entity.into_decoded();
            trace!(entity = %decoded, "decoded entity");
            self.decoded.push(decoded);
        }
    }
}

/// Reads the entities of one document from its tags. The tags can come from any producer and the
/// categories are not checked.
///
/// * `tags`: Pairs of tags and tokens, in document order.
pub fn decode_tags<I, S, T>(tags: I) -> Result<Vec<DecodedEntity>, ResolutionError>
where
    I: IntoIterator<Item = (S, T)>,
    S: AsRef<str>,
    T: Borrow<Token>,
{
    let mut decoder = BilouDecoder::new();
    for (tag, token) in tags {
        decoder.feed(tag.as_ref(), token.borrow())?;
    }
    Ok(decoder.finish())
}

/// Reads the entities back from the output of the encoder.
pub fn decode_tagged(tagged: &[TaggedToken]) -> Vec<DecodedEntity> {
    let mut decoder = BilouDecoder::new();
    for TaggedToken { tag, token } in tagged {
        match tag {
            TagLabel::Outside | TagLabel::Entity(Prefix::O, _) => decoder.on_outside(),
            TagLabel::Entity(Prefix::B | Prefix::I, category) => {
                decoder.on_begin_or_inside(category.as_str(), token)
            }
            TagLabel::Entity(Prefix::L, category) => decoder.on_last(category.as_str(), token),
            TagLabel::Entity(Prefix::U, category) => decoder.on_unit(category.as_str(), token),
        }
    }
    decoder.finish()
}
