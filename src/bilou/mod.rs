/**
This module converts resolved entities to BILOU tags and back. A BILOU tag is made of a prefix,
giving the place of the token in its entity, and of the category of the entity:
* `B`: Beginning of a multi-token entity, e.g. `B-PER`
* `I`: Inside a multi-token entity, e.g. `I-PER`
* `L`: Last token of a multi-token entity, e.g. `L-PER`
* `U`: Unit, single-token entity, e.g. `U-LOC`
* `O`: Outside of any entity, written `O` alone
*/
use crate::entity::Category;
use crate::error::ResolutionError;
use crate::token::Token;
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

mod decoder;
mod encoder;

// Re-exporting
pub use decoder::{decode_tagged, decode_tags, BilouDecoder, DecodedEntity};
pub use encoder::encode_entities;

/// Delimiter written between the prefix and the category of a tag.
pub const TAG_DELIMITER: char = '-';

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Sequence)]
/// Place of a token in its entity. Every prefix is a single ascii char.
pub enum Prefix {
    B,
    I,
    L,
    O,
    U,
}

impl TryFrom<char> for Prefix {
    type Error = char;
    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'B' => Ok(Self::B),
            'I' => Ok(Self::I),
            'L' => Ok(Self::L),
            'O' => Ok(Self::O),
            'U' => Ok(Self::U),
            c => Err(c),
        }
    }
}

impl Prefix {
    pub fn as_char(&self) -> char {
        match self {
            Prefix::B => 'B',
            Prefix::I => 'I',
            Prefix::L => 'L',
            Prefix::O => 'O',
            Prefix::U => 'U',
        }
    }

    /// Prefix of the `i`-th (zero-based) token of an entity of `n` tokens.
    pub fn for_position(i: usize, n: usize) -> Self {
        match (i, n) {
            (_, 1) => Prefix::U,
            (0, _) => Prefix::B,
            (i, n) if i + 1 == n => Prefix::L,
            _ => Prefix::I,
        }
    }
}

impl Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Splits a raw tag into its prefix and its category. The category is whatever follows the
/// prefix and the delimiter, and is empty for `O`. Only the first char of the tag is validated.
pub(crate) fn split_tag(tag: &str) -> Result<(Prefix, &str), ResolutionError> {
    let mut chars = tag.chars();
    let prefix = chars
        .next()
        .and_then(|c| Prefix::try_from(c).ok())
        .ok_or_else(|| ResolutionError::InvalidTagLabel(String::from(tag)))?;
    // Skip the delimiter
    chars.next();
    Ok((prefix, chars.as_str()))
}

/// A tag produced by the encoder: `O`, or a prefix and a category such as `B-PER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TagLabel {
    Outside,
    Entity(Prefix, Category),
}

impl TagLabel {
    pub fn prefix(&self) -> Prefix {
        match self {
            TagLabel::Outside => Prefix::O,
            TagLabel::Entity(prefix, _) => *prefix,
        }
    }

    pub fn category(&self) -> Option<Category> {
        match self {
            TagLabel::Outside => None,
            TagLabel::Entity(_, category) => Some(*category),
        }
    }
}

impl Display for TagLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagLabel::Outside => write!(f, "O"),
            TagLabel::Entity(prefix, category) => {
                write!(f, "{}{}{}", prefix, TAG_DELIMITER, category)
            }
        }
    }
}

/// Strict parsing: only `O` and the `{B,I,L,U}-{PER,ORG,LOC}` tags are accepted. Use the decoder
/// to read tags of any other shape.
impl FromStr for TagLabel {
    type Err = ResolutionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ResolutionError::InvalidTagLabel(String::from(s));
        if s == "O" {
            return Ok(TagLabel::Outside);
        }
        let (prefix, category) = split_tag(s)?;
        if prefix == Prefix::O || s.chars().nth(1) != Some(TAG_DELIMITER) {
            return Err(invalid());
        }
        let category = category.parse::<Category>().map_err(|_| invalid())?;
        Ok(TagLabel::Entity(prefix, category))
    }
}

impl From<TagLabel> for String {
    fn from(value: TagLabel) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for TagLabel {
    type Error = ResolutionError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A document token with the tag assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaggedToken {
    pub tag: TagLabel,
    pub token: Token,
}

impl TaggedToken {
    pub fn new(tag: TagLabel, token: Token) -> Self {
        TaggedToken { tag, token }
    }
}

impl Display for TaggedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.tag, self.token.text)
    }
}
