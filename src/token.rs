/*!
Tokens of a document and the index mapping their identifiers to their position in the document.
*/
use crate::error::ResolutionError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::num::ParseIntError;
use std::str::FromStr;

/// Identifier of a token. Identifiers are read as strings but are ordered as integers, which the
/// range normalizer relies on to fill gaps.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct TokenId(pub u64);

impl TokenId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for TokenId {
    fn from(value: u64) -> Self {
        TokenId(value)
    }
}

impl FromStr for TokenId {
    type Err = ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(TokenId)
    }
}

impl Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A token of a document. `position` and `length` are character offsets into the original text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub position: usize,
    pub length: usize,
    pub text: String,
}

impl Token {
    pub fn new<S: Into<String>>(id: TokenId, position: usize, length: usize, text: S) -> Self {
        Token {
            id,
            position,
            length,
            text: text.into(),
        }
    }

    /// Offset of the first character after this token. Saturates at `usize::MAX`.
    pub fn end(&self) -> usize {
        self.position.saturating_add(self.length)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.id, self.position, self.length, self.text
        )
    }
}

/// Maps the identifier of every token of a document to its zero-based index in the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenIndex {
    positions: AHashMap<TokenId, usize>,
    ids: Vec<TokenId>,
}

impl TokenIndex {
    /// Builds the index of `tokens`. Fails on the first identifier seen twice.
    pub fn new(tokens: &[Token]) -> Result<Self, ResolutionError> {
        let mut positions = AHashMap::with_capacity(tokens.len());
        let mut ids = Vec::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            if positions.insert(token.id, i).is_some() {
                return Err(ResolutionError::DuplicateTokenId(token.id));
            }
            ids.push(token.id);
        }
        Ok(TokenIndex { positions, ids })
    }

    /// Position of the token `id` in the document.
    pub fn position_of(&self, id: TokenId) -> Result<usize, ResolutionError> {
        self.get(id).ok_or(ResolutionError::UnknownTokenId(id))
    }

    #[inline]
    pub fn get(&self, id: TokenId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    #[inline]
    pub fn contains(&self, id: TokenId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Identifiers in document order.
    pub fn ids(&self) -> &[TokenId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
