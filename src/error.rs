/*!
Errors raised while resolving, encoding and decoding a single document. Every error is scoped to
one document: the corpus driver reports it and moves on to the next document.
*/
use crate::reader::RecordError;
use crate::token::TokenId;
use thiserror::Error;

/// Errors of the resolution core (token index, span resolver, encoder and decoder).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// Two tokens of the same document share an identifier.
    #[error("Duplicate token id in document: {0}")]
    DuplicateTokenId(TokenId),
    /// A span, entity or resolved entity references a token the document does not contain.
    #[error("Unknown token id: {0}")]
    UnknownTokenId(TokenId),
    /// The entity type is not one of `Person`, `Org`, `Location`, `LocOrg` or `Project`.
    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),
    /// The tag does not start with one of the `O`, `B`, `I`, `L` or `U` prefixes.
    #[error("Invalid tag label: {0:?}")]
    InvalidTagLabel(String),
}

/// Any error that can exclude a document from the output.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Record(#[from] RecordError),
}
