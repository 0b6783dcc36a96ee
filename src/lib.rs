/*!
This library converts document-level entity annotations into token-level BILOU tags, and reads
entities back from BILOU tags predicted by a sequence tagger. It targets corpora annotated like
factRuEval: tokens, spans grouping consecutive tokens, and objects grouping spans.

# Pipeline
* The record reader builds a `Document` from its `.tokens`, `.spans` and `.objects` files.
* The span resolver turns the possibly overlapping objects of a document into disjoint entities.
    Tokens whose identifiers are close enough are merged into a single range, and overlapping
    entities are merged into the one seen first.
* The BILOU encoder tags every token of the document with one of `O`, `B-*`, `I-*`, `L-*` and
    `U-*`, where `*` is one of `PER`, `ORG` and `LOC`.
* The BILOU decoder reads a sequence of tags back into entities located by character offsets,
    repairing malformed sequences instead of rejecting them.

# Terminology
* An entity type is the type of an annotated object: `Person`, `Org`, `Location`, `LocOrg` or
    `Project`. It collapses into one of the three categories `PER`, `ORG` and `LOC`.
* A candidate is an object as annotated. A resolved entity is a candidate after resolution: its
    tokens are sorted and no other entity of the document claims them.
* A corpus is a set of independent documents. A document failing to resolve is reported and
    excluded from the output, the other documents are still processed.
*/

mod bilou;
mod config;
mod corpus;
mod entity;
mod error;
mod reader;
mod submission;
mod token;

// The public api starts here
pub use bilou::{
    decode_tagged, decode_tags, encode_entities, BilouDecoder, DecodedEntity, Prefix, TagLabel,
    TaggedToken, TAG_DELIMITER,
};

pub use entity::{
    category_of, normalize_range, resolve_entities, Category, EntityCandidate, EntityType,
    ResolvedEntities, ResolvedEntity, GAP_FILL_THRESHOLD,
};

pub use token::{Token, TokenId, TokenIndex};

pub use reader::{
    parse_rows, parse_token, Document, DocumentBuilder, ObjectRecord, RecordError, SpanRecord,
};

pub use corpus::{
    decode_corpus, encode_corpus, load_corpus, load_corpus_tokens, CorpusReport, DocumentFailure,
};

pub use submission::write_submission;

pub use config::{BilouConfig, BilouConfigBuilder, DEFAULT_COMMENT_MARKER};

pub use error::{DocumentError, ResolutionError};

use std::borrow::Borrow;
use tracing::debug;

/// Main entrypoint of the encoding side. Resolves the candidates of the document into disjoint
/// entities and tags every token of the document.
///
/// * `document`: A document built by the record reader.
///
/// #Example
/// ```rust
/// use bilou::{encode_document, DocumentBuilder};
///
/// let document = DocumentBuilder::default()
///     .read_tokens("1 0 4 Anna\n2 5 8 Karenina\n3 14 6 visits\n4 21 6 Moscow")?
///     .read_spans("10 name 0 4 1 1\n11 surname 5 8 2 1\n12 loc_name 21 6 4 1")?
///     .read_objects("20 Person 10 11\n21 Location 12")?
///     .build()?;
///
/// let tags: Vec<String> = encode_document(&document)?
///     .iter()
///     .map(|t| t.tag.to_string())
///     .collect();
/// assert_eq!(tags, vec!["B-PER", "L-PER", "O", "U-LOC"]);
/// # Ok::<(), bilou::DocumentError>(())
/// ```
pub fn encode_document(document: &Document) -> Result<Vec<TaggedToken>, DocumentError> {
    let entities = resolve_entities(document.candidates().iter().cloned(), document.index())?;
    debug!(
        candidates = document.candidates().len(),
        entities = entities.len(),
        "resolved document"
    );
    Ok(encode_entities(
        document.tokens(),
        document.index(),
        &entities,
    )?)
}

/// Main entrypoint of the decoding side. Reads the entities of a document from its predicted
/// tags. The tags are not required to form a well-formed BILOU sequence.
///
/// * `tags`: Pairs of tags and tokens, in document order.
///
/// #Example
/// ```rust
/// use bilou::{decode_document, DecodedEntity, Token, TokenId};
///
/// let tokens = vec![
///     Token::new(TokenId(1), 0, 4, "Anna"),
///     Token::new(TokenId(2), 5, 8, "Karenina"),
///     Token::new(TokenId(3), 14, 6, "visits"),
/// ];
/// let tags = vec!["B-PER", "L-PER", "O"];
/// let decoded = decode_document(tags.into_iter().zip(tokens.iter()))?;
/// assert_eq!(decoded, vec![DecodedEntity::new("PER", 0, 13)]);
/// # Ok::<(), bilou::ResolutionError>(())
/// ```
pub fn decode_document<I, S, T>(tags: I) -> Result<Vec<DecodedEntity>, ResolutionError>
where
    I: IntoIterator<Item = (S, T)>,
    S: AsRef<str>,
    T: Borrow<Token>,
{
    let decoded = decode_tags(tags)?;
    debug!(entities = decoded.len(), "decoded document");
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Document {
        DocumentBuilder::default()
            .read_tokens(
                "1 0 3 The\n2 4 5 Bank\n3 10 2 of\n4 13 6 Russia\n5 20 4 said\n6 25 4 Anna",
            )
            .unwrap()
            .read_spans("10 org 4 5 2 3\n11 loc 13 6 4 1\n12 per 25 4 6 1")
            .unwrap()
            .read_objects("20 Org 10\n21 Location 11\n22 Person 12")
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_encode_document_resolves_nested_entities() {
        let tagged = encode_document(&document()).unwrap();
        let tags: Vec<String> = tagged.iter().map(|t| t.tag.to_string()).collect();
        assert_eq!(tags, vec!["O", "B-ORG", "I-ORG", "L-ORG", "O", "U-PER"]);
    }

    #[test]
    fn test_decode_what_was_encoded() {
        let tagged = encode_document(&document()).unwrap();
        let decoded = decode_document(tagged.iter().map(|t| (t.tag.to_string(), &t.token)));
        assert_eq!(
            decoded.unwrap(),
            vec![
                DecodedEntity::new("ORG", 4, 15),
                DecodedEntity::new("PER", 25, 4)
            ]
        );
        assert_eq!(decode_tagged(&tagged), decoded_from_labels(&tagged));
    }

    fn decoded_from_labels(tagged: &[TaggedToken]) -> Vec<DecodedEntity> {
        decode_document(tagged.iter().map(|t| (t.tag.to_string(), &t.token))).unwrap()
    }

    #[test]
    fn test_unknown_entity_type_fails_the_document() {
        let result = DocumentBuilder::default()
            .read_tokens("1 0 3 abc")
            .unwrap()
            .read_spans("10 x 0 3 1 1")
            .unwrap()
            .read_objects("20 Facility 10")
            .unwrap()
            .build();
        assert!(matches!(
            result,
            Err(DocumentError::Resolution(ResolutionError::UnknownEntityType(_)))
        ));
    }
}
