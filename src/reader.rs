/*!
Reads the annotation records of a document and assembles them into a [`Document`].

A document comes as three whitespace delimited record files sharing a stem:
* `<stem>.tokens`: `id position length text`
* `<stem>.spans`: `span_id _ _ _ start_token_id token_count ...`
* `<stem>.objects`: `object_id type_tag span_id...`

Everything following the inline comment marker (` # ` by default) is ignored.
*/
use crate::config::BilouConfig;
use crate::entity::{EntityCandidate, EntityType};
use crate::error::DocumentError;
use crate::token::{Token, TokenId, TokenIndex};
use ahash::{AHashMap, AHashSet};
use std::{
    collections::BTreeSet,
    ffi::OsString,
    fs::read_to_string,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;

/// Errors raised while reading the records of a document.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("The {record} record is missing its {field} field")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },
    #[error("Could not parse the {field} field from {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("Duplicate {record} id: {id}")]
    DuplicateRecord { record: &'static str, id: String },
    #[error("Object {object} references an unknown span: {span}")]
    UnknownSpanId { object: String, span: String },
    #[error("Span {span} of {count} tokens starting at token {start} runs past the document end")]
    SpanOutOfBounds {
        span: String,
        start: TokenId,
        count: usize,
    },
    #[error("The document is missing its {0}")]
    IncompleteDocument(&'static str),
    #[error("{tags} tags predicted for {tokens} tokens")]
    PredictionCount { tokens: usize, tags: usize },
    #[error("Could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Splits `text` into rows of whitespace separated fields. Comments and empty rows are dropped.
///
/// * `text`: Content of a record file.
/// * `comment_marker`: Everything following it on a line is ignored. Empty to keep everything.
pub fn parse_rows<'a>(text: &'a str, comment_marker: &str) -> Vec<Vec<&'a str>> {
    text.lines()
        .map(|line| match line.find(comment_marker) {
            Some(i) if !comment_marker.is_empty() => &line[..i],
            _ => line,
        })
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .filter(|row| !row.is_empty())
        .collect()
}

fn field<'a>(
    fields: &[&'a str],
    i: usize,
    record: &'static str,
    name: &'static str,
) -> Result<&'a str, RecordError> {
    fields.get(i).copied().ok_or(RecordError::MissingField {
        record,
        field: name,
    })
}

fn number<T: FromStr>(value: &str, name: &'static str) -> Result<T, RecordError> {
    value.parse::<T>().map_err(|_| RecordError::InvalidNumber {
        field: name,
        value: String::from(value),
    })
}

/// Parses a token record: `id position length text`.
pub fn parse_token(fields: &[&str]) -> Result<Token, RecordError> {
    let id = number(field(fields, 0, "token", "id")?, "id")?;
    let position = number(field(fields, 1, "token", "position")?, "position")?;
    let length = number(field(fields, 2, "token", "length")?, "length")?;
    let text = field(fields, 3, "token", "text")?;
    Ok(Token::new(id, position, length, text))
}

/// A span as written in the records: a run of `count` tokens starting at token `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanRecord {
    pub span_id: String,
    pub start: TokenId,
    pub count: usize,
}

impl TryFrom<&[&str]> for SpanRecord {
    type Error = RecordError;
    fn try_from(fields: &[&str]) -> Result<Self, Self::Error> {
        let span_id = field(fields, 0, "span", "id")?;
        let start = field(fields, 4, "span", "start token")?;
        let count = field(fields, 5, "span", "token count")?;
        Ok(SpanRecord {
            span_id: String::from(span_id),
            start: number(start, "start token")?,
            count: number(count, "token count")?,
        })
    }
}

/// An annotated object as written in the records. Its tokens are those of its spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    pub object_id: String,
    pub type_tag: String,
    pub span_ids: Vec<String>,
}

impl TryFrom<&[&str]> for ObjectRecord {
    type Error = RecordError;
    fn try_from(fields: &[&str]) -> Result<Self, Self::Error> {
        let object_id = field(fields, 0, "object", "id")?;
        let type_tag = field(fields, 1, "object", "type")?;
        Ok(ObjectRecord {
            object_id: String::from(object_id),
            type_tag: String::from(type_tag),
            span_ids: fields.iter().skip(2).map(|s| String::from(*s)).collect(),
        })
    }
}

/// Builds a document from its records. Every part must be given before building, the document
/// is validated as a whole by `build`.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    tokens: Option<Vec<Token>>,
    spans: Option<Vec<SpanRecord>>,
    objects: Option<Vec<ObjectRecord>>,
    comment_marker: String,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new(&BilouConfig::default())
    }
}

impl DocumentBuilder {
    pub fn new(config: &BilouConfig) -> Self {
        DocumentBuilder {
            tokens: None,
            spans: None,
            objects: None,
            comment_marker: String::from(config.comment_marker()),
        }
    }

    pub fn tokens(mut self, tokens: Vec<Token>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn spans(mut self, spans: Vec<SpanRecord>) -> Self {
        self.spans = Some(spans);
        self
    }

    pub fn objects(mut self, objects: Vec<ObjectRecord>) -> Self {
        self.objects = Some(objects);
        self
    }

    /// Parses the content of a `.tokens` file.
    pub fn read_tokens(self, text: &str) -> Result<Self, RecordError> {
        let tokens = parse_rows(text, &self.comment_marker)
            .iter()
            .map(|row| parse_token(row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.tokens(tokens))
    }

    /// Parses the content of a `.spans` file.
    pub fn read_spans(self, text: &str) -> Result<Self, RecordError> {
        let spans = parse_rows(text, &self.comment_marker)
            .iter()
            .map(|row| SpanRecord::try_from(row.as_slice()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.spans(spans))
    }

    /// Parses the content of a `.objects` file.
    pub fn read_objects(self, text: &str) -> Result<Self, RecordError> {
        let objects = parse_rows(text, &self.comment_marker)
            .iter()
            .map(|row| ObjectRecord::try_from(row.as_slice()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.objects(objects))
    }

    /// Validates the records and builds the document.
    pub fn build(self) -> Result<Document, DocumentError> {
        let tokens = self.tokens.ok_or(RecordError::IncompleteDocument("tokens"))?;
        let spans = self.spans.ok_or(RecordError::IncompleteDocument("spans"))?;
        let objects = self
            .objects
            .ok_or(RecordError::IncompleteDocument("objects"))?;
        let index = TokenIndex::new(&tokens)?;
        let spans = materialize_spans(spans, &index)?;
        let candidates = gather_candidates(objects, &spans)?;
        Ok(Document {
            tokens,
            index,
            spans,
            candidates,
        })
    }

    /// Builds a document without annotations, such as a document whose tags are predicted.
    pub fn build_tokens_only(self) -> Result<Document, DocumentError> {
        let tokens = self.tokens.ok_or(RecordError::IncompleteDocument("tokens"))?;
        Document::new(tokens, Vec::new())
    }
}

/// Walks the token list from the start token of every span.
fn materialize_spans(
    spans: Vec<SpanRecord>,
    index: &TokenIndex,
) -> Result<AHashMap<String, Vec<TokenId>>, DocumentError> {
    let mut materialized = AHashMap::with_capacity(spans.len());
    for span in spans {
        let start = index.position_of(span.start)?;
        let token_ids = start
            .checked_add(span.count)
            .and_then(|end| index.ids().get(start..end))
            .ok_or_else(|| RecordError::SpanOutOfBounds {
                span: span.span_id.clone(),
                start: span.start,
                count: span.count,
            })?
            .to_vec();
        if materialized.insert(span.span_id.clone(), token_ids).is_some() {
            return Err(RecordError::DuplicateRecord {
                record: "span",
                id: span.span_id,
            }
            .into());
        }
    }
    Ok(materialized)
}

/// Unions the tokens of the spans of every object. Objects keep the order of their records.
fn gather_candidates(
    objects: Vec<ObjectRecord>,
    spans: &AHashMap<String, Vec<TokenId>>,
) -> Result<Vec<EntityCandidate>, DocumentError> {
    let mut seen = AHashSet::with_capacity(objects.len());
    let mut candidates = Vec::with_capacity(objects.len());
    for object in objects {
        if !seen.insert(object.object_id.clone()) {
            return Err(RecordError::DuplicateRecord {
                record: "object",
                id: object.object_id,
            }
            .into());
        }
        let entity_type: EntityType = object.type_tag.parse()?;
        let mut token_ids = BTreeSet::new();
        for span_id in object.span_ids.iter() {
            let span = spans
                .get(span_id)
                .ok_or_else(|| RecordError::UnknownSpanId {
                    object: object.object_id.clone(),
                    span: span_id.clone(),
                })?;
            token_ids.extend(span.iter().copied());
        }
        candidates.push(EntityCandidate {
            entity_id: object.object_id,
            entity_type,
            token_ids,
        });
    }
    Ok(candidates)
}

/// A validated document: its tokens, their index and its annotated entities.
#[derive(Debug, Clone)]
pub struct Document {
    tokens: Vec<Token>,
    index: TokenIndex,
    spans: AHashMap<String, Vec<TokenId>>,
    candidates: Vec<EntityCandidate>,
}

impl Document {
    /// Builds a document from already gathered candidates.
    pub fn new(
        tokens: Vec<Token>,
        candidates: Vec<EntityCandidate>,
    ) -> Result<Self, DocumentError> {
        let index = TokenIndex::new(&tokens).map_err(DocumentError::from)?;
        Ok(Document {
            tokens,
            index,
            spans: AHashMap::new(),
            candidates,
        })
    }

    /// Reads `<stem>.tokens`, `<stem>.spans` and `<stem>.objects`.
    pub fn load<P: AsRef<Path>>(stem: P, config: &BilouConfig) -> Result<Self, DocumentError> {
        let stem = stem.as_ref();
        DocumentBuilder::new(config)
            .read_tokens(&read_record_file(stem, "tokens")?)?
            .read_spans(&read_record_file(stem, "spans")?)?
            .read_objects(&read_record_file(stem, "objects")?)?
            .build()
    }

    /// Reads `<stem>.tokens` only.
    pub fn load_tokens<P: AsRef<Path>>(
        stem: P,
        config: &BilouConfig,
    ) -> Result<Self, DocumentError> {
        DocumentBuilder::new(config)
            .read_tokens(&read_record_file(stem.as_ref(), "tokens")?)?
            .build_tokens_only()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn index(&self) -> &TokenIndex {
        &self.index
    }

    pub fn candidates(&self) -> &[EntityCandidate] {
        &self.candidates
    }

    /// Token ids of a span, in document order.
    pub fn span<S: AsRef<str>>(&self, span_id: S) -> Option<&[TokenId]> {
        self.spans.get(span_id.as_ref()).map(|v| v.as_slice())
    }
}

fn read_record_file(stem: &Path, extension: &str) -> Result<String, RecordError> {
    let mut path = OsString::from(stem.as_os_str());
    path.push(".");
    path.push(extension);
    let path = PathBuf::from(path);
    read_to_string(&path).map_err(|source| RecordError::Io { path, source })
}
