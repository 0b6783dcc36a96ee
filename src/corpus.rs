/*!
Runs the encoder or the decoder over every document of a corpus. The documents are independent:
a document failing is reported in the `CorpusReport` and excluded from its output, and the other
documents are still processed.
*/
use crate::bilou::{DecodedEntity, TaggedToken};
use crate::config::BilouConfig;
use crate::error::DocumentError;
use crate::reader::{Document, RecordError};
use crate::token::Token;
use crate::{decode_document, encode_document};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::fs::read_dir;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A document excluded from the output, with the reason.
#[derive(Debug)]
pub struct DocumentFailure {
    pub document_id: String,
    pub error: DocumentError,
}

impl Display for DocumentFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.document_id, self.error)
    }
}

/// Output of a corpus run: the output of every document that succeeded, keyed by document id,
/// and the failures sorted by document id.
#[derive(Debug)]
pub struct CorpusReport<T> {
    pub documents: BTreeMap<String, T>,
    pub failures: Vec<DocumentFailure>,
}

impl<T> Default for CorpusReport<T> {
    fn default() -> Self {
        CorpusReport {
            documents: BTreeMap::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> CorpusReport<T> {
    fn from_results(results: Vec<(String, Result<T, DocumentError>)>) -> Self {
        let mut report = CorpusReport::default();
        for (document_id, result) in results {
            match result {
                Ok(output) => {
                    debug!(document = %document_id, "document processed");
                    report.documents.insert(document_id, output);
                }
                Err(error) => {
                    warn!(document = %document_id, %error, "document excluded from output");
                    report.failures.push(DocumentFailure { document_id, error });
                }
            }
        }
        report
            .failures
            .sort_by(|a, b| a.document_id.cmp(&b.document_id));
        report
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Adds the failures of an earlier stage, such as loading, to this report.
    pub fn merge_failures<F>(&mut self, failures: F)
    where
        F: IntoIterator<Item = DocumentFailure>,
    {
        self.failures.extend(failures);
        self.failures
            .sort_by(|a, b| a.document_id.cmp(&b.document_id));
    }
}

impl CorpusReport<Document> {
    /// Tags every loaded document. The documents that failed to load stay in the failures.
    pub fn encode(self, config: &BilouConfig) -> CorpusReport<Vec<TaggedToken>> {
        let mut report = encode_corpus(self.documents, config);
        report.merge_failures(self.failures);
        report
    }

    /// Reads the entities of every loaded document from the tags predicted for its tokens.
    /// A document needs exactly one tag per token, a document without predictions fails with
    /// `PredictionCount`. The documents that failed to load stay in the failures.
    ///
    /// * `predictions`: Tags keyed by document id, in document order.
    pub fn decode<S>(
        self,
        mut predictions: BTreeMap<String, Vec<S>>,
        config: &BilouConfig,
    ) -> CorpusReport<Vec<DecodedEntity>>
    where
        S: AsRef<str> + Send,
    {
        let inputs: Vec<_> = self
            .documents
            .into_iter()
            .map(|(id, document)| {
                let tags = predictions.remove(&id).unwrap_or_default();
                (id, (document, tags))
            })
            .collect();
        for document_id in predictions.keys() {
            warn!(document = %document_id, "predictions for an unknown document ignored");
        }
        let mut report = run(inputs, config.parallel(), |(document, tags)| {
            if tags.len() != document.tokens().len() {
                return Err(RecordError::PredictionCount {
                    tokens: document.tokens().len(),
                    tags: tags.len(),
                }
                .into());
            }
            Ok(decode_document(tags.iter().zip(document.tokens()))?)
        });
        report.merge_failures(self.failures);
        report
    }
}

impl CorpusReport<Vec<TaggedToken>> {
    /// Every distinct tag produced over the corpus, `O` included.
    pub fn tag_vocabulary(&self) -> BTreeSet<String> {
        self.documents
            .values()
            .flatten()
            .map(|tagged| tagged.tag.to_string())
            .collect()
    }
}

/// Lists the failures as a table. An empty table means every document was processed.
impl<T> Display for CorpusReport<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Document, Error")?;
        for failure in self.failures.iter() {
            writeln!(f, "{}", failure)?
        }
        Ok(())
    }
}

fn run<I, T, F>(inputs: Vec<(String, I)>, parallel: bool, process: F) -> CorpusReport<T>
where
    I: Send,
    T: Send,
    F: Fn(I) -> Result<T, DocumentError> + Send + Sync,
{
    let results: Vec<(String, Result<T, DocumentError>)> = if parallel {
        inputs
            .into_par_iter()
            .map(|(id, input)| (id, process(input)))
            .collect()
    } else {
        inputs
            .into_iter()
            .map(|(id, input)| (id, process(input)))
            .collect()
    };
    CorpusReport::from_results(results)
}

/// Every `<stem>.tokens` file of the directory, as `(stem name, stem path)` sorted by name.
fn document_stems(dir: &Path) -> Result<Vec<(String, PathBuf)>, RecordError> {
    let io = |source: std::io::Error| RecordError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut stems = Vec::new();
    for entry in read_dir(dir).map_err(io)? {
        let path = entry.map_err(io)?.path();
        if path.extension().is_some_and(|e| e == "tokens") {
            let stem = path.with_extension("");
            let name = stem
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            stems.push((name, stem));
        }
    }
    stems.sort();
    Ok(stems)
}

/// Loads every annotated document of a directory: one document per `<stem>.tokens` file, read
/// with its `<stem>.spans` and `<stem>.objects` files. A document failing to load is reported in
/// the failures and the other documents are still loaded. Only an unreadable directory is an
/// error.
///
/// * `dir`: Directory holding the record files.
/// * `config`: Comment marker of the records, and uses multiple cores when `parallel` is set.
pub fn load_corpus<P: AsRef<Path>>(
    dir: P,
    config: &BilouConfig,
) -> Result<CorpusReport<Document>, RecordError> {
    let stems = document_stems(dir.as_ref())?;
    Ok(run(stems, config.parallel(), |stem| {
        Document::load(stem, config)
    }))
}

/// Loads the tokens of every document of a directory, for documents whose tags are predicted.
/// Failures are collected as in [`load_corpus`].
pub fn load_corpus_tokens<P: AsRef<Path>>(
    dir: P,
    config: &BilouConfig,
) -> Result<CorpusReport<Document>, RecordError> {
    let stems = document_stems(dir.as_ref())?;
    Ok(run(stems, config.parallel(), |stem| {
        Document::load_tokens(stem, config)
    }))
}

/// Tags every token of every document.
///
/// * `documents`: Pairs of document ids and documents.
/// * `config`: Uses multiple cores when `parallel` is set.
pub fn encode_corpus<D>(documents: D, config: &BilouConfig) -> CorpusReport<Vec<TaggedToken>>
where
    D: IntoIterator<Item = (String, Document)>,
{
    let documents: Vec<_> = documents.into_iter().collect();
    run(documents, config.parallel(), |document| {
        encode_document(&document)
    })
}

/// Reads the entities of every document from its predicted tags.
///
/// * `predictions`: Pairs of document ids and of the tags predicted for each token of the
///   document, in document order.
/// * `config`: Uses multiple cores when `parallel` is set.
pub fn decode_corpus<P, S>(
    predictions: P,
    config: &BilouConfig,
) -> CorpusReport<Vec<DecodedEntity>>
where
    P: IntoIterator<Item = (String, Vec<(S, Token)>)>,
    S: AsRef<str> + Send,
{
    let predictions: Vec<_> = predictions.into_iter().collect();
    run(predictions, config.parallel(), |tags| {
        Ok(decode_document(tags)?)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BilouConfigBuilder;
    use crate::entity::{EntityCandidate, EntityType};
    use crate::error::ResolutionError;
    use crate::reader::DocumentBuilder;
    use crate::token::TokenId;
    use rstest::rstest;

    fn document(objects: &str) -> Document {
        DocumentBuilder::default()
            .read_tokens("1 0 4 Anna\n2 5 6 visits\n3 12 6 Moscow")
            .unwrap()
            .read_spans("10 name 0 4 1 1\n11 loc 12 6 3 1")
            .unwrap()
            .read_objects(objects)
            .unwrap()
            .build()
            .unwrap()
    }

    fn corpus() -> Vec<(String, Document)> {
        // A candidate pointing outside of its document can only be built by hand.
        let broken = Document::new(
            document("").tokens().to_vec(),
            vec![EntityCandidate::new("30", EntityType::Org, vec![TokenId(42)])],
        )
        .unwrap();
        vec![
            (String::from("book_2"), document("20 Person 10\n21 Location 11")),
            (String::from("book_1"), broken),
            (String::from("book_3"), document("")),
        ]
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn test_encode_corpus_isolates_failures(#[case] parallel: bool) {
        let config = BilouConfigBuilder::new().parallel(parallel).build();
        let report = encode_corpus(corpus(), &config);
        assert_eq!(
            report.documents.keys().collect::<Vec<_>>(),
            vec!["book_2", "book_3"]
        );
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].document_id, "book_1");
        assert!(matches!(
            report.failures[0].error,
            DocumentError::Resolution(ResolutionError::UnknownTokenId(TokenId(42)))
        ));
        assert!(!report.is_complete());
    }

    #[test]
    fn test_tag_vocabulary() {
        let report = encode_corpus(corpus(), &BilouConfig::default());
        let vocabulary: Vec<String> = report.tag_vocabulary().into_iter().collect();
        assert_eq!(vocabulary, vec!["O", "U-LOC", "U-PER"]);
    }

    #[test]
    fn test_report_display() {
        let report = encode_corpus(corpus(), &BilouConfig::default());
        assert_eq!(
            report.to_string(),
            "Document, Error\nbook_1, Unknown token id: 42\n"
        );
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn test_load_failures_reach_the_encoded_report(#[case] parallel: bool) {
        let config = BilouConfigBuilder::new().parallel(parallel).build();
        let loaded = load_corpus("tests/data", &config).unwrap();
        assert_eq!(
            loaded.documents.keys().collect::<Vec<_>>(),
            vec!["book_1", "book_2"]
        );
        let report = loaded.encode(&config);
        assert_eq!(report.documents.len(), 2);
        assert_eq!(
            report.to_string(),
            "Document, Error\nbook_3, Unknown entity type: Facility\n"
        );
    }

    #[test]
    fn test_merged_failures_stay_sorted() {
        let mut report = encode_corpus(corpus(), &BilouConfig::default());
        report.merge_failures(vec![DocumentFailure {
            document_id: String::from("book_0"),
            error: RecordError::IncompleteDocument("spans").into(),
        }]);
        assert_eq!(
            report.to_string(),
            concat!(
                "Document, Error\n",
                "book_0, The document is missing its spans\n",
                "book_1, Unknown token id: 42\n"
            )
        );
    }

    #[test]
    fn test_decode_loaded_tokens() {
        let config = BilouConfig::default();
        let loaded = load_corpus_tokens("tests/data", &config).unwrap();
        assert_eq!(loaded.documents.len(), 3);
        let predictions = BTreeMap::from([
            (String::from("book_2"), vec!["U-ORG", "O", "U-ORG", "O", "O"]),
            (String::from("book_3"), vec!["B-LOC"]),
            (String::from("book_9"), vec!["O"]),
        ]);
        let report = loaded.decode(predictions, &config);
        assert_eq!(
            report.documents["book_2"],
            vec![DecodedEntity::new("ORG", 0, 7), DecodedEntity::new("ORG", 12, 7)]
        );
        let failed: Vec<String> = report.failures.iter().map(|f| f.to_string()).collect();
        assert_eq!(
            failed,
            vec![
                "book_1, 0 tags predicted for 12 tokens",
                "book_3, 1 tags predicted for 2 tokens"
            ]
        );
    }

    #[test]
    fn test_load_missing_directory() {
        let result = load_corpus("tests/no_such_directory", &BilouConfig::default());
        assert!(matches!(result, Err(RecordError::Io { .. })));
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn test_decode_corpus(#[case] parallel: bool) {
        let config = BilouConfigBuilder::new().parallel(parallel).build();
        let tokens = vec![
            Token::new(TokenId(1), 0, 4, "Anna"),
            Token::new(TokenId(2), 5, 6, "visits"),
        ];
        let predictions = vec![
            (
                String::from("a"),
                vec![("U-PER", tokens[0].clone()), ("O", tokens[1].clone())],
            ),
            (
                String::from("b"),
                vec![("U-PER", tokens[0].clone()), ("Z", tokens[1].clone())],
            ),
        ];
        let report = decode_corpus(predictions, &config);
        assert_eq!(report.documents["a"], vec![DecodedEntity::new("PER", 0, 4)]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].document_id, "b");
    }
}
