use bilou::{
    decode_document, encode_corpus, encode_document, load_corpus, write_submission, BilouConfig,
    BilouConfigBuilder, DecodedEntity, Document, DocumentError, EntityCandidate, EntityType,
    RecordError, ResolutionError, TagLabel, Token, TokenId,
};

fn load(name: &str) -> Result<Document, DocumentError> {
    Document::load(format!("tests/data/{}", name), &BilouConfig::default())
}

fn tags_of(document: &Document) -> Vec<String> {
    encode_document(document)
        .expect("the fixture resolves")
        .iter()
        .map(|t| t.tag.to_string())
        .collect()
}

#[test]
fn encode_nested_organization_and_person() {
    let document = load("book_1").expect("file book_1 not found in test directory");
    assert_eq!(document.tokens().len(), 12);
    assert_eq!(document.candidates().len(), 4);
    assert_eq!(
        tags_of(&document),
        vec![
            "B-ORG", "I-ORG", "L-ORG", "O", "B-PER", "L-PER", "O", "O", "U-LOC", "O", "O", "O"
        ]
    );
}

#[test]
fn encode_gapped_organization() {
    let document = load("book_2").expect("file book_2 not found in test directory");
    assert_eq!(tags_of(&document), vec!["B-ORG", "I-ORG", "L-ORG", "O", "O"]);
}

#[test]
fn unknown_entity_type_fails_the_document() {
    let result = load("book_3");
    assert!(matches!(
        result,
        Err(DocumentError::Resolution(ResolutionError::UnknownEntityType(t))) if t == "Facility"
    ));
}

#[test]
fn missing_document_is_an_io_error() {
    assert!(matches!(
        load("book_404"),
        Err(DocumentError::Record(RecordError::Io { .. }))
    ));
}

#[test]
fn decode_encoded_document_into_submission() {
    let document = load("book_1").unwrap();
    let tagged = encode_document(&document).unwrap();
    let decoded = decode_document(tagged.iter().map(|t| (t.tag.to_string(), &t.token))).unwrap();
    assert_eq!(
        decoded,
        vec![
            DecodedEntity::new("ORG", 0, 14),
            DecodedEntity::new("PER", 21, 17),
            DecodedEntity::new("LOC", 47, 6),
        ]
    );
    let mut submission = Vec::new();
    write_submission(&mut submission, &decoded).unwrap();
    assert_eq!(
        String::from_utf8(submission).unwrap(),
        "ORG 0 14\nPER 21 17\nLOC 47 6\n"
    );
}

#[test]
fn decode_predictions_over_tokens_only() {
    let document =
        Document::load_tokens("tests/data/book_2", &BilouConfig::default()).unwrap();
    assert!(document.candidates().is_empty());
    // A malformed prediction: an entity never closed, then a category change.
    let predictions = ["B-ORG", "I-ORG", "I-LOC", "O", "L-PER"];
    let decoded = decode_document(predictions.iter().zip(document.tokens())).unwrap();
    assert_eq!(
        decoded,
        vec![
            DecodedEntity::new("ORG", 0, 11),
            DecodedEntity::new("LOC", 12, 7),
            DecodedEntity::new("PER", 27, 1),
        ]
    );
}

#[test]
fn corpus_keeps_going_after_a_failure() {
    let book_1 = load("book_1").unwrap();
    let broken = Document::new(
        book_1.tokens().to_vec(),
        vec![EntityCandidate::new(
            "1",
            EntityType::Person,
            vec![TokenId(1004), TokenId(9999)],
        )],
    )
    .unwrap();
    let corpus = vec![
        (String::from("book_1"), book_1),
        (String::from("book_2"), load("book_2").unwrap()),
        (String::from("broken"), broken),
    ];
    let config = BilouConfigBuilder::new().parallel(true).build();
    let report = encode_corpus(corpus, &config);
    assert_eq!(report.documents.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(
        report.to_string(),
        "Document, Error\nbroken, Unknown token id: 9999\n"
    );
    let vocabulary: Vec<String> = report.tag_vocabulary().into_iter().collect();
    assert_eq!(
        vocabulary,
        vec!["B-ORG", "B-PER", "I-ORG", "L-ORG", "L-PER", "O", "U-LOC"]
    );
}

#[test]
fn comment_marker_is_configurable() {
    // Without comment stripping, the trailing comment of an object is read as span references.
    let config = BilouConfigBuilder::new().comment_marker("").build();
    let result = Document::load("tests/data/book_2", &config);
    assert!(matches!(
        result,
        Err(DocumentError::Record(RecordError::UnknownSpanId { span, .. })) if span == "#"
    ));
    let document = Document::load_tokens("tests/data/book_2", &config).unwrap();
    assert_eq!(document.tokens().len(), 5);
}

#[test]
fn tagged_tokens_serialize_to_json() {
    let document = load("book_2").unwrap();
    let tagged = encode_document(&document).unwrap();
    assert_eq!(tagged[0].tag, "B-ORG".parse::<TagLabel>().unwrap());
    let json = serde_json::to_string(&tagged[..2]).unwrap();
    assert_eq!(
        json,
        concat!(
            r#"[{"tag":"B-ORG","token":{"id":2000,"position":0,"length":7,"text":"Gazprom"}},"#,
            r#"{"tag":"I-ORG","token":{"id":2001,"position":8,"length":3,"text":"and"}}]"#
        )
    );
}

#[test]
fn corpus_report_lists_documents_failing_to_load() {
    let config = BilouConfig::default();
    let loaded = load_corpus("tests/data", &config).expect("tests/data is readable");
    let report = loaded.encode(&config);
    assert_eq!(
        report.documents.keys().collect::<Vec<_>>(),
        vec!["book_1", "book_2"]
    );
    assert_eq!(
        report.to_string(),
        "Document, Error\nbook_3, Unknown entity type: Facility\n"
    );
}

#[test]
fn decoding_huge_offsets_does_not_panic() {
    let token = Token::new(TokenId(1), usize::MAX, 5, "x");
    let decoded = decode_document(vec![("U-PER", &token)]).unwrap();
    assert_eq!(decoded, vec![DecodedEntity::new("PER", usize::MAX, 0)]);
}
