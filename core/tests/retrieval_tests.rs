use ranksift_core::{Document, Error, Normalizer, SearchConfig, SearchEngine};

fn engine_with(docs: &[Document]) -> SearchEngine {
    let engine = SearchEngine::new(Normalizer::default(), SearchConfig::default());
    engine.build(docs).unwrap();
    engine
}

fn pets() -> Vec<Document> {
    vec![
        Document::new("0", "Mat", "the cat sat on the mat", "pets.csv"),
        Document::new("1", "Pets", "dogs and cats are pets", "pets.csv"),
    ]
}

#[test]
fn cat_ranks_the_mat_document_first() {
    let engine = engine_with(&pets());
    let hits = engine.search("cat", 5).unwrap();
    assert!(!hits.is_empty());
    assert_eq!(hits[0].doc_id, "0");
    assert!(hits[0].score > 0.0);
    if let Some(second) = hits.get(1) {
        assert_eq!(second.doc_id, "1");
        assert!(hits[0].score > second.score);
    }
}

#[test]
fn unmatched_query_returns_empty() {
    let engine = engine_with(&pets());
    assert!(engine.search("submarine", 5).unwrap().is_empty());
    assert!(engine.search("the and", 5).unwrap().is_empty());
    assert!(engine.search("   ", 5).unwrap().is_empty());
}

#[test]
fn empty_corpus_raises() {
    let engine = SearchEngine::new(Normalizer::default(), SearchConfig::default());
    assert!(matches!(engine.build(&[]), Err(Error::CorpusEmpty)));
    assert!(!engine.is_ready());
}

#[test]
fn malformed_query_is_a_syntax_error() {
    let engine = engine_with(&pets());
    assert!(matches!(engine.search("(cat", 5), Err(Error::QuerySyntax { .. })));
}

#[test]
fn scores_are_bounded_and_self_match_is_one() {
    let docs = vec![
        Document::new("a", "", "rust borrow checker", ""),
        Document::new("b", "", "rust borrow checker lifetimes lifetimes", ""),
        Document::new("c", "", "rust", ""),
    ];
    let engine = engine_with(&docs);
    let hits = engine.search("rust borrow checker", 10).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].doc_id, "a");
    assert!((hits[0].score - 1.0).abs() < 1e-6);
    for hit in &hits {
        assert!((0.0..=1.0).contains(&hit.score));
    }

    let hits = engine.search("rust OR lifetimes", 10).unwrap();
    assert_eq!(hits.len(), 3);
}

#[test]
fn excluded_candidates_can_score_zero_without_failing() {
    let docs = vec![
        Document::new("a", "", "solar panels", ""),
        Document::new("b", "", "wind turbines", ""),
    ];
    let engine = engine_with(&docs);
    // NOT-only queries match documents that share no positive term with the query
    let hits = engine.search("NOT solar", 10).unwrap();
    assert_eq!(hits, vec![ranksift_core::SearchHit { doc_id: "b".into(), score: 0.0 }]);
}

#[test]
fn ranking_is_deterministic_with_ties_in_candidate_order() {
    let docs: Vec<Document> = (0..20)
        .map(|i| Document::new(i.to_string(), "", "identical apple text", ""))
        .collect();
    let engine = engine_with(&docs);
    let first = engine.search("apple", 5).unwrap();
    let second = engine.search("apple", 5).unwrap();
    assert_eq!(first, second);
    let ids: Vec<&str> = first.iter().map(|h| h.doc_id.as_str()).collect();
    assert_eq!(ids, vec!["0", "1", "2", "3", "4"]);
}

#[test]
fn posting_sets_match_document_content_exactly() {
    let docs = vec![
        Document::new("0", "", "red apples and green pears", ""),
        Document::new("1", "", "green tea", ""),
        Document::new("2", "", "", ""),
    ];
    let normalizer = Normalizer::default();
    let engine = SearchEngine::new(Normalizer::default(), SearchConfig::default());
    let snapshot = engine.build(&docs).unwrap();
    let index = snapshot.index();
    for term in snapshot.vectors().vocabulary().terms() {
        let posting: Vec<&str> = index.posting_set(term);
        for doc in &docs {
            let contains = normalizer.normalize(&doc.content).contains(term);
            assert_eq!(posting.contains(&doc.id.as_str()), contains, "{term} / {}", doc.id);
        }
    }
}

#[test]
fn documents_are_available_for_rendering() {
    let engine = engine_with(&pets());
    let doc = engine.document("1").unwrap();
    assert_eq!(doc.title, "Pets");
    assert_eq!(doc.source, "pets.csv");
    assert!(engine.document("9").is_none());
}

#[test]
fn deeply_nested_queries_are_rejected_not_fatal() {
    let engine = engine_with(&pets());
    let not_chain = format!("{}cat", "NOT ".repeat(20_000));
    assert!(matches!(engine.search(&not_chain, 5), Err(Error::QuerySyntax { .. })));

    let groups = format!("{}cat{}", "(".repeat(100_000), ")".repeat(100_000));
    assert!(matches!(engine.search(&groups, 5), Err(Error::QuerySyntax { .. })));

    let hits = engine.search("((((cat))))", 5).unwrap();
    assert_eq!(hits[0].doc_id, "0");
}
