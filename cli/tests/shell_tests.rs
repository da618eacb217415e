use ranksift::shell::{run, ShellOptions};
use ranksift::{index_dataset, open_index};
use ranksift_core::{Normalizer, SearchConfig, SearchEngine};
use std::fs;
use std::io::Cursor;
use tempfile::tempdir;

fn engine() -> SearchEngine {
    SearchEngine::new(Normalizer::default(), SearchConfig::default())
}

fn write_dataset(dir: &std::path::Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join("pets.csv"),
        "title,content\nMat,the cat sat on the mat\nPets,dogs and cats are pets\n",
    )
    .unwrap();
}

fn drive(engine: &SearchEngine, opts: &ShellOptions, script: &str) -> String {
    let mut out = Vec::new();
    run(engine, opts, Cursor::new(script.to_string()), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn index_then_search_ranks_mat_first() {
    let dir = tempdir().unwrap();
    let opts = ShellOptions { dataset: dir.path().join("dataset"), index: dir.path().join("index"), top_k: 5 };
    write_dataset(&opts.dataset);

    let out = drive(&engine(), &opts, "1\n2\ncat\n3\n");
    assert!(out.contains("[INFO] Indexed 2 documents."));
    let first = out.find("[1] Mat").expect("mat ranked");
    if let Some(second) = out.find("[2] Pets") {
        assert!(first < second);
    }
    assert!(out.ends_with("Done.\n"));
}

#[test]
fn search_without_index_asks_to_build_first() {
    let dir = tempdir().unwrap();
    let opts = ShellOptions { dataset: dir.path().join("dataset"), index: dir.path().join("index"), top_k: 5 };
    let out = drive(&engine(), &opts, "2\n9\n");
    assert!(out.contains("[!] No index yet. Run option 1 first."));
    assert!(out.contains("Invalid choice."));
}

#[test]
fn search_loads_persisted_index_lazily() {
    let dir = tempdir().unwrap();
    let opts = ShellOptions { dataset: dir.path().join("dataset"), index: dir.path().join("index"), top_k: 5 };
    write_dataset(&opts.dataset);
    index_dataset(&engine(), &opts.dataset, &opts.index).unwrap();

    let fresh = engine();
    let out = drive(&fresh, &opts, "2\nsubmarine\n2\n(cat\n");
    assert!(fresh.is_ready());
    assert!(out.contains("No matching documents."));
    assert!(out.contains("[ERROR] query syntax error"));
}

#[test]
fn open_index_reports_metadata() {
    let dir = tempdir().unwrap();
    let dataset = dir.path().join("dataset");
    let index = dir.path().join("index");
    write_dataset(&dataset);
    index_dataset(&engine(), &dataset, &index).unwrap();

    let fresh = engine();
    let meta = open_index(&fresh, &index).unwrap();
    assert_eq!(meta.num_docs, 2);
    assert_eq!(meta.stemmer, "english");
    assert_eq!(fresh.search("cat", 1).unwrap()[0].doc_id, "0");
}

#[test]
fn empty_dataset_is_reported_not_fatal() {
    let dir = tempdir().unwrap();
    let opts = ShellOptions { dataset: dir.path().join("dataset"), index: dir.path().join("index"), top_k: 5 };
    fs::create_dir_all(&opts.dataset).unwrap();
    let out = drive(&engine(), &opts, "1\n3\n");
    assert!(out.contains("[ERROR] building index"));
}

#[test]
fn failed_save_keeps_the_built_index_searchable() {
    let dir = tempdir().unwrap();
    let dataset = dir.path().join("dataset");
    write_dataset(&dataset);
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let engine = engine();
    let err = index_dataset(&engine, &dataset, &blocker.join("index")).unwrap_err();
    assert!(format!("{err:#}").contains("saving index"));
    assert!(engine.is_ready());
    let hits = engine.search("cat", 5).unwrap();
    assert_eq!(hits[0].doc_id, "0");
}
