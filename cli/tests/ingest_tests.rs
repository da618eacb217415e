use ranksift::ingest::load_documents;
use std::fs;
use tempfile::tempdir;

#[test]
fn detects_title_and_content_columns() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("a_kompas.csv"),
        "Judul,Isi,Tanggal\nKucing lucu,\"Kucing duduk di atas tikar\",2024\nBerita,,2023\n",
    )
    .unwrap();

    let docs = load_documents(dir.path()).unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].id, "0");
    assert_eq!(docs[0].title, "Kucing lucu");
    assert_eq!(docs[0].content, "Kucing duduk di atas tikar");
    assert!(docs[0].source.ends_with("a_kompas.csv"));
    assert_eq!(docs[1].content, "");
}

#[test]
fn falls_back_to_file_name_and_joined_cells() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("misc.csv"), "x,y\nalpha,beta\n").unwrap();

    let docs = load_documents(dir.path()).unwrap();
    assert_eq!(docs[0].title, "misc.csv_0");
    assert_eq!(docs[0].content, "alpha beta");
}

#[test]
fn decodes_latin1_when_not_utf8() {
    let dir = tempdir().unwrap();
    let mut bytes = b"title,body\nCaf".to_vec();
    bytes.push(0xE9);
    bytes.extend_from_slice(b",cr\xE8me br\xFBl\xE9e\n");
    fs::write(dir.path().join("latin.csv"), bytes).unwrap();

    let docs = load_documents(dir.path()).unwrap();
    assert_eq!(docs[0].title, "Café");
    assert_eq!(docs[0].content, "crème brûlée");
}

#[test]
fn reads_json_and_jsonl_with_sequential_ids() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.csv"), "title,content\nOne,first doc\n").unwrap();
    fs::write(dir.path().join("b.json"), r#"[{"title":"Two","body":"second doc"}]"#).unwrap();
    fs::write(dir.path().join("c.jsonl"), "{\"title\":\"Three\",\"content\":\"third\"}\n\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let docs = load_documents(dir.path()).unwrap();
    let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["0", "1", "2"]);
    assert_eq!(docs[1].content, "second doc");
    assert_eq!(docs[2].title, "Three");
}

#[test]
fn missing_dataset_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(load_documents(&dir.path().join("absent")).is_err());
}
