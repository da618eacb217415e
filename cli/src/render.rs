use ranksift_core::{Document, SearchHit};
use std::fmt::Write;

const SNIPPET_CHARS: usize = 200;

/// First characters of the content on a single line.
pub fn snippet(content: &str) -> String {
    content.replace(['\r', '\n'], " ").chars().take(SNIPPET_CHARS).collect()
}

/// `[rank] title (score=0.0000)` followed by an indented snippet per hit.
pub fn format_results<F>(hits: &[SearchHit], lookup: F) -> String
where
    F: Fn(&str) -> Option<Document>,
{
    let mut out = String::from("\n=== SEARCH RESULTS ===\n");
    if hits.is_empty() {
        out.push_str("No matching documents.\n");
        return out;
    }
    for (rank, hit) in hits.iter().enumerate() {
        let Some(doc) = lookup(&hit.doc_id) else { continue };
        let _ = writeln!(out, "[{}] {} (score={:.4})", rank + 1, doc.title, hit.score);
        let _ = writeln!(out, "     {}...\n", snippet(&doc.content));
    }
    out
}
