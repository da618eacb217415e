use crate::config::NormalizerConfig;
use crate::Document;
use lazy_static::lazy_static;
use parking_lot::Mutex;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use unicode_normalization::UnicodeNormalization;

/// Corpus normalization logs progress every this many documents.
pub const PROGRESS_EVERY: usize = 500;

lazy_static! {
    static ref MARKUP: Regex = Regex::new(r"<[^>]+>").expect("valid regex");
    static ref WORD: Regex = Regex::new(r"\b[\w']+\b").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            // Indonesian
            "yang","dan","di","ke","dari","ini","itu","pada","untuk","dengan","adalah","sebagai",
            "oleh","karena","dalam","akan","atau","juga","tidak","lebih","dapat","para",
            // English
            "the","and","is","in","of","to","a","for","on","that","this","as","by","from","be",
        ];
        words.iter().copied().collect()
    };
}

/// A pluggable stemming function. Must be pure: the same token always yields the same stem.
pub trait Stem: Send + Sync {
    fn stem(&self, token: &str) -> String;
    /// Recorded with persisted snapshots so a mismatched reload can be detected.
    fn name(&self) -> &str;
}

pub struct SnowballStemmer {
    inner: Stemmer,
    name: String,
}

impl SnowballStemmer {
    pub fn new(algorithm: Algorithm, name: impl Into<String>) -> Self {
        Self { inner: Stemmer::create(algorithm), name: name.into() }
    }
}

impl Stem for SnowballStemmer {
    fn stem(&self, token: &str) -> String {
        self.inner.stem(token).into_owned()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Leaves tokens untouched.
pub struct IdentityStemmer;

impl Stem for IdentityStemmer {
    fn stem(&self, token: &str) -> String {
        token.to_string()
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// Memoized raw token -> stem mapping. Append-only for the lifetime of its owner.
#[derive(Default)]
pub struct StemCache {
    entries: Mutex<HashMap<String, String>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl StemCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached stem of `token`, computing and inserting it on a miss.
    pub fn get_or_stem(&self, token: &str, stemmer: &dyn Stem) -> String {
        let mut entries = self.entries.lock();
        if let Some(stem) = entries.get(token) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return stem.clone();
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let stem = stemmer.stem(token);
        entries.insert(token.to_string(), stem.clone());
        stem
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

/// Turns raw text into the term sequence used by both indexing and querying.
pub struct Normalizer {
    stemmer: Box<dyn Stem>,
    extra_stopwords: HashSet<String>,
    min_token_len: usize,
    cache: StemCache,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&NormalizerConfig::default())
    }
}

impl Normalizer {
    pub fn new(config: &NormalizerConfig) -> Self {
        let stemmer: Box<dyn Stem> = match config.language.algorithm() {
            Some(algorithm) => Box::new(SnowballStemmer::new(algorithm, config.language.as_str())),
            None => Box::new(IdentityStemmer),
        };
        Self::with_stemmer(stemmer, config)
    }

    pub fn with_stemmer(stemmer: Box<dyn Stem>, config: &NormalizerConfig) -> Self {
        let extra_stopwords = config.extra_stopwords.iter().map(|w| w.to_lowercase()).collect();
        Self { stemmer, extra_stopwords, min_token_len: config.min_token_len, cache: StemCache::new() }
    }

    pub fn stemmer_name(&self) -> &str {
        self.stemmer.name()
    }

    pub fn cache(&self) -> &StemCache {
        &self.cache
    }

    fn is_stopword(&self, token: &str) -> bool {
        STOPWORDS.contains(token) || self.extra_stopwords.contains(token)
    }

    /// Lowercase, strip `<...>` markup, tokenize, drop stopwords and short tokens, stem.
    /// Order and duplicates are preserved; empty input yields an empty sequence.
    pub fn normalize(&self, raw: &str) -> Vec<String> {
        let lowered = raw.nfkc().collect::<String>().to_lowercase();
        let stripped = MARKUP.replace_all(&lowered, " ");
        let mut terms = Vec::new();
        for mat in WORD.find_iter(&stripped) {
            let token = mat.as_str();
            if token.chars().count() < self.min_token_len || self.is_stopword(token) {
                continue;
            }
            terms.push(self.cache.get_or_stem(token, self.stemmer.as_ref()));
        }
        terms
    }

    /// Normalize every document's content, logging progress as it goes.
    pub fn normalize_corpus(&self, documents: &[Document]) -> Vec<Vec<String>> {
        let total = documents.len();
        let mut normalized = Vec::with_capacity(total);
        for (i, doc) in documents.iter().enumerate() {
            normalized.push(self.normalize(&doc.content));
            if (i + 1) % PROGRESS_EVERY == 0 || i + 1 == total {
                tracing::info!(done = i + 1, total, "preprocessed documents");
            }
        }
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingStemmer(std::sync::atomic::AtomicUsize);

    impl Stem for CountingStemmer {
        fn stem(&self, token: &str) -> String {
            self.0.fetch_add(1, Ordering::SeqCst);
            token.trim_end_matches('s').to_string()
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    #[test]
    fn basic_normalize() {
        let t = Normalizer::default().normalize("Running, runner's run!");
        assert!(t.iter().any(|w| w == "run"));
    }

    #[test]
    fn markup_is_replaced_by_space() {
        let t = Normalizer::default().normalize("<p>hello</p>world<br/>again");
        assert_eq!(t, vec!["hello", "world", "again"]);
    }

    #[test]
    fn short_tokens_and_stopwords_are_dropped() {
        let cfg = NormalizerConfig { language: crate::Language::None, ..Default::default() };
        let t = Normalizer::new(&cfg).normalize("yang ok dan kucing the cat is on mat");
        assert_eq!(t, vec!["kucing", "cat", "mat"]);
    }

    #[test]
    fn corpus_normalization_keeps_document_order() {
        let docs: Vec<Document> = (0..PROGRESS_EVERY + 3)
            .map(|i| Document::new(i.to_string(), "", format!("alpha{i} beta"), ""))
            .collect();
        let normalized = Normalizer::default().normalize_corpus(&docs);
        assert_eq!(normalized.len(), docs.len());
        assert_eq!(normalized[PROGRESS_EVERY + 2], vec![format!("alpha{}", PROGRESS_EVERY + 2), "beta".to_string()]);
    }

    #[test]
    fn cache_avoids_repeat_stemming() {
        let stemmer = CountingStemmer(std::sync::atomic::AtomicUsize::new(0));
        let n = Normalizer::with_stemmer(Box::new(stemmer), &NormalizerConfig::default());
        let first = n.normalize("cats cats dogs");
        let second = n.normalize("cats cats dogs");
        assert_eq!(first, second);
        assert_eq!(first, vec!["cat", "cat", "dog"]);
        assert_eq!(n.cache().len(), 2);
        assert_eq!(n.cache().misses(), 2);
        assert_eq!(n.cache().hits(), 4);
    }
}
