//! Fixed vocabulary and raw term-frequency matrix over the corpus.

use crate::error::{Error, Result};
use crate::tokenizer::Normalizer;
use crate::{Document, TermId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Distinct corpus terms in lexicographic order; a term's rank is its column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    terms: Vec<String>,
    lookup: HashMap<String, TermId>,
}

impl From<Vec<String>> for Vocabulary {
    fn from(terms: Vec<String>) -> Self {
        let lookup = terms.iter().enumerate().map(|(i, t)| (t.clone(), i as TermId)).collect();
        Self { terms, lookup }
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocab: Vocabulary) -> Self {
        vocab.terms
    }
}

impl Vocabulary {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn id(&self, term: &str) -> Option<TermId> {
        self.lookup.get(term).copied()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// Sparse row of raw counts, sorted by term id, zero counts omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermVector {
    entries: Vec<(TermId, u32)>,
}

impl TermVector {
    /// Count `terms` against `vocab`; unknown terms are ignored.
    pub fn from_terms<S: AsRef<str>>(terms: &[S], vocab: &Vocabulary) -> Self {
        let mut counts: BTreeMap<TermId, u32> = BTreeMap::new();
        for term in terms {
            if let Some(id) = vocab.id(term.as_ref()) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        Self { entries: counts.into_iter().collect() }
    }

    pub fn entries(&self) -> &[(TermId, u32)] {
        &self.entries
    }

    pub fn dot(&self, other: &TermVector) -> u64 {
        let (mut i, mut j, mut sum) = (0, 0, 0u64);
        while i < self.entries.len() && j < other.entries.len() {
            let (a, ca) = self.entries[i];
            let (b, cb) = other.entries[j];
            match a.cmp(&b) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += ca as u64 * cb as u64;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|&(_, c)| (c as f64) * (c as f64)).sum::<f64>().sqrt()
    }
}

/// `(q . d) / (|q| |d|)`, defined as 0 when either vector is zero.
pub fn cosine_similarity(q: &TermVector, d: &TermVector) -> f32 {
    let denom = q.norm() * d.norm();
    if denom == 0.0 {
        return 0.0;
    }
    ((q.dot(d) as f64 / denom).min(1.0)) as f32
}

/// Vocabulary, term-frequency matrix and document map from one corpus.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VectorStore {
    pub(crate) vocabulary: Vocabulary,
    pub(crate) matrix: Vec<TermVector>,
    pub(crate) documents: HashMap<String, Document>,
    pub(crate) rows: HashMap<String, usize>,
    pub(crate) generation: u64,
    pub(crate) ready: bool,
}

impl VectorStore {
    /// An empty, unbuilt store. `vectorize` fails with `VectorStoreNotReady` until `build`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(&mut self, documents: &[Document], normalizer: &Normalizer) -> Result<()> {
        let normalized = normalizer.normalize_corpus(documents);
        let built = Self::from_normalized(documents, &normalized, crate::engine::next_generation())?;
        *self = built;
        Ok(())
    }

    pub(crate) fn from_normalized(
        documents: &[Document],
        normalized: &[Vec<String>],
        generation: u64,
    ) -> Result<Self> {
        if documents.is_empty() {
            return Err(Error::CorpusEmpty);
        }
        let distinct: BTreeSet<&str> = normalized.iter().flatten().map(String::as_str).collect();
        let vocabulary = Vocabulary::from(distinct.into_iter().map(str::to_string).collect::<Vec<_>>());

        let mut store = Self { vocabulary, generation, ..Self::default() };
        for (row, (doc, terms)) in documents.iter().zip(normalized).enumerate() {
            if store.rows.insert(doc.id.clone(), row).is_some() {
                return Err(Error::DuplicateDocument(doc.id.clone()));
            }
            store.matrix.push(TermVector::from_terms(terms, &store.vocabulary));
            store.documents.insert(doc.id.clone(), doc.clone());
        }
        store.ready = true;
        tracing::debug!(rows = store.matrix.len(), columns = store.vocabulary.len(), "term-frequency matrix built");
        Ok(store)
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn document(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    /// Stored matrix row for a document.
    pub fn row(&self, id: &str) -> Option<&TermVector> {
        self.rows.get(id).map(|&r| &self.matrix[r])
    }

    /// Count `text`'s terms against the existing vocabulary. Never grows the vocabulary.
    pub fn vectorize(&self, text: &str, normalizer: &Normalizer) -> Result<TermVector> {
        if !self.ready {
            return Err(Error::VectorStoreNotReady);
        }
        Ok(TermVector::from_terms(&normalizer.normalize(text), &self.vocabulary))
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}
