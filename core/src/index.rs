use crate::error::{Error, Result};
use crate::query::{self, Query};
use crate::tokenizer::Normalizer;
use crate::{DocId, Document, TermId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    /// Offsets of the term in the document's normalized sequence, ascending.
    pub positions: Vec<u32>,
}

impl Posting {
    pub fn term_frequency(&self) -> u32 {
        self.positions.len() as u32
    }
}

/// Term -> posting list over document content, plus stored documents.
///
/// Built once per corpus snapshot and read-only afterwards. `build` replaces
/// the whole structure only after the new one is complete.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub(crate) dictionary: HashMap<String, TermId>,
    pub(crate) df: Vec<u32>,
    pub(crate) postings: HashMap<TermId, Vec<Posting>>, // postings sorted by doc_id
    pub(crate) docs: Vec<Document>,
    pub(crate) doc_ids: HashMap<String, DocId>,
    pub(crate) generation: u64,
    pub(crate) ready: bool,
}

/// A literal after normalization.
#[derive(Debug)]
enum Node {
    Term(String),
    Phrase(Vec<String>),
    And(Vec<Node>),
    Or(Vec<Node>),
    Not(Box<Node>),
}

impl InvertedIndex {
    /// An empty, unbuilt index. Queries fail with `IndexNotReady` until `build`.
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
        let mut index = Self { generation, ..Self::default() };
        for (doc, terms) in documents.iter().zip(normalized) {
            let doc_id = index.docs.len() as DocId;
            if index.doc_ids.insert(doc.id.clone(), doc_id).is_some() {
                return Err(Error::DuplicateDocument(doc.id.clone()));
            }

            let mut positions: HashMap<TermId, Vec<u32>> = HashMap::new();
            for (pos, term) in terms.iter().enumerate() {
                let next_id = index.dictionary.len() as TermId;
                let tid = *index.dictionary.entry(term.clone()).or_insert(next_id);
                positions.entry(tid).or_default().push(pos as u32);
            }
            for (tid, positions) in positions {
                if index.df.len() <= tid as usize {
                    index.df.resize(tid as usize + 1, 0);
                }
                index.df[tid as usize] += 1;
                // doc ids increase monotonically, so each list stays sorted
                index.postings.entry(tid).or_default().push(Posting { doc_id, positions });
            }
            index.docs.push(doc.clone());
        }
        index.ready = true;
        tracing::debug!(num_docs = index.docs.len(), num_terms = index.dictionary.len(), "inverted index built");
        Ok(index)
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn num_docs(&self) -> usize {
        self.docs.len()
    }

    pub fn num_terms(&self) -> usize {
        self.dictionary.len()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn document(&self, id: &str) -> Option<&Document> {
        self.doc_ids.get(id).map(|&d| &self.docs[d as usize])
    }

    /// Posting list for an already-normalized term.
    pub fn postings(&self, term: &str) -> &[Posting] {
        self.dictionary
            .get(term)
            .and_then(|tid| self.postings.get(tid))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Ids of documents containing `term`, in insertion order.
    pub fn posting_set(&self, term: &str) -> Vec<&str> {
        self.postings(term).iter().map(|p| self.docs[p.doc_id as usize].id.as_str()).collect()
    }

    /// Parse and evaluate `expression`, returning up to `limit` document ids by baseline score.
    pub fn query(&self, expression: &str, limit: usize, normalizer: &Normalizer) -> Result<Vec<String>> {
        if !self.ready {
            return Err(Error::IndexNotReady);
        }
        let Some(query) = query::parse(expression)? else {
            return Ok(Vec::new());
        };
        Ok(self
            .evaluate(&query, limit, normalizer)?
            .into_iter()
            .map(|(id, _)| id)
            .collect())
    }

    /// Evaluate a parsed query. Results are ordered by score descending, then insertion order.
    pub fn evaluate(&self, query: &Query, limit: usize, normalizer: &Normalizer) -> Result<Vec<(String, f32)>> {
        if !self.ready {
            return Err(Error::IndexNotReady);
        }
        let Some(node) = lower(query, normalizer) else {
            return Ok(Vec::new());
        };
        let Some(matched) = self.matches(&node) else {
            return Ok(Vec::new());
        };

        let mut positive = Vec::new();
        collect_terms(&node, &mut positive);
        positive.sort();
        positive.dedup();

        let mut scored: Vec<(DocId, f32)> =
            matched.into_iter().map(|doc_id| (doc_id, self.score(doc_id, &positive))).collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(limit);
        Ok(scored
            .into_iter()
            .map(|(doc_id, score)| (self.docs[doc_id as usize].id.clone(), score))
            .collect())
    }

    /// Smoothed tf-idf: sum of (1 + ln tf) * ln(1 + N/df) over matched terms.
    fn score(&self, doc_id: DocId, terms: &[&str]) -> f32 {
        let n = self.docs.len().max(1) as f32;
        let mut total = 0.0f32;
        for term in terms {
            let Some(&tid) = self.dictionary.get(*term) else { continue };
            let list = self.postings(term);
            let Ok(i) = list.binary_search_by_key(&doc_id, |p| p.doc_id) else { continue };
            let tf = list[i].term_frequency() as f32;
            let df_t = self.df[tid as usize].max(1) as f32;
            total += (1.0 + tf.ln()) * (1.0 + n / df_t).ln();
        }
        total
    }

    /// `None` means the node places no constraint.
    fn matches(&self, node: &Node) -> Option<BTreeSet<DocId>> {
        match node {
            Node::Term(t) => Some(self.postings(t).iter().map(|p| p.doc_id).collect()),
            Node::Phrase(terms) => Some(self.phrase_matches(terms)),
            Node::And(children) => children
                .iter()
                .filter_map(|c| self.matches(c))
                .reduce(|acc, s| acc.intersection(&s).copied().collect()),
            Node::Or(children) => children
                .iter()
                .filter_map(|c| self.matches(c))
                .reduce(|mut acc, s| {
                    acc.extend(s);
                    acc
                }),
            Node::Not(inner) => {
                let excluded = self.matches(inner)?;
                Some((0..self.docs.len() as DocId).filter(|d| !excluded.contains(d)).collect())
            }
        }
    }

    fn phrase_matches(&self, terms: &[String]) -> BTreeSet<DocId> {
        let lists: Vec<&[Posting]> = terms.iter().map(|t| self.postings(t)).collect();
        let mut out = BTreeSet::new();
        let Some((first, rest)) = lists.split_first() else { return out };
        'docs: for head in first.iter() {
            let mut tails = Vec::with_capacity(rest.len());
            for list in rest {
                match list.binary_search_by_key(&head.doc_id, |p| p.doc_id) {
                    Ok(i) => tails.push(&list[i].positions),
                    Err(_) => continue 'docs,
                }
            }
            let consecutive = head.positions.iter().any(|&start| {
                tails
                    .iter()
                    .enumerate()
                    .all(|(offset, positions)| positions.binary_search(&(start + offset as u32 + 1)).is_ok())
            });
            if consecutive {
                out.insert(head.doc_id);
            }
        }
        out
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// Normalize literals. Literals that normalize to nothing are dropped.
fn lower(query: &Query, normalizer: &Normalizer) -> Option<Node> {
    match query {
        Query::Term(raw) | Query::Phrase(raw) => {
            let mut terms = normalizer.normalize(raw);
            match terms.len() {
                0 => None,
                1 => terms.pop().map(Node::Term),
                _ => Some(Node::Phrase(terms)),
            }
        }
        Query::And(children) => lower_all(children, normalizer).map(Node::And),
        Query::Or(children) => lower_all(children, normalizer).map(Node::Or),
        Query::Not(inner) => lower(inner, normalizer).map(|n| Node::Not(Box::new(n))),
    }
}

fn lower_all(children: &[Query], normalizer: &Normalizer) -> Option<Vec<Node>> {
    let nodes: Vec<Node> = children.iter().filter_map(|c| lower(c, normalizer)).collect();
    (!nodes.is_empty()).then_some(nodes)
}

fn collect_terms<'a>(node: &'a Node, out: &mut Vec<&'a str>) {
    match node {
        Node::Term(t) => out.push(t),
        Node::Phrase(terms) => out.extend(terms.iter().map(String::as_str)),
        Node::And(children) | Node::Or(children) => {
            for child in children {
                collect_terms(child, out);
            }
        }
        Node::Not(_) => {}
    }
}
