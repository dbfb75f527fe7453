//! Lexical fallback scoring
//!
//! TF-IDF keyword relevance used when no query embedding can be produced.
//! Documents are tokenized once per corpus load; document frequencies are
//! computed per search over the filtered candidate set only.

use std::collections::{HashMap, HashSet};

use crate::record::{CourseId, CourseRecord};

/// English function words removed by [`tokenize`]
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "if", "because", "as", "what", "when", "where", "how",
    "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did",
    "to", "at", "by", "for", "with", "about", "against", "between", "into", "through", "during",
    "before", "after", "above", "below", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "all", "any", "both", "each",
    "few", "more", "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same",
    "so", "than", "too", "very", "will", "just", "should", "now",
];

/// Lowercase, strip ASCII punctuation, split on whitespace, drop stop words
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_punctuation() { ' ' } else { c })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|token| !STOP_WORDS.contains(token))
        .map(String::from)
        .collect()
}

/// Term counts of one tokenized document
#[derive(Debug, Clone)]
pub struct TokenizedDocument {
    pub id: CourseId,
    term_counts: HashMap<String, usize>,
    length: usize,
}

impl TokenizedDocument {
    pub fn new(id: CourseId, text: &str) -> Self {
        let tokens = tokenize(text);
        let mut term_counts: HashMap<String, usize> = HashMap::new();
        for token in &tokens {
            *term_counts.entry(token.clone()).or_insert(0) += 1;
        }

        Self {
            id,
            term_counts,
            length: tokens.len(),
        }
    }

    /// Occurrences of `term` in this document
    pub fn count(&self, term: &str) -> usize {
        self.term_counts.get(term).copied().unwrap_or(0)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.term_counts.contains_key(term)
    }

    /// Number of tokens after stop-word removal
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Tokenized documents for every corpus record, in corpus order
#[derive(Debug, Clone, Default)]
pub struct LexicalTable {
    documents: Vec<TokenizedDocument>,
}

impl LexicalTable {
    /// Tokenize `"{name} {description}"` of every record
    pub fn build(records: &[CourseRecord]) -> Self {
        let documents = records
            .iter()
            .map(|r| TokenizedDocument::new(r.id.clone(), &r.searchable_text()))
            .collect();
        Self { documents }
    }

    /// Document at corpus position `pos`
    pub fn document(&self, pos: usize) -> Option<&TokenizedDocument> {
        self.documents.get(pos)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// TF-IDF scorer over a candidate set
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalScorer;

impl LexicalScorer {
    /// Score each candidate document against the query tokens.
    ///
    /// For every query token present in a document, adds
    /// `tf = count / doc_len` times `idf = ln(N / df)`, where N and df are taken
    /// over `documents` only. Repeated query tokens contribute repeatedly.
    /// Results are in the order of `documents`.
    pub fn score(
        &self,
        query_tokens: &[String],
        documents: &[&TokenizedDocument],
    ) -> Vec<(CourseId, f32)> {
        let n = documents.len() as f64;

        let distinct: HashSet<&str> = query_tokens.iter().map(String::as_str).collect();
        let doc_freq: HashMap<&str, usize> = distinct
            .into_iter()
            .map(|term| (term, documents.iter().filter(|d| d.contains(term)).count()))
            .collect();

        documents
            .iter()
            .map(|doc| {
                if doc.is_empty() {
                    return (doc.id.clone(), 0.0);
                }
                let doc_len = doc.len() as f64;
                let score: f64 = query_tokens
                    .iter()
                    .filter_map(|token| {
                        let count = doc.count(token);
                        let df = doc_freq.get(token.as_str()).copied().unwrap_or(0);
                        if count == 0 || df == 0 {
                            return None;
                        }
                        let tf = count as f64 / doc_len;
                        let idf = (n / df as f64).ln();
                        Some(tf * idf)
                    })
                    .sum();
                (doc.id.clone(), score as f32)
            })
            .collect()
    }
}
