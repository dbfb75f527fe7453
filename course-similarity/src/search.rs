//! Course search
//!
//! Filters the corpus by department, scores every candidate in exactly one
//! mode (embedding cosine or lexical TF-IDF), and returns the top-k matches.

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::embedding::{request_query_embedding, Embedder, QueryEmbedding};
use crate::lexical::{tokenize, LexicalScorer, LexicalTable, TokenizedDocument};
use crate::record::CourseRecord;
use crate::store::CorpusStore;
use crate::vector::cosine_similarity;

/// Result count used when a query asks for zero or fewer results
pub const DEFAULT_TOP_K: usize = 5;

/// Search configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Result count substituted for non-positive `top_k` (default: 5)
    pub default_top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_top_k: DEFAULT_TOP_K,
        }
    }
}

/// A search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    /// Case-insensitive exact department match; blank means no filter
    pub department: Option<String>,
    pub top_k: i64,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            department: None,
            top_k: DEFAULT_TOP_K as i64,
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_top_k(mut self, top_k: i64) -> Self {
        self.top_k = top_k;
        self
    }

    /// Requested result count, with non-positive values replaced by `default`
    pub fn effective_top_k(&self, default: usize) -> usize {
        if self.top_k <= 0 {
            default
        } else {
            usize::try_from(self.top_k).unwrap_or(usize::MAX)
        }
    }

    fn department_filter(&self) -> Option<&str> {
        self.department
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

/// How the candidates of a search were scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// Cosine similarity against the query embedding
    Semantic,
    /// TF-IDF keyword relevance
    Lexical,
}

/// One ranked search hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMatch {
    pub score: f32,
    pub code: String,
    pub name: String,
    pub description: String,
    pub department: String,
    pub faculty: String,
}

impl ScoredMatch {
    fn from_record(record: &CourseRecord, score: f32) -> Self {
        Self {
            score,
            code: record.code.clone(),
            name: record.name.clone(),
            description: record.description.clone(),
            department: record.department.clone(),
            faculty: record.faculty.clone(),
        }
    }
}

/// Ranked matches plus timing
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub matches: Vec<ScoredMatch>,
    pub elapsed: Duration,
    /// `None` when the department filter left nothing to score
    pub mode: Option<ScoringMode>,
}

impl SearchOutcome {
    /// Elapsed wall time in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Search over a loaded corpus
pub struct SearchEngine<'a> {
    store: &'a CorpusStore,
    lexical: &'a LexicalTable,
    config: SearchConfig,
}

impl<'a> SearchEngine<'a> {
    pub fn new(store: &'a CorpusStore, lexical: &'a LexicalTable) -> Self {
        Self::with_config(store, lexical, SearchConfig::default())
    }

    pub fn with_config(
        store: &'a CorpusStore,
        lexical: &'a LexicalTable,
        config: SearchConfig,
    ) -> Self {
        Self {
            store,
            lexical,
            config,
        }
    }

    /// Run a search.
    ///
    /// A query embedding is requested only when `embedder` is given and the
    /// query text is not blank; otherwise, or when the embedding is
    /// unavailable, candidates are scored lexically.
    pub fn search(&self, query: &SearchQuery, embedder: Option<&dyn Embedder>) -> SearchOutcome {
        let start = Instant::now();
        let top_k = query.effective_top_k(self.config.default_top_k);

        let candidates: Vec<usize> = match query.department_filter() {
            Some(department) => self
                .store
                .all()
                .iter()
                .enumerate()
                .filter(|(_, r)| r.in_department(department))
                .map(|(pos, _)| pos)
                .collect(),
            None => (0..self.store.len()).collect(),
        };

        if candidates.is_empty() {
            log::info!(
                "No courses in department {:?}; returning empty result",
                query.department_filter().unwrap_or_default()
            );
            return SearchOutcome {
                matches: Vec::new(),
                elapsed: start.elapsed(),
                mode: None,
            };
        }

        let embedding = request_query_embedding(embedder, &query.text, self.store.dimension());

        let (mode, mut scored) = match embedding {
            QueryEmbedding::Vector(query_vector) => {
                (ScoringMode::Semantic, self.score_semantic(&candidates, &query_vector))
            }
            QueryEmbedding::Unavailable(reason) => {
                log::warn!("Query embedding unavailable ({}); using lexical scoring", reason);
                (ScoringMode::Lexical, self.score_lexical(&candidates, &query.text))
            }
        };

        // sort_by is stable: equal scores keep corpus order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);

        let records = self.store.all();
        let matches: Vec<ScoredMatch> = scored
            .into_iter()
            .map(|(pos, score)| ScoredMatch::from_record(&records[pos], score))
            .collect();

        let elapsed = start.elapsed();
        log::info!(
            "Search for {:?} scored {} candidates ({:?}), returned {} in {:.3}s",
            query.text,
            candidates.len(),
            mode,
            matches.len(),
            elapsed.as_secs_f64()
        );

        SearchOutcome {
            matches,
            elapsed,
            mode: Some(mode),
        }
    }

    fn score_semantic(&self, candidates: &[usize], query_vector: &[f32]) -> Vec<(usize, f32)> {
        let records = self.store.all();
        candidates
            .iter()
            .map(|&pos| (pos, cosine_similarity(query_vector, records[pos].embedding())))
            .collect()
    }

    fn score_lexical(&self, candidates: &[usize], text: &str) -> Vec<(usize, f32)> {
        let tokens = tokenize(text);
        let (positions, documents): (Vec<usize>, Vec<&TokenizedDocument>) = candidates
            .iter()
            .filter_map(|&pos| self.lexical.document(pos).map(|doc| (pos, doc)))
            .unzip();

        LexicalScorer
            .score(&tokens, &documents)
            .into_iter()
            .zip(positions)
            .map(|((_, score), pos)| (pos, score))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, SimilarityError};
    use crate::embedding::EmbeddingRole;
    use crate::record::RawCourseRow;

    struct FixedEmbedder(Vec<f32>);

    impl Embedder for FixedEmbedder {
        fn embed(&self, _text: &str, role: EmbeddingRole) -> Result<Vec<f32>> {
            assert!(role.is_query());
            Ok(self.0.clone())
        }
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn embed(&self, _text: &str, _role: EmbeddingRole) -> Result<Vec<f32>> {
            Err(SimilarityError::embedding("service down"))
        }
    }

    fn abc_corpus() -> (CorpusStore, LexicalTable) {
        let rows = vec![
            RawCourseRow::builder("A")
                .code("CS100")
                .name("Algorithms")
                .description("Sorting and graph search")
                .department("CS")
                .embedding(vec![1.0, 0.0])
                .build(),
            RawCourseRow::builder("B")
                .code("CS200")
                .name("Databases")
                .description("Relational storage and queries")
                .department("CS")
                .embedding(vec![0.0, 1.0])
                .build(),
            RawCourseRow::builder("C")
                .code("ART100")
                .name("Drawing")
                .description("Figure drawing and sketching")
                .department("ART")
                .embedding(vec![1.0, 0.0])
                .build(),
        ];
        let (store, _) = CorpusStore::load(rows);
        let lexical = LexicalTable::build(store.all());
        (store, lexical)
    }

    fn codes(outcome: &SearchOutcome) -> Vec<&str> {
        outcome.matches.iter().map(|m| m.code.as_str()).collect()
    }

    #[test]
    fn test_semantic_ranking_ties_keep_corpus_order() {
        let (store, lexical) = abc_corpus();
        let engine = SearchEngine::new(&store, &lexical);
        let embedder = FixedEmbedder(vec![1.0, 0.0]);

        let outcome = engine.search(&SearchQuery::new("anything").with_top_k(2), Some(&embedder));

        assert_eq!(outcome.mode, Some(ScoringMode::Semantic));
        assert_eq!(codes(&outcome), vec!["CS100", "ART100"]);
        assert!(outcome.matches.iter().all(|m| (m.score - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_department_filter() {
        let (store, lexical) = abc_corpus();
        let engine = SearchEngine::new(&store, &lexical);
        let embedder = FixedEmbedder(vec![1.0, 0.0]);

        let query = SearchQuery::new("anything").with_department("art");
        let outcome = engine.search(&query, Some(&embedder));

        assert_eq!(codes(&outcome), vec!["ART100"]);
        assert!((outcome.matches[0].score - 1.0).abs() < 1e-6);
        assert_eq!(outcome.matches[0].department, "ART");
    }

    #[test]
    fn test_unknown_department_is_empty() {
        let (store, lexical) = abc_corpus();
        let engine = SearchEngine::new(&store, &lexical);
        let embedder = FixedEmbedder(vec![1.0, 0.0]);

        let outcome = engine.search(
            &SearchQuery::new("anything").with_department("Music"),
            Some(&embedder),
        );
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.mode, None);
    }

    #[test]
    fn test_blank_department_means_no_filter() {
        let (store, lexical) = abc_corpus();
        let engine = SearchEngine::new(&store, &lexical);
        let outcome = engine.search(&SearchQuery::new("drawing").with_department("  "), None);
        assert_eq!(outcome.matches.len(), 3);
    }

    #[test]
    fn test_top_k_clamped_and_normalized() {
        let (store, lexical) = abc_corpus();
        let engine = SearchEngine::new(&store, &lexical);
        let embedder = FixedEmbedder(vec![0.6, 0.8]);

        let many = engine.search(&SearchQuery::new("q").with_top_k(50), Some(&embedder));
        assert_eq!(many.matches.len(), 3);

        for k in [0, -3] {
            let outcome = engine.search(&SearchQuery::new("q").with_top_k(k), Some(&embedder));
            assert_eq!(outcome.matches.len(), 3);
        }

        let one = engine.search(&SearchQuery::new("q").with_top_k(1), Some(&embedder));
        assert_eq!(codes(&one), vec!["CS200"]);

        let scores: Vec<f32> = many.matches.iter().map(|m| m.score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_effective_top_k() {
        assert_eq!(SearchQuery::new("q").effective_top_k(5), 5);
        assert_eq!(SearchQuery::new("q").with_top_k(0).effective_top_k(5), 5);
        assert_eq!(SearchQuery::new("q").with_top_k(-1).effective_top_k(7), 7);
        assert_eq!(SearchQuery::new("q").with_top_k(12).effective_top_k(5), 12);
    }

    #[test]
    fn test_search_is_idempotent() {
        let (store, lexical) = abc_corpus();
        let engine = SearchEngine::new(&store, &lexical);
        let embedder = FixedEmbedder(vec![0.3, 0.7]);
        let query = SearchQuery::new("graph search");

        let first = engine.search(&query, Some(&embedder));
        let second = engine.search(&query, Some(&embedder));
        assert_eq!(first.matches, second.matches);

        let lexical_first = engine.search(&query, None);
        let lexical_second = engine.search(&query, None);
        assert_eq!(lexical_first.matches, lexical_second.matches);
    }

    #[test]
    fn test_fallback_to_lexical() {
        let (store, lexical) = abc_corpus();
        let engine = SearchEngine::new(&store, &lexical);

        let outcome = engine.search(&SearchQuery::new("figure sketching"), Some(&FailingEmbedder));
        assert_eq!(outcome.mode, Some(ScoringMode::Lexical));
        assert_eq!(outcome.matches[0].code, "ART100");
        assert!(outcome.matches[0].score > 0.0);
        assert_eq!(outcome.matches[1].score, 0.0);
    }

    #[test]
    fn test_dimension_mismatch_falls_back() {
        let (store, lexical) = abc_corpus();
        let engine = SearchEngine::new(&store, &lexical);
        let embedder = FixedEmbedder(vec![1.0, 0.0, 0.0]);

        let outcome = engine.search(&SearchQuery::new("relational queries"), Some(&embedder));
        assert_eq!(outcome.mode, Some(ScoringMode::Lexical));
        assert_eq!(outcome.matches[0].code, "CS200");
    }

    #[test]
    fn test_stop_word_query_scores_zero() {
        let (store, lexical) = abc_corpus();
        let engine = SearchEngine::new(&store, &lexical);

        let query = "The and, what is?";
        assert!(crate::lexical::tokenize(query).is_empty());

        let outcome = engine.search(&SearchQuery::new(query), None);
        assert_eq!(outcome.mode, Some(ScoringMode::Lexical));
        assert_eq!(outcome.matches.len(), 3);
        assert!(outcome.matches.iter().all(|m| m.score == 0.0));
        assert_eq!(codes(&outcome), vec!["CS100", "CS200", "ART100"]);
    }

    #[test]
    fn test_empty_query_uses_lexical_without_calling_embedder() {
        let (store, lexical) = abc_corpus();
        let engine = SearchEngine::new(&store, &lexical);
        let outcome = engine.search(&SearchQuery::new("   "), Some(&FailingEmbedder));
        assert_eq!(outcome.mode, Some(ScoringMode::Lexical));
        assert!(outcome.matches.iter().all(|m| m.score == 0.0));
    }
}
