//! Loaded corpus bundle
//!
//! Store, lexical table and pairwise index built together and read-only
//! afterwards. Share it as `Arc<Corpus>`.

use std::path::Path;
use std::time::Instant;

use crate::embedding::Embedder;
use crate::error::{Result, SimilarityError};
use crate::graph::{GraphExport, GraphExporter};
use crate::ingest::read_course_csv;
use crate::lexical::LexicalTable;
use crate::pairwise::{BuildControl, PairwiseSimilarityIndex};
use crate::record::RawCourseRow;
use crate::search::{SearchConfig, SearchEngine, SearchOutcome, SearchQuery};
use crate::store::{CorpusStore, LoadReport};

/// Everything needed to answer searches and graph requests
#[derive(Debug)]
pub struct Corpus {
    store: CorpusStore,
    lexical: LexicalTable,
    index: PairwiseSimilarityIndex,
    report: LoadReport,
    search_config: SearchConfig,
}

impl Corpus {
    /// Validate rows, tokenize documents and precompute all pairwise similarities.
    ///
    /// Fails with `EmptyCorpus` if no row survives validation and with
    /// `BuildCancelled` if `control` is cancelled mid-build.
    pub fn build(
        rows: impl IntoIterator<Item = RawCourseRow>,
        control: &BuildControl,
    ) -> Result<Self> {
        let start = Instant::now();

        let (store, report) = CorpusStore::load(rows);
        if store.is_empty() {
            return Err(SimilarityError::empty_corpus(format!(
                "no course had a usable embedding ({} rows rejected)",
                report.rejected()
            )));
        }

        let lexical = LexicalTable::build(store.all());
        let index = PairwiseSimilarityIndex::build_with(&store, control)?;

        log::info!(
            "Corpus ready: {} courses, {} departments, {} pairs in {:.2}s",
            store.len(),
            store.departments().len(),
            index.pair_count(),
            start.elapsed().as_secs_f64()
        );

        Ok(Self {
            store,
            lexical,
            index,
            report,
            search_config: SearchConfig::default(),
        })
    }

    /// Read a course CSV and build from its rows
    pub fn from_csv(path: impl AsRef<Path>, control: &BuildControl) -> Result<Self> {
        let rows = read_course_csv(path)?;
        Self::build(rows, control)
    }

    pub fn with_search_config(mut self, config: SearchConfig) -> Self {
        self.search_config = config;
        self
    }

    pub fn store(&self) -> &CorpusStore {
        &self.store
    }

    pub fn index(&self) -> &PairwiseSimilarityIndex {
        &self.index
    }

    pub fn lexical(&self) -> &LexicalTable {
        &self.lexical
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }

    pub fn search(&self, query: &SearchQuery, embedder: Option<&dyn Embedder>) -> SearchOutcome {
        SearchEngine::with_config(&self.store, &self.lexical, self.search_config.clone())
            .search(query, embedder)
    }

    pub fn export_graph(&self) -> GraphExport {
        GraphExporter.export(&self.store, &self.index)
    }
}
