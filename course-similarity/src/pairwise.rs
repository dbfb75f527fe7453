//! Precomputed all-pairs similarity table
//!
//! Built once per corpus load: O(n²·D) time and O(n²) space. Upper-triangle
//! rows are computed in parallel, then mirrored into a dense n×n table, so
//! `get(a, b)` and `get(b, a)` read bit-identical values. The index is only
//! returned once every row is done.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::error::{Result, SimilarityError};
use crate::record::CourseId;
use crate::store::CorpusStore;
use crate::vector::cosine_similarity;

/// Progress and cancellation handle for an index build
#[derive(Debug, Default)]
pub struct BuildControl {
    cancelled: AtomicBool,
    completed_rows: AtomicUsize,
    total_rows: AtomicUsize,
}

impl BuildControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; rows not yet started are skipped
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// (completed rows, total rows) of the current build
    pub fn progress(&self) -> (usize, usize) {
        (
            self.completed_rows.load(Ordering::Relaxed),
            self.total_rows.load(Ordering::Relaxed),
        )
    }

    fn start(&self, total: usize) {
        self.completed_rows.store(0, Ordering::Relaxed);
        self.total_rows.store(total, Ordering::Relaxed);
    }

    fn row_done(&self) {
        self.completed_rows.fetch_add(1, Ordering::Relaxed);
    }
}

/// Symmetric similarity lookup over every pair of distinct corpus records
#[derive(Debug, Clone, Default)]
pub struct PairwiseSimilarityIndex {
    ids: Vec<CourseId>,
    positions: HashMap<CourseId, usize>,
    /// Row-major n×n table; the diagonal is never read
    table: Vec<f32>,
}

impl PairwiseSimilarityIndex {
    /// Build the index without external control
    pub fn build(store: &CorpusStore) -> Self {
        let control = BuildControl::new();
        match Self::build_with(store, &control) {
            Ok(index) => index,
            // A private control is never cancelled
            Err(_) => Self::default(),
        }
    }

    /// Build the index, reporting progress and honoring cancellation
    pub fn build_with(store: &CorpusStore, control: &BuildControl) -> Result<Self> {
        let records = store.all();
        let n = records.len();
        control.start(n);

        log::info!(
            "Pre-calculating pairwise similarities for {} courses ({} pairs)...",
            n,
            n * n.saturating_sub(1) / 2
        );

        let upper: Vec<Option<Vec<f32>>> = (0..n)
            .into_par_iter()
            .map(|i| {
                if control.is_cancelled() {
                    return None;
                }
                let row: Vec<f32> = records[i + 1..]
                    .iter()
                    .map(|other| cosine_similarity(records[i].embedding(), other.embedding()))
                    .collect();
                control.row_done();
                Some(row)
            })
            .collect();

        if control.is_cancelled() || upper.iter().any(Option::is_none) {
            let (completed, total) = control.progress();
            log::warn!("Pairwise similarity build cancelled ({}/{} rows)", completed, total);
            return Err(SimilarityError::BuildCancelled { completed, total });
        }

        let mut table = vec![0.0_f32; n * n];
        for (i, row) in upper.into_iter().flatten().enumerate() {
            for (offset, sim) in row.into_iter().enumerate() {
                let j = i + 1 + offset;
                table[i * n + j] = sim;
                table[j * n + i] = sim;
            }
        }

        let ids: Vec<CourseId> = records.iter().map(|r| r.id.clone()).collect();
        let positions = ids.iter().cloned().enumerate().map(|(i, id)| (id, i)).collect();

        let index = Self {
            ids,
            positions,
            table,
        };
        log::info!("Calculated {} unique pairwise similarities", index.pair_count());
        Ok(index)
    }

    /// Similarity of two records.
    ///
    /// `Ok(None)` for a self-pair, `UnknownId` if either id is not in the corpus.
    pub fn get(&self, a: &CourseId, b: &CourseId) -> Result<Option<f32>> {
        let i = self.position(a)?;
        let j = self.position(b)?;
        if i == j {
            return Ok(None);
        }
        Ok(Some(self.table[i * self.ids.len() + j]))
    }

    fn position(&self, id: &CourseId) -> Result<usize> {
        self.positions
            .get(id)
            .copied()
            .ok_or_else(|| SimilarityError::unknown_id(id.as_str()))
    }

    /// Every stored entry `(a, b, score)` with `a != b`, both orderings
    pub fn entries(&self) -> impl Iterator<Item = (&CourseId, &CourseId, f32)> + '_ {
        let n = self.ids.len();
        (0..n).flat_map(move |i| {
            (0..n)
                .filter(move |&j| j != i)
                .map(move |j| (&self.ids[i], &self.ids[j], self.table[i * n + j]))
        })
    }

    /// Number of stored entries (both orderings)
    pub fn len(&self) -> usize {
        let n = self.ids.len();
        n * n.saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of unordered pairs
    pub fn pair_count(&self) -> usize {
        self.len() / 2
    }

    /// Number of records covered by the index
    pub fn course_count(&self) -> usize {
        self.ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawCourseRow;

    fn abc_store() -> CorpusStore {
        let rows = vec![
            RawCourseRow::builder("A").department("CS").embedding(vec![1.0, 0.0]).build(),
            RawCourseRow::builder("B").department("CS").embedding(vec![0.0, 1.0]).build(),
            RawCourseRow::builder("C").department("ART").embedding(vec![1.0, 0.0]).build(),
        ];
        CorpusStore::load(rows).0
    }

    fn id(s: &str) -> CourseId {
        CourseId::from(s)
    }

    #[test]
    fn test_abc_scenario() {
        let index = PairwiseSimilarityIndex::build(&abc_store());

        assert_eq!(index.get(&id("A"), &id("C")).unwrap(), Some(1.0));
        assert_eq!(index.get(&id("A"), &id("B")).unwrap(), Some(0.0));
        assert_eq!(index.len(), 6);
        assert_eq!(index.pair_count(), 3);
        assert_eq!(index.entries().count(), 6);
    }

    #[test]
    fn test_symmetric_and_no_self_pairs() {
        let rows = (0..7)
            .map(|i| {
                let x = i as f32;
                RawCourseRow::builder(CourseId::from_row(i))
                    .embedding(vec![x.sin(), x.cos(), 0.3 * x - 1.0])
                    .build()
            })
            .collect::<Vec<_>>();
        let (store, _) = CorpusStore::load(rows);
        let index = PairwiseSimilarityIndex::build(&store);

        for a in store.all() {
            assert_eq!(index.get(&a.id, &a.id).unwrap(), None);
            for b in store.all() {
                let ab = index.get(&a.id, &b.id).unwrap();
                let ba = index.get(&b.id, &a.id).unwrap();
                assert_eq!(ab.map(f32::to_bits), ba.map(f32::to_bits));
            }
        }
        assert!(index.entries().all(|(a, b, _)| a != b));
    }

    #[test]
    fn test_unknown_id_is_error() {
        let index = PairwiseSimilarityIndex::build(&abc_store());
        let err = index.get(&id("A"), &id("Z")).unwrap_err();
        assert!(matches!(err, SimilarityError::UnknownId(ref s) if s == "Z"));
        assert!(index.get(&id("Z"), &id("Z")).is_err());
    }

    #[test]
    fn test_empty_and_single_record() {
        let (empty, _) = CorpusStore::load(Vec::new());
        let index = PairwiseSimilarityIndex::build(&empty);
        assert!(index.is_empty());
        assert_eq!(index.entries().count(), 0);

        let (single, _) =
            CorpusStore::load(vec![RawCourseRow::builder("A").embedding(vec![1.0]).build()]);
        let index = PairwiseSimilarityIndex::build(&single);
        assert_eq!(index.len(), 0);
        assert_eq!(index.get(&id("A"), &id("A")).unwrap(), None);
    }

    #[test]
    fn test_build_reports_progress() {
        let control = BuildControl::new();
        let index = PairwiseSimilarityIndex::build_with(&abc_store(), &control).unwrap();
        assert_eq!(control.progress(), (3, 3));
        assert_eq!(index.course_count(), 3);
    }

    #[test]
    fn test_cancelled_build_publishes_nothing() {
        let control = BuildControl::new();
        control.cancel();
        let result = PairwiseSimilarityIndex::build_with(&abc_store(), &control);
        assert!(matches!(
            result,
            Err(SimilarityError::BuildCancelled { total: 3, .. })
        ));
    }
}
