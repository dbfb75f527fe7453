//! In-memory course corpus
//!
//! Validates raw rows once at load time and keeps the accepted records in
//! source order. The store is immutable after `load`, so reads need no locking.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::record::{CourseId, CourseRecord, EmbeddingField, RawCourseRow};

/// Why a raw row was kept out of the corpus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No embedding, or an empty one
    Missing,
    /// Embedding cell could not be parsed
    Unparseable,
    /// Dimensionality differs from the corpus dimensionality
    DimensionMismatch,
    /// Embedding contains NaN or infinite components
    NonFinite,
    /// Id already used by an earlier accepted row
    DuplicateId,
}

/// Diagnostics collected while loading the corpus
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub accepted: usize,
    pub missing: usize,
    pub unparseable: usize,
    pub dimension_mismatch: usize,
    pub non_finite: usize,
    pub duplicate_id: usize,
}

impl LoadReport {
    /// Total number of rejected rows
    pub fn rejected(&self) -> usize {
        self.missing + self.unparseable + self.dimension_mismatch + self.non_finite + self.duplicate_id
    }

    fn record(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::Missing => self.missing += 1,
            RejectReason::Unparseable => self.unparseable += 1,
            RejectReason::DimensionMismatch => self.dimension_mismatch += 1,
            RejectReason::NonFinite => self.non_finite += 1,
            RejectReason::DuplicateId => self.duplicate_id += 1,
        }
    }
}

/// Immutable collection of validated course records
#[derive(Debug, Clone, Default)]
pub struct CorpusStore {
    records: Vec<CourseRecord>,
    positions: HashMap<CourseId, usize>,
    dimension: usize,
}

impl CorpusStore {
    /// Validate raw rows and build the store.
    ///
    /// The first accepted row fixes the dimensionality D; later rows with a
    /// different length are rejected.
    pub fn load(rows: impl IntoIterator<Item = RawCourseRow>) -> (Self, LoadReport) {
        let mut records = Vec::new();
        let mut positions = HashMap::new();
        let mut dimension = 0;
        let mut report = LoadReport::default();

        for mut row in rows {
            let field = std::mem::replace(&mut row.embedding, EmbeddingField::Missing);
            let verdict = validate_embedding(field, dimension).and_then(|vector| {
                if positions.contains_key(&row.id) {
                    Err(RejectReason::DuplicateId)
                } else {
                    Ok(vector)
                }
            });

            match verdict {
                Ok(vector) => {
                    if dimension == 0 {
                        dimension = vector.len();
                    }
                    positions.insert(row.id.clone(), records.len());
                    records.push(CourseRecord::from_validated(row, vector));
                }
                Err(reason) => {
                    log::debug!("Rejected course {} ({}): {:?}", row.id, row.code, reason);
                    report.record(reason);
                }
            }
        }

        report.accepted = records.len();

        log::info!("Loaded {} courses ({}d)", records.len(), dimension);
        if report.rejected() > 0 {
            log::warn!(
                "Skipped {} courses with missing or invalid embeddings \
                 (missing: {}, unparseable: {}, dimension mismatch: {}, non-finite: {}, duplicate id: {})",
                report.rejected(),
                report.missing,
                report.unparseable,
                report.dimension_mismatch,
                report.non_finite,
                report.duplicate_id
            );
        }

        (
            Self {
                records,
                positions,
                dimension,
            },
            report,
        )
    }

    /// All records in source order
    pub fn all(&self) -> &[CourseRecord] {
        &self.records
    }

    /// Records whose department matches `name` case-insensitively, in source order
    pub fn by_department(&self, name: &str) -> Vec<&CourseRecord> {
        let wanted = name.to_lowercase();
        self.records
            .iter()
            .filter(|r| r.department.to_lowercase() == wanted)
            .collect()
    }

    /// Distinct non-empty department names, sorted ascending
    pub fn departments(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| !r.department.is_empty())
            .map(|r| r.department.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Get a record by id
    pub fn get(&self, id: &CourseId) -> Option<&CourseRecord> {
        self.position(id).map(|pos| &self.records[pos])
    }

    /// Position of a record in source order
    pub fn position(&self, id: &CourseId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Shared embedding dimensionality (0 for an empty store)
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn validate_embedding(field: EmbeddingField, dimension: usize) -> Result<Vec<f32>, RejectReason> {
    match field {
        EmbeddingField::Missing => Err(RejectReason::Missing),
        EmbeddingField::Unparseable(_) => Err(RejectReason::Unparseable),
        EmbeddingField::Vector(v) if v.is_empty() => Err(RejectReason::Missing),
        EmbeddingField::Vector(v) if v.iter().any(|x| !x.is_finite()) => {
            Err(RejectReason::NonFinite)
        }
        EmbeddingField::Vector(v) if dimension != 0 && v.len() != dimension => {
            Err(RejectReason::DimensionMismatch)
        }
        EmbeddingField::Vector(v) => Ok(v),
    }
}
