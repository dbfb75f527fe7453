//! Course CSV ingestion
//!
//! Maps the scraped course export (one row per section, embedding as a JSON
//! array in the `Embedding` column) onto [`RawCourseRow`]s. Column positions
//! are fixed by the export format; validation happens later in the store.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{Result, SimilarityError};
use crate::record::{CourseId, EmbeddingField, RawCourseRow};

/// Locations probed when no data file is given explicitly
pub const DEFAULT_DATA_CANDIDATES: &[&str] = &[
    "../data/course-embd-data-with-embeddings.csv",
    "data/course-embd-data-with-embeddings.csv",
    "course-embd-data-with-embeddings.csv",
];

const EMBEDDING_HEADER: &str = "Embedding";

const COL_CODE: usize = 0;
const COL_NAME: usize = 1;
const COL_START_DATE: usize = 2;
const COL_END_DATE: usize = 3;
const COL_SECTION: usize = 6;
const COL_FACULTY_FIRST: usize = 7;
const COL_FACULTY_LAST: usize = 8;
const COL_DEPARTMENT: usize = 10;
const COL_DELIVERY: usize = 11;
const COL_DESCRIPTION: usize = 12;

/// Read course rows from a CSV file
pub fn read_course_csv(path: impl AsRef<Path>) -> Result<Vec<RawCourseRow>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let rows = read_course_csv_from(file)?;
    log::info!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Read course rows from any CSV source with a header row
pub fn read_course_csv_from<R: Read>(reader: R) -> Result<Vec<RawCourseRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    // Cells are decoded lossily, one field at a time
    let headers = reader.byte_headers()?.clone();
    let embedding_col = headers
        .iter()
        .position(|h| String::from_utf8_lossy(h).trim() == EMBEDDING_HEADER)
        .unwrap_or_else(|| headers.len().saturating_sub(1));

    let mut rows = Vec::new();
    for (i, result) in reader.byte_records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                log::warn!("Skipping unreadable CSV row {}: {}", i, e);
                rows.push(
                    RawCourseRow::builder(CourseId::from_row(i))
                        .embedding_field(EmbeddingField::Unparseable(e.to_string()))
                        .build(),
                );
                continue;
            }
        };
        let cell = |col: usize| {
            record
                .get(col)
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .unwrap_or_default()
        };

        let embedding = match record.get(embedding_col) {
            Some(raw) => parse_embedding(&String::from_utf8_lossy(raw)),
            None => EmbeddingField::Missing,
        };
        if let EmbeddingField::Unparseable(reason) = &embedding {
            log::warn!("Could not parse embedding for course {}: {}", cell(COL_CODE), reason);
        }

        let faculty = format!("{} {}", cell(COL_FACULTY_FIRST), cell(COL_FACULTY_LAST))
            .trim()
            .to_string();

        rows.push(
            RawCourseRow::builder(CourseId::from_row(i))
                .code(cell(COL_CODE))
                .name(cell(COL_NAME))
                .dates(cell(COL_START_DATE), cell(COL_END_DATE))
                .section(cell(COL_SECTION))
                .faculty(faculty)
                .department(cell(COL_DEPARTMENT))
                .delivery(cell(COL_DELIVERY))
                .description(cell(COL_DESCRIPTION))
                .embedding_field(embedding)
                .build(),
        );
    }

    Ok(rows)
}

/// Parse a JSON array cell; `[]` and blank cells count as missing
pub fn parse_embedding(raw: &str) -> EmbeddingField {
    let raw = raw.trim();
    if raw.is_empty() {
        return EmbeddingField::Missing;
    }
    match serde_json::from_str::<Vec<f32>>(raw) {
        Ok(v) if v.is_empty() => EmbeddingField::Missing,
        Ok(v) => EmbeddingField::Vector(v),
        Err(e) => EmbeddingField::Unparseable(e.to_string()),
    }
}

/// First existing path among `candidates`
pub fn discover_data_file<P: AsRef<Path>>(candidates: &[P]) -> Result<PathBuf> {
    for candidate in candidates {
        let path = candidate.as_ref();
        if path.is_file() {
            log::info!("Found course data at {}", path.display());
            return Ok(path.to_path_buf());
        }
        log::debug!("No course data at {}", path.display());
    }

    let checked: Vec<String> = candidates
        .iter()
        .map(|c| c.as_ref().display().to_string())
        .collect();
    Err(SimilarityError::data_not_found(format!(
        "checked {}",
        checked.join(", ")
    )))
}
