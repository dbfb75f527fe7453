//! Course record types
//!
//! `RawCourseRow` is what the ingestion collaborator hands over; `CourseRecord`
//! is the validated, immutable shape the rest of the engine works with.

use serde::{Deserialize, Serialize};

/// Identifier of a course within one loaded corpus (`course-{row}`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(String);

impl CourseId {
    /// Id for the data row at `row` (zero-based, header excluded)
    pub fn from_row(row: usize) -> Self {
        Self(format!("course-{}", row))
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CourseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CourseId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Embedding cell as delivered by ingestion
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingField {
    /// Parsed vector (may still be empty or have the wrong dimensionality)
    Vector(Vec<f32>),
    /// No embedding for this row
    Missing,
    /// Cell present but could not be parsed
    Unparseable(String),
}

/// A raw course row before validation
#[derive(Debug, Clone, PartialEq)]
pub struct RawCourseRow {
    pub id: CourseId,
    pub code: String,
    pub name: String,
    pub description: String,
    pub department: String,
    pub faculty: String,
    pub section: String,
    pub delivery: String,
    pub start_date: String,
    pub end_date: String,
    pub embedding: EmbeddingField,
}

impl RawCourseRow {
    /// Create a new builder for RawCourseRow
    pub fn builder(id: impl Into<CourseId>) -> RawCourseRowBuilder {
        RawCourseRowBuilder::new(id.into())
    }
}

/// Builder for RawCourseRow with fluent API
#[derive(Debug)]
pub struct RawCourseRowBuilder {
    row: RawCourseRow,
}

impl RawCourseRowBuilder {
    pub fn new(id: CourseId) -> Self {
        Self {
            row: RawCourseRow {
                id,
                code: String::new(),
                name: String::new(),
                description: String::new(),
                department: String::new(),
                faculty: String::new(),
                section: String::new(),
                delivery: String::new(),
                start_date: String::new(),
                end_date: String::new(),
                embedding: EmbeddingField::Missing,
            },
        }
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.row.code = code.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.row.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.row.description = description.into();
        self
    }

    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.row.department = department.into();
        self
    }

    pub fn faculty(mut self, faculty: impl Into<String>) -> Self {
        self.row.faculty = faculty.into();
        self
    }

    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.row.section = section.into();
        self
    }

    pub fn delivery(mut self, delivery: impl Into<String>) -> Self {
        self.row.delivery = delivery.into();
        self
    }

    /// Set the scheduled start and end dates
    pub fn dates(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.row.start_date = start.into();
        self.row.end_date = end.into();
        self
    }

    /// Set embedding vector
    pub fn embedding(mut self, embedding: Vec<f32>) -> Self {
        self.row.embedding = EmbeddingField::Vector(embedding);
        self
    }

    /// Set the embedding field directly
    pub fn embedding_field(mut self, field: EmbeddingField) -> Self {
        self.row.embedding = field;
        self
    }

    pub fn build(self) -> RawCourseRow {
        self.row
    }
}

/// A validated course with a non-empty embedding of the corpus dimensionality
#[derive(Debug, Clone, Serialize)]
pub struct CourseRecord {
    pub id: CourseId,
    pub code: String,
    pub name: String,
    pub description: String,
    pub department: String,
    pub faculty: String,
    pub section: String,
    pub delivery: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(skip)]
    embedding: Vec<f32>,
}

impl CourseRecord {
    /// Convert a raw row whose embedding has already been validated
    pub(crate) fn from_validated(row: RawCourseRow, embedding: Vec<f32>) -> Self {
        Self {
            id: row.id,
            code: row.code,
            name: row.name,
            description: row.description,
            department: row.department,
            faculty: row.faculty,
            section: row.section,
            delivery: row.delivery,
            start_date: row.start_date,
            end_date: row.end_date,
            embedding,
        }
    }

    /// Stored passage embedding
    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    /// Text used by the lexical fallback scorer
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.name, self.description)
    }

    /// Case-insensitive department match
    pub fn in_department(&self, department: &str) -> bool {
        self.department.to_lowercase() == department.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_id_from_row() {
        let id = CourseId::from_row(12);
        assert_eq!(id.as_str(), "course-12");
        assert_eq!(id.to_string(), "course-12");
    }

    #[test]
    fn test_builder_defaults() {
        let row = RawCourseRow::builder("course-0").code("CS101").build();
        assert_eq!(row.code, "CS101");
        assert!(row.name.is_empty());
        assert_eq!(row.embedding, EmbeddingField::Missing);
    }

    #[test]
    fn test_searchable_text_and_department() {
        let row = RawCourseRow::builder("course-0")
            .name("Compilers")
            .description("Parsing and code generation")
            .department("Computer Science")
            .embedding(vec![1.0])
            .build();
        let record = CourseRecord::from_validated(row, vec![1.0]);

        assert_eq!(record.searchable_text(), "Compilers Parsing and code generation");
        assert!(record.in_department("computer science"));
        assert!(record.in_department("COMPUTER SCIENCE"));
        assert!(!record.in_department("computer"));
    }

    #[test]
    fn test_record_serialization_skips_embedding() {
        let row = RawCourseRow::builder("course-3").code("ART200").build();
        let record = CourseRecord::from_validated(row, vec![0.5, 0.5]);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"id\":\"course-3\""));
        assert!(!json.contains("embedding"));
    }
}
