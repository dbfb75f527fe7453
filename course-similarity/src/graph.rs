//! Node/edge projection for graph visualization

use std::collections::BTreeMap;

use serde::Serialize;

use crate::pairwise::PairwiseSimilarityIndex;
use crate::record::{CourseId, CourseRecord};
use crate::store::CorpusStore;

/// Course as shown in the graph; never carries the embedding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: CourseId,
    pub code: String,
    pub name: String,
    pub department: String,
    pub faculty: String,
    pub description: String,
}

impl From<&CourseRecord> for GraphNode {
    fn from(record: &CourseRecord) -> Self {
        Self {
            id: record.id.clone(),
            code: record.code.clone(),
            name: record.name.clone(),
            department: record.department.clone(),
            faculty: record.faculty.clone(),
            description: record.description.clone(),
        }
    }
}

/// Full graph payload
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphExport {
    pub nodes: Vec<GraphNode>,
    /// `"<id_a>,<id_b>"` to score, both orderings
    pub similarities: BTreeMap<String, f32>,
    pub departments: Vec<String>,
}

impl GraphExport {
    /// Key under which the pair `(a, b)` is stored
    pub fn pair_key(a: &CourseId, b: &CourseId) -> String {
        format!("{},{}", a, b)
    }

    /// Look up the score of an ordered pair
    pub fn similarity(&self, a: &CourseId, b: &CourseId) -> Option<f32> {
        self.similarities.get(&Self::pair_key(a, b)).copied()
    }
}

/// Builds [`GraphExport`]s from a loaded corpus
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphExporter;

impl GraphExporter {
    pub fn export(&self, store: &CorpusStore, index: &PairwiseSimilarityIndex) -> GraphExport {
        let nodes = store.all().iter().map(GraphNode::from).collect();
        let similarities = index
            .entries()
            .map(|(a, b, score)| (GraphExport::pair_key(a, b), score))
            .collect();

        GraphExport {
            nodes,
            similarities,
            departments: store.departments(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawCourseRow;

    fn fixture() -> (CorpusStore, PairwiseSimilarityIndex) {
        let rows = vec![
            RawCourseRow::builder("A").code("CS100").department("CS").embedding(vec![1.0, 0.0]).build(),
            RawCourseRow::builder("B").code("CS200").department("CS").embedding(vec![0.0, 1.0]).build(),
            RawCourseRow::builder("C").code("ART100").department("ART").embedding(vec![1.0, 0.0]).build(),
        ];
        let (store, _) = CorpusStore::load(rows);
        let index = PairwiseSimilarityIndex::build(&store);
        (store, index)
    }

    #[test]
    fn test_export_contents() {
        let (store, index) = fixture();
        let export = GraphExporter.export(&store, &index);

        assert_eq!(export.nodes.len(), 3);
        assert_eq!(export.nodes[0].code, "CS100");
        assert_eq!(export.similarities.len(), 6);
        assert_eq!(export.similarity(&"A".into(), &"C".into()), Some(1.0));
        assert_eq!(export.similarity(&"C".into(), &"A".into()), Some(1.0));
        assert_eq!(export.similarity(&"A".into(), &"A".into()), None);
        assert_eq!(export.departments, vec!["ART".to_string(), "CS".to_string()]);
    }

    #[test]
    fn test_export_json_shape() {
        let (store, index) = fixture();
        let json = serde_json::to_value(GraphExporter.export(&store, &index)).unwrap();

        assert!(json["nodes"][0].get("embedding").is_none());
        assert_eq!(json["nodes"][1]["id"], "B");
        assert_eq!(json["similarities"]["A,B"], 0.0);
        assert_eq!(json["departments"][1], "CS");
    }

    #[test]
    fn test_export_empty() {
        let (store, _) = CorpusStore::load(Vec::new());
        let index = PairwiseSimilarityIndex::build(&store);
        assert_eq!(GraphExporter.export(&store, &index), GraphExport::default());
    }
}
