//! Tool definitions and argument parsing
//!
//! Two tools: `search_courses` and `get_graph_data`.

use super::protocol::{PropertySchema, Tool, ToolInputSchema};
use course_similarity::{SearchQuery, DEFAULT_TOP_K};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{ServerError, ServerResult};

pub const SEARCH_COURSES: &str = "search_courses";
pub const GET_GRAPH_DATA: &str = "get_graph_data";

/// Get all available tools
pub fn get_all_tools() -> Vec<Tool> {
    vec![search_courses_tool(), get_graph_data_tool()]
}

fn prop(property_type: &str, description: &str, default: Option<Value>) -> PropertySchema {
    PropertySchema {
        property_type: property_type.to_string(),
        description: description.to_string(),
        default,
    }
}

fn search_courses_tool() -> Tool {
    let mut properties = BTreeMap::new();
    properties.insert(
        "query".to_string(),
        prop("string", "Free-text description of the course you are looking for", None),
    );
    properties.insert(
        "top_k".to_string(),
        prop(
            "integer",
            "Number of results to return; values <= 0 use the default",
            Some(serde_json::json!(DEFAULT_TOP_K)),
        ),
    );
    properties.insert(
        "department".to_string(),
        prop("string", "Only search this department (case-insensitive)", None),
    );

    Tool {
        name: SEARCH_COURSES.to_string(),
        description: "Rank courses by similarity to a query. Uses the embedding service when \
                      reachable and keyword scoring otherwise."
            .to_string(),
        input_schema: ToolInputSchema {
            schema_type: "object".to_string(),
            properties,
            required: vec!["query".to_string()],
        },
    }
}

fn get_graph_data_tool() -> Tool {
    Tool {
        name: GET_GRAPH_DATA.to_string(),
        description: "All courses, their pairwise similarity scores keyed \"id_a,id_b\", and the \
                      department list."
            .to_string(),
        input_schema: ToolInputSchema {
            schema_type: "object".to_string(),
            properties: BTreeMap::new(),
            required: Vec::new(),
        },
    }
}

/// Build a search query from `search_courses` arguments
pub fn parse_search_args(args: &Value) -> ServerResult<SearchQuery> {
    let query = args
        .get("query")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ServerError::invalid_params("Missing 'query' parameter"))?;

    let top_k = match args.get("top_k").or_else(|| args.get("topK")) {
        None | Some(Value::Null) => DEFAULT_TOP_K as i64,
        Some(v) => v
            .as_i64()
            .or_else(|| v.as_f64().map(|f| f as i64))
            .ok_or_else(|| ServerError::invalid_params("'top_k' must be a number"))?,
    };

    let mut search = SearchQuery::new(query).with_top_k(top_k);
    if let Some(department) = args.get("department").and_then(|v| v.as_str()) {
        search = search.with_department(department);
    }
    Ok(search)
}
