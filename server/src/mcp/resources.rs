//! Resource definitions
//!
//! Read-only catalog views available through `resources/read`.

use super::protocol::{Resource, ResourceContent, ResourceReadResult};
use crate::catalog::CatalogManager;
use crate::error::{ServerError, ServerResult};

pub const DEPARTMENTS_URI: &str = "catalog://departments";
pub const STATUS_URI: &str = "catalog://status";

const JSON_MIME: &str = "application/json";

/// Get all available resources
pub fn get_all_resources() -> Vec<Resource> {
    vec![
        Resource {
            uri: DEPARTMENTS_URI.to_string(),
            name: "Departments".to_string(),
            description: "Distinct department names in the loaded catalog, sorted".to_string(),
            mime_type: JSON_MIME.to_string(),
        },
        Resource {
            uri: STATUS_URI.to_string(),
            name: "Catalog Status".to_string(),
            description: "Load state, course and pair counts, and rejected row counts"
                .to_string(),
            mime_type: JSON_MIME.to_string(),
        },
    ]
}

/// Read a resource by URI
pub async fn read_resource(uri: &str, catalog: &CatalogManager) -> ServerResult<ResourceReadResult> {
    let value = match uri {
        DEPARTMENTS_URI => serde_json::json!({ "departments": catalog.departments().await? }),
        STATUS_URI => catalog.status().await,
        _ => return Err(ServerError::ResourceNotFound(uri.to_string())),
    };

    Ok(ResourceReadResult {
        contents: vec![ResourceContent {
            uri: uri.to_string(),
            mime_type: JSON_MIME.to_string(),
            text: serde_json::to_string_pretty(&value)?,
        }],
    })
}
