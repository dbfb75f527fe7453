//! Course Graph Server Library
//!
//! Process shell around `course_similarity`: configuration, the published
//! catalog, and a JSON-RPC stdio service.

pub mod catalog;
pub mod config;
pub mod error;
pub mod mcp;

pub use catalog::{CatalogManager, SearchResponse};
pub use config::ServiceConfig;
pub use error::{ServerError, ServerResult};
