//! JSON-RPC Service Module
//!
//! Exposes course search and graph data to tool-calling clients.
//!
//! ## Usage
//!
//! ```bash
//! course-graph serve --data data/course-embd-data-with-embeddings.csv
//! ```
//!
//! The server communicates via stdio using newline-delimited JSON-RPC 2.0.

pub mod protocol;
pub mod resources;
pub mod server;
pub mod tools;
pub mod transport;

pub use protocol::*;
pub use server::McpServer;
pub use transport::LineTransport;
