//! JSON-RPC Server Implementation
//!
//! Handles protocol requests and routes them to the course catalog.

use super::protocol::*;
use super::resources::{get_all_resources, read_resource};
use super::tools::{get_all_tools, parse_search_args, GET_GRAPH_DATA, SEARCH_COURSES};
use super::transport::LineTransport;
use crate::catalog::CatalogManager;
use crate::error::{ServerError, ServerResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "course-graph";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// JSON-RPC server over a shared catalog
pub struct McpServer {
    catalog: Arc<CatalogManager>,
    initialized: bool,
}

impl McpServer {
    pub fn new(catalog: Arc<CatalogManager>) -> Self {
        Self {
            catalog,
            initialized: false,
        }
    }

    /// Serve stdin/stdout until the client closes its end
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut transport = LineTransport::stdio();
        self.serve(&mut transport).await
    }

    /// Serve requests from `transport` until end of input
    pub async fn serve<R, W>(&mut self, transport: &mut LineTransport<R, W>) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!("JSON-RPC server listening on stdio");

        loop {
            match transport.read_request().await {
                Ok(Some(request)) => {
                    if let Some(response) = self.handle_request(request).await {
                        transport.write_response(&response).await?;
                    }
                }
                Ok(None) => {
                    tracing::info!("Client disconnected");
                    break;
                }
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    let response = JsonRpcResponse::error(
                        None,
                        JsonRpcError::parse_error(format!("Parse error: {}", e)),
                    );
                    transport.write_response(&response).await?;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    /// Handle one request; notifications get no response
    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        tracing::debug!("Handling request: {}", request.method);

        if request.is_notification() {
            tracing::debug!("Notification: {}", request.method);
            return None;
        }

        let id = request.id;
        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request(format!(
                    "Unsupported jsonrpc version: {}",
                    request.jsonrpc
                )),
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => JsonRpcResponse::from_serializable(
                id,
                &ToolsListResult {
                    tools: get_all_tools(),
                },
            ),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            "resources/list" => JsonRpcResponse::from_serializable(
                id,
                &ResourcesListResult {
                    resources: get_all_resources(),
                },
            ),
            "resources/read" => self.handle_resources_read(id, request.params).await,
            method => JsonRpcResponse::error(id, JsonRpcError::method_not_found(method)),
        };
        Some(response)
    }

    fn handle_initialize(&mut self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();
        if let Some(client) = &params.client_info {
            tracing::info!(
                "Client {} {} (protocol {})",
                client.name,
                client.version.as_deref().unwrap_or("?"),
                params.protocol_version.as_deref().unwrap_or("?")
            );
        }

        self.initialized = true;

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                resources: Some(ListCapability::default()),
                tools: Some(ListCapability::default()),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
        };
        JsonRpcResponse::from_serializable(id, &result)
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match parse_params(params) {
            Ok(p) => p,
            Err(e) => return JsonRpcResponse::error(id, e),
        };

        match self.execute_tool(&params.name, params.arguments).await {
            Ok(result) => {
                let text = serde_json::to_string_pretty(&result)
                    .unwrap_or_else(|_| result.to_string());
                JsonRpcResponse::from_serializable(id, &ToolCallResult::text(text))
            }
            Err(e @ ServerError::InvalidParams(_)) | Err(e @ ServerError::UnknownTool(_)) => {
                JsonRpcResponse::error(id, e.into())
            }
            Err(e) if e.is_corpus_unavailable() => JsonRpcResponse::error(id, e.into()),
            Err(e) => {
                tracing::warn!("Tool {} failed: {}", params.name, e);
                JsonRpcResponse::from_serializable(id, &ToolCallResult::error(format!("Error: {}", e)))
            }
        }
    }

    async fn handle_resources_read(
        &self,
        id: Option<Value>,
        params: Option<Value>,
    ) -> JsonRpcResponse {
        let params: ResourceReadParams = match parse_params(params) {
            Ok(p) => p,
            Err(e) => return JsonRpcResponse::error(id, e),
        };

        match read_resource(&params.uri, &self.catalog).await {
            Ok(result) => JsonRpcResponse::from_serializable(id, &result),
            Err(e) => JsonRpcResponse::error(id, e.into()),
        }
    }

    /// Execute a tool by name
    async fn execute_tool(&self, name: &str, args: Option<Value>) -> ServerResult<Value> {
        let args = args.unwrap_or(Value::Object(serde_json::Map::new()));

        match name {
            SEARCH_COURSES => {
                let query = parse_search_args(&args)?;
                let response = self.catalog.search(query).await?;
                Ok(serde_json::to_value(response)?)
            }
            GET_GRAPH_DATA => {
                let export = self.catalog.graph().await?;
                Ok(serde_json::to_value(export)?)
            }
            _ => Err(ServerError::UnknownTool(name.to_string())),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, JsonRpcError> {
    let params = params.ok_or_else(|| JsonRpcError::invalid_params("Missing params"))?;
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))
}
