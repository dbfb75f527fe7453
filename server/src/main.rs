//! Course Graph Entry Point
//!
//! Three commands:
//! - serve (default): JSON-RPC over stdio for tool-calling clients
//! - search: one-shot ranked search printed as JSON
//! - graph: one-shot graph export printed as JSON

use clap::{Parser, Subcommand};
use course_graph_server::mcp::McpServer;
use course_graph_server::{CatalogManager, ServerResult, ServiceConfig};
use course_similarity::{SearchQuery, DEFAULT_TOP_K};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "course_graph_server=info,course_similarity=info";

#[derive(Parser)]
#[command(name = "course-graph")]
#[command(about = "Semantic course search and similarity graph data")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Course CSV with an Embedding column (probed from default locations if unset)
    #[arg(long, global = true, env = "COURSE_GRAPH_DATA")]
    data: Option<PathBuf>,

    /// Embedding service endpoint
    #[arg(
        long,
        global = true,
        env = "COURSE_GRAPH_EMBEDDING_URL",
        default_value = course_similarity::embedding::DEFAULT_EMBEDDING_URL
    )]
    embedding_url: String,

    /// Timeout for one embedding request, in milliseconds
    #[arg(
        long,
        global = true,
        env = "COURSE_GRAPH_EMBEDDING_TIMEOUT_MS",
        default_value_t = 10_000
    )]
    embedding_timeout_ms: u64,

    /// Most query embeddings kept in memory
    #[arg(
        long,
        global = true,
        env = "COURSE_GRAPH_EMBEDDING_CACHE_SIZE",
        default_value_t = course_similarity::embedding::DEFAULT_CACHE_CAPACITY
    )]
    embedding_cache_size: usize,

    /// Never call the embedding service; always use keyword scoring
    #[arg(long, global = true)]
    no_embedding: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Serve JSON-RPC over stdio (default)
    Serve,
    /// Run one search and print the results
    Search {
        query: String,
        #[arg(long)]
        department: Option<String>,
        #[arg(long, default_value_t = DEFAULT_TOP_K as i64, allow_negative_numbers = true)]
        top_k: i64,
    },
    /// Print the full similarity graph
    Graph,
}

impl Args {
    fn service_config(&self) -> ServiceConfig {
        let mut config =
            ServiceConfig::default().with_embedding_cache_capacity(self.embedding_cache_size);
        if let Some(data) = &self.data {
            config = config.with_data_path(data);
        }
        if !self.no_embedding {
            config = config.with_embedding(
                self.embedding_url.clone(),
                Duration::from_millis(self.embedding_timeout_ms),
            );
        }
        config
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // stdout carries protocol output, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(args).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> ServerResult<()> {
    let config = args.service_config();
    let data_path = config.resolve_data_path()?;
    let catalog = Arc::new(CatalogManager::with_search_config(
        config.embedder(),
        config.search.clone(),
    ));

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing::info!("Starting course graph server");

            // Requests arriving before the build finishes get CorpusUnavailable
            let loader = Arc::clone(&catalog);
            tokio::spawn(async move {
                if let Err(e) = loader.initialize(data_path).await {
                    tracing::error!("Failed to load course catalog: {}", e);
                }
            });

            let mut server = McpServer::new(catalog);
            server.run().await?;
        }
        Command::Search {
            query,
            department,
            top_k,
        } => {
            catalog.initialize(data_path).await?;

            let mut search = SearchQuery::new(query).with_top_k(top_k);
            if let Some(department) = department {
                search = search.with_department(department);
            }
            let response = catalog.search(search).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Graph => {
            catalog.initialize(data_path).await?;
            let export = catalog.graph().await?;
            println!("{}", serde_json::to_string(&export)?);
        }
    }

    Ok(())
}
