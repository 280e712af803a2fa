//! docpilot - HTTP Server Entry Point
//!
//! Ingests the corpus, builds the retrieval index, registers tools, and
//! starts the HTTP server.

use std::sync::Arc;

use docpilot::api::{self, AppState};
use docpilot::config::Config;
use docpilot::corpus::index::Retriever;
use docpilot::corpus::{Corpus, DEFAULT_PASSAGE_CHARS};
use docpilot::llm::OpenRouterClient;
use docpilot::tools::{ReadPassage, SearchDocuments, ToolRegistry};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docpilot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration: model={}", config.default_model);

    let client = Arc::new(OpenRouterClient::new(config.api_key.clone()));

    // Ingest the corpus and build the retrieval index
    let mut corpus = Corpus::new();
    let added = corpus.ingest_dir(&config.corpus_path, DEFAULT_PASSAGE_CHARS)?;
    info!(
        "Ingested {} passages from {}",
        added,
        config.corpus_path.display()
    );
    let corpus = Arc::new(corpus);

    let retriever = Arc::new(
        Retriever::build(
            Arc::clone(&corpus),
            client.clone(),
            config.embed_model.clone(),
        )
        .await?,
    );

    // Register tools
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(SearchDocuments::new(Arc::clone(&retriever))))?;
    registry.register(Arc::new(ReadPassage::new(Arc::clone(retriever.corpus()))))?;

    // Start HTTP server
    let state = AppState {
        config,
        registry: Arc::new(registry),
        corpus,
        llm: client,
    };
    api::serve(state).await?;

    Ok(())
}
