//! HTTP API: question submission and health.

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::agent::AgentSession;
use crate::config::Config;
use crate::corpus::Corpus;
use crate::driver::LlmDriver;
use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::tools::ToolRegistry;

use types::{HealthResponse, QueryError, QueryRequest, QueryResponse};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub registry: Arc<ToolRegistry>,
    pub corpus: Arc<Corpus>,
    pub llm: Arc<dyn LlmClient>,
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/query", post(query))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        corpus_passages: state.corpus.len(),
        tools: state.registry.len(),
    })
}

async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Response {
    let model = request
        .model
        .unwrap_or_else(|| state.config.default_model.clone());

    let mut limits = state.config.session_limits();
    if let Some(max_steps) = request.max_iterations {
        limits.max_steps = max_steps;
    }

    let driver = Arc::new(LlmDriver::new(
        Arc::clone(&state.llm),
        model.clone(),
        state.registry.get_tool_schemas(),
    ));
    let session = AgentSession::new(driver, Arc::clone(&state.registry), limits);

    tracing::info!(question = %request.question, model = %model, "running session");

    match session.run(&request.question).await {
        Ok(completed) => Json(QueryResponse {
            id: Uuid::new_v4(),
            answer: completed.answer,
            transcript: completed.transcript.steps().to_vec(),
            steps_used: completed.steps_used,
            model,
            finished_at: Utc::now(),
        })
        .into_response(),
        Err(failure) => {
            let status = match failure.error {
                AgentError::ReasoningFailure { .. } | AgentError::BudgetExceeded { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let body = QueryError {
                error: failure.error.to_string(),
                transcript: failure.transcript.steps().to_vec(),
            };
            (status, Json(body)).into_response()
        }
    }
}
