//! API request and response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::transcript::Step;

/// Request to ask the agent a question.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    /// The question to answer from the corpus
    pub question: String,

    /// Optional model override (uses default if not specified)
    pub model: Option<String>,

    /// Optional step budget override for this session
    pub max_iterations: Option<usize>,
}

/// A successfully answered query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    /// Unique session identifier
    pub id: Uuid,

    /// The agent's final answer
    pub answer: String,

    /// Full session transcript
    pub transcript: Vec<Step>,

    /// Driver proposals consumed
    pub steps_used: usize,

    /// Model used for this session
    pub model: String,

    /// When the session finished
    pub finished_at: DateTime<Utc>,
}

/// A failed session, with the partial transcript for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct QueryError {
    pub error: String,
    pub transcript: Vec<Step>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Passages available for retrieval
    pub corpus_passages: usize,
    /// Registered tool count
    pub tools: usize,
}
