//! Error taxonomy for the agent loop.
//!
//! The split matters for control flow: recoverable failures (unknown tool,
//! bad arguments, a tool returning an error) are fed back into the transcript
//! as observations so the model can adapt. Fatal failures (reasoning that
//! never parses, step budget exhausted, transcript corruption) abort the
//! session and surface the partial transcript to the caller.

use thiserror::Error;

use crate::transcript::{Transcript, TranscriptError};

#[derive(Debug, Error)]
pub enum AgentError {
    /// The driver requested a tool that is not in the registry.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// A tool with this name is already registered.
    #[error("tool already registered: {0}")]
    DuplicateTool(String),

    /// Arguments did not validate against the tool's parameter schema.
    #[error("invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// The tool ran and failed. Recoverable; wrapped as an observation.
    #[error("tool '{tool}' failed: {reason}")]
    ToolFailed { tool: String, reason: String },

    /// The driver produced unusable output too many times in a row.
    #[error("reasoning failed after {attempts} rejected proposals: {reason}")]
    ReasoningFailure { attempts: u32, reason: String },

    /// The session hit its step budget without producing a final answer.
    #[error("step budget of {limit} exhausted without a final answer")]
    BudgetExceeded { limit: usize },

    /// Transcript bookkeeping broke. Infrastructure-level; always fatal.
    #[error("transcript invariant violated: {0}")]
    Transcript(#[from] TranscriptError),
}

impl AgentError {
    /// Whether the session can continue after this error by recording it as
    /// an observation instead of aborting.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AgentError::UnknownTool(_)
                | AgentError::InvalidArguments { .. }
                | AgentError::ToolFailed { .. }
        )
    }
}

/// A fatal session outcome, carrying whatever transcript was accumulated so
/// the caller can inspect how far the agent got.
#[derive(Debug)]
pub struct SessionFailure {
    pub error: AgentError,
    pub transcript: Transcript,
}

impl std::fmt::Display for SessionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} transcript steps)", self.error, self.transcript.len())
    }
}

impl std::error::Error for SessionFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
