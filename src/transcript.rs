//! The transcript: an append-only record of one agent session.
//!
//! Steps alternate between reasoning and tool use. The recording methods
//! enforce the structural invariants instead of trusting the loop to call
//! them in the right order:
//!
//! - every action is followed by exactly one observation before the next
//!   thought, action, or final answer
//! - no two consecutive thoughts
//! - at most one final answer, and nothing may follow it

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// One entry in the transcript.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    /// Free-form reasoning text from the driver.
    Thought { text: String },

    /// A request to invoke a registered tool.
    Action { tool: String, arguments: Value },

    /// The result fed back to the driver after an action, or a correction
    /// when a proposal was rejected.
    Observation { content: String, is_error: bool },

    /// The terminal answer. Always last.
    FinalAnswer { text: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("transcript already finalized")]
    AlreadyFinalized,

    #[error("action is awaiting an observation")]
    PendingObservation,

    #[error("two consecutive thoughts without an action or observation")]
    ConsecutiveThoughts,
}

/// Append-only sequence of steps for one session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    steps: Vec<Step>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether the transcript ends with a final answer.
    pub fn is_finalized(&self) -> bool {
        matches!(self.steps.last(), Some(Step::FinalAnswer { .. }))
    }

    /// Whether the last step is an action still waiting for its observation.
    pub fn has_pending_action(&self) -> bool {
        matches!(self.steps.last(), Some(Step::Action { .. }))
    }

    /// The final answer text, if the session produced one.
    pub fn final_answer(&self) -> Option<&str> {
        match self.steps.last() {
            Some(Step::FinalAnswer { text }) => Some(text),
            _ => None,
        }
    }

    pub fn record_thought(&mut self, text: impl Into<String>) -> Result<(), TranscriptError> {
        self.check_open()?;
        if self.has_pending_action() {
            return Err(TranscriptError::PendingObservation);
        }
        if matches!(self.steps.last(), Some(Step::Thought { .. })) {
            return Err(TranscriptError::ConsecutiveThoughts);
        }
        self.steps.push(Step::Thought { text: text.into() });
        Ok(())
    }

    pub fn record_action(
        &mut self,
        tool: impl Into<String>,
        arguments: Value,
    ) -> Result<(), TranscriptError> {
        self.check_open()?;
        if self.has_pending_action() {
            return Err(TranscriptError::PendingObservation);
        }
        self.steps.push(Step::Action {
            tool: tool.into(),
            arguments,
        });
        Ok(())
    }

    /// Record a tool result or a correction. Corrections (rejected proposals)
    /// are observations that do not follow an action.
    pub fn record_observation(
        &mut self,
        content: impl Into<String>,
        is_error: bool,
    ) -> Result<(), TranscriptError> {
        self.check_open()?;
        self.steps.push(Step::Observation {
            content: content.into(),
            is_error,
        });
        Ok(())
    }

    pub fn finalize(&mut self, answer: impl Into<String>) -> Result<(), TranscriptError> {
        self.check_open()?;
        if self.has_pending_action() {
            return Err(TranscriptError::PendingObservation);
        }
        self.steps.push(Step::FinalAnswer {
            text: answer.into(),
        });
        Ok(())
    }

    fn check_open(&self) -> Result<(), TranscriptError> {
        if self.is_finalized() {
            return Err(TranscriptError::AlreadyFinalized);
        }
        Ok(())
    }
}
