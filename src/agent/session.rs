//! The agent session: a bounded think/act/observe state machine.
//!
//! Each step starts in `Thinking` (the driver proposes), moves to `Acting`
//! (validate + execute a tool) or `Answering` (finalize), and actions pass
//! through `Observing` (record the result) before the next step. Recoverable
//! failures become observations; fatal ones abort with the partial
//! transcript attached.

use std::sync::Arc;

use serde_json::Value;

use crate::driver::{NextAction, ReasoningDriver};
use crate::error::{AgentError, SessionFailure};
use crate::tools::{validate_args, ToolRegistry};
use crate::transcript::Transcript;

/// Termination bounds for one session.
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    /// Maximum driver proposals before aborting with BudgetExceeded.
    pub max_steps: usize,
    /// Consecutive rejected proposals tolerated beyond the first before
    /// aborting with ReasoningFailure.
    pub max_retries: u32,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_steps: 25,
            max_retries: 2,
        }
    }
}

/// A session that ran to a final answer.
#[derive(Debug)]
pub struct CompletedSession {
    pub answer: String,
    pub transcript: Transcript,
    /// Driver proposals consumed.
    pub steps_used: usize,
}

/// One agent run over a query.
///
/// The registry is shared and read-only for the duration of the run; the
/// transcript is owned by the session.
pub struct AgentSession {
    driver: Arc<dyn ReasoningDriver>,
    registry: Arc<ToolRegistry>,
    limits: SessionLimits,
}

impl AgentSession {
    pub fn new(
        driver: Arc<dyn ReasoningDriver>,
        registry: Arc<ToolRegistry>,
        limits: SessionLimits,
    ) -> Self {
        Self {
            driver,
            registry,
            limits,
        }
    }

    /// Run the loop to completion.
    pub async fn run(&self, query: &str) -> Result<CompletedSession, SessionFailure> {
        let mut transcript = Transcript::new();
        match self.run_inner(query, &mut transcript).await {
            Ok((answer, steps_used)) => Ok(CompletedSession {
                answer,
                transcript,
                steps_used,
            }),
            Err(error) => {
                tracing::warn!(%error, "session aborted");
                Err(SessionFailure { error, transcript })
            }
        }
    }

    async fn run_inner(
        &self,
        query: &str,
        transcript: &mut Transcript,
    ) -> Result<(String, usize), AgentError> {
        let tools = self.registry.describe_all();
        let mut rejections: u32 = 0;

        for step in 1..=self.limits.max_steps {
            tracing::debug!(step, phase = "thinking", "proposing next action");

            let proposal = match self.driver.propose(query, transcript, &tools).await {
                Ok(action) => action,
                Err(e) => {
                    // Unparseable output. Feed a correction back and retry.
                    rejections += 1;
                    if rejections > self.limits.max_retries {
                        return Err(AgentError::ReasoningFailure {
                            attempts: rejections,
                            reason: e.to_string(),
                        });
                    }
                    transcript.record_observation(
                        format!("Your response could not be processed: {}. Respond with either a single tool call or a final answer.", e),
                        true,
                    )?;
                    continue;
                }
            };

            match proposal {
                NextAction::Final { answer } => {
                    tracing::debug!(step, phase = "answering", "finalizing");
                    transcript.finalize(answer.clone())?;
                    return Ok((answer, step));
                }
                NextAction::Invoke {
                    thought,
                    tool,
                    arguments,
                } => {
                    if let Some(thought) = thought {
                        transcript.record_thought(thought)?;
                    }
                    transcript.record_action(tool.clone(), arguments.clone())?;

                    tracing::debug!(step, phase = "acting", tool = %tool, "executing tool");

                    match self.act(&tool, arguments).await {
                        Ok(output) => {
                            tracing::debug!(step, phase = "observing", tool = %tool, "tool succeeded");
                            rejections = 0;
                            transcript.record_observation(output, false)?;
                        }
                        Err(e) if e.is_recoverable() => {
                            tracing::debug!(step, phase = "observing", tool = %tool, error = %e, "tool step failed");
                            // Bad proposals (unknown tool, invalid args) burn a
                            // retry; a tool that ran and failed does not.
                            match &e {
                                AgentError::ToolFailed { .. } => rejections = 0,
                                _ => {
                                    rejections += 1;
                                    if rejections > self.limits.max_retries {
                                        transcript.record_observation(e.to_string(), true)?;
                                        return Err(AgentError::ReasoningFailure {
                                            attempts: rejections,
                                            reason: e.to_string(),
                                        });
                                    }
                                }
                            }
                            transcript.record_observation(e.to_string(), true)?;
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        Err(AgentError::BudgetExceeded {
            limit: self.limits.max_steps,
        })
    }

    /// Validate and execute one tool call.
    async fn act(&self, tool_name: &str, arguments: Value) -> Result<String, AgentError> {
        let tool = self.registry.resolve(tool_name)?;

        if let Err(reason) = validate_args(&tool.parameters_schema(), &arguments) {
            return Err(AgentError::InvalidArguments {
                tool: tool_name.to_string(),
                reason,
            });
        }

        tool.execute(arguments)
            .await
            .map_err(|e| AgentError::ToolFailed {
                tool: tool_name.to_string(),
                reason: e.to_string(),
            })
    }
}
