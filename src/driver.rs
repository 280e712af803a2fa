//! The reasoning driver: what decides the agent's next move.
//!
//! The session loop only depends on `ReasoningDriver`; tests script it with
//! stubs, production wires in `LlmDriver`, which replays the transcript as a
//! chat conversation and maps the model's reply onto a `NextAction`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::agent::build_system_prompt;
use crate::llm::{ChatMessage, LlmClient};
use crate::tools::ToolDescriptor;
use crate::transcript::{Step, Transcript};

/// The driver's proposal for the next step.
#[derive(Debug, Clone, PartialEq)]
pub enum NextAction {
    /// Invoke a tool, optionally preceded by reasoning text.
    Invoke {
        thought: Option<String>,
        tool: String,
        arguments: Value,
    },
    /// Stop and answer.
    Final { answer: String },
}

/// Proposes the next action given the query and transcript so far.
///
/// Returning `Err` means the driver's output could not be understood at all;
/// the session counts it against the retry budget.
#[async_trait]
pub trait ReasoningDriver: Send + Sync {
    async fn propose(
        &self,
        query: &str,
        transcript: &Transcript,
        tools: &[ToolDescriptor],
    ) -> anyhow::Result<NextAction>;
}

/// Driver backed by a chat-completions model with native tool calling.
pub struct LlmDriver {
    llm: Arc<dyn LlmClient>,
    model: String,
    tool_schemas: Vec<Value>,
}

impl LlmDriver {
    pub fn new(llm: Arc<dyn LlmClient>, model: String, tool_schemas: Vec<Value>) -> Self {
        Self {
            llm,
            model,
            tool_schemas,
        }
    }

    /// Replay the transcript as a chat conversation.
    ///
    /// Thoughts become assistant content (attached to the following tool call
    /// when there is one), actions become assistant tool calls, observations
    /// become tool results. Corrections (observations with no preceding
    /// action) are delivered as user messages so the model sees them even
    /// though no tool ran.
    fn build_messages(
        &self,
        query: &str,
        transcript: &Transcript,
        tools: &[ToolDescriptor],
    ) -> Vec<ChatMessage> {
        let mut messages = vec![
            ChatMessage::system(build_system_prompt(tools)),
            ChatMessage::user(query.to_string()),
        ];

        let mut pending_thought: Option<String> = None;
        let mut last_call_id: Option<String> = None;

        for (i, step) in transcript.steps().iter().enumerate() {
            match step {
                Step::Thought { text } => {
                    pending_thought = Some(text.clone());
                }
                Step::Action { tool, arguments } => {
                    let call_id = format!("call_{}", i);
                    messages.push(ChatMessage::assistant(
                        pending_thought.take(),
                        Some(vec![crate::llm::ToolCall {
                            id: call_id.clone(),
                            call_type: "function".to_string(),
                            function: crate::llm::FunctionCall {
                                name: tool.clone(),
                                arguments: arguments.to_string(),
                            },
                        }]),
                    ));
                    last_call_id = Some(call_id);
                }
                Step::Observation { content, is_error } => {
                    // Flush a thought that never led to an action.
                    if let Some(thought) = pending_thought.take() {
                        messages.push(ChatMessage::assistant(Some(thought), None));
                    }
                    let body = if *is_error {
                        format!("Error: {}", content)
                    } else {
                        content.clone()
                    };
                    match last_call_id.take() {
                        Some(id) => messages.push(ChatMessage::tool_result(id, body)),
                        None => messages.push(ChatMessage::user(body)),
                    }
                }
                Step::FinalAnswer { text } => {
                    messages.push(ChatMessage::assistant(Some(text.clone()), None));
                }
            }
        }

        if let Some(thought) = pending_thought {
            messages.push(ChatMessage::assistant(Some(thought), None));
        }

        messages
    }
}

#[async_trait]
impl ReasoningDriver for LlmDriver {
    async fn propose(
        &self,
        query: &str,
        transcript: &Transcript,
        tools: &[ToolDescriptor],
    ) -> anyhow::Result<NextAction> {
        let messages = self.build_messages(query, transcript, tools);
        let response = self
            .llm
            .chat_completion(&self.model, &messages, Some(&self.tool_schemas))
            .await?;

        if let Some(tool_calls) = &response.tool_calls {
            if let Some(call) = tool_calls.first() {
                if tool_calls.len() > 1 {
                    tracing::warn!(
                        requested = tool_calls.len(),
                        "model requested multiple tool calls; executing the first"
                    );
                }
                let arguments: Value = serde_json::from_str(&call.function.arguments)
                    .map_err(|e| {
                        anyhow::anyhow!(
                            "tool call arguments are not valid JSON ({}): {}",
                            e,
                            call.function.arguments
                        )
                    })?;
                return Ok(NextAction::Invoke {
                    thought: response.content.clone().filter(|c| !c.trim().is_empty()),
                    tool: call.function.name.clone(),
                    arguments,
                });
            }
        }

        match response.content {
            Some(content) if !content.trim().is_empty() => {
                Ok(NextAction::Final { answer: content })
            }
            _ => anyhow::bail!("model returned neither content nor tool calls"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatResponse, Role, ToolCall};
    use serde_json::json;

    struct CannedLlm {
        response: ChatResponse,
    }

    #[async_trait]
    impl LlmClient for CannedLlm {
        async fn chat_completion(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _tools: Option<&[Value]>,
        ) -> anyhow::Result<ChatResponse> {
            Ok(ChatResponse {
                content: self.response.content.clone(),
                tool_calls: self.response.tool_calls.clone(),
                usage: None,
            })
        }
    }

    fn driver_with(response: ChatResponse) -> LlmDriver {
        LlmDriver::new(Arc::new(CannedLlm { response }), "test-model".into(), vec![])
    }

    #[tokio::test]
    async fn tool_call_maps_to_invoke() {
        let driver = driver_with(ChatResponse {
            content: Some("let me search".to_string()),
            tool_calls: Some(vec![ToolCall {
                id: "call_1".into(),
                call_type: "function".into(),
                function: crate::llm::FunctionCall {
                    name: "search_documents".into(),
                    arguments: r#"{"query":"rust"}"#.into(),
                },
            }]),
            usage: None,
        });

        let action = driver
            .propose("q", &Transcript::new(), &[])
            .await
            .unwrap();
        assert_eq!(
            action,
            NextAction::Invoke {
                thought: Some("let me search".into()),
                tool: "search_documents".into(),
                arguments: json!({"query": "rust"}),
            }
        );
    }

    #[tokio::test]
    async fn plain_content_maps_to_final() {
        let driver = driver_with(ChatResponse {
            content: Some("the answer".to_string()),
            tool_calls: None,
            usage: None,
        });
        let action = driver.propose("q", &Transcript::new(), &[]).await.unwrap();
        assert_eq!(
            action,
            NextAction::Final {
                answer: "the answer".into()
            }
        );
    }

    #[tokio::test]
    async fn malformed_arguments_are_rejected() {
        let driver = driver_with(ChatResponse {
            content: None,
            tool_calls: Some(vec![ToolCall {
                id: "call_1".into(),
                call_type: "function".into(),
                function: crate::llm::FunctionCall {
                    name: "search_documents".into(),
                    arguments: "not json".into(),
                },
            }]),
            usage: None,
        });
        assert!(driver.propose("q", &Transcript::new(), &[]).await.is_err());
    }

    #[tokio::test]
    async fn empty_response_is_rejected() {
        let driver = driver_with(ChatResponse {
            content: None,
            tool_calls: None,
            usage: None,
        });
        assert!(driver.propose("q", &Transcript::new(), &[]).await.is_err());
    }

    #[test]
    fn transcript_replay_pairs_actions_with_results() {
        let driver = driver_with(ChatResponse {
            content: None,
            tool_calls: None,
            usage: None,
        });

        let mut t = Transcript::new();
        t.record_thought("search first").unwrap();
        t.record_action("search_documents", json!({"query": "x"}))
            .unwrap();
        t.record_observation("found it", false).unwrap();

        let messages = driver.build_messages("the question", &t, &[]);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[2].content.as_deref(), Some("search first"));
        let call_id = messages[2].tool_calls.as_ref().unwrap()[0].id.clone();
        assert_eq!(messages[3].role, Role::Tool);
        assert_eq!(messages[3].tool_call_id.as_deref(), Some(call_id.as_str()));
    }

    #[test]
    fn correction_replays_as_user_message() {
        let driver = driver_with(ChatResponse {
            content: None,
            tool_calls: None,
            usage: None,
        });

        let mut t = Transcript::new();
        t.record_observation("could not parse your response", true)
            .unwrap();

        let messages = driver.build_messages("q", &t, &[]);
        assert_eq!(messages[2].role, Role::User);
        assert!(messages[2].content.as_ref().unwrap().starts_with("Error:"));
    }
}
