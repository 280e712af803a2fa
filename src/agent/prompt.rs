//! System prompt templates for the agent.

use crate::tools::ToolDescriptor;

/// Build the system prompt with tool definitions.
pub fn build_system_prompt(tools: &[ToolDescriptor]) -> String {
    let tool_descriptions = tools
        .iter()
        .map(|t| format!("- **{}**: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a research assistant that answers questions using an ingested document corpus.

## Available Tools
{tool_descriptions}

## Rules
1. **Search before answering** - Ground every claim in passages retrieved from the corpus. Don't answer from memory.
2. **Cite passages** - Reference passage ids and source documents in your answer.
3. **One tool call at a time** - Make a single tool call, read its result, then decide the next step.
4. **Adapt on errors** - If a tool call fails, read the error and adjust your arguments instead of repeating the same call.
5. **Say when you don't know** - If the corpus has no relevant passages, say so rather than inventing an answer.

When you have enough evidence, respond with the final answer as plain text and no tool call."#,
        tool_descriptions = tool_descriptions
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prompt_lists_all_tools() {
        let tools = vec![
            ToolDescriptor {
                name: "search_documents".into(),
                description: "Search the corpus.".into(),
                schema: json!({}),
            },
            ToolDescriptor {
                name: "read_passage".into(),
                description: "Read one passage.".into(),
                schema: json!({}),
            },
        ];
        let prompt = build_system_prompt(&tools);
        assert!(prompt.contains("**search_documents**"));
        assert!(prompt.contains("**read_passage**"));
    }
}
