//! Corpus tools: semantic search and passage lookup.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::corpus::index::Retriever;
use crate::corpus::Corpus;

use super::Tool;

/// Default number of passages returned by a search.
const DEFAULT_TOP_K: usize = 4;

/// Semantic search over the ingested documents.
pub struct SearchDocuments {
    retriever: Arc<Retriever>,
}

impl SearchDocuments {
    pub fn new(retriever: Arc<Retriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Tool for SearchDocuments {
    fn name(&self) -> &str {
        "search_documents"
    }

    fn description(&self) -> &str {
        "Search the ingested documents for passages relevant to a query. Returns the most similar passages with their ids and source documents. Use this to find evidence before answering."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to search for"
                },
                "top_k": {
                    "type": "integer",
                    "description": "Number of passages to return (default: 4)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let query = args["query"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'query' argument"))?;
        let top_k = args["top_k"].as_u64().unwrap_or(DEFAULT_TOP_K as u64) as usize;

        tracing::info!(query, top_k, "searching documents");

        let hits = self.retriever.top_k(query, top_k.clamp(1, 20)).await?;
        if hits.is_empty() {
            return Ok("No matching passages found.".to_string());
        }

        let mut result = String::new();
        for passage in hits {
            result.push_str(&format!(
                "[passage {} | {}]\n{}\n\n",
                passage.id, passage.source, passage.text
            ));
        }
        Ok(result.trim_end().to_string())
    }
}

/// Fetch one passage by id, for re-reading a search hit in full.
pub struct ReadPassage {
    corpus: Arc<Corpus>,
}

impl ReadPassage {
    pub fn new(corpus: Arc<Corpus>) -> Self {
        Self { corpus }
    }
}

#[async_trait]
impl Tool for ReadPassage {
    fn name(&self) -> &str {
        "read_passage"
    }

    fn description(&self) -> &str {
        "Read a single passage by its id, as returned by search_documents."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": "integer",
                    "description": "Passage id"
                }
            },
            "required": ["id"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let id = args["id"]
            .as_u64()
            .ok_or_else(|| anyhow::anyhow!("Missing 'id' argument"))? as usize;

        match self.corpus.get(id) {
            Some(passage) => Ok(format!(
                "[passage {} | {}]\n{}",
                passage.id, passage.source, passage.text
            )),
            None => anyhow::bail!(
                "No passage with id {} (corpus has {} passages)",
                id,
                self.corpus.len()
            ),
        }
    }
}
