//! Embedding index over the corpus and the retriever built on top of it.
//!
//! The index is a flat in-memory store searched by cosine similarity. The
//! embedding computation itself goes through `EmbeddingClient`; swapping in
//! a real vector database would replace this module without touching the
//! retriever's callers.

use std::sync::Arc;

use crate::corpus::{Corpus, Passage};
use crate::llm::EmbeddingClient;

/// How many passages to embed per API call.
const EMBED_BATCH_SIZE: usize = 64;

/// Flat vector index keyed by passage id.
#[derive(Debug, Default)]
pub struct VectorIndex {
    entries: Vec<(usize, Vec<f32>)>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, passage_id: usize, embedding: Vec<f32>) {
        self.entries.push((passage_id, embedding));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Passage ids of the `k` nearest entries by cosine similarity,
    /// best first.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .map(|(id, vec)| (*id, cosine_similarity(query, vec)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

/// Embedding-backed top-k retrieval over an ingested corpus.
pub struct Retriever {
    corpus: Arc<Corpus>,
    index: VectorIndex,
    embedder: Arc<dyn EmbeddingClient>,
    embed_model: String,
}

impl Retriever {
    /// Embed every passage in the corpus and build the index.
    pub async fn build(
        corpus: Arc<Corpus>,
        embedder: Arc<dyn EmbeddingClient>,
        embed_model: String,
    ) -> anyhow::Result<Self> {
        let mut index = VectorIndex::new();

        for batch in corpus.passages().chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|p| p.text.clone()).collect();
            let embeddings = embedder.embed(&embed_model, &texts).await?;
            for (passage, embedding) in batch.iter().zip(embeddings) {
                index.insert(passage.id, embedding);
            }
        }

        tracing::info!(passages = index.len(), model = %embed_model, "built vector index");

        Ok(Self {
            corpus,
            index,
            embedder,
            embed_model,
        })
    }

    /// The `k` passages most relevant to `query`, best first.
    pub async fn top_k(&self, query: &str, k: usize) -> anyhow::Result<Vec<&Passage>> {
        if self.index.is_empty() {
            return Ok(Vec::new());
        }
        let query_vec = self
            .embedder
            .embed(&self.embed_model, &[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("embedding backend returned no vector for query"))?;

        Ok(self
            .index
            .search(&query_vec, k)
            .into_iter()
            .filter_map(|(id, _score)| self.corpus.get(id))
            .collect())
    }

    pub fn corpus(&self) -> &Arc<Corpus> {
        &self.corpus
    }
}
