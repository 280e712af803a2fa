//! Document corpus: ingestion into passages and passage lookup.
//!
//! Ingestion is deliberately thin. A `DocumentSource` turns some document
//! into plain text (the seam where a PDF extractor or HTML scraper would
//! plug in); the corpus splits that text into fixed-size passages on
//! paragraph boundaries. Heavier parsing stays behind the trait.

pub mod index;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Default passage size in characters.
pub const DEFAULT_PASSAGE_CHARS: usize = 1200;

/// One retrievable chunk of an ingested document.
#[derive(Debug, Clone, Serialize)]
pub struct Passage {
    /// Position in the corpus; stable for the corpus lifetime.
    pub id: usize,
    /// Name of the document this passage came from.
    pub source: String,
    pub text: String,
}

/// Something that can be turned into plain text for ingestion.
pub trait DocumentSource: Send + Sync {
    /// Display name for the document (shown in citations).
    fn name(&self) -> &str;

    /// Extract the full document text.
    fn extract_text(&self) -> anyhow::Result<String>;
}

/// A UTF-8 text or markdown file on disk.
pub struct TextFileSource {
    path: PathBuf,
    name: String,
}

impl TextFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { path, name }
    }
}

impl DocumentSource for TextFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract_text(&self) -> anyhow::Result<String> {
        fs::read_to_string(&self.path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", self.path.display(), e))
    }
}

/// The ingested passage store.
#[derive(Debug, Default)]
pub struct Corpus {
    passages: Vec<Passage>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one document, splitting it into passages of at most
    /// `max_chars` characters.
    pub fn ingest(&mut self, source: &dyn DocumentSource, max_chars: usize) -> anyhow::Result<usize> {
        let text = source.extract_text()?;
        let chunks = split_passages(&text, max_chars);
        let added = chunks.len();
        for chunk in chunks {
            self.passages.push(Passage {
                id: self.passages.len(),
                source: source.name().to_string(),
                text: chunk,
            });
        }
        tracing::info!(source = source.name(), passages = added, "ingested document");
        Ok(added)
    }

    /// Ingest every .txt and .md file directly under `dir`.
    pub fn ingest_dir(&mut self, dir: &Path, max_chars: usize) -> anyhow::Result<usize> {
        let mut entries: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|e| anyhow::anyhow!("failed to read corpus dir {}: {}", dir.display(), e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                matches!(
                    path.extension().and_then(|e| e.to_str()),
                    Some("txt") | Some("md")
                )
            })
            .collect();
        entries.sort();

        let mut total = 0;
        for path in entries {
            total += self.ingest(&TextFileSource::new(path), max_chars)?;
        }
        Ok(total)
    }

    pub fn get(&self, id: usize) -> Option<&Passage> {
        self.passages.get(id)
    }

    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}

/// Split text into passages of at most `max_chars`, preferring paragraph
/// boundaries, falling back to hard splits for oversized paragraphs.
fn split_passages(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut passages = Vec::new();
    let mut current = String::new();

    for paragraph in text.split("\n\n") {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        if paragraph.len() > max_chars {
            if !current.is_empty() {
                passages.push(std::mem::take(&mut current));
            }
            for chunk in hard_split(paragraph, max_chars) {
                passages.push(chunk);
            }
            continue;
        }

        // +2 for the paragraph separator we re-insert.
        if !current.is_empty() && current.len() + paragraph.len() + 2 > max_chars {
            passages.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(paragraph);
    }

    if !current.is_empty() {
        passages.push(current);
    }
    passages
}

/// Split on char boundaries into chunks of at most `max_chars` characters.
fn hard_split(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|c| c.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn split_respects_paragraphs() {
        let text = "first paragraph\n\nsecond paragraph\n\nthird paragraph";
        let passages = split_passages(text, 40);
        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0], "first paragraph\n\nsecond paragraph");
        assert_eq!(passages[1], "third paragraph");
    }

    #[test]
    fn oversized_paragraph_hard_splits() {
        let text = "x".repeat(25);
        let passages = split_passages(&text, 10);
        assert_eq!(passages.len(), 3);
        assert_eq!(passages[0].len(), 10);
        assert_eq!(passages[2].len(), 5);
    }

    #[test]
    fn hard_split_handles_multibyte() {
        let text = "héllo wörld".repeat(3);
        for chunk in hard_split(&text, 4) {
            assert!(chunk.chars().count() <= 4);
        }
    }

    #[test]
    fn ingest_dir_assigns_sequential_ids() {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in [("a.txt", "alpha\n\nbeta"), ("b.md", "gamma"), ("c.bin", "skip")] {
            let mut f = std::fs::File::create(dir.path().join(name)).unwrap();
            f.write_all(body.as_bytes()).unwrap();
        }

        let mut corpus = Corpus::new();
        let added = corpus.ingest_dir(dir.path(), 1000).unwrap();
        assert_eq!(added, 2);
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.get(0).unwrap().source, "a.txt");
        assert_eq!(corpus.get(1).unwrap().source, "b.md");
        assert!(corpus.get(2).is_none());
    }
}
