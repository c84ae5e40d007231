//! Knowledge system type definitions.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// A passage of corpus text returned by vector search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier derived from locator and content
    pub id: String,

    /// Passage text
    pub text: String,

    /// Source locator (file path)
    pub source: String,

    /// Chunk position within the source
    pub position: u32,

    /// Relevance to the query, set during scored retrieval
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Document {
    /// Create an unscored document with a content-derived id.
    pub fn new(source: impl Into<String>, position: u32, text: impl Into<String>) -> Self {
        let source = source.into();
        let text = text.into();
        Self {
            id: document_id(&source, position, &text),
            text,
            source,
            position,
            score: None,
        }
    }

    /// Human-readable locator, `path#position`.
    pub fn locator(&self) -> String {
        format!("{}#{}", self.source, self.position)
    }

    /// Copy of this document carrying a relevance score.
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }
}

/// Derive a short hex id from a document's locator and text.
pub fn document_id(source: &str, position: u32, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(position.to_le_bytes());
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    digest.iter().take(8).map(|b| format!("{:02x}", b)).collect()
}

/// Ordered, content-unique documents plus their newline-joined text.
///
/// Two documents are the same entry when their text is byte-identical.
/// The first occurrence keeps its position; later duplicates are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContextBundle {
    documents: Vec<Document>,
    text: String,
}

impl ContextBundle {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a bundle from documents in search order.
    pub fn from_documents(documents: Vec<Document>) -> Self {
        Self::empty().merge(documents)
    }

    /// Stable set-union keyed by content: existing entries first, then any
    /// new content from `extra` in the order it appears.
    pub fn merge(self, extra: Vec<Document>) -> Self {
        let mut seen: HashSet<String> = self.documents.iter().map(|d| d.text.clone()).collect();
        let mut documents = self.documents;

        for document in extra {
            if seen.insert(document.text.clone()) {
                documents.push(document);
            }
        }

        let text = documents
            .iter()
            .map(|d| d.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Self { documents, text }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Concatenated passage text, newline separated.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True when there is no text to ground an answer on.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// How vector search picks results from its candidate pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "mode")]
pub enum DiversityMode {
    /// Plain top-k by cosine similarity
    Similarity,

    /// Maximal marginal relevance; `lambda` weighs relevance against novelty
    Mmr { lambda: f32 },
}

/// Parameters for a single vector search call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Results returned
    pub k: usize,

    /// Candidate pool considered before diversity re-ranking
    pub fetch_k: usize,

    pub mode: DiversityMode,
}

impl SearchParams {
    /// MMR search keeping `k` of the `fetch_k` nearest candidates.
    pub fn mmr(k: usize, fetch_k: usize, lambda: f32) -> Self {
        Self {
            k,
            fetch_k,
            mode: DiversityMode::Mmr { lambda },
        }
    }

    /// Plain top-k similarity search.
    pub fn similarity(k: usize) -> Self {
        Self {
            k,
            fetch_k: k,
            mode: DiversityMode::Similarity,
        }
    }
}

/// Internal chunk candidate before it becomes a Document.
#[derive(Debug, Clone)]
pub struct ChunkCandidate {
    pub position: u32,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<Document> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Document::new("faq.md", i as u32, *t))
            .collect()
    }

    fn texts(bundle: &ContextBundle) -> Vec<&str> {
        bundle.documents().iter().map(|d| d.text.as_str()).collect()
    }

    #[test]
    fn test_from_documents_joins_with_newlines() {
        let bundle = ContextBundle::from_documents(docs(&["alpha", "beta"]));
        assert_eq!(bundle.text(), "alpha\nbeta");
        assert_eq!(bundle.len(), 2);
    }

    #[test]
    fn test_merge_keeps_first_occurrence_order() {
        let first = ContextBundle::from_documents(docs(&["a", "b", "c"]));
        let merged = first.merge(docs(&["c", "d", "a", "e"]));

        assert_eq!(texts(&merged), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(merged.text(), "a\nb\nc\nd\ne");
    }

    #[test]
    fn test_merge_dedups_by_content_not_id() {
        let first = ContextBundle::from_documents(vec![Document::new("billing.md", 0, "Pay online.")]);
        let merged = first.merge(vec![Document::new("payments.md", 7, "Pay online.")]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged.documents()[0].source, "billing.md");
    }

    #[test]
    fn test_merge_with_itself_equals_dedup() {
        let a = docs(&["x", "y", "x", "z"]);
        let dedup = ContextBundle::from_documents(a.clone());
        let merged = ContextBundle::from_documents(a.clone()).merge(a);

        assert_eq!(texts(&merged), vec!["x", "y", "z"]);
        assert_eq!(merged, dedup);
    }

    #[test]
    fn test_empty_bundle() {
        let bundle = ContextBundle::from_documents(Vec::new());
        assert!(bundle.is_empty());
        assert_eq!(bundle.text(), "");
    }

    #[test]
    fn test_document_id_is_stable() {
        let a = Document::new("faq.md", 3, "Reset the modem.");
        let b = Document::new("faq.md", 3, "Reset the modem.");
        let c = Document::new("faq.md", 4, "Reset the modem.");

        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
        assert_eq!(a.id.len(), 16);
        assert_eq!(a.locator(), "faq.md#3");
    }
}
