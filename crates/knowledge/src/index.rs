//! In-memory vector index with similarity and MMR search.
//!
//! Built once at start-up from the loaded corpus and never mutated
//! afterwards, so a single `Arc<InMemoryIndex>` serves every request.

use crate::embeddings::EmbeddingProvider;
use crate::types::{DiversityMode, Document, SearchParams};
use crate::vector_index::VectorSearch;
use helpdesk_core::{AppError, AppResult};
use std::cmp::Ordering;
use std::sync::Arc;

#[derive(Debug)]
struct IndexEntry {
    document: Document,
    embedding: Vec<f32>,
}

/// Corpus passages and their embeddings, held in memory.
#[derive(Debug)]
pub struct InMemoryIndex {
    entries: Vec<IndexEntry>,
    provider: Arc<dyn EmbeddingProvider>,
}

impl InMemoryIndex {
    /// Embed every document with `provider` and build the index.
    pub async fn build(
        documents: Vec<Document>,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let embeddings = provider.embed_batch(&texts).await?;

        if embeddings.len() != documents.len() {
            return Err(AppError::Knowledge(format!(
                "Embedding provider returned {} vectors for {} documents",
                embeddings.len(),
                documents.len()
            )));
        }

        let entries = documents
            .into_iter()
            .zip(embeddings)
            .map(|(document, embedding)| IndexEntry {
                document,
                embedding,
            })
            .collect::<Vec<_>>();

        tracing::info!(
            "Built in-memory index: {} passages ({} / {})",
            entries.len(),
            provider.provider_name(),
            provider.model_name()
        );

        Ok(Self { entries, provider })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry index with its query similarity, best first.
    /// Ties keep corpus order.
    fn rank(&self, query_embedding: &[f32]) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, cosine_similarity(query_embedding, &e.embedding)))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored
    }

    /// Greedy maximal marginal relevance over a ranked candidate pool.
    ///
    /// Each step picks the candidate maximising
    /// `lambda * relevance - (1 - lambda) * max_similarity_to_selected`;
    /// ties go to the better-ranked candidate.
    fn select_mmr(&self, candidates: &[(usize, f32)], k: usize, lambda: f32) -> Vec<(usize, f32)> {
        let mut remaining: Vec<(usize, f32)> = candidates.to_vec();
        let mut selected: Vec<(usize, f32)> = Vec::with_capacity(k.min(remaining.len()));

        while selected.len() < k && !remaining.is_empty() {
            let mut best_pos = 0;
            let mut best_score = f32::NEG_INFINITY;

            for (pos, (idx, relevance)) in remaining.iter().enumerate() {
                let redundancy = selected
                    .iter()
                    .map(|(s, _)| {
                        cosine_similarity(&self.entries[*idx].embedding, &self.entries[*s].embedding)
                    })
                    .fold(None, |max: Option<f32>, sim| {
                        Some(max.map_or(sim, |m| m.max(sim)))
                    })
                    .unwrap_or(0.0);

                let score = lambda * relevance - (1.0 - lambda) * redundancy;
                if score > best_score {
                    best_score = score;
                    best_pos = pos;
                }
            }

            selected.push(remaining.remove(best_pos));
        }

        selected
    }
}

#[async_trait::async_trait]
impl VectorSearch for InMemoryIndex {
    async fn search(&self, query: &str, params: &SearchParams) -> AppResult<Vec<(Document, f32)>> {
        if params.k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.provider.embed(query).await?;
        let ranked = self.rank(&query_embedding);

        let picked = match params.mode {
            DiversityMode::Similarity => ranked.into_iter().take(params.k).collect::<Vec<_>>(),
            DiversityMode::Mmr { lambda } => {
                let pool_size = params.fetch_k.max(params.k);
                let pool: Vec<(usize, f32)> = ranked.into_iter().take(pool_size).collect();
                self.select_mmr(&pool, params.k, lambda)
            }
        };

        tracing::debug!(
            "Vector search returned {} of {} passages (k={}, fetch_k={}, mode={:?})",
            picked.len(),
            self.entries.len(),
            params.k,
            params.fetch_k,
            params.mode
        );

        Ok(picked
            .into_iter()
            .map(|(idx, score)| (self.entries[idx].document.clone().with_score(score), score))
            .collect())
    }
}

/// Calculate cosine similarity between two vectors.
///
/// Mismatched lengths and zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
        return 0.0;
    }

    (dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
