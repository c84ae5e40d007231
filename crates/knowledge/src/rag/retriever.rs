//! Diversity-aware retrieval and the broadened second pass.

use crate::types::{ContextBundle, Document, SearchParams};
use crate::vector_index::VectorSearch;
use helpdesk_core::config::RetrievalConfig;
use helpdesk_core::AppResult;
use std::sync::Arc;

/// Wraps vector search with the two fixed retrieval breadths.
#[derive(Clone)]
pub struct Retriever {
    search: Arc<dyn VectorSearch>,
    first_pass: SearchParams,
    expanded_pass: SearchParams,
}

impl Retriever {
    pub fn new(
        search: Arc<dyn VectorSearch>,
        first_pass: SearchParams,
        expanded_pass: SearchParams,
    ) -> Self {
        Self {
            search,
            first_pass,
            expanded_pass,
        }
    }

    /// MMR passes sized from configuration (8 of 24, then 12 of 32 by default).
    pub fn from_config(search: Arc<dyn VectorSearch>, config: &RetrievalConfig) -> Self {
        Self::new(
            search,
            SearchParams::mmr(config.k, config.fetch_k, config.mmr_lambda),
            SearchParams::mmr(config.expanded_k, config.expanded_fetch_k, config.mmr_lambda),
        )
    }

    async fn fetch(&self, query: &str, params: &SearchParams) -> AppResult<Vec<Document>> {
        let results = self.search.search(query, params).await?;
        Ok(results.into_iter().map(|(doc, _score)| doc).collect())
    }

    /// First retrieval pass, in search order.
    pub async fn retrieve(&self, query: &str) -> AppResult<ContextBundle> {
        let documents = self.fetch(query, &self.first_pass).await?;
        let bundle = ContextBundle::from_documents(documents);

        tracing::info!(documents = bundle.len(), "Retrieved context");
        Ok(bundle)
    }

    /// Broader second pass merged into `existing` by content.
    pub async fn expand(&self, query: &str, existing: ContextBundle) -> AppResult<ContextBundle> {
        let before = existing.len();
        let extra = self.fetch(query, &self.expanded_pass).await?;
        let fetched = extra.len();
        let merged = existing.merge(extra);

        tracing::info!(
            before,
            fetched,
            after = merged.len(),
            "Expanded context"
        );
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Returns a fixed list per `k` and records every call.
    struct ScriptedSearch {
        by_k: Vec<(usize, Vec<&'static str>)>,
        calls: Mutex<Vec<SearchParams>>,
    }

    #[async_trait::async_trait]
    impl VectorSearch for ScriptedSearch {
        async fn search(
            &self,
            _query: &str,
            params: &SearchParams,
        ) -> AppResult<Vec<(Document, f32)>> {
            self.calls.lock().unwrap().push(*params);
            let texts = self
                .by_k
                .iter()
                .find(|(k, _)| *k == params.k)
                .map(|(_, t)| t.clone())
                .unwrap_or_default();
            Ok(texts
                .into_iter()
                .enumerate()
                .map(|(i, t)| (Document::new("faq.md", i as u32, t), 1.0))
                .collect())
        }
    }

    fn retriever(search: Arc<ScriptedSearch>) -> Retriever {
        Retriever::from_config(search, &RetrievalConfig::default())
    }

    #[tokio::test]
    async fn test_retrieve_uses_first_pass_params() {
        let search = Arc::new(ScriptedSearch {
            by_k: vec![(8, vec!["a", "b"])],
            calls: Mutex::new(Vec::new()),
        });

        let bundle = retriever(search.clone()).retrieve("q").await.unwrap();

        assert_eq!(bundle.text(), "a\nb");
        assert_eq!(
            search.calls.lock().unwrap()[0],
            SearchParams::mmr(8, 24, 0.5)
        );
    }

    #[tokio::test]
    async fn test_expand_merges_stably() {
        let search = Arc::new(ScriptedSearch {
            by_k: vec![(8, vec!["a", "b"]), (12, vec!["b", "c", "a", "d"])],
            calls: Mutex::new(Vec::new()),
        });
        let retriever = retriever(search.clone());

        let first = retriever.retrieve("q").await.unwrap();
        let merged = retriever.expand("q", first).await.unwrap();

        assert_eq!(merged.text(), "a\nb\nc\nd");
        assert_eq!(
            search.calls.lock().unwrap()[1],
            SearchParams::mmr(12, 32, 0.5)
        );
    }
}
