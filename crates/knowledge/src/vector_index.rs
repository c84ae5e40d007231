//! Vector search abstraction consumed by the retrieval stages.

use crate::types::{Document, SearchParams};
use helpdesk_core::AppResult;

/// Read-only similarity search over the corpus.
///
/// Implementations are shared by every in-flight request and must not
/// mutate state at query time.
#[async_trait::async_trait]
pub trait VectorSearch: Send + Sync {
    /// Return up to `params.k` documents for `query`, best first, each
    /// paired with its similarity to the query.
    async fn search(&self, query: &str, params: &SearchParams) -> AppResult<Vec<(Document, f32)>>;
}
