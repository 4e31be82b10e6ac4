//! Retrieval engine boundary
//!
//! The phrase-retrieval engine is consumed through the [`PhraseSearch`] trait:
//! a batch search capability returning per-query phrase lists plus metadata
//! records carrying a relevance score. [`DensePhraseEngine`] is the built-in
//! implementation (fastembed embeddings over an HNSW phrase index); anything
//! honouring the trait contract can stand in for it.

mod dense;
mod embedder;

pub use dense::{DensePhraseEngine, IndexParams, PhraseRecord};
pub use embedder::{EmbedError, FastEmbedder, QueryEmbedder};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine initialization failed: {0}")]
    InitializationError(String),

    #[error("Phrase dump error: {context}: {source}")]
    PhraseDump {
        source: std::io::Error,
        context: String,
    },

    #[error("Phrase dump parse error: {0}")]
    PhraseDumpParse(#[from] serde_json::Error),

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbedError),

    #[error("Search failed: {0}")]
    SearchError(String),
}

/// Per-candidate metadata returned by the engine.
///
/// `score` is the only field the core consumes; `extra` carries whatever else
/// the engine reports (document ids, offsets, ...) untouched.
#[derive(Debug, Clone)]
pub struct PhraseMeta {
    pub score: f32,
    pub extra: serde_json::Value,
}

impl PhraseMeta {
    pub fn from_score(score: f32) -> Self {
        Self {
            score,
            extra: serde_json::Value::Null,
        }
    }
}

/// Result of one batched phrase search.
///
/// `phrases[q]` and `metadata[q]` are parallel lists for query `q`, ordered by
/// engine relevance. The engine may return fewer than the requested `top_k`
/// candidates; callers decide whether a shortfall is an error.
#[derive(Debug, Clone, Default)]
pub struct SearchResponse {
    pub phrases: Vec<Vec<String>>,
    pub metadata: Vec<Vec<PhraseMeta>>,
}

/// Batch phrase-search capability
///
/// One call handles an arbitrary number of queries; scores must be comparable
/// via addition across independent calls (the chain ranker sums them).
pub trait PhraseSearch: Send + Sync {
    fn search(&self, queries: &[String], top_k: usize) -> Result<SearchResponse, EngineError>;
}
