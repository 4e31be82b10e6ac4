//! In-process dense phrase engine
//!
//! Embeds a phrase dump with the configured model, indexes the vectors in an
//! HNSW graph (cosine distance), and serves batched top-k phrase search over
//! it. Scores are cosine similarities (1 - distance), so hop scores from
//! independent calls are on the same additive scale.

use super::{EngineError, PhraseMeta, PhraseSearch, QueryEmbedder, SearchResponse};
use hnsw_rs::prelude::*;
use serde::Deserialize;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// One record of the phrase dump file (a JSON array of these)
#[derive(Debug, Clone, Deserialize)]
pub struct PhraseRecord {
    /// Phrase text; also serves as the phrase identifier
    pub phrase: String,

    /// Engine-specific extras (document id, passage offsets, ...), passed
    /// through untouched as candidate metadata
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// HNSW construction and search parameters
#[derive(Debug, Clone, Copy)]
pub struct IndexParams {
    pub ef_construction: usize,
    pub m: usize,
    pub ef_search: usize,
}

impl Default for IndexParams {
    fn default() -> Self {
        Self {
            ef_construction: 200,
            m: 16,
            ef_search: 64,
        }
    }
}

/// Dense phrase-retrieval engine over an in-memory HNSW index
pub struct DensePhraseEngine {
    embedder: Arc<dyn QueryEmbedder>,
    index: RwLock<Hnsw<'static, f32, DistCosine>>,
    records: Vec<PhraseRecord>,
    ef_search: usize,
}

impl DensePhraseEngine {
    /// Build an engine from a phrase dump file
    ///
    /// Reads the dump (JSON array of [`PhraseRecord`]), embeds every phrase in
    /// one batch, and inserts the vectors into a fresh index. The dump must
    /// contain at least one phrase.
    pub fn from_dump(
        embedder: Arc<dyn QueryEmbedder>,
        dump_path: &Path,
        params: IndexParams,
    ) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(dump_path).map_err(|e| EngineError::PhraseDump {
            source: e,
            context: format!("Failed to read phrase dump: {:?}", dump_path),
        })?;
        let records: Vec<PhraseRecord> = serde_json::from_str(&content)?;

        if records.is_empty() {
            return Err(EngineError::InitializationError(format!(
                "Phrase dump is empty: {:?}",
                dump_path
            )));
        }

        tracing::info!(
            "Embedding {} phrases from {:?} with {}",
            records.len(),
            dump_path,
            embedder.model_name()
        );

        let texts: Vec<String> = records.iter().map(|r| r.phrase.clone()).collect();
        let vectors = embedder.embed_batch(&texts)?;

        let index = Hnsw::<f32, DistCosine>::new(
            params.m,
            records.len(),
            16, // max layers
            params.ef_construction,
            DistCosine,
        );
        for (i, vector) in vectors.iter().enumerate() {
            index.insert((vector, i));
        }

        tracing::info!("Phrase index built ({} vectors)", records.len());

        Ok(Self {
            embedder,
            index: RwLock::new(index),
            records,
            ef_search: params.ef_search,
        })
    }

    /// Number of indexed phrases
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl PhraseSearch for DensePhraseEngine {
    fn search(&self, queries: &[String], top_k: usize) -> Result<SearchResponse, EngineError> {
        if queries.is_empty() {
            return Ok(SearchResponse::default());
        }

        let embeddings = self.embedder.embed_batch(queries)?;

        let index = self
            .index
            .read()
            .map_err(|_| EngineError::SearchError("Index lock poisoned".to_string()))?;

        let mut phrases = Vec::with_capacity(queries.len());
        let mut metadata = Vec::with_capacity(queries.len());

        for embedding in &embeddings {
            let neighbours = index.search(embedding, top_k, self.ef_search);

            let mut query_phrases = Vec::with_capacity(neighbours.len());
            let mut query_meta = Vec::with_capacity(neighbours.len());
            for neighbour in neighbours {
                let record = self.records.get(neighbour.d_id).ok_or_else(|| {
                    EngineError::SearchError(format!(
                        "Index returned unknown phrase id {}",
                        neighbour.d_id
                    ))
                })?;
                query_phrases.push(record.phrase.clone());
                query_meta.push(PhraseMeta {
                    // Cosine distance to similarity
                    score: 1.0 - neighbour.distance,
                    extra: serde_json::Value::Object(record.extra.clone()),
                });
            }

            phrases.push(query_phrases);
            metadata.push(query_meta);
        }

        Ok(SearchResponse { phrases, metadata })
    }
}
