//! Retrieval adapter: batched hop-1 / hop-2 calls against the engine

use super::{FlatHopGrid, Hop1Grid, RetrievalError};
use crate::engine::{PhraseSearch, SearchResponse};
use ndarray::Array2;
use std::sync::Arc;
use tracing::debug;

/// Flat row index for hop-1 candidate `candidate` of query `query`
///
/// This is the order `augment_queries` emits and the order hop-2 rows come
/// back in; `grid_position` is its inverse.
pub fn flat_index(query: usize, candidate: usize, top_k: usize) -> usize {
    query * top_k + candidate
}

/// Inverse of [`flat_index`]: `(query, candidate)` for a flat row
pub fn grid_position(flat: usize, top_k: usize) -> (usize, usize) {
    (flat / top_k, flat % top_k)
}

/// Build the hop-2 query batch: each hop-1 phrase concatenated with the
/// original question, flattened in `flat_index` order
pub fn augment_queries(queries: &[String], hop1: &Hop1Grid, separator: &str) -> Vec<String> {
    let mut augmented = Vec::with_capacity(queries.len() * hop1.phrases.first().map_or(0, Vec::len));
    for (q, query) in queries.iter().enumerate() {
        for phrase in &hop1.phrases[q] {
            augmented.push(format!("{}{}{}", phrase, separator, query));
        }
    }
    augmented
}

/// Bridge between the engine's batch search API and the ranker's grids
///
/// Holds nothing but the engine handle; no state survives between calls.
pub struct RetrievalAdapter {
    engine: Arc<dyn PhraseSearch>,
}

impl RetrievalAdapter {
    pub fn new(engine: Arc<dyn PhraseSearch>) -> Self {
        Self { engine }
    }

    /// First hop: one batched engine call over all queries
    ///
    /// Errors with [`RetrievalError::Shortfall`] if any query received fewer
    /// than `top_k` candidates.
    pub fn hop1(&self, queries: &[String], top_k: usize) -> Result<Hop1Grid, RetrievalError> {
        debug!("Hop-1 retrieval: {} queries, top_k={}", queries.len(), top_k);
        let response = self.engine.search(queries, top_k)?;
        Self::check_batch(&response, queries.len(), top_k)?;

        let mut scores = Array2::<f32>::zeros((queries.len(), top_k));
        for (q, meta) in response.metadata.iter().enumerate() {
            for (c, candidate) in meta.iter().enumerate() {
                scores[[q, c]] = candidate.score;
            }
        }

        Ok(Hop1Grid {
            phrases: response.phrases,
            scores,
        })
    }

    /// Second hop: one batched engine call over the augmented queries
    ///
    /// The response keeps the flat row order established by
    /// [`augment_queries`]; callers regroup it with `Hop2Grid::from_flat`.
    pub fn hop2(
        &self,
        flat_queries: &[String],
        top_k: usize,
    ) -> Result<FlatHopGrid, RetrievalError> {
        debug!(
            "Hop-2 retrieval: {} augmented queries, top_k={}",
            flat_queries.len(),
            top_k
        );
        let response = self.engine.search(flat_queries, top_k)?;
        Self::check_batch(&response, flat_queries.len(), top_k)?;

        let scores = response
            .metadata
            .into_iter()
            .map(|meta| meta.into_iter().map(|m| m.score).collect())
            .collect();

        Ok(FlatHopGrid {
            phrases: response.phrases,
            scores,
        })
    }

    /// Enforce the exactly-top_k-per-query contract on an engine response
    fn check_batch(
        response: &SearchResponse,
        num_queries: usize,
        top_k: usize,
    ) -> Result<(), RetrievalError> {
        if response.phrases.len() != num_queries || response.metadata.len() != num_queries {
            return Err(RetrievalError::BatchShape {
                expected: num_queries,
                got: response.phrases.len().min(response.metadata.len()),
            });
        }
        for q in 0..num_queries {
            let got = response.phrases[q].len().min(response.metadata[q].len());
            if response.phrases[q].len() != top_k || response.metadata[q].len() != top_k {
                return Err(RetrievalError::Shortfall {
                    query_index: q,
                    expected: top_k,
                    got,
                });
            }
        }
        Ok(())
    }
}
