//! Hop retrieval: batched engine calls and score/phrase grids
//!
//! The adapter bridges the engine's batch search API and the numeric grids
//! the chain ranker consumes. Hop-2 results come back flat (one row per
//! hop-1 candidate of every query); the flat-to-nested mapping is done with
//! explicit index functions rather than array-shape reinterpretation.

mod adapter;

pub use adapter::{augment_queries, flat_index, grid_position, RetrievalAdapter};

use crate::engine::EngineError;
use ndarray::{Array2, Array3};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetrievalError {
    /// The engine returned fewer candidates than requested for some query.
    /// Never padded or truncated away; the batch aborts.
    #[error("Retrieval shortfall: query {query_index} got {got} candidates, expected {expected}")]
    Shortfall {
        query_index: usize,
        expected: usize,
        got: usize,
    },

    /// Engine response row count does not match the query batch
    #[error("Engine response has {got} rows, expected {expected}")]
    BatchShape { expected: usize, got: usize },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Hop-1 results for a batch: `Q x top_k` phrases and scores
#[derive(Debug, Clone)]
pub struct Hop1Grid {
    pub phrases: Vec<Vec<String>>,
    pub scores: Array2<f32>,
}

impl Hop1Grid {
    /// Number of queries in the batch
    pub fn num_queries(&self) -> usize {
        self.phrases.len()
    }
}

/// Raw hop-2 results, still flat: `(Q * top_k) x top_k`
///
/// Row `flat_index(q, c, top_k)` holds the candidates retrieved for hop-1
/// candidate `c` of query `q`.
#[derive(Debug, Clone)]
pub struct FlatHopGrid {
    pub phrases: Vec<Vec<String>>,
    pub scores: Vec<Vec<f32>>,
}

/// Hop-2 results regrouped per query: `Q x top_k x top_k`
///
/// `phrases[q][i][j]` / `scores[[q, i, j]]` is hop-2 candidate `j` retrieved
/// for hop-1 candidate `i` of query `q`.
#[derive(Debug, Clone)]
pub struct Hop2Grid {
    pub phrases: Vec<Vec<Vec<String>>>,
    pub scores: Array3<f32>,
}

impl Hop2Grid {
    /// Rebuild per-query tensors from the flat hop-2 response
    ///
    /// Walks `grid_position` explicitly so a malformed row count surfaces as
    /// an error instead of silently reshaping into the wrong cells.
    pub fn from_flat(
        flat: &FlatHopGrid,
        num_queries: usize,
        top_k: usize,
    ) -> Result<Self, RetrievalError> {
        let expected = num_queries * top_k;
        if flat.phrases.len() != expected || flat.scores.len() != expected {
            return Err(RetrievalError::BatchShape {
                expected,
                got: flat.phrases.len().min(flat.scores.len()),
            });
        }

        let mut phrases = vec![vec![Vec::new(); top_k]; num_queries];
        let mut scores = Array3::<f32>::zeros((num_queries, top_k, top_k));

        for flat_row in 0..expected {
            let (q, i) = grid_position(flat_row, top_k);
            phrases[q][i] = flat.phrases[flat_row].clone();
            for (j, score) in flat.scores[flat_row].iter().enumerate() {
                scores[[q, i, j]] = *score;
            }
        }

        Ok(Self { phrases, scores })
    }
}
