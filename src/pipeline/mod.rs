//! Batch pipeline: hop 1 -> augment -> hop 2 -> rank -> document
//!
//! Strictly sequential and synchronous. Any stage failure aborts the whole
//! batch before the output sink is touched; a partially populated document is
//! never written.

mod report;

pub use report::ChainDocument;

use crate::chain::rank_batch;
use crate::config::RetrievalConfig;
use crate::engine::PhraseSearch;
use crate::error::Result;
use crate::retrieval::{augment_queries, Hop2Grid, RetrievalAdapter};
use std::sync::Arc;
use tracing::info;

/// Runs one batch of queries end to end
pub struct BatchRunner {
    adapter: RetrievalAdapter,
    top_k: usize,
    n_sel: usize,
    separator: String,
}

impl BatchRunner {
    pub fn new(engine: Arc<dyn PhraseSearch>, config: &RetrievalConfig) -> Self {
        Self {
            adapter: RetrievalAdapter::new(engine),
            top_k: config.top_k,
            n_sel: config.n_sel,
            separator: config.separator.clone(),
        }
    }

    /// Extract the best evidence chains for every query
    pub fn run(&self, queries: &[String]) -> Result<ChainDocument> {
        info!(
            "Running chain extraction: {} queries, top_k={}, n_sel={}",
            queries.len(),
            self.top_k,
            self.n_sel
        );

        let hop1 = self.adapter.hop1(queries, self.top_k)?;
        info!("Hop 1 complete ({} candidates per query)", self.top_k);

        let augmented = augment_queries(queries, &hop1, &self.separator);
        let flat = self.adapter.hop2(&augmented, self.top_k)?;
        let hop2 = Hop2Grid::from_flat(&flat, queries.len(), self.top_k)?;
        info!("Hop 2 complete ({} augmented queries)", augmented.len());

        let ranked = rank_batch(queries, &hop1, &hop2, self.top_k, self.n_sel)?;
        info!("Ranked {} chain sets", ranked.len());

        Ok(ChainDocument::new(ranked))
    }
}
