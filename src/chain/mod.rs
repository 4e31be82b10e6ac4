//! Chain ranking: combine hop scores and select the best evidence chains

mod ranker;

pub use ranker::{rank_batch, rank_chains, RankError};

/// One two-hop evidence path with its combined score
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    /// Hop-1 phrase identifier
    pub hop1: String,
    /// Hop-2 phrase identifier
    pub hop2: String,
    /// Sum of the two hop scores
    pub score: f32,
}

/// Ranked chains for one query, non-increasing by score
pub type ChainSet = Vec<Chain>;

/// Batch output pairing each query with its ranked chains, in input order
#[derive(Debug, Clone)]
pub struct QueryChains {
    pub query: String,
    pub chains: ChainSet,
}
