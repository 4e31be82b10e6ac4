//! Hopchain - Multi-Hop Evidence-Chain Extraction
//!
//! Extracts two-hop evidence chains on top of a dense phrase-retrieval engine:
//! each question retrieves a first set of candidate phrases, every candidate is
//! re-queried together with the original question, and the combined hop scores
//! select the best evidence chains per question.

pub mod chain;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod queryset;
pub mod retrieval;

pub use error::{HopchainError, Result};
