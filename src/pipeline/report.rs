//! Output sink: the final chain document
//!
//! One JSON object keyed by query text, each value an ordered list of
//! `[hop1_id, hop2_id]` pairs. Written once, after the whole batch succeeds.

use crate::chain::QueryChains;
use crate::error::{HopchainError, Result};
use serde_json::{json, Map, Value};
use std::path::Path;

/// Ranked chains for a whole batch, ready for serialization
#[derive(Debug, Clone)]
pub struct ChainDocument {
    entries: Vec<QueryChains>,
}

impl ChainDocument {
    pub fn new(entries: Vec<QueryChains>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[QueryChains] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as `{ "<query>": [[hop1_id, hop2_id], ...], ... }`
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for entry in &self.entries {
            let chains: Vec<Value> = entry
                .chains
                .iter()
                .map(|c| json!([c.hop1, c.hop2]))
                .collect();
            map.insert(entry.query.clone(), Value::Array(chains));
        }
        Value::Object(map)
    }

    /// Write the document to `path` in one shot
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(&self.to_json()).map_err(|e| HopchainError::Json {
                source: e,
                context: "Failed to serialize chain document".to_string(),
            })?;
        std::fs::write(path, content).map_err(|e| HopchainError::Io {
            source: e,
            context: format!("Failed to write chain document: {:?}", path),
        })?;
        tracing::info!("Chain document written to {:?}", path);
        Ok(())
    }
}
