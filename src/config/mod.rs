//! Configuration management for hopchain
//!
//! Loading, validation, and defaults for the batch runner. Everything the
//! pipeline tunes (hop width, chain selection, engine location, output path)
//! lives here instead of hard-coded constants.

use crate::error::{HopchainError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub retrieval: RetrievalConfig,
    pub engine: EngineConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Hop retrieval and chain selection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Candidates retained per hop (> 0)
    pub top_k: usize,
    /// Chains returned per query (0 < n_sel <= top_k^2)
    pub n_sel: usize,
    /// Separator between a hop-1 phrase and the original question
    pub separator: String,
}

/// Retrieval engine parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Embedding model name
    pub model: String,
    /// Embedding dimension (must match the model)
    pub vector_dim: usize,
    /// Phrase dump file (JSON array of phrase records)
    pub phrase_dump: PathBuf,
    pub hnsw_ef_construction: usize,
    pub hnsw_m: usize,
    pub hnsw_ef_search: usize,
}

/// Input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Query list file (JSON array or one question per line)
    pub queries: PathBuf,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Destination for the chain document
    pub path: PathBuf,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HopchainError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| HopchainError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        // Validate configuration
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| HopchainError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: HOPCHAIN_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("HOPCHAIN_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "RETRIEVAL__TOP_K" => {
                self.retrieval.top_k = Self::parse_env(path, value)?;
            }
            "RETRIEVAL__N_SEL" => {
                self.retrieval.n_sel = Self::parse_env(path, value)?;
            }
            "ENGINE__MODEL" => {
                self.engine.model = value.to_string();
            }
            "ENGINE__PHRASE_DUMP" => {
                self.engine.phrase_dump = PathBuf::from(value);
            }
            "OUTPUT__PATH" => {
                self.output.path = PathBuf::from(value);
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    fn parse_env(path: &str, value: &str) -> Result<usize> {
        value.parse().map_err(|_| HopchainError::InvalidConfigValue {
            path: path.to_string(),
            message: format!("Cannot parse '{}' as integer", value),
        })
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| HopchainError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("hopchain").join("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            retrieval: RetrievalConfig {
                top_k: 2,
                n_sel: 2,
                separator: " ".to_string(),
            },
            engine: EngineConfig {
                model: "all-MiniLM-L6-v2".to_string(),
                vector_dim: 384,
                phrase_dump: PathBuf::from("phrases.json"),
                hnsw_ef_construction: 200,
                hnsw_m: 16,
                hnsw_ef_search: 64,
            },
            input: InputConfig {
                queries: PathBuf::from("queries.json"),
            },
            output: OutputConfig {
                path: PathBuf::from("chains.json"),
            },
        }
    }
}
