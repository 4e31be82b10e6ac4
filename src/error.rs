use std::path::PathBuf;
use thiserror::Error;

use crate::chain::RankError;
use crate::engine::{EmbedError, EngineError};
use crate::retrieval::RetrievalError;

/// Main error type for the hopchain application
#[derive(Error, Debug)]
pub enum HopchainError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// Query list ingestion errors
    #[error("Query list error: {0}")]
    QuerySet(String),

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// Retrieval engine errors
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Embedding backend errors
    #[error(transparent)]
    Embed(#[from] EmbedError),

    /// Retrieval adapter errors (shortfalls, shape mismatches)
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    /// Chain ranking contract violations
    #[error(transparent)]
    Rank(#[from] RankError),

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for hopchain operations
pub type Result<T> = std::result::Result<T, HopchainError>;
