use crate::config::Config;
use crate::error::{HopchainError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_retrieval(config, &mut errors);
        Self::validate_engine(config, &mut errors);
        Self::validate_paths(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(HopchainError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_retrieval(config: &Config, errors: &mut Vec<ValidationError>) {
        let top_k = config.retrieval.top_k;
        let n_sel = config.retrieval.n_sel;

        if top_k == 0 {
            errors.push(ValidationError::new(
                "retrieval.top_k",
                "top_k must be greater than 0",
            ));
        }

        if n_sel == 0 {
            errors.push(ValidationError::new(
                "retrieval.n_sel",
                "n_sel must be greater than 0",
            ));
        } else if top_k > 0 && n_sel > top_k * top_k {
            errors.push(ValidationError::new(
                "retrieval.n_sel",
                format!(
                    "n_sel ({}) cannot exceed top_k^2 ({})",
                    n_sel,
                    top_k * top_k
                ),
            ));
        }
    }

    fn validate_engine(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.engine.model.is_empty() {
            errors.push(ValidationError::new(
                "engine.model",
                "Model name cannot be empty",
            ));
        }

        if config.engine.vector_dim == 0 {
            errors.push(ValidationError::new(
                "engine.vector_dim",
                "Vector dimension must be greater than 0",
            ));
        }

        if config.engine.hnsw_ef_construction == 0 {
            errors.push(ValidationError::new(
                "engine.hnsw_ef_construction",
                "ef_construction must be greater than 0",
            ));
        }

        if config.engine.hnsw_m == 0 {
            errors.push(ValidationError::new(
                "engine.hnsw_m",
                "M must be greater than 0",
            ));
        }

        if config.engine.hnsw_ef_search == 0 {
            errors.push(ValidationError::new(
                "engine.hnsw_ef_search",
                "ef_search must be greater than 0",
            ));
        }
    }

    fn validate_paths(config: &Config, errors: &mut Vec<ValidationError>) {
        // File existence is checked at load time, not here; paths may not
        // exist yet when the config is first written
        if config.engine.phrase_dump.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "engine.phrase_dump",
                "Phrase dump path cannot be empty",
            ));
        }

        if config.input.queries.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "input.queries",
                "Query list path cannot be empty",
            ));
        }

        if config.output.path.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "output.path",
                "Output path cannot be empty",
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_top_k_rejected() {
        let mut config = Config::default();
        config.retrieval.top_k = 0;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_n_sel_over_budget_rejected() {
        let mut config = Config::default();
        config.retrieval.top_k = 2;
        config.retrieval.n_sel = 5;

        let err = ConfigValidator::validate(&config).unwrap_err();
        match err {
            HopchainError::ConfigValidation { errors } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].path, "retrieval.n_sel");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_n_sel_at_budget_accepted() {
        let mut config = Config::default();
        config.retrieval.top_k = 3;
        config.retrieval.n_sel = 9;
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_empty_model_rejected() {
        let mut config = Config::default();
        config.engine.model = String::new();
        assert!(ConfigValidator::validate(&config).is_err());
    }
}
