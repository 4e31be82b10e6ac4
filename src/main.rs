use std::path::PathBuf;
use std::sync::Arc;

use hopchain::cli::{Cli, Commands, ConfigAction};
use hopchain::config::{Config, ConfigValidator};
use hopchain::engine::{DensePhraseEngine, FastEmbedder};
use hopchain::error::{HopchainError, Result};
use hopchain::pipeline::BatchRunner;
use hopchain::queryset::QuerySet;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            queries,
            output,
            top_k,
            n_sel,
        } => {
            cmd_run(cli.config, queries, output, top_k, n_sel)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose {
        "hopchain=debug"
    } else {
        "hopchain=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt().with_env_filter(filter).with_target(false).init();
}

fn cmd_run(
    config_path: Option<PathBuf>,
    queries: Option<PathBuf>,
    output: Option<PathBuf>,
    top_k: Option<usize>,
    n_sel: Option<usize>,
) -> Result<()> {
    let mut config = load_config(config_path)?;

    // CLI flags beat the config file; re-validate after applying them
    if let Some(top_k) = top_k {
        config.retrieval.top_k = top_k;
    }
    if let Some(n_sel) = n_sel {
        config.retrieval.n_sel = n_sel;
    }
    ConfigValidator::validate(&config)?;

    let query_path = queries.unwrap_or_else(|| config.input.queries.clone());
    let output_path = output.unwrap_or_else(|| config.output.path.clone());

    let query_set = QuerySet::from_path(&expand_path(&query_path)?)?;
    tracing::info!("Loaded {} queries from {:?}", query_set.len(), query_path);

    let embedder = Arc::new(FastEmbedder::new(&config.engine.model)?);
    let engine = DensePhraseEngine::from_dump(
        embedder,
        &expand_path(&config.engine.phrase_dump)?,
        hopchain::engine::IndexParams {
            ef_construction: config.engine.hnsw_ef_construction,
            m: config.engine.hnsw_m,
            ef_search: config.engine.hnsw_ef_search,
        },
    )?;

    let runner = BatchRunner::new(Arc::new(engine), &config.retrieval);
    let document = runner.run(query_set.queries())?;

    document.write_json(&expand_path(&output_path)?)?;

    println!("✓ Chain extraction complete");
    println!("  Queries:   {}", document.len());
    println!("  Chains:    {} per query", config.retrieval.n_sel);
    println!("  Output:    {}", output_path.display());

    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            let json = serde_json::to_string_pretty(&config).map_err(|e| HopchainError::Json {
                source: e,
                context: "Failed to serialize config".to_string(),
            })?;
            println!("{}", json);
        }
        ConfigAction::Validate { file } => {
            let path = match file {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
        }
        ConfigAction::Init { force } => {
            let path = Config::default_path()?;

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| HopchainError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            let config = Config::default();
            config.save(&path)?;

            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'hopchain config init' to create one."
        );
        return Ok(Config::default());
    }

    Config::load(&path)
}

fn expand_path(path: &std::path::Path) -> Result<PathBuf> {
    let path_str = path
        .to_str()
        .ok_or_else(|| HopchainError::Config("Invalid path encoding".to_string()))?;

    if let Some(stripped) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| HopchainError::Config("Cannot determine home directory".to_string()))?;
        Ok(home.join(stripped))
    } else {
        Ok(path.to_path_buf())
    }
}
