//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "hopchain",
    version,
    about = "Multi-hop evidence-chain extraction over dense phrase retrieval",
    long_about = "Hopchain retrieves candidate phrases for each question, re-queries with every \
                  candidate prepended to the question, and combines the hop scores to select \
                  the best two-hop evidence chains per question."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/hopchain/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run chain extraction over a batch of questions
    Run {
        /// Query list file (JSON array or one question per line)
        #[arg(short, long)]
        queries: Option<PathBuf>,

        /// Output path for the chain document
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Candidates retained per hop
        #[arg(long, value_name = "N")]
        top_k: Option<usize>,

        /// Chains returned per question
        #[arg(long, value_name = "N")]
        n_sel: Option<usize>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
