//! CLI definitions for PageLens.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// PageLens CLI.
#[derive(Parser)]
#[command(name = "pagelens")]
#[command(about = "DOM simplification and serialization for LLM browser agents")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.pagelens/config.toml if present)
    #[arg(short, long, global = true, env = "PAGELENS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Serialize a DOM capture and print the result
    Serialize {
        /// Path to the capture JSON file
        capture: PathBuf,

        /// Capture of the previous step, used to mark new elements
        #[arg(short, long)]
        previous: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Disable the bounding box containment filter
        #[arg(long)]
        no_bbox_filter: bool,
    },

    /// Validate the configuration file
    CheckConfig,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Indented text as shown to the model
    Text,
    /// Text plus the selector map as JSON
    Json,
}
