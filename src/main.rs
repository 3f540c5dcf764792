//! PageLens - DOM simplification and serialization for LLM browser agents
//!
//! Main entry point for the PageLens CLI.

mod cli;

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use clap::Parser;
use serde_json::json;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pagelens_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig, SerializerConfig};
use pagelens_dom::{generate_xpath, DomTree, DomTreeSerializer, SerializedDomState};

use cli::{Cli, Commands, OutputFormat};

/// Initialize tracing.
///
/// Logs go to stderr so the rendering on stdout can be piped.
fn init_tracing(logging: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let json_layer = logging
        .json
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!logging.json).then(|| {
        fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = ConfigLoader::load_or_default(cli.config.as_deref())?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Serialize {
            capture,
            previous,
            format,
            no_bbox_filter,
        } => {
            let validation = ConfigValidator::validate(&config);
            for warning in &validation.warnings {
                warn!("Config {}: {}", warning.path, warning.message);
            }
            if !validation.is_valid() {
                return check_config(&config);
            }

            let mut serializer_config = config.serializer;
            if no_bbox_filter {
                serializer_config.enable_bbox_filtering = false;
            }
            let capture = ConfigLoader::expand_path(&capture);
            let previous = previous.map(|p| ConfigLoader::expand_path(&p));
            serialize(serializer_config, &capture, previous.as_deref(), format)
        }
        Commands::CheckConfig => check_config(&config),
    }
}

/// Serialize one capture and print it.
fn serialize(
    config: SerializerConfig,
    capture: &Path,
    previous: Option<&Path>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let serializer = DomTreeSerializer::new(config);

    let previous_state = match previous {
        Some(path) => {
            debug!("Loading previous capture from {}", path.display());
            Some(serializer.serialize(read_capture(path)?, None))
        }
        None => None,
    };

    let tree = read_capture(capture)?;
    let state = serializer.serialize(tree, previous_state.as_ref());
    info!(
        interactive = state.len(),
        "Serialized {}",
        capture.display()
    );

    match format {
        OutputFormat::Text => println!("{}", state.llm_representation(None)),
        OutputFormat::Json => {
            let output = json!({
                "text": state.llm_representation(None),
                "elements": selector_entries(&state),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn read_capture(path: &Path) -> Result<DomTree, Box<dyn std::error::Error>> {
    let file = File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let tree = DomTree::from_reader(BufReader::new(file))
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(tree)
}

fn selector_entries(state: &SerializedDomState) -> Vec<serde_json::Value> {
    let is_new: HashMap<_, _> = state
        .root
        .iter()
        .flat_map(|root| root.walk())
        .map(|node| (node.node_id, node.is_new))
        .collect();

    state
        .selector_map
        .iter()
        .map(|(index, id)| {
            let node = &state.tree()[id];
            json!({
                "index": index,
                "tag": node.tag_name,
                "backend_node_id": node.backend_node_id,
                "xpath": generate_xpath(state.tree(), id),
                "is_new": is_new.get(&id).copied().unwrap_or(false),
            })
        })
        .collect()
}

/// Print validation results; fails when the config has errors.
fn check_config(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let result = ConfigValidator::validate(config);

    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }
    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }

    if result.is_valid() {
        println!("Configuration OK");
        Ok(())
    } else {
        Err(format!("{} configuration error(s)", result.errors.len()).into())
    }
}
