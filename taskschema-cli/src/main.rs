use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use taskschema::{
    classify, merge_schemas, reset_value, set_field_type, value_path_to_schema_path, FieldType,
    SchemaNode, SchemaPath, SynthesisMode, Synthesizer,
};

mod config;
mod logging;

use config::CliConfig;
use logging::init_logging;

/// Reconcile JSON schemas and synthesize typed values from them
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about)]
struct Cli {
    /// Path to a config file (defaults to ~/.taskschema/config)
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging on stderr
    #[clap(long, short, global = true)]
    verbose: bool,

    /// Pretty-print JSON output
    #[clap(long, global = true, conflicts_with = "compact")]
    pretty: bool,

    /// Print JSON output on a single line
    #[clap(long, global = true)]
    compact: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Print the field type of a node
    Classify {
        #[clap(help = "Schema JSON file")]
        schema: PathBuf,
        #[clap(long, default_value = "", help = "Value key path of the field (root when empty)")]
        path: String,
        #[clap(long, help = "JSON file with the field's current value")]
        value: Option<PathBuf>,
    },

    /// Merge a newer schema revision onto an older one
    Merge {
        #[clap(help = "Old schema JSON file")]
        old: PathBuf,
        #[clap(help = "New schema JSON file")]
        new: PathBuf,
    },

    /// Produce a value shaped like the schema
    Synthesize {
        #[clap(help = "Schema JSON file")]
        schema: PathBuf,
        #[clap(long, help = "nothing, void, type or example (defaults to the configured mode)")]
        mode: Option<SynthesisMode>,
    },

    /// Change the declared type of a field
    SetType {
        #[clap(help = "Schema JSON file")]
        schema: PathBuf,
        #[clap(help = "Value key path of the field, e.g. items.0.name")]
        key_path: String,
        #[clap(help = "New field type, e.g. image or string")]
        field_type: FieldType,
    },

    /// Translate a value key path into a schema key path
    SchemaPath {
        #[clap(help = "Value key path, e.g. items.0.name")]
        key_path: String,
    },

    /// Clear a previously produced value while keeping its keys
    Reset {
        #[clap(help = "Value JSON file")]
        value: PathBuf,
    },

    /// Print the JSON schema of the config file
    ConfigSchema,
}

fn read_json(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing JSON in {}", path.display()))
}

fn read_schema(path: &Path) -> Result<SchemaNode> {
    let value = read_json(path)?;
    SchemaNode::from_value(value)
        .with_context(|| format!("{} is not a JSON schema", path.display()))
}

fn print_json(value: &Value, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", rendered);
    Ok(())
}

fn schema_value(schema: &SchemaNode) -> Result<Value> {
    schema.to_value().context("serializing schema")
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref())?;
    if cli.pretty {
        config = config.with_pretty(true);
    } else if cli.compact {
        config = config.with_pretty(false);
    }

    let log_level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    init_logging(log_level);

    let output = match cli.command {
        Commands::Classify {
            schema,
            path,
            value,
        } => {
            let schema = read_schema(&schema)?;
            let value = value.as_deref().map(read_json).transpose()?;
            let node = schema.node_at(&SchemaPath::from_value_path(&path));
            if node.is_none() {
                tracing::warn!("No schema node at '{}'", path);
            }
            let field_type = classify(node, schema.defs.as_ref(), value.as_ref());
            Value::String(field_type.to_string())
        }
        Commands::Merge { old, new } => {
            let old = read_schema(&old)?;
            let new = read_schema(&new)?;
            let merged = merge_schemas(Some(&old), Some(&new)).context("nothing to merge")?;
            schema_value(&merged)?
        }
        Commands::Synthesize { schema, mode } => {
            let mode = mode.unwrap_or(config.mode);
            let schema = read_schema(&schema)?;
            tracing::debug!("Synthesizing in {} mode", mode);
            let synthesizer = Synthesizer::new(schema.defs.as_ref(), mode).lenient(true);
            synthesizer
                .synthesize(&schema)
                .context("synthesizing value")?
        }
        Commands::SetType {
            schema,
            key_path,
            field_type,
        } => {
            let schema = read_schema(&schema)?;
            schema_value(&set_field_type(&schema, &key_path, field_type))?
        }
        Commands::SchemaPath { key_path } => Value::String(value_path_to_schema_path(&key_path)),
        Commands::Reset { value } => {
            let value = read_json(&value)?;
            reset_value(&value).context("reset expects a JSON object")?
        }
        Commands::ConfigSchema => serde_json::to_value(schemars::schema_for!(CliConfig))
            .context("rendering config schema")?,
    };

    print_json(&output, config.pretty)
}
