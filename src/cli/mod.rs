//! Command-line interface for h5pscan.
//!
//! Provides commands for extracting content type data, counting content
//! types, finding nodes that include a type, and inspecting the registry and
//! configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters;
use crate::config::{self, Overrides, ResolvedConfig};
use crate::core::{collect_types_data, containing_nodes, count_types, Extractor};
use crate::domain::ContentRecord;
use crate::report::{self, OutputFormat};

/// h5pscan - H5P content type inventory
#[derive(Parser, Debug)]
#[command(name = "h5pscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// SQLite database holding node, h5p_nodes and h5p_libraries
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Glob of JSONL content dumps (takes precedence over --database)
    #[arg(long, global = true)]
    pub dump: Option<String>,

    /// Directory for report files
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Maximum container nesting depth
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract parameters of every content type version in use
    TypesData,

    /// Count content types, embedded ones included
    TypeCounts {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },

    /// List nodes that include a content type (looks inside H5P.Column)
    NodesIncluding {
        /// Content type machine name (e.g. H5P.QuestionSet)
        machine_name: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },

    /// Show registered container types and their rules
    Registry,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let cfg = config::config()?.clone().with_overrides(&self.overrides());

        match self.command {
            Commands::TypesData => types_data(&cfg).await,
            Commands::TypeCounts { format } => type_counts(&cfg, format).await,
            Commands::NodesIncluding {
                machine_name,
                format,
            } => nodes_including(&cfg, &machine_name, format).await,
            Commands::Registry => show_registry(&cfg),
            Commands::Config => show_config(&cfg),
        }
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            database: self.database.clone(),
            dump: self.dump.clone(),
            output_dir: self.output_dir.clone(),
            max_depth: self.max_depth,
        }
    }
}

/// Fetch all records from the configured source
fn fetch_records(cfg: &ResolvedConfig) -> Result<Vec<ContentRecord>> {
    let spec = cfg.require_source()?;
    let source = adapters::open(&spec)?;
    let records = source
        .fetch()
        .with_context(|| format!("Failed to fetch content from {}", source.name()))?;

    if records.is_empty() {
        tracing::warn!(source = %spec, "Source returned no H5P content");
    }
    println!("Number of nodes: {}", records.len());
    Ok(records)
}

/// Extract the first-seen parameters of every library version
async fn types_data(cfg: &ResolvedConfig) -> Result<()> {
    let registry = cfg.registry()?;
    let extractor = Extractor::new(&registry).with_limits(cfg.limits);
    let records = fetch_records(cfg)?;

    let store = collect_types_data(&records, &extractor)?;
    let path = report::write_types_data(&cfg.output_dir, &store).await?;

    println!("Libraries: {}", store.len());
    println!("Digest:    {}", store.digest()?);
    println!("Result written to {}", path.display());
    Ok(())
}

/// Count content types across all records
async fn type_counts(cfg: &ResolvedConfig, format: OutputFormat) -> Result<()> {
    let registry = cfg.registry()?;
    let extractor = Extractor::new(&registry).with_limits(cfg.limits);
    let records = fetch_records(cfg)?;

    let counter = count_types(&records, &extractor)?;
    let path = report::write_type_counts(&cfg.output_dir, &counter, format).await?;

    println!("Result written to {}", path.display());
    Ok(())
}

/// List nodes containing a content type
async fn nodes_including(cfg: &ResolvedConfig, machine_name: &str, format: OutputFormat) -> Result<()> {
    if machine_name.trim().is_empty() {
        anyhow::bail!("H5P content type machine name not provided");
    }

    let registry = cfg.registry()?;
    let records = fetch_records(cfg)?;

    let matches = containing_nodes(&records, machine_name, &registry)?;
    let path = report::write_node_matches(&cfg.output_dir, &matches, format).await?;

    println!("Matching nodes: {}", matches.len());
    println!("Result written to {}", path.display());
    Ok(())
}

/// Show the registry; fails if a flagged container has no rules
fn show_registry(cfg: &ResolvedConfig) -> Result<()> {
    let registry = cfg.registry()?;

    println!("Registered container types ({}):", registry.len());
    for (container, rules) in registry.iter() {
        println!("  {}", container);
        for rule in rules {
            println!("    - {}", rule.path);
        }
    }

    let gaps = registry.gaps();
    if !gaps.is_empty() {
        anyhow::bail!("Container types without extraction rules: {}", gaps.join(", "));
    }
    Ok(())
}

/// Show resolved configuration
fn show_config(cfg: &ResolvedConfig) -> Result<()> {
    println!("h5pscan configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Source:");
    match cfg.source() {
        Some(spec) => println!("  {}", spec),
        None => println!("  (not configured)"),
    }
    println!();
    println!("Output directory: {}", cfg.output_dir.display());
    println!("Max depth:        {}", cfg.limits.max_depth);
    println!();
    println!("Extra container rules:");
    if cfg.extra_rules.is_empty() {
        println!("  (none)");
    } else {
        for (container, paths) in &cfg.extra_rules {
            println!("  {}: {}", container, paths.join(", "));
        }
    }

    Ok(())
}
