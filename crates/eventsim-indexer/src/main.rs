// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Eventsim Indexer CLI
//!
//! Index an eventsim JSON-lines file into an indexing pipeline.
//!
//! # Usage
//!
//! ```bash
//! # Index into the default local pipeline
//! eventsim-indexer --eventsim-json events.json --fusion-pass secret
//!
//! # Several endpoints, no authentication, larger batches
//! eventsim-indexer --eventsim-json events.json \
//!     --fusion http://f1:8764/index,http://f2:8764/index \
//!     --fusion-auth-enabled false --fusion-batch-size 500
//!
//! # Using a configuration file
//! eventsim-indexer --eventsim-json events.json --config indexer.toml
//!
//! # Map and batch without sending anything
//! eventsim-indexer --eventsim-json events.json --fusion-auth-enabled false --dry-run
//! ```

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand};
use eventsim_indexer::config::parse_endpoints;
use eventsim_indexer::{
    CancellationToken, HttpTransportFactory, JobStats, JsonLinesSource, MemoryFactory,
    PartitionRunner, PipelineConfig,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "eventsim-indexer")]
#[command(author = "naskel.com")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Index eventsim activity logs into a search indexing pipeline")]
#[command(subcommand_negates_reqs = true)]
struct Cli {
    /// Path to an eventsim JSON file (one event per line)
    #[arg(long, alias = "eventsimJson", value_name = "FILE", required = true)]
    eventsim_json: Option<PathBuf>,

    /// Configuration file (TOML); command-line options take precedence
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Indexing pipeline endpoint(s), comma-separated
    #[arg(long, value_name = "URL(s)")]
    fusion: Option<String>,

    /// Username [default: admin]
    #[arg(long, alias = "fusionUser", value_name = "USERNAME")]
    fusion_user: Option<String>,

    /// Password; required when authentication is enabled
    #[arg(long, alias = "fusionPass", value_name = "PASSWORD")]
    fusion_pass: Option<String>,

    /// Security realm [default: native]
    #[arg(long, alias = "fusionRealm", value_name = "REALM")]
    fusion_realm: Option<String>,

    /// Authentication enabled [default: true]
    #[arg(long, alias = "fusionAuthEnabled", value_name = "true|false")]
    #[arg(value_parser = BoolishValueParser::new())]
    fusion_auth_enabled: Option<bool>,

    /// Documents per batch [default: 100]
    #[arg(long, alias = "fusionBatchSize", value_name = "INT")]
    fusion_batch_size: Option<usize>,

    /// HTTP request timeout in seconds [default: 60]
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Number of parallel partitions [default: available CPUs]
    #[arg(short, long)]
    partitions: Option<usize>,

    /// Map and batch without posting to the pipeline
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an example configuration file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "indexer.toml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(format!("eventsim_indexer={}", cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("eventsim_indexer=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Some(Commands::GenConfig { output }) = &cli.command {
        return cmd_gen_config(output);
    }

    let config = build_config(&cli)?;
    config.validate().context("invalid configuration")?;

    let events = cli
        .eventsim_json
        .as_ref()
        .context("--eventsim-json is required")?;
    let source = JsonLinesSource::from_path(events)
        .with_context(|| format!("failed to load {}", events.display()))?;

    let partitions = cli.partitions.unwrap_or_else(default_partitions);
    let parts = source.partitions(partitions);
    tracing::info!(
        "loaded {} events ({} fields) from {}, {} partitions",
        source.len(),
        source.schema().len(),
        events.display(),
        parts.len()
    );

    let token = CancellationToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || {
        tracing::warn!("interrupted, finishing in-flight batches");
        handler_token.cancel();
    })
    .context("failed to install Ctrl+C handler")?;

    let runner = PartitionRunner::new(&config).with_cancellation(token);
    let stats = if cli.dry_run {
        let factory = MemoryFactory::new();
        let stats = runner.run(&parts, &factory)?;
        tracing::info!("dry run: {} batches prepared, nothing sent", factory.batch_sizes().len());
        stats
    } else {
        runner.run(&parts, &HttpTransportFactory::new(&config))?
    };

    print_stats(&stats);
    Ok(())
}

fn build_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_toml(
            &std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
        )?,
        None => PipelineConfig::default(),
    };

    if let Some(endpoints) = &cli.fusion {
        config.endpoints = parse_endpoints(endpoints);
    }
    if let Some(user) = &cli.fusion_user {
        config.username = user.clone();
    }
    if let Some(pass) = &cli.fusion_pass {
        config.password = Some(pass.clone());
    }
    if let Some(realm) = &cli.fusion_realm {
        config.realm = realm.clone();
    }
    if let Some(enabled) = cli.fusion_auth_enabled {
        config.auth_enabled = enabled;
    }
    if let Some(size) = cli.fusion_batch_size {
        config.batch_size = size;
    }
    if let Some(timeout) = cli.timeout {
        config.request_timeout_secs = timeout;
    }

    Ok(config)
}

fn default_partitions() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn cmd_gen_config(output: &Path) -> Result<()> {
    let config = PipelineConfig {
        endpoints: vec![
            "http://fusion-1:8764/api/apollo/index-pipelines/eventsim-default/collections/eventsim/index".into(),
            "http://fusion-2:8764/api/apollo/index-pipelines/eventsim-default/collections/eventsim/index".into(),
        ],
        password: Some("change-me".into()),
        ..Default::default()
    };

    let toml_str = toml::to_string_pretty(&config)?;
    let content = format!(
        r#"# Eventsim Indexer Configuration
# Generated by eventsim-indexer gen-config

{}
"#,
        toml_str
    );

    std::fs::write(output, content)?;
    println!("Generated configuration file: {}", output.display());
    Ok(())
}

fn print_stats(stats: &JobStats) {
    println!("--- Indexing Summary ---");
    println!("  Partitions:     {}", stats.partitions);
    println!("  Rows read:      {}", stats.totals.rows_read);
    println!("  Rows skipped:   {}", stats.totals.rows_skipped);
    println!("  Documents sent: {}", stats.totals.documents_posted);
    println!("  Batches sent:   {}", stats.totals.batches_posted);
    if stats.cancelled {
        println!("  (cancelled before the input was exhausted)");
    }
}
