//! hephora_docgen CLI
//!
//! Usage:
//!   hephora_docgen generate                       # every family
//!   hephora_docgen generate --family design --family class-diagrams
//!   hephora_docgen --snapshot graph.json generate # offline, from a snapshot
//!   hephora_docgen export-snapshot graph.json
//!   hephora_docgen bootstrap

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use hephora_docgen::{
    DocFamily, DocGenerator, DocgenConfig, HandlebarsRenderer, HttpNodeRepository,
    InMemoryRepository, NodeRepository, Snapshot,
};

#[derive(Parser, Debug)]
#[command(name = "hephora_docgen")]
#[command(version)]
#[command(about = "Generate Sphinx pages and diagrams from a Hephora node graph")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML configuration file
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Node service base URL (overrides config and HEPHORA_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Read nodes from a JSON snapshot instead of the node service
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Sphinx source directory (overrides config and HEPHORA_DOCS_DIR)
    #[arg(long, global = true)]
    docs_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate documents (all families unless --family is given)
    Generate {
        #[arg(long = "family", short = 'f', value_enum)]
        families: Vec<DocFamily>,
    },

    /// Write the Sphinx skeleton only
    Bootstrap,

    /// Fetch every node and write it as a JSON snapshot
    ExportSnapshot {
        /// Output file
        path: PathBuf,
    },
}

fn load_config(cli: &Cli) -> Result<DocgenConfig> {
    let mut config = DocgenConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(url) = &cli.base_url {
        config.base_url = url.clone();
    }
    if let Some(dir) = &cli.docs_dir {
        config.docs_dir = dir.clone();
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn repository(cli: &Cli, config: &DocgenConfig) -> Result<Box<dyn NodeRepository>> {
    match &cli.snapshot {
        Some(path) => {
            let snapshot = Snapshot::load(path)
                .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
            info!("Using snapshot {} ({} nodes)", path.display(), snapshot.nodes.len());
            Ok(Box::new(InMemoryRepository::from_snapshot(snapshot)))
        }
        None => {
            let repo = HttpNodeRepository::new(&config.base_url, config.token.clone(), config.timeout())
                .context("Failed to create node service client")?;
            info!("Using node service at {}", repo.base_url());
            Ok(Box::new(repo))
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let config = load_config(&cli)?;
    let renderer = HandlebarsRenderer::with_overrides(config.templates_dir.as_deref())
        .context("Failed to load templates")?;
    let repository = repository(&cli, &config)?;
    let generator = DocGenerator::new(config, repository, Box::new(renderer));

    match cli.command {
        Commands::Generate { families } => {
            let families = if families.is_empty() {
                DocFamily::ALL.to_vec()
            } else {
                families
            };
            let report = generator.run(&families).await.context("Generation failed")?;

            for family in &report.families {
                match &family.error {
                    None => println!("{:<16} {} files", family.family.to_string(), family.written.len()),
                    Some(e) => println!("{:<16} FAILED: {}", family.family.to_string(), e),
                }
            }
            Ok(!report.has_failures())
        }
        Commands::Bootstrap => {
            generator.bootstrap().context("Bootstrap failed")?;
            println!("Skeleton written to {}", generator.config().docs_dir.display());
            Ok(true)
        }
        Commands::ExportSnapshot { path } => {
            let count = generator
                .export_snapshot(&path)
                .await
                .with_context(|| format!("Failed to export snapshot to {}", path.display()))?;
            println!("Exported {} nodes to {}", count, path.display());
            Ok(true)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hephora_docgen=info")),
        )
        .init();

    match run(Cli::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
