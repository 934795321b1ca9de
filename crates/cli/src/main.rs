use agentscan_registry::{discover, BuildManifest, DiscoveryConfig};
use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agentscan")]
#[command(about = "Discover agents and evals and print their build manifest", long_about = None)]
#[command(version)]
struct Cli {
    /// Project root
    root: PathBuf,

    /// Project id every identifier is scoped to
    #[arg(long, env = "AGENTSCAN_PROJECT_ID")]
    project_id: String,

    /// Deployment id build identifiers are scoped to
    #[arg(long, env = "AGENTSCAN_DEPLOYMENT_ID")]
    deployment_id: String,

    /// Discovery config (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pretty-print the manifest
    #[arg(long)]
    pretty: bool,

    /// Enable verbose logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // the directory walker logs every ignore file it reads
    if !cli.verbose {
        builder.filter_module("ignore", log::LevelFilter::Warn);
        builder.filter_module("globset", log::LevelFilter::Warn);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = match &cli.config {
        Some(path) => DiscoveryConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DiscoveryConfig::default(),
    }
    .with_env_overrides();

    let report = discover(&cli.root, &cli.project_id, &cli.deployment_id, &config)
        .await
        .with_context(|| format!("Discovery failed for {}", cli.root.display()))?;
    if !report.skipped.is_empty() {
        log::info!("{} files skipped, see warnings above", report.skipped.len());
    }

    let manifest = BuildManifest::from_registry(&report.registry);
    let json = manifest
        .to_json(cli.pretty)
        .context("Failed to serialize manifest")?;
    println!("{json}");

    Ok(())
}
