//! Sitesnap main entry point
//!
//! This is the command-line interface for the Sitesnap site renderer.

use clap::Parser;
use sitesnap::config::{
    load_file_config, validate, ColorScheme, CrawlConfig, FileConfig, Media, RenderOptions,
};
use sitesnap::crawler::Coordinator;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sitesnap: render every page of a website
///
/// Sitesnap starts at ROOT_URL, follows every link that stays under it and
/// saves one snapshot per page, grouped by domain, together with a list of
/// all visited URLs.
#[derive(Parser, Debug)]
#[command(name = "sitesnap")]
#[command(version = "1.0.0")]
#[command(about = "Render every page of a website to a snapshot", long_about = None)]
struct Cli {
    /// URL to start from; only links beginning with it are followed
    #[arg(value_name = "ROOT_URL")]
    root_url: String,

    /// Walk the site and print the URLs without saving snapshots
    #[arg(short, long)]
    dry_run: bool,

    /// Print visited/remaining counts and the final URL list
    #[arg(short, long)]
    verbose: bool,

    /// Add a header and footer to each snapshot
    #[arg(short = 'H', long)]
    with_header: bool,

    /// CSS media type to emulate
    #[arg(short, long, value_enum, default_value_t = Media::Print)]
    media: Media,

    /// Color scheme to emulate
    #[arg(short, long, value_enum, default_value_t = ColorScheme::NoPreference)]
    color_scheme: ColorScheme,

    /// Path to a TOML tuning file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory snapshots are written to
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Number of pages rendered at once
    #[arg(short = 'j', long, value_name = "N")]
    concurrency: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Err(e);
        }
    };

    tracing::info!("Root URL: {}", config.root_url);
    if config.dry_run {
        tracing::info!("-- DRY RUN, NOT SAVING ARTIFACTS --");
    }

    match handle_crawl(config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e)
        }
    }
}

/// Sets up the logging/tracing subscriber
///
/// `RUST_LOG` takes precedence over the verbosity flag.
fn setup_logging(verbose: bool) {
    let default = if verbose {
        "sitesnap=debug"
    } else {
        "sitesnap=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Layers command-line flags over the tuning file and validates the result
fn build_config(cli: &Cli) -> Result<CrawlConfig, Box<dyn std::error::Error>> {
    let file = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_file_config(path)?
        }
        None => FileConfig::default(),
    };

    let mut config = CrawlConfig::from_file(cli.root_url.trim(), file);
    config.dry_run = cli.dry_run;
    config.verbose = cli.verbose;
    config.render = RenderOptions {
        with_header: cli.with_header,
        media: cli.media,
        color_scheme: cli.color_scheme,
    };
    if let Some(dir) = &cli.output_dir {
        config.output.output_dir = dir.clone();
    }
    if let Some(n) = cli.concurrency {
        config.crawler.max_concurrent_pages_open = n;
    }

    validate(&config)?;
    Ok(config)
}

/// Handles the main crawl operation
#[cfg(feature = "chromium")]
async fn handle_crawl(config: CrawlConfig) -> Result<(), Box<dyn std::error::Error>> {
    let renderer = sitesnap::render::BrowserRenderer::launch().await?;
    report(Coordinator::new(config, renderer)?.run().await?);
    Ok(())
}

/// Handles the main crawl operation
#[cfg(not(feature = "chromium"))]
async fn handle_crawl(config: CrawlConfig) -> Result<(), Box<dyn std::error::Error>> {
    let renderer = sitesnap::render::HttpRenderer::new()?;
    report(Coordinator::new(config, renderer)?.run().await?);
    Ok(())
}

fn report(report: sitesnap::CrawlReport) {
    tracing::info!("Manifest: {}", report.manifest_path.display());
}
