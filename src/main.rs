//! Archive Fetcher CLI application
//!
//! Command-line interface for browsing and reading a GitHub-hosted archive of
//! dated markdown articles.

use std::process;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

// Import CLI modules through the library (module is public but not re-exported)
use archive_fetcher::cli::{
    handle_articles, handle_config, handle_folders, handle_read, handle_years, AppContext, Cli,
    Commands,
};
use archive_fetcher::config::AppConfig;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();
    let config_path = cli.global.config.as_deref();
    let config = AppConfig::load(config_path)
        .await
        .context("Failed to load configuration")?;

    init_logging(&cli, &config.logging.level);

    info!("Archive Fetcher v{} starting", env!("CARGO_PKG_VERSION"));

    let ctx = AppContext::build(config, config_path).await?;

    match cli.command {
        Commands::Years => handle_years(&ctx).await,
        Commands::Articles { year } => handle_articles(&ctx, &year).await,
        Commands::Read(args) => handle_read(&ctx, args).await,
        Commands::Folders => handle_folders(&ctx).await,
        Commands::Config(args) => handle_config(&ctx, args).await,
    }
}

/// Initialize logging from the CLI verbosity flags, else the configured level
fn init_logging(cli: &Cli, configured_level: &str) {
    let level = cli
        .log_level()
        .map(|level| level.to_string().to_lowercase())
        .unwrap_or_else(|| configured_level.to_string());

    let filter = EnvFilter::from_default_env();
    let filter = match format!("archive_fetcher={}", level).parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => {
            eprintln!("Ignoring unknown log level '{}'", level);
            filter.add_directive(LevelFilter::WARN.into())
        }
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .with_writer(std::io::stderr)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
