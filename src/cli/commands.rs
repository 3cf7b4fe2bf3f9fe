//! Command handlers for Archive Fetcher CLI
//!
//! This module implements the command handlers that connect CLI arguments to
//! the content service.

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, info, warn};

use crate::app::models::{Article, RepositoryConfig, RepositoryUpdate};
use crate::app::{
    display_title, parse_github_url, settings, ArchiveService, CacheManager, GitHubClient,
    RepoConfigStore,
};
use crate::cli::{ConfigAction, ConfigArgs, ReadArgs, RepositoryArgs};
use crate::config::AppConfig;

/// Everything a command needs: the loaded configuration and a ready service
pub struct AppContext {
    pub config: AppConfig,
    pub service: ArchiveService,
}

impl AppContext {
    /// Open the repository overrides and build the service
    ///
    /// `config_path` is the configuration file in use, if one was given; the
    /// overrides file lives next to it.
    pub async fn build(config: AppConfig, config_path: Option<&Path>) -> Result<Self> {
        let settings = match AppConfig::repository_overrides_path(config_path) {
            Ok(path) => RepoConfigStore::open(&path, config.repository.clone())
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
            Err(e) => {
                warn!("Repository changes will not be saved: {}", e);
                RepoConfigStore::in_memory(config.repository.clone())
            }
        };

        let client = GitHubClient::new(&config.client.clone().with_token_from_env())
            .context("Failed to create GitHub client")?;

        let service = ArchiveService::with_prefetch_window(
            Arc::new(client),
            Arc::new(settings),
            Arc::new(CacheManager::new(config.cache.clone())),
            config.prefetch.window,
        );

        Ok(Self { config, service })
    }
}

/// Handle the years command
pub async fn handle_years(ctx: &AppContext) -> Result<()> {
    let years = ctx.service.get_year_folders().await?;
    if years.is_empty() {
        println!("No year folders found");
        return Ok(());
    }

    let default_year = ctx.service.get_default_year(&years);
    for year in &years {
        let marker = if *year == default_year { "*" } else { " " };
        println!("{} {}", marker, year);
    }
    Ok(())
}

/// Handle the articles command
pub async fn handle_articles(ctx: &AppContext, year: &str) -> Result<()> {
    let articles = ctx.service.get_articles_by_year(year).await?;
    if articles.is_empty() {
        println!("No articles found for {}", year);
        return Ok(());
    }

    for (position, article) in articles.iter().enumerate() {
        println!("{}", format_listing_line(position + 1, article));
    }
    Ok(())
}

/// Handle the read command
///
/// Neighbouring articles are warmed while the selected one is fetched.
pub async fn handle_read(ctx: &AppContext, args: ReadArgs) -> Result<()> {
    let year = match args.year {
        Some(year) => year,
        None => {
            let years = ctx.service.get_year_folders().await?;
            ctx.service.get_default_year(&years)
        }
    };

    let articles = ctx.service.get_articles_by_year(&year).await?;
    if articles.is_empty() {
        bail!("No articles found for {}", year);
    }

    let index = select_article(&ctx.service, &articles, args.index, args.name.as_deref())?;
    let article = &articles[index];
    info!("Reading {} ({}/{})", article.name, index + 1, articles.len());

    let prefetch = if args.no_prefetch {
        None
    } else {
        Some(
            ctx.service
                .preload_articles(&articles, index, ctx.service.prefetch_window()),
        )
    };

    let content = ctx.service.get_article_content(&article.download_url).await?;
    println!("{}", content);

    if let Some(handle) = prefetch {
        if let Err(e) = handle.await {
            debug!("Prefetch task ended abnormally: {}", e);
        }
    }
    Ok(())
}

/// Handle the folders command
pub async fn handle_folders(ctx: &AppContext) -> Result<()> {
    let folders = ctx.service.get_all_folders().await?;
    let selected = ctx.service.settings().get_config().selected_folders;
    for folder in folders {
        let marker = if selected.contains(&folder) { "*" } else { " " };
        println!("{} {}", marker, folder);
    }
    Ok(())
}

/// Handle the config command
pub async fn handle_config(ctx: &AppContext, args: ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Show => show_config(ctx),
        ConfigAction::Set(repository) => {
            if repository.is_empty() {
                bail!("Nothing to change; pass --url or at least one field");
            }
            let update = repository_update(repository)?;
            let config = ctx.service.update_repository(&update).await?;
            println!("Repository set to {}", describe(&config));
            Ok(())
        }
        ConfigAction::Reset => {
            let config = ctx.service.reset_repository().await?;
            println!("Repository reset to {}", describe(&config));
            Ok(())
        }
        ConfigAction::Test(repository) => {
            let update = repository_update(repository)?;
            let candidate = ctx.service.settings().get_config().merged(&update);
            if ctx.service.test_repo_connection(&candidate).await {
                println!("OK: {}", describe(&candidate));
                Ok(())
            } else {
                Err(anyhow!("Cannot list {}", describe(&candidate)))
            }
        }
        ConfigAction::Validate => {
            let active = RepositoryUpdate::from(&ctx.service.settings().get_config());
            let mut errors = ctx.config.validate();
            errors.extend(settings::validate(&active));
            if errors.is_empty() {
                println!("Configuration is valid");
                Ok(())
            } else {
                for error in &errors {
                    println!("  - {}", error);
                }
                bail!("{} configuration problem(s) found", errors.len())
            }
        }
    }
}

fn show_config(ctx: &AppContext) -> Result<()> {
    let settings = ctx.service.settings();
    let config = settings.get_config();

    println!("Repository:  {}", describe(&config));
    if !config.selected_folders.is_empty() {
        println!("Folders:     {}", config.selected_folders.join(", "));
    }
    match settings.path() {
        Some(path) => println!("Overrides:   {}", path.display()),
        None => println!("Overrides:   (not persisted)"),
    }
    println!();
    print!("{}", ctx.config.to_toml()?);
    Ok(())
}

fn repository_update(args: RepositoryArgs) -> Result<RepositoryUpdate> {
    let from_url = args.url.as_deref().map(parse_github_url).transpose()?;
    Ok(args.into_update(from_url))
}

fn describe(config: &RepositoryConfig) -> String {
    let base = if config.base_path.is_empty() {
        "/".to_string()
    } else {
        config.base_path.clone()
    };
    format!("{}/{}@{} {}", config.owner, config.repo, config.branch, base)
}

/// Pick the article to read: by position, by name, today's, or the first
fn select_article(
    service: &ArchiveService,
    articles: &[Article],
    index: Option<usize>,
    name: Option<&str>,
) -> Result<usize> {
    if let Some(position) = index {
        if position == 0 || position > articles.len() {
            bail!(
                "Index {} is out of range (1-{})",
                position,
                articles.len()
            );
        }
        return Ok(position - 1);
    }

    if let Some(name) = name {
        return articles
            .iter()
            .position(|article| article.name == name)
            .ok_or_else(|| anyhow!("No article named {}", name));
    }

    Ok(service
        .find_article_by_current_date(articles)
        .and_then(|found| articles.iter().position(|article| article.path == found.path))
        .unwrap_or(0))
}

fn format_listing_line(position: usize, article: &Article) -> String {
    let date = article
        .date
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    format!(
        "{:>3}. {:<10}  {}",
        position,
        date,
        display_title(&article.name)
    )
}
