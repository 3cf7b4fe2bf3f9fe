//! Background warming of article bodies around the one being read

use std::collections::HashSet;
use std::sync::MutexGuard;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::app::cache::CacheKey;
use crate::app::models::Article;

use super::ArchiveService;

/// Indices within `window` of `current`, clamped to `0..len`, excluding `current`
pub fn neighbour_indices(len: usize, current: usize, window: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let start = current.saturating_sub(window);
    let end = current.saturating_add(window).min(len - 1);
    (start..=end).filter(|&index| index != current).collect()
}

impl ArchiveService {
    /// Start fetching an article body in the background
    ///
    /// Returns `None` when a preload for the URL is already queued. The task
    /// skips the fetch when the body is validly cached, stores it on success
    /// and only logs failures. Must be called from within a tokio runtime.
    pub fn preload_article_content(&self, download_url: &str) -> Option<JoinHandle<()>> {
        if download_url.is_empty() {
            return None;
        }
        if !self.queued().insert(download_url.to_string()) {
            debug!("Preload already queued: {}", download_url);
            return None;
        }

        let service = self.clone();
        let url = download_url.to_string();
        Some(tokio::spawn(async move {
            let cached = service
                .inner
                .cache
                .get_valid(&CacheKey::content(url.as_str()))
                .await
                .is_some();
            if !cached {
                match service.fetch_content(&url).await {
                    Ok(body) => debug!("Preloaded {} ({} bytes)", url, body.len()),
                    Err(e) => warn!("Preload of {} failed: {}", url, e),
                }
            }
            service.queued().remove(&url);
        }))
    }

    /// Warm the articles within `window_size` of `current_index`
    ///
    /// Returns immediately; the handle resolves once every neighbour has
    /// settled. Nothing is ever reported back to the caller.
    pub fn preload_articles(
        &self,
        articles: &[Article],
        current_index: usize,
        window_size: usize,
    ) -> JoinHandle<()> {
        let handles: Vec<JoinHandle<()>> =
            neighbour_indices(articles.len(), current_index, window_size)
                .into_iter()
                .filter_map(|index| self.preload_article_content(&articles[index].download_url))
                .collect();
        debug!(
            "Preloading {} articles around index {}",
            handles.len(),
            current_index
        );

        tokio::spawn(async move {
            for result in futures::future::join_all(handles).await {
                if let Err(e) = result {
                    warn!("Preload task panicked: {}", e);
                }
            }
        })
    }

    /// Number of preloads scheduled or running
    pub fn queued_preloads(&self) -> usize {
        self.queued().len()
    }

    fn queued(&self) -> MutexGuard<'_, HashSet<String>> {
        self.inner
            .queued
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
