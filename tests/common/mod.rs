//! Shared fixtures for the integration tests
//!
//! [`FakeSource`] is an in-memory [`ContentSource`] with scripted listings and
//! bodies, per-path failure injection, an optional response delay and call
//! counters.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use archive_fetcher::app::models::EntryType;
use archive_fetcher::app::{
    ArchiveService, CacheConfig, CacheManager, ContentSource, DirectoryEntry, ManualClock,
    RepoConfigStore, RepositoryConfig,
};
use archive_fetcher::errors::{FetchError, FetchResult};

pub const RAW_BASE: &str = "https://raw.example.com";

#[derive(Debug, Default)]
struct State {
    listings: HashMap<String, FetchResult<Vec<DirectoryEntry>>>,
    bodies: HashMap<String, FetchResult<String>>,
    list_calls: HashMap<String, usize>,
    fetch_calls: HashMap<String, usize>,
}

#[derive(Debug, Default)]
pub struct FakeSource {
    state: Mutex<State>,
    delay: Mutex<Option<Duration>>,
}

impl FakeSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every call wait before answering
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn set_listing(&self, path: &str, entries: Vec<DirectoryEntry>) {
        self.state
            .lock()
            .unwrap()
            .listings
            .insert(path.to_string(), Ok(entries));
    }

    pub fn fail_listing(&self, path: &str, error: FetchError) {
        self.state
            .lock()
            .unwrap()
            .listings
            .insert(path.to_string(), Err(error));
    }

    pub fn set_body(&self, url: &str, body: &str) {
        self.state
            .lock()
            .unwrap()
            .bodies
            .insert(url.to_string(), Ok(body.to_string()));
    }

    pub fn fail_body(&self, url: &str, error: FetchError) {
        self.state
            .lock()
            .unwrap()
            .bodies
            .insert(url.to_string(), Err(error));
    }

    pub fn list_calls(&self, path: &str) -> usize {
        *self.state.lock().unwrap().list_calls.get(path).unwrap_or(&0)
    }

    pub fn total_list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls.values().sum()
    }

    pub fn fetch_calls(&self, url: &str) -> usize {
        *self.state.lock().unwrap().fetch_calls.get(url).unwrap_or(&0)
    }

    pub fn total_fetch_calls(&self) -> usize {
        self.state.lock().unwrap().fetch_calls.values().sum()
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ContentSource for FakeSource {
    async fn list_directory(
        &self,
        _repo: &RepositoryConfig,
        path: &str,
    ) -> FetchResult<Vec<DirectoryEntry>> {
        *self
            .state
            .lock()
            .unwrap()
            .list_calls
            .entry(path.to_string())
            .or_default() += 1;
        self.pause().await;

        let scripted = self.state.lock().unwrap().listings.get(path).cloned();
        scripted.unwrap_or_else(|| {
            Err(FetchError::NotFound {
                url: format!("contents/{}", path),
            })
        })
    }

    async fn fetch_raw(&self, download_url: &str) -> FetchResult<String> {
        *self
            .state
            .lock()
            .unwrap()
            .fetch_calls
            .entry(download_url.to_string())
            .or_default() += 1;
        self.pause().await;

        let scripted = self.state.lock().unwrap().bodies.get(download_url).cloned();
        scripted.unwrap_or_else(|| {
            Err(FetchError::NotFound {
                url: download_url.to_string(),
            })
        })
    }
}

pub fn dir(parent: &str, name: &str) -> DirectoryEntry {
    DirectoryEntry {
        name: name.to_string(),
        path: join(parent, name),
        entry_type: EntryType::Dir,
        size: 0,
        download_url: None,
        content_sha: format!("sha-{}", name),
    }
}

pub fn file(parent: &str, name: &str) -> DirectoryEntry {
    let path = join(parent, name);
    DirectoryEntry {
        name: name.to_string(),
        download_url: Some(raw_url(&path)),
        path,
        entry_type: EntryType::File,
        size: 42,
        content_sha: format!("sha-{}", name),
    }
}

pub fn raw_url(path: &str) -> String {
    format!("{}/{}", RAW_BASE, path)
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Service over `source` with default repository settings and a manual clock
pub fn service_with(source: &Arc<FakeSource>, clock: &Arc<ManualClock>) -> ArchiveService {
    service_with_settings(source, clock, RepoConfigStore::default())
}

pub fn service_with_settings(
    source: &Arc<FakeSource>,
    clock: &Arc<ManualClock>,
    settings: RepoConfigStore,
) -> ArchiveService {
    let source: Arc<dyn ContentSource> = source.clone();
    let cache = CacheManager::with_clock(CacheConfig::default(), clock.clone());
    ArchiveService::new(source, Arc::new(settings), Arc::new(cache))
}

/// The default layout: `archive/` with three years and a README
pub fn seed_default_archive(source: &FakeSource) {
    source.set_listing(
        "archive",
        vec![
            dir("archive", "2024"),
            file("archive", "README.md"),
            dir("archive", "2022"),
            dir("archive", "2023"),
        ],
    );
}
