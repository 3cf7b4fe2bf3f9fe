//! Data models for the article archive
//!
//! Defines the repository location tuple, the directory entries returned by
//! the contents API, and the annotated [`Article`] records built from them,
//! along with the total order articles are presented in.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::app::filename::{parse_date, parse_sequence_number};
use crate::constants::{archive, repository};

/// Identifies the external content source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepositoryConfig {
    /// Repository owner (user or organisation)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Branch or other git ref to read from
    pub branch: String,
    /// Folder that holds the year directories; empty means the repository root
    pub base_path: String,
    /// When non-empty, the exact folders treated as years
    pub selected_folders: Vec<String>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            owner: repository::DEFAULT_OWNER.to_string(),
            repo: repository::DEFAULT_REPO.to_string(),
            branch: repository::DEFAULT_BRANCH.to_string(),
            base_path: repository::DEFAULT_BASE_PATH.to_string(),
            selected_folders: Vec::new(),
        }
    }
}

impl RepositoryConfig {
    /// Join the base path with a relative path
    ///
    /// A separator is only inserted when both sides are non-empty, so an empty
    /// base path never yields a leading `/` and an empty relative path never
    /// yields a trailing one.
    pub fn resolve_path(&self, path: &str) -> String {
        let base = self.base_path.trim_matches('/');
        let path = path.trim_matches('/');
        match (base.is_empty(), path.is_empty()) {
            (true, _) => path.to_string(),
            (false, true) => base.to_string(),
            (false, false) => format!("{}/{}", base, path),
        }
    }

    /// Apply a partial update on top of this configuration
    pub fn merged(&self, update: &RepositoryUpdate) -> Self {
        Self {
            owner: update.owner.clone().unwrap_or_else(|| self.owner.clone()),
            repo: update.repo.clone().unwrap_or_else(|| self.repo.clone()),
            branch: update.branch.clone().unwrap_or_else(|| self.branch.clone()),
            base_path: update
                .base_path
                .clone()
                .unwrap_or_else(|| self.base_path.clone()),
            selected_folders: update
                .selected_folders
                .clone()
                .unwrap_or_else(|| self.selected_folders.clone()),
        }
    }
}

/// Partial repository configuration; `None` fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepositoryUpdate {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub base_path: Option<String>,
    pub selected_folders: Option<Vec<String>>,
}

impl From<&RepositoryConfig> for RepositoryUpdate {
    fn from(config: &RepositoryConfig) -> Self {
        Self {
            owner: Some(config.owner.clone()),
            repo: Some(config.repo.clone()),
            branch: Some(config.branch.clone()),
            base_path: Some(config.base_path.clone()),
            selected_folders: Some(config.selected_folders.clone()),
        }
    }
}

/// Kind of a directory entry as reported by the contents API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Dir,
    /// Symlinks and submodules; never treated as articles or folders
    #[serde(other)]
    Other,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "download_url", default)]
    pub download_url: Option<String>,
    #[serde(rename = "sha", default)]
    pub content_sha: String,
}

impl DirectoryEntry {
    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Dir
    }

    /// Whether this entry is a markdown file, judged by the literal extension
    pub fn is_article(&self) -> bool {
        self.entry_type == EntryType::File && self.name.ends_with(archive::ARTICLE_EXTENSION)
    }
}

/// A markdown article within a year folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub name: String,
    /// Repository path; stable and unique within a year
    pub path: String,
    pub download_url: String,
    pub size: u64,
    pub date: Option<NaiveDate>,
    pub sequence_number: Option<u32>,
}

impl Article {
    /// Build an article from a listing entry, annotating it from its filename
    pub fn from_entry(entry: &DirectoryEntry) -> Self {
        Self {
            name: entry.name.clone(),
            path: entry.path.clone(),
            download_url: entry.download_url.clone().unwrap_or_default(),
            size: entry.size,
            date: parse_date(&entry.name),
            sequence_number: parse_sequence_number(&entry.name),
        }
    }
}

/// Presentation order for articles within a year
///
/// Rules, first applicable wins: newer dates first; dated before undated;
/// larger sequence numbers first; numbered before unnumbered; filenames in
/// descending order.
pub fn compare_articles(a: &Article, b: &Article) -> Ordering {
    match (a.date, b.date) {
        (Some(da), Some(db)) => return db.cmp(&da),
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        (None, None) => {}
    }

    match (a.sequence_number, b.sequence_number) {
        (Some(na), Some(nb)) => nb.cmp(&na),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.name.cmp(&a.name),
    }
}

/// Sort articles in place by [`compare_articles`]
pub fn sort_articles(articles: &mut [Article]) {
    articles.sort_by(compare_articles);
}
