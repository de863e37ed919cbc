//! The remote side of every operation: the `Backend` trait and the records it exchanges.
//!
//! `GithubClient` talks to the real REST API through octocrab; tests drive the
//! orchestration layer with an in-memory backend instead.

mod client;

pub use client::GithubClient;

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PER_PAGE: usize = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct Org {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repo {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub color: String,
}

impl Label {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: normalize_color(&color.into()),
        }
    }
}

/// GitHub stores colors as six lowercase hex digits without a leading `#`.
pub fn normalize_color(color: &str) -> String {
    color.trim().trim_start_matches('#').to_ascii_lowercase()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub user: Option<Author>,
    #[serde(default)]
    pub labels: Vec<Label>,
    pub html_url: String,
    pub state: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    pub fn author(&self) -> &str {
        self.user.as_ref().map(|u| u.login.as_str()).unwrap_or(GHOST)
    }

    pub fn label_names(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.name.clone()).collect()
    }
}

/// Login GitHub shows for deleted accounts.
pub const GHOST: &str = "ghost";

#[derive(Debug, Clone, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub repository_url: String,
}

impl SearchHit {
    /// Repository name, taken from the trailing segment of `repository_url`.
    pub fn repo_name(&self) -> &str {
        self.repository_url
            .rsplit('/')
            .next()
            .unwrap_or(&self.repository_url)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullSummary {
    pub number: u64,
    pub created_at: DateTime<Utc>,
    pub user: Option<Author>,
}

impl PullSummary {
    pub fn author(&self) -> &str {
        self.user.as_ref().map(|u| u.login.as_str()).unwrap_or(GHOST)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PullStats {
    pub commits: u64,
    pub additions: u64,
    pub deletions: u64,
}

/// Every remote call the orchestration layer makes.
///
/// Paged listings take a 1-based page number and return at most [`PER_PAGE`] items;
/// a short page is the last one.
pub trait Backend {
    async fn organization(&self, org: &str) -> Result<Org>;

    async fn repository(&self, org: &str, repo: &str) -> Result<Repo>;

    async fn repos_page(&self, org: &str, page: u32) -> Result<Vec<Repo>>;

    async fn labels(&self, org: &str, repo: &str) -> Result<Vec<Label>>;

    /// `None` when the repository has no label called `name`.
    async fn label(&self, org: &str, repo: &str, name: &str) -> Result<Option<Label>>;

    async fn create_label(&self, org: &str, repo: &str, name: &str, color: &str) -> Result<Label>;

    async fn update_label(
        &self,
        org: &str,
        repo: &str,
        name: &str,
        new_name: &str,
        color: &str,
    ) -> Result<Label>;

    async fn delete_label(&self, org: &str, repo: &str, name: &str) -> Result<()>;

    async fn issue(&self, org: &str, repo: &str, number: u64) -> Result<Issue>;

    async fn create_issue(&self, org: &str, repo: &str, issue: &NewIssue) -> Result<Issue>;

    async fn close_issue(&self, org: &str, repo: &str, number: u64) -> Result<Issue>;

    async fn comment_issue(&self, org: &str, repo: &str, number: u64, body: &str) -> Result<()>;

    async fn search_issues(&self, query: &str, page: u32) -> Result<Vec<SearchHit>>;

    /// Pull requests in any state, newest created first.
    async fn pulls_page(&self, org: &str, repo: &str, page: u32) -> Result<Vec<PullSummary>>;

    async fn pull_stats(&self, org: &str, repo: &str, number: u64) -> Result<PullStats>;

    /// Closed issues (pull requests included), most recently updated first.
    async fn closed_issues_page(&self, org: &str, repo: &str, page: u32) -> Result<Vec<Issue>>;
}
