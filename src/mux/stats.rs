use crate::error::Result;
use crate::github::{Backend, PullStats, PER_PAGE};
use crate::mux::GitHubMux;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::AddAssign;
use tracing::debug;

/// Running totals for a set of pull requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub count: u64,
    pub commits: u64,
    pub additions: u64,
    pub deletions: u64,
}

impl Counters {
    pub fn add_pull(&mut self, pull: &PullStats) {
        self.count += 1;
        self.commits += pull.commits;
        self.additions += pull.additions;
        self.deletions += pull.deletions;
    }
}

impl AddAssign for Counters {
    fn add_assign(&mut self, other: Self) {
        self.count += other.count;
        self.commits += other.commits;
        self.additions += other.additions;
        self.deletions += other.deletions;
    }
}

impl<'a> std::iter::Sum<&'a Counters> for Counters {
    fn sum<I: Iterator<Item = &'a Counters>>(iter: I) -> Self {
        let mut total = Counters::default();
        for c in iter {
            total += *c;
        }
        total
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct PrStats {
    /// repo -> author -> counters
    pub detail: BTreeMap<String, BTreeMap<String, Counters>>,
    /// author -> counters, across all repos
    pub users: BTreeMap<String, Counters>,
    /// repo -> counters; every visited repo is present, even with nothing in the window
    pub repos: BTreeMap<String, Counters>,
}

impl PrStats {
    fn visit(&mut self, repo: &str) {
        self.repos.entry(repo.to_string()).or_default();
    }

    fn record(&mut self, repo: &str, user: &str, pull: &PullStats) {
        let targets = [
            self.detail
                .entry(repo.to_string())
                .or_default()
                .entry(user.to_string())
                .or_default(),
            self.users.entry(user.to_string()).or_default(),
            self.repos.entry(repo.to_string()).or_default(),
        ];
        for counters in targets {
            counters.add_pull(pull);
        }
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct IssueStats {
    /// repo -> issues closed within the window
    pub closed: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub days: u32,
    pub since: DateTime<Utc>,
    pub pulls: PrStats,
    pub issues: IssueStats,
}

pub fn cutoff(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(days))
}

impl<B: Backend> GitHubMux<B> {
    /// Counts pull requests created at or after `since`.
    ///
    /// The listing is sorted newest first, so a repo stops being scanned at the first
    /// older pull request.
    pub async fn pr_stats(&self, since: DateTime<Utc>) -> Result<PrStats> {
        let mut stats = PrStats::default();
        let mut repos = self.repos(&self.exclude);
        while let Some(repo) = repos.next().await? {
            stats.visit(&repo.name);
            let mut page = 1u32;
            'pages: loop {
                let pulls = self.backend.pulls_page(&self.org, &repo.name, page).await?;
                for pull in &pulls {
                    if pull.created_at < since {
                        debug!(repo = %repo.name, number = pull.number, "left the window");
                        break 'pages;
                    }
                    let detail = self
                        .backend
                        .pull_stats(&self.org, &repo.name, pull.number)
                        .await?;
                    stats.record(&repo.name, pull.author(), &detail);
                }
                if pulls.len() < PER_PAGE {
                    break;
                }
                page += 1;
            }
        }
        Ok(stats)
    }

    /// Counts issues closed (last updated) at or after `since`. Pull requests,
    /// which GitHub lists alongside issues, are not counted.
    pub async fn issue_stats(&self, since: DateTime<Utc>) -> Result<IssueStats> {
        let mut stats = IssueStats::default();
        let mut repos = self.repos(&self.exclude);
        while let Some(repo) = repos.next().await? {
            let closed = stats.closed.entry(repo.name.clone()).or_default();
            let mut page = 1u32;
            'pages: loop {
                let issues = self
                    .backend
                    .closed_issues_page(&self.org, &repo.name, page)
                    .await?;
                for issue in &issues {
                    if issue.updated_at < since {
                        debug!(repo = %repo.name, number = issue.number, "left the window");
                        break 'pages;
                    }
                    if issue.pull_request.is_none() {
                        *closed += 1;
                    }
                }
                if issues.len() < PER_PAGE {
                    break;
                }
                page += 1;
            }
        }
        Ok(stats)
    }

    /// Pull request and closed issue stats for the last `days` days. Both scans share
    /// the cutoff reported in `StatsReport::since`.
    pub async fn stats(&self, days: u32) -> Result<StatsReport> {
        self.stats_at(Utc::now(), days).await
    }

    async fn stats_at(&self, now: DateTime<Utc>, days: u32) -> Result<StatsReport> {
        let since = cutoff(now, days);
        debug!(days, %since, "gathering stats");
        let pulls = self.pr_stats(since).await?;
        let issues = self.issue_stats(since).await?;
        Ok(StatsReport {
            days,
            since,
            pulls,
            issues,
        })
    }
}
