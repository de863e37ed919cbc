//! `GitHubMux` runs one operation across every eligible repository of an organization.
//!
//! Repositories are processed one at a time, in the order the API lists them. Any
//! backend failure other than an expected "not found" aborts the whole operation;
//! changes already made remotely stay in place.

mod issues;
mod labels;
mod stats;

#[cfg(test)]
pub(crate) mod fake;

pub use issues::{MovedIssue, SpreadOutcome};
#[cfg(test)]
pub use issues::IssueRef;
pub use labels::{LabelChange, LabelOutcome};
pub use stats::{Counters, StatsReport};

use crate::display;
use crate::error::Result;
use crate::github::{Backend, Repo, PER_PAGE};
use std::collections::VecDeque;
use tracing::debug;

/// Repository names an operation must never touch. Keeps insertion order, no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludeSet {
    names: Vec<String>,
}

impl ExcludeSet {
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// A copy of this set that also excludes `name`.
    pub fn with(&self, name: &str) -> Self {
        let mut extended = self.clone();
        extended.insert(name);
        extended
    }

    fn insert(&mut self, name: &str) {
        if !self.contains(name) {
            self.names.push(name.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ExcludeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = ExcludeSet::default();
        for name in iter {
            set.insert(&name.into());
        }
        set
    }
}

pub struct GitHubMux<B> {
    backend: B,
    org: String,
    exclude: ExcludeSet,
}

impl<B: Backend> GitHubMux<B> {
    /// Resolves the organization up front so a typo fails before any work starts.
    pub async fn connect(backend: B, organization: &str, exclude: ExcludeSet) -> Result<Self> {
        let org = backend.organization(organization).await?;
        debug!(org = %org.login, excluded = exclude.len(), "connected");
        Ok(Self {
            backend,
            org: org.login,
            exclude,
        })
    }

    #[cfg(test)]
    pub(crate) fn exclude(&self) -> &ExcludeSet {
        &self.exclude
    }

    #[cfg(test)]
    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }

    /// Starts a fresh walk over the organization's repositories, skipping `exclude`.
    pub fn repos<'a>(&'a self, exclude: &'a ExcludeSet) -> RepoWalk<'a, B> {
        RepoWalk {
            backend: &self.backend,
            org: &self.org,
            exclude,
            page: 1,
            buffer: VecDeque::new(),
            done: false,
        }
    }
}

/// Lazily pages through an organization's repositories, one API page at a time.
pub struct RepoWalk<'a, B> {
    backend: &'a B,
    org: &'a str,
    exclude: &'a ExcludeSet,
    page: u32,
    buffer: VecDeque<Repo>,
    done: bool,
}

impl<B: Backend> RepoWalk<'_, B> {
    pub async fn next(&mut self) -> Result<Option<Repo>> {
        loop {
            if let Some(repo) = self.buffer.pop_front() {
                if self.exclude.contains(&repo.name) {
                    display::skipped(&format!("Skipping repo `{}`.", repo.name));
                    continue;
                }
                debug!(repo = %repo.name, "repository selected");
                return Ok(Some(repo));
            }
            if self.done {
                return Ok(None);
            }
            let page = self.backend.repos_page(self.org, self.page).await?;
            self.page += 1;
            if page.len() < PER_PAGE {
                self.done = true;
            }
            self.buffer.extend(page);
        }
    }
}
