//! In-memory organization used by the orchestration tests.

use crate::error::{GhToolsError, Result};
use crate::github::{
    Backend, Issue, Label, NewIssue, Org, PullStats, PullSummary, Repo, SearchHit, PER_PAGE,
};
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FakeRepo {
    pub name: String,
    pub labels: Vec<Label>,
    pub issues: Vec<Issue>,
    pub pulls: Vec<(PullSummary, PullStats)>,
    pub comments: Vec<(u64, String)>,
}

#[derive(Debug, Default)]
struct State {
    repos: Vec<FakeRepo>,
    mutations: Vec<String>,
    repo_pages_fetched: usize,
    pull_pages_fetched: usize,
    closed_issue_pages_fetched: usize,
}

pub struct FakeBackend {
    org: String,
    state: Mutex<State>,
    pull_latency: Option<Duration>,
}

fn page_of<T: Clone>(items: &[T], page: u32) -> Vec<T> {
    items
        .iter()
        .skip((page as usize - 1) * PER_PAGE)
        .take(PER_PAGE)
        .cloned()
        .collect()
}

pub fn issue(org: &str, repo: &str, number: u64, title: &str, author: &str) -> Issue {
    Issue {
        number,
        title: title.to_string(),
        body: Some(String::new()),
        user: Some(crate::github::Author {
            login: author.to_string(),
        }),
        labels: Vec::new(),
        html_url: format!("https://github.com/{org}/{repo}/issues/{number}"),
        state: "open".to_string(),
        updated_at: Utc::now(),
        pull_request: None,
    }
}

impl FakeBackend {
    pub fn new(org: &str) -> Self {
        Self {
            org: org.to_string(),
            state: Mutex::new(State::default()),
            pull_latency: None,
        }
    }

    pub fn with_repo(self, name: &str) -> Self {
        self.with_labels(name, &[])
    }

    pub fn with_labels(self, name: &str, labels: &[(&str, &str)]) -> Self {
        self.state.lock().unwrap().repos.push(FakeRepo {
            name: name.to_string(),
            labels: labels.iter().map(|(n, c)| Label::new(*n, *c)).collect(),
            issues: Vec::new(),
            pulls: Vec::new(),
            comments: Vec::new(),
        });
        self
    }

    pub fn with_issue(self, repo: &str, issue: Issue) -> Self {
        self.repo_mut(repo, |r| r.issues.push(issue));
        self
    }

    pub fn with_pull(
        self,
        repo: &str,
        author: &str,
        created_at: DateTime<Utc>,
        stats: PullStats,
    ) -> Self {
        self.repo_mut(repo, |r| {
            let number = (r.pulls.len() + 1) as u64;
            r.pulls.push((
                PullSummary {
                    number,
                    created_at,
                    user: Some(crate::github::Author {
                        login: author.to_string(),
                    }),
                },
                stats,
            ));
        });
        self
    }

    /// Every pull request listing call sleeps for `latency` first.
    pub fn with_pull_latency(mut self, latency: Duration) -> Self {
        self.pull_latency = Some(latency);
        self
    }

    pub fn repo(&self, name: &str) -> FakeRepo {
        self.state
            .lock()
            .unwrap()
            .repos
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .unwrap()
    }

    pub fn label_set(&self, repo: &str) -> std::collections::BTreeSet<Label> {
        self.repo(repo).labels.into_iter().collect()
    }

    pub fn mutations(&self) -> Vec<String> {
        self.state.lock().unwrap().mutations.clone()
    }

    pub fn clear_mutations(&self) {
        self.state.lock().unwrap().mutations.clear();
    }

    pub fn repo_pages_fetched(&self) -> usize {
        self.state.lock().unwrap().repo_pages_fetched
    }

    pub fn pull_pages_fetched(&self) -> usize {
        self.state.lock().unwrap().pull_pages_fetched
    }

    pub fn closed_issue_pages_fetched(&self) -> usize {
        self.state.lock().unwrap().closed_issue_pages_fetched
    }

    fn repo_mut<T>(&self, name: &str, f: impl FnOnce(&mut FakeRepo) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        let repo = state
            .repos
            .iter_mut()
            .find(|r| r.name == name)
            .unwrap_or_else(|| panic!("no repo {name}"));
        f(repo)
    }

    fn try_repo<T>(
        &self,
        org: &str,
        name: &str,
        f: impl FnOnce(&mut FakeRepo) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.state.lock().unwrap();
        if org != self.org {
            return Err(GhToolsError::NotFound(format!("organization {org}")));
        }
        let repo = state
            .repos
            .iter_mut()
            .find(|r| r.name == name)
            .ok_or_else(|| GhToolsError::NotFound(format!("repository {org}/{name}")))?;
        f(repo)
    }

    fn record(&self, mutation: String) {
        self.state.lock().unwrap().mutations.push(mutation);
    }
}

impl Backend for FakeBackend {
    async fn organization(&self, org: &str) -> Result<Org> {
        if org == self.org {
            Ok(Org {
                login: org.to_string(),
            })
        } else {
            Err(GhToolsError::OrgNotFound(org.to_string()))
        }
    }

    async fn repository(&self, org: &str, repo: &str) -> Result<Repo> {
        self.try_repo(org, repo, |r| {
            Ok(Repo {
                name: r.name.clone(),
            })
        })
    }

    async fn repos_page(&self, _org: &str, page: u32) -> Result<Vec<Repo>> {
        let mut state = self.state.lock().unwrap();
        state.repo_pages_fetched += 1;
        let names: Vec<Repo> = state
            .repos
            .iter()
            .map(|r| Repo {
                name: r.name.clone(),
            })
            .collect();
        Ok(page_of(&names, page))
    }

    async fn labels(&self, org: &str, repo: &str) -> Result<Vec<Label>> {
        self.try_repo(org, repo, |r| Ok(r.labels.clone()))
    }

    async fn label(&self, org: &str, repo: &str, name: &str) -> Result<Option<Label>> {
        self.try_repo(org, repo, |r| {
            Ok(r.labels.iter().find(|l| l.name == name).cloned())
        })
    }

    async fn create_label(&self, org: &str, repo: &str, name: &str, color: &str) -> Result<Label> {
        let label = self.try_repo(org, repo, |r| {
            let label = Label::new(name, color);
            r.labels.push(label.clone());
            Ok(label)
        })?;
        self.record(format!("create_label {repo} {name} {color}"));
        Ok(label)
    }

    async fn update_label(
        &self,
        org: &str,
        repo: &str,
        name: &str,
        new_name: &str,
        color: &str,
    ) -> Result<Label> {
        let label = self.try_repo(org, repo, |r| {
            let existing = r
                .labels
                .iter_mut()
                .find(|l| l.name == name)
                .ok_or_else(|| GhToolsError::NotFound(format!("label {name}")))?;
            *existing = Label::new(new_name, color);
            Ok(existing.clone())
        })?;
        self.record(format!("update_label {repo} {name} {new_name} {color}"));
        Ok(label)
    }

    async fn delete_label(&self, org: &str, repo: &str, name: &str) -> Result<()> {
        self.try_repo(org, repo, |r| {
            let before = r.labels.len();
            r.labels.retain(|l| l.name != name);
            if r.labels.len() == before {
                return Err(GhToolsError::NotFound(format!("label {name}")));
            }
            Ok(())
        })?;
        self.record(format!("delete_label {repo} {name}"));
        Ok(())
    }

    async fn issue(&self, org: &str, repo: &str, number: u64) -> Result<Issue> {
        self.try_repo(org, repo, |r| {
            r.issues
                .iter()
                .find(|i| i.number == number)
                .cloned()
                .ok_or_else(|| GhToolsError::NotFound(format!("issue {org}/{repo}#{number}")))
        })
    }

    async fn create_issue(&self, org: &str, repo: &str, new: &NewIssue) -> Result<Issue> {
        let created = self.try_repo(org, repo, |r| {
            let number = (r.issues.len() + 1) as u64;
            let mut created = issue(org, repo, number, &new.title, "gh-tools-bot");
            created.body = Some(new.body.clone());
            created.labels = new
                .labels
                .iter()
                .map(|name| Label::new(name.as_str(), "ededed"))
                .collect();
            r.issues.push(created.clone());
            Ok(created)
        })?;
        self.record(format!("create_issue {repo} {}", new.title));
        Ok(created)
    }

    async fn close_issue(&self, org: &str, repo: &str, number: u64) -> Result<Issue> {
        let closed = self.try_repo(org, repo, |r| {
            let issue = r
                .issues
                .iter_mut()
                .find(|i| i.number == number)
                .ok_or_else(|| GhToolsError::NotFound(format!("issue {number}")))?;
            issue.state = "closed".to_string();
            Ok(issue.clone())
        })?;
        self.record(format!("close_issue {repo} {number}"));
        Ok(closed)
    }

    async fn comment_issue(&self, org: &str, repo: &str, number: u64, body: &str) -> Result<()> {
        self.try_repo(org, repo, |r| {
            r.comments.push((number, body.to_string()));
            Ok(())
        })?;
        self.record(format!("comment_issue {repo} {number}"));
        Ok(())
    }

    /// Mimics GitHub's fuzzy title search: any issue whose title contains the search
    /// words is a hit, exact or not.
    async fn search_issues(&self, query: &str, page: u32) -> Result<Vec<SearchHit>> {
        let title = query.split(" in:title").next().unwrap_or_default();
        let scope = query.rsplit("repo:").next().unwrap_or_default();
        let (org, repo) = scope.split_once('/').unwrap_or_default();
        let hits: Vec<SearchHit> = self.try_repo(org, repo, |r| {
            Ok(r.issues
                .iter()
                .filter(|i| i.pull_request.is_none() && i.title.contains(title))
                .map(|i| SearchHit {
                    number: i.number,
                    title: i.title.clone(),
                    html_url: i.html_url.clone(),
                    repository_url: format!("https://api.github.com/repos/{org}/{repo}"),
                })
                .collect())
        })?;
        Ok(page_of(&hits, page))
    }

    async fn pulls_page(&self, org: &str, repo: &str, page: u32) -> Result<Vec<PullSummary>> {
        if let Some(latency) = self.pull_latency {
            tokio::time::sleep(latency).await;
        }
        self.state.lock().unwrap().pull_pages_fetched += 1;
        self.try_repo(org, repo, |r| {
            let mut pulls: Vec<PullSummary> = r.pulls.iter().map(|(p, _)| p.clone()).collect();
            pulls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(page_of(&pulls, page))
        })
    }

    async fn pull_stats(&self, org: &str, repo: &str, number: u64) -> Result<PullStats> {
        self.try_repo(org, repo, |r| {
            r.pulls
                .iter()
                .find(|(p, _)| p.number == number)
                .map(|(_, s)| *s)
                .ok_or_else(|| GhToolsError::NotFound(format!("pull {number}")))
        })
    }

    async fn closed_issues_page(&self, org: &str, repo: &str, page: u32) -> Result<Vec<Issue>> {
        self.state.lock().unwrap().closed_issue_pages_fetched += 1;
        self.try_repo(org, repo, |r| {
            let mut closed: Vec<Issue> = r
                .issues
                .iter()
                .filter(|i| i.state == "closed")
                .cloned()
                .collect();
            closed.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            Ok(page_of(&closed, page))
        })
    }
}
