use crate::error::{GhToolsError, Result};
use crate::github::{
    Backend, Issue, Label, NewIssue, Org, PullStats, PullSummary, Repo, SearchHit, PER_PAGE,
};
use octocrab::Octocrab;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

pub struct GithubClient {
    octocrab: Octocrab,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    items: Vec<SearchHit>,
}

impl GithubClient {
    pub fn new(token: &str) -> Result<Self> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| GhToolsError::GitHub(e.to_string()))?;
        Ok(Self { octocrab })
    }

    #[cfg(test)]
    fn with_base_uri(token: &str, base_uri: &str) -> Result<Self> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(base_uri)
            .map_err(|e| GhToolsError::Config(format!("Invalid API URL {base_uri}: {e}")))?
            .build()
            .map_err(|e| GhToolsError::GitHub(e.to_string()))?;
        Ok(Self { octocrab })
    }

    fn label_route(org: &str, repo: &str, name: &str) -> String {
        format!(
            "/repos/{org}/{repo}/labels/{}",
            urlencoding::encode(name)
        )
    }
}

impl Backend for GithubClient {
    async fn organization(&self, org: &str) -> Result<Org> {
        debug!(org, "fetching organization");
        match self.octocrab.get(format!("/orgs/{org}"), None::<&()>).await {
            Ok(org) => Ok(org),
            Err(e) => match GhToolsError::from(e) {
                GhToolsError::NotFound(_) => Err(GhToolsError::OrgNotFound(org.to_string())),
                other => Err(other),
            },
        }
    }

    async fn repository(&self, org: &str, repo: &str) -> Result<Repo> {
        debug!(org, repo, "fetching repository");
        match self.octocrab.get(format!("/repos/{org}/{repo}"), None::<&()>).await {
            Ok(repo) => Ok(repo),
            Err(e) => match GhToolsError::from(e) {
                GhToolsError::NotFound(_) => {
                    Err(GhToolsError::NotFound(format!("repository {org}/{repo}")))
                }
                other => Err(other),
            },
        }
    }

    async fn repos_page(&self, org: &str, page: u32) -> Result<Vec<Repo>> {
        debug!(org, page, "listing repositories");
        let repos: Vec<Repo> = self
            .octocrab
            .get(
                format!("/orgs/{org}/repos"),
                Some(&[
                    ("type", "all".to_string()),
                    ("per_page", PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ]),
            )
            .await?;
        Ok(repos)
    }

    async fn labels(&self, org: &str, repo: &str) -> Result<Vec<Label>> {
        let mut all_labels = Vec::new();
        let mut page = 1u32;
        loop {
            debug!(org, repo, page, "listing labels");
            let labels: Vec<Label> = self
                .octocrab
                .get(
                    format!("/repos/{org}/{repo}/labels"),
                    Some(&[
                        ("per_page", PER_PAGE.to_string()),
                        ("page", page.to_string()),
                    ]),
                )
                .await?;
            let last = labels.len() < PER_PAGE;
            all_labels.extend(labels);
            if last {
                break;
            }
            page += 1;
        }
        Ok(all_labels)
    }

    async fn label(&self, org: &str, repo: &str, name: &str) -> Result<Option<Label>> {
        debug!(org, repo, name, "fetching label");
        let result: std::result::Result<Label, _> = self
            .octocrab
            .get(Self::label_route(org, repo, name), None::<&()>)
            .await;
        match result {
            Ok(label) => Ok(Some(label)),
            Err(e) => match GhToolsError::from(e) {
                GhToolsError::NotFound(_) => Ok(None),
                other => Err(other),
            },
        }
    }

    async fn create_label(&self, org: &str, repo: &str, name: &str, color: &str) -> Result<Label> {
        debug!(org, repo, name, color, "creating label");
        let label: Label = self
            .octocrab
            .post(
                format!("/repos/{org}/{repo}/labels"),
                Some(&json!({ "name": name, "color": color })),
            )
            .await?;
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
        debug!(org, repo, name, new_name, color, "updating label");
        let label: Label = self
            .octocrab
            .patch(
                Self::label_route(org, repo, name),
                Some(&json!({ "new_name": new_name, "color": color })),
            )
            .await?;
        Ok(label)
    }

    async fn delete_label(&self, org: &str, repo: &str, name: &str) -> Result<()> {
        debug!(org, repo, name, "deleting label");
        let response = self
            .octocrab
            ._delete(Self::label_route(org, repo, name), None::<&()>)
            .await?;
        octocrab::map_github_error(response).await?;
        Ok(())
    }

    async fn issue(&self, org: &str, repo: &str, number: u64) -> Result<Issue> {
        debug!(org, repo, number, "fetching issue");
        match self
            .octocrab
            .get(format!("/repos/{org}/{repo}/issues/{number}"), None::<&()>)
            .await
        {
            Ok(issue) => Ok(issue),
            Err(e) => match GhToolsError::from(e) {
                GhToolsError::NotFound(_) => {
                    Err(GhToolsError::NotFound(format!("issue {org}/{repo}#{number}")))
                }
                other => Err(other),
            },
        }
    }

    async fn create_issue(&self, org: &str, repo: &str, issue: &NewIssue) -> Result<Issue> {
        debug!(org, repo, title = %issue.title, "creating issue");
        let created: Issue = self
            .octocrab
            .post(format!("/repos/{org}/{repo}/issues"), Some(issue))
            .await?;
        Ok(created)
    }

    async fn close_issue(&self, org: &str, repo: &str, number: u64) -> Result<Issue> {
        debug!(org, repo, number, "closing issue");
        let closed: Issue = self
            .octocrab
            .patch(
                format!("/repos/{org}/{repo}/issues/{number}"),
                Some(&json!({ "state": "closed" })),
            )
            .await?;
        Ok(closed)
    }

    async fn comment_issue(&self, org: &str, repo: &str, number: u64, body: &str) -> Result<()> {
        debug!(org, repo, number, "commenting on issue");
        let _: serde_json::Value = self
            .octocrab
            .post(
                format!("/repos/{org}/{repo}/issues/{number}/comments"),
                Some(&json!({ "body": body })),
            )
            .await?;
        Ok(())
    }

    async fn search_issues(&self, query: &str, page: u32) -> Result<Vec<SearchHit>> {
        debug!(query, page, "searching issues");
        let result: SearchPage = self
            .octocrab
            .get(
                "/search/issues",
                Some(&[
                    ("q", query.to_string()),
                    ("per_page", PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ]),
            )
            .await?;
        Ok(result.items)
    }

    async fn pulls_page(&self, org: &str, repo: &str, page: u32) -> Result<Vec<PullSummary>> {
        debug!(org, repo, page, "listing pull requests");
        let pulls: Vec<PullSummary> = self
            .octocrab
            .get(
                format!("/repos/{org}/{repo}/pulls"),
                Some(&[
                    ("state", "all".to_string()),
                    ("sort", "created".to_string()),
                    ("direction", "desc".to_string()),
                    ("per_page", PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ]),
            )
            .await?;
        Ok(pulls)
    }

    async fn pull_stats(&self, org: &str, repo: &str, number: u64) -> Result<PullStats> {
        debug!(org, repo, number, "fetching pull request details");
        let stats: PullStats = self
            .octocrab
            .get(format!("/repos/{org}/{repo}/pulls/{number}"), None::<&()>)
            .await?;
        Ok(stats)
    }

    async fn closed_issues_page(&self, org: &str, repo: &str, page: u32) -> Result<Vec<Issue>> {
        debug!(org, repo, page, "listing closed issues");
        let issues: Vec<Issue> = self
            .octocrab
            .get(
                format!("/repos/{org}/{repo}/issues"),
                Some(&[
                    ("state", "closed".to_string()),
                    ("sort", "updated".to_string()),
                    ("direction", "desc".to_string()),
                    ("per_page", PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ]),
            )
            .await?;
        Ok(issues)
    }
}
