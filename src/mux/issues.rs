use crate::display;
use crate::error::Result;
use crate::github::{Backend, Issue, NewIssue, PER_PAGE};
use crate::mux::GitHubMux;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// GitHub search never returns more than 1000 results, i.e. ten full pages.
const MAX_SEARCH_PAGES: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRef {
    pub org: String,
    pub repo: String,
    pub number: u64,
    pub url: String,
}

impl fmt::Display for IssueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.org, self.repo, self.number)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MovedIssue {
    pub original: IssueRef,
    pub new: IssueRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "issue", rename_all = "snake_case")]
pub enum SpreadOutcome {
    Existing(IssueRef),
    Created(IssueRef),
}

pub fn move_body(org: &str, repo: &str, issue: &Issue) -> String {
    format!(
        "Original issue {org}/{repo}#{} created by @{}\n\n{}",
        issue.number,
        issue.author(),
        issue.body.as_deref().unwrap_or_default()
    )
}

pub fn spread_body(org: &str, repo: &str, number: u64) -> String {
    format!("See details in the parent issue {org}/{repo}#{number}\n\n")
}

pub fn title_query(org: &str, repo: &str, title: &str) -> String {
    format!("{title} in:title is:issue repo:{org}/{repo}")
}

impl<B: Backend> GitHubMux<B> {
    fn issue_ref(&self, repo: &str, issue: &Issue) -> IssueRef {
        IssueRef {
            org: self.org.clone(),
            repo: repo.to_string(),
            number: issue.number,
            url: issue.html_url.clone(),
        }
    }

    /// First issue in `repo` whose title is exactly `title`.
    ///
    /// GitHub's search matches words, not whole titles, so hits are filtered for
    /// exact equality. Further exact duplicates are not reported.
    pub async fn search_issue_by_title(&self, title: &str, repo: &str) -> Result<Option<IssueRef>> {
        let query = title_query(&self.org, repo, title);
        for page in 1..=MAX_SEARCH_PAGES {
            let hits = self.backend.search_issues(&query, page).await?;
            debug!(%query, page, hits = hits.len(), "search results");
            if let Some(hit) = hits.iter().find(|h| h.title == title) {
                return Ok(Some(IssueRef {
                    org: self.org.clone(),
                    repo: hit.repo_name().to_string(),
                    number: hit.number,
                    url: hit.html_url.clone(),
                }));
            }
            if hits.len() < PER_PAGE {
                break;
            }
        }
        Ok(None)
    }

    /// Closes issue `id` in `src_repo` and recreates it in `dst_repo` with a back-reference.
    pub async fn move_issue(&self, id: u64, src_repo: &str, dst_repo: &str) -> Result<MovedIssue> {
        let src = self.backend.repository(&self.org, src_repo).await?;
        let dst = self.backend.repository(&self.org, dst_repo).await?;
        let issue = self.backend.issue(&self.org, &src.name, id).await?;

        let new_issue = NewIssue {
            title: issue.title.clone(),
            body: move_body(&self.org, &src.name, &issue),
            labels: issue.label_names(),
        };

        let closed = self
            .backend
            .close_issue(&self.org, &src.name, issue.number)
            .await?;
        debug!(number = closed.number, state = %closed.state, "original issue closed");
        let created = self
            .backend
            .create_issue(&self.org, &dst.name, &new_issue)
            .await?;
        let new = self.issue_ref(&dst.name, &created);

        self.backend
            .comment_issue(
                &self.org,
                &src.name,
                issue.number,
                &format!("Issue moved to {new} - {}", new.url),
            )
            .await?;

        display::changed(&format!("Issue moved, new ID is {new} - {}", new.url));
        Ok(MovedIssue {
            original: self.issue_ref(&src.name, &issue),
            new,
        })
    }

    /// Opens a copy of issue `id` from `src_repo` in every other eligible repository
    /// that doesn't already have an issue with the same title.
    pub async fn spread_issue(&self, id: u64, src_repo: &str) -> Result<Vec<SpreadOutcome>> {
        let src = self.backend.repository(&self.org, src_repo).await?;
        let issue = self.backend.issue(&self.org, &src.name, id).await?;
        let exclude = self.exclude.with(&src.name);

        let new_issue = NewIssue {
            title: issue.title.clone(),
            body: spread_body(&self.org, &src.name, issue.number),
            labels: issue.label_names(),
        };

        let mut outcomes = Vec::new();
        let mut repos = self.repos(&exclude);
        while let Some(repo) = repos.next().await? {
            match self.search_issue_by_title(&issue.title, &repo.name).await? {
                Some(existing) => {
                    display::unchanged(&format!(
                        "Issue already exists, ID is {existing} - {}",
                        existing.url
                    ));
                    outcomes.push(SpreadOutcome::Existing(existing));
                }
                None => {
                    let created = self
                        .backend
                        .create_issue(&self.org, &repo.name, &new_issue)
                        .await?;
                    let created = self.issue_ref(&repo.name, &created);
                    display::changed(&format!(
                        "Issue created, ID is {created} - {}",
                        created.url
                    ));
                    outcomes.push(SpreadOutcome::Created(created));
                }
            }
        }
        Ok(outcomes)
    }
}
