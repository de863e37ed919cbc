use crate::display;
use crate::error::Result;
use crate::github::{normalize_color, Backend, Label};
use crate::mux::GitHubMux;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelOutcome {
    /// Label already had the requested name and color.
    Unchanged,
    /// Label existed with another color (or name casing) and was edited in place.
    Updated,
    Created,
    Deleted,
    AlreadyMissing,
    Renamed,
    /// Rename source label was not present.
    Missing,
}

/// What happened to one label in one repository.
#[derive(Debug, Clone, Serialize)]
pub struct LabelChange {
    pub repo: String,
    pub label: Option<Label>,
    pub outcome: LabelOutcome,
}

impl LabelChange {
    fn new(repo: &str, label: Option<Label>, outcome: LabelOutcome) -> Self {
        Self {
            repo: repo.to_string(),
            label,
            outcome,
        }
    }
}

impl<B: Backend> GitHubMux<B> {
    async fn set_label_repo(&self, repo: &str, name: &str, color: &str) -> Result<LabelChange> {
        let color = normalize_color(color);
        let change = match self.backend.label(&self.org, repo, name).await? {
            Some(existing) if existing.name == name && normalize_color(&existing.color) == color => {
                display::unchanged(&format!(
                    "Label `{name}` already exists in repo `{repo}`."
                ));
                LabelChange::new(repo, Some(existing), LabelOutcome::Unchanged)
            }
            Some(existing) => {
                display::changed(&format!(
                    "Label `{name}` already exists in repo `{repo}` but has a different color. Fixing."
                ));
                let label = self
                    .backend
                    .update_label(&self.org, repo, &existing.name, name, &color)
                    .await?;
                LabelChange::new(repo, Some(label), LabelOutcome::Updated)
            }
            None => {
                display::changed(&format!(
                    "Label `{name}` doesn't exist in repo `{repo}`. Creating."
                ));
                let label = self
                    .backend
                    .create_label(&self.org, repo, name, &color)
                    .await?;
                LabelChange::new(repo, Some(label), LabelOutcome::Created)
            }
        };
        Ok(change)
    }

    /// Ensures every eligible repository has label `name` with `color`.
    pub async fn set_label(&self, name: &str, color: &str) -> Result<Vec<LabelChange>> {
        let mut changes = Vec::new();
        let mut repos = self.repos(&self.exclude);
        while let Some(repo) = repos.next().await? {
            changes.push(self.set_label_repo(&repo.name, name, color).await?);
        }
        Ok(changes)
    }

    async fn unset_label_repo(&self, repo: &str, name: &str) -> Result<LabelChange> {
        match self.backend.label(&self.org, repo, name).await? {
            Some(existing) => {
                display::changed(&format!(
                    "Label `{name}` exists in repo `{repo}`. Deleting."
                ));
                self.backend.delete_label(&self.org, repo, &existing.name).await?;
                Ok(LabelChange::new(repo, Some(existing), LabelOutcome::Deleted))
            }
            None => {
                display::unchanged(&format!(
                    "Label `{name}` is already missing in repo `{repo}`."
                ));
                Ok(LabelChange::new(repo, None, LabelOutcome::AlreadyMissing))
            }
        }
    }

    /// Deletes label `name` from every eligible repository that has it.
    pub async fn unset_label(&self, name: &str) -> Result<Vec<LabelChange>> {
        let mut changes = Vec::new();
        let mut repos = self.repos(&self.exclude);
        while let Some(repo) = repos.next().await? {
            changes.push(self.unset_label_repo(&repo.name, name).await?);
        }
        Ok(changes)
    }

    /// Renames label `name` to `new_name` wherever it exists, keeping its color.
    pub async fn rename_label(&self, name: &str, new_name: &str) -> Result<Vec<LabelChange>> {
        let mut changes = Vec::new();
        let mut repos = self.repos(&self.exclude);
        while let Some(repo) = repos.next().await? {
            let change = match self.backend.label(&self.org, &repo.name, name).await? {
                Some(existing) => {
                    display::changed(&format!(
                        "Label `{name}` exists in repo `{}`. Renaming.",
                        repo.name
                    ));
                    let label = self
                        .backend
                        .update_label(
                            &self.org,
                            &repo.name,
                            &existing.name,
                            new_name,
                            &existing.color,
                        )
                        .await?;
                    LabelChange::new(&repo.name, Some(label), LabelOutcome::Renamed)
                }
                None => {
                    display::unchanged(&format!(
                        "Couldn't find label `{name}` in repo `{}`.",
                        repo.name
                    ));
                    LabelChange::new(&repo.name, None, LabelOutcome::Missing)
                }
            };
            changes.push(change);
        }
        Ok(changes)
    }

    async fn label_set(&self, repo: &str) -> Result<BTreeSet<Label>> {
        let labels = self.backend.labels(&self.org, repo).await?;
        Ok(labels
            .into_iter()
            .map(|l| Label::new(l.name, l.color))
            .collect())
    }

    /// Makes every other eligible repository carry exactly the labels of `truth_repo`.
    pub async fn synch_from_repo(&self, truth_repo: &str) -> Result<Vec<LabelChange>> {
        let truth = self.backend.repository(&self.org, truth_repo).await?;
        let truth_labels = self.label_set(&truth.name).await?;
        debug!(repo = %truth.name, labels = truth_labels.len(), "source of truth loaded");

        let mut changes = Vec::new();
        let mut repos = self.repos(&self.exclude);
        while let Some(repo) = repos.next().await? {
            if repo.name == truth.name {
                continue;
            }
            display::progress(&format!("Processing {}", repo.name));

            let current = self.label_set(&repo.name).await?;
            for label in truth_labels.difference(&current) {
                changes.push(
                    self.set_label_repo(&repo.name, &label.name, &label.color)
                        .await?,
                );
            }

            // Re-read: fixing colors above changes which pairs are now extra.
            let current = self.label_set(&repo.name).await?;
            for label in current.difference(&truth_labels) {
                changes.push(self.unset_label_repo(&repo.name, &label.name).await?);
            }
        }
        Ok(changes)
    }
}
