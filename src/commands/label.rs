use crate::commands::connect;
use crate::config::Context;
use crate::display;
use crate::error::Result;
use crate::mux::{LabelChange, LabelOutcome};
use clap::Subcommand;
use owo_colors::OwoColorize;

#[derive(Subcommand, Debug)]
pub enum LabelAction {
    /// Ensure the label exists with COLOR in every repo
    Set {
        /// Hex color, with or without a leading `#`
        color: String,
    },
    /// Delete the label from every repo
    Unset,
    /// Rename the label in every repo, keeping its color
    Rename {
        /// New label name
        new_name: String,
    },
    /// Make every repo carry exactly the labels of REPO
    #[command(name = "synch-labels")]
    SynchLabels {
        /// Repo holding the source of truth
        repo: String,
    },
}

pub async fn run(ctx: &Context, name: &str, action: &LabelAction) -> Result<()> {
    let mux = connect(ctx).await?;

    let changes = match action {
        LabelAction::Set { color } => mux.set_label(name, color).await?,
        LabelAction::Unset => mux.unset_label(name).await?,
        LabelAction::Rename { new_name } => mux.rename_label(name, new_name).await?,
        LabelAction::SynchLabels { repo } => mux.synch_from_repo(repo).await?,
    };

    display::output(ctx.json, &changes, |data| render_summary(data));

    Ok(())
}

/// Counts of each outcome, in a fixed display order, skipping outcomes that never happened.
fn tally(changes: &[LabelChange]) -> Vec<(LabelOutcome, usize)> {
    [
        LabelOutcome::Created,
        LabelOutcome::Updated,
        LabelOutcome::Renamed,
        LabelOutcome::Deleted,
        LabelOutcome::Unchanged,
        LabelOutcome::AlreadyMissing,
        LabelOutcome::Missing,
    ]
    .into_iter()
    .map(|outcome| {
        let n = changes.iter().filter(|c| c.outcome == outcome).count();
        (outcome, n)
    })
    .filter(|(_, n)| *n > 0)
    .collect()
}

fn outcome_label(outcome: LabelOutcome) -> &'static str {
    match outcome {
        LabelOutcome::Unchanged => "unchanged",
        LabelOutcome::Updated => "updated",
        LabelOutcome::Created => "created",
        LabelOutcome::Deleted => "deleted",
        LabelOutcome::AlreadyMissing => "already missing",
        LabelOutcome::Renamed => "renamed",
        LabelOutcome::Missing => "not found",
    }
}

fn render_summary(changes: &[LabelChange]) {
    if changes.is_empty() {
        display::warn("No repositories processed.");
        return;
    }
    let parts: Vec<String> = tally(changes)
        .into_iter()
        .map(|(outcome, n)| format!("{n} {}", outcome_label(outcome)))
        .collect();
    println!("\n{} {}", "Done:".bold(), parts.join(", "));
}
