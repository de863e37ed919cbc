use crate::commands::connect;
use crate::config::Context;
use crate::display;
use crate::error::Result;
use crate::mux::{MovedIssue, SpreadOutcome};
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum IssueAction {
    /// Move issue ISSUE_ID from SOURCE_REPO to DEST_REPO
    Move {
        issue_id: u64,
        source_repo: String,
        dest_repo: String,
    },
    /// Spread issue ISSUE_ID from SOURCE_REPO to the rest of the repos
    Spread { issue_id: u64, source_repo: String },
}

pub async fn run(ctx: &Context, action: &IssueAction) -> Result<()> {
    let mux = connect(ctx).await?;

    match action {
        IssueAction::Move {
            issue_id,
            source_repo,
            dest_repo,
        } => {
            let moved = mux.move_issue(*issue_id, source_repo, dest_repo).await?;
            display::output(ctx.json, &moved, |data| display::success(&move_summary(data)));
        }
        IssueAction::Spread {
            issue_id,
            source_repo,
        } => {
            let outcomes = mux.spread_issue(*issue_id, source_repo).await?;
            display::output(ctx.json, &outcomes, |data| render_spread(data));
        }
    }

    Ok(())
}

fn move_summary(moved: &MovedIssue) -> String {
    format!(
        "{} closed, continued as {} - {}",
        moved.original, moved.new, moved.new.url
    )
}

fn spread_counts(outcomes: &[SpreadOutcome]) -> (usize, usize) {
    let created = outcomes
        .iter()
        .filter(|o| matches!(o, SpreadOutcome::Created(_)))
        .count();
    (created, outcomes.len() - created)
}

fn render_spread(outcomes: &[SpreadOutcome]) {
    let (created, existing) = spread_counts(outcomes);
    if created == 0 {
        display::success(&format!(
            "Nothing to do, issue already present in {existing} repo(s)."
        ));
    } else {
        display::success(&format!(
            "{created} issue(s) created, {existing} already present."
        ));
    }
}
