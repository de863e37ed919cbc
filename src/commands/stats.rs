use crate::commands::connect;
use crate::config::Context;
use crate::display;
use crate::error::Result;
use crate::mux::{Counters, StatsReport};
use clap::Subcommand;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::collections::BTreeMap;

#[derive(Subcommand, Debug)]
pub enum StatsAction {
    /// Gather PR and issue stats for the past DAYS days
    Gather {
        /// Size of the trailing window, in days
        days: u32,
    },
}

const COUNTER_HEADERS: [&str; 4] = ["PRs", "Commits", "Additions", "Deletions"];

pub async fn run(ctx: &Context, action: &StatsAction) -> Result<()> {
    let StatsAction::Gather { days } = action;
    let mux = connect(ctx).await?;

    let report = mux.stats(*days).await?;

    display::output(ctx.json, &report, render_report);

    Ok(())
}

fn counter_cells(c: &Counters) -> [String; 4] {
    [
        c.count.to_string(),
        c.commits.to_string(),
        c.additions.to_string(),
        c.deletions.to_string(),
    ]
}

fn total_row(leading: usize, total: &Counters) -> Vec<String> {
    let mut row = vec!["Total".to_string()];
    row.extend(std::iter::repeat(String::new()).take(leading - 1));
    row.extend(counter_cells(total));
    row
}

fn detail_table(detail: &BTreeMap<String, BTreeMap<String, Counters>>) -> Table {
    let mut headers = vec!["Repo", "User"];
    headers.extend(COUNTER_HEADERS);
    let mut table = display::new_table(&headers);

    for (repo, users) in detail {
        for (user, counters) in users {
            let mut row = vec![repo.clone(), user.clone()];
            row.extend(counter_cells(counters));
            table.add_row(row);
        }
    }
    let total: Counters = detail.values().flat_map(|users| users.values()).sum();
    table.add_row(total_row(2, &total));
    display::align_numeric(&mut table, 2);
    table
}

fn summary_table(key: &str, rows: &BTreeMap<String, Counters>) -> Table {
    let mut headers = vec![key];
    headers.extend(COUNTER_HEADERS);
    let mut table = display::new_table(&headers);

    for (name, counters) in rows {
        let mut row = vec![name.clone()];
        row.extend(counter_cells(counters));
        table.add_row(row);
    }
    let total: Counters = rows.values().sum();
    table.add_row(total_row(1, &total));
    display::align_numeric(&mut table, 1);
    table
}

fn closed_table(closed: &BTreeMap<String, u64>) -> Table {
    let mut table = display::new_table(&["Repo", "Closed"]);
    for (repo, count) in closed {
        table.add_row(vec![repo.clone(), count.to_string()]);
    }
    let total: u64 = closed.values().sum();
    table.add_row(vec!["Total".to_string(), total.to_string()]);
    display::align_numeric(&mut table, 1);
    table
}

fn render_report(report: &StatsReport) {
    println!(
        "{} last {} day(s), since {}",
        "Window:".bold(),
        report.days,
        report.since.format("%Y-%m-%d %H:%M UTC")
    );

    display::section_header("Pull Requests by Repo and User");
    println!("{}", detail_table(&report.pulls.detail));

    display::section_header("Pull Requests by User");
    println!("{}", summary_table("User", &report.pulls.users));

    display::section_header("Pull Requests by Repo");
    println!("{}", summary_table("Repo", &report.pulls.repos));

    display::section_header("Closed Issues");
    println!("{}", closed_table(&report.issues.closed));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters(count: u64, commits: u64, additions: u64, deletions: u64) -> Counters {
        Counters {
            count,
            commits,
            additions,
            deletions,
        }
    }

    #[test]
    fn summary_table_has_total_row() {
        let mut rows = BTreeMap::new();
        rows.insert("core".to_string(), counters(2, 5, 100, 20));
        rows.insert("agent".to_string(), counters(1, 1, 7, 3));
        rows.insert("quiet".to_string(), Counters::default());

        let rendered = summary_table("Repo", &rows).to_string();
        assert!(rendered.contains("quiet"));
        assert!(rendered.contains("Total"));
        assert!(rendered.contains("107"));
        assert!(rendered.contains("23"));
    }

    #[test]
    fn detail_table_lists_each_repo_user_pair() {
        let mut detail: BTreeMap<String, BTreeMap<String, Counters>> = BTreeMap::new();
        detail
            .entry("core".into())
            .or_default()
            .insert("alice".into(), counters(1, 2, 3, 4));
        detail
            .entry("agent".into())
            .or_default()
            .insert("bob".into(), counters(1, 10, 30, 40));

        let rendered = detail_table(&detail).to_string();
        assert!(rendered.contains("alice"));
        assert!(rendered.contains("bob"));
        assert!(rendered.contains("44"));
    }

    #[test]
    fn closed_table_sums_counts() {
        let mut closed = BTreeMap::new();
        closed.insert("core".to_string(), 4);
        closed.insert("agent".to_string(), 0);
        closed.insert("collector".to_string(), 9);

        let rendered = closed_table(&closed).to_string();
        assert!(rendered.contains("Total"));
        assert!(rendered.contains("13"));
    }

    #[test]
    fn total_row_pads_leading_columns() {
        let row = total_row(2, &counters(1, 2, 3, 4));
        assert_eq!(row, vec!["Total", "", "1", "2", "3", "4"]);
    }
}
