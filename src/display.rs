use comfy_table::{presets::UTF8_FULL_CONDENSED, CellAlignment, ContentArrangement, Table};
use owo_colors::OwoColorize;
use serde::Serialize;

pub fn output<T: Serialize>(json_mode: bool, data: &T, render_table: impl FnOnce(&T)) {
    if json_mode {
        match serde_json::to_string_pretty(data) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("{} Failed to serialize JSON: {e}", "error:".red().bold()),
        }
    } else {
        render_table(data);
    }
}

pub fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);
    table
}

/// Right-aligns every column from `first` onwards, for numeric columns.
pub fn align_numeric(table: &mut Table, first: usize) {
    let count = table.column_count();
    for index in first..count {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

pub fn section_header(title: &str) {
    println!("\n{}", title.cyan().bold());
    println!("{}", "─".repeat(title.chars().count()).cyan());
}

/// Progress marker printed before working on a repository.
pub fn progress(msg: &str) {
    println!("{}", msg.cyan());
}

/// A repository left alone by the exclude list.
pub fn skipped(msg: &str) {
    println!("{}", msg.blue());
}

/// Remote state already matched what was asked; nothing was changed.
pub fn unchanged(msg: &str) {
    println!("{}", msg.green());
}

/// A remote mutation is about to happen or just happened.
pub fn changed(msg: &str) {
    println!("{}", msg.yellow());
}

pub fn success(msg: &str) {
    println!("{} {msg}", "✓".green().bold());
}

pub fn warn(msg: &str) {
    eprintln!("{} {msg}", "warning:".yellow().bold());
}

pub fn error(msg: &str) {
    eprintln!("{} {msg}", "error:".red().bold());
}
