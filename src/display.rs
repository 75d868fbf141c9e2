//! Colored console output for a cleaning run and the presets listing.

use crate::deleter::{ItemOutcome, OutcomeTally, Reporter};
use crate::presets::DeletionParams;
use crate::scanner::DeletionTarget;

use colored::{ColoredString, Colorize};
use std::collections::BTreeMap;
use std::path::Path;

const RULE_WIDTH: usize = 80;

/// Center `text` in a horizontal rule
fn rule(text: &str) -> String {
    format!("{:─^width$}", format!(" {text} "), width = RULE_WIDTH)
}

/// Prints progress of a run to stdout
pub struct ConsoleReporter {
    delete_mode: bool,
}

impl ConsoleReporter {
    pub fn new(delete_mode: bool) -> Self {
        ConsoleReporter { delete_mode }
    }

    fn styled(&self, text: &str) -> ColoredString {
        if self.delete_mode {
            text.red().bold()
        } else {
            text.yellow()
        }
    }

    pub fn show_header(&self, root: &Path) {
        let mode = if self.delete_mode { "DELETING" } else { "DRY RUN" };
        println!("{}", self.styled(&rule(&format!("{mode} in {}", root.display()))));
    }
}

impl Reporter for ConsoleReporter {
    fn on_action(&mut self, target: &DeletionTarget, delete_mode: bool) {
        let verb = if delete_mode { "Deleting" } else { "Would delete" };
        println!("{}: {}", self.styled(verb), target.path.display().to_string().dimmed());
    }

    fn on_result(&mut self, _target: &DeletionTarget, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Projected => {}
            ItemOutcome::Deleted => println!("  {}", "done".green()),
            ItemOutcome::Failed(err) => println!("  {}: {}", "failed".red().bold(), err),
        }
    }

    fn on_summary(&mut self, tally: &OutcomeTally) {
        let text = if self.delete_mode {
            format!(
                "{} items successfully deleted; {} could not be deleted",
                tally.deleted(),
                tally.failed()
            )
        } else {
            format!("{} items will be deleted with --delete option", tally.deleted())
        };
        println!("{}", self.styled(&rule(&text)));
    }
}

fn join_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

/// Print every preset as a table, one row per preset
pub fn show_presets_table(presets: &BTreeMap<String, DeletionParams>) {
    let headers = ["Preset", "Dirs", "Files", "Globs", "Ignored Dirs", "Ignored Files"];

    let rows: Vec<[String; 6]> = presets
        .iter()
        .map(|(name, params)| {
            [
                name.clone(),
                join_or_dash(&params.dirs),
                join_or_dash(&params.files),
                join_or_dash(&params.globs),
                join_or_dash(&params.ignored_dirs),
                join_or_dash(&params.ignored_files),
            ]
        })
        .collect();

    let mut widths = headers.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let pad = |text: &str, width: usize| format!("{text:<width$}");

    println!("{}", "Cleaner Presets".bold());
    let header_line: Vec<String> = headers
        .iter()
        .zip(widths)
        .map(|(h, w)| pad(*h, w).bold().to_string())
        .collect();
    println!("{}", header_line.join("  "));

    let separator: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    println!("{}", separator.join("  "));

    if rows.is_empty() {
        println!("{}", "No presets defined.".dimmed());
        return;
    }

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (cell, w))| {
                let padded = pad(cell.as_str(), w);
                match i {
                    0 => padded.cyan().to_string(),
                    1 => padded.magenta().to_string(),
                    2 => padded.green().to_string(),
                    3 => padded.blue().to_string(),
                    _ => padded.red().to_string(),
                }
            })
            .collect();
        println!("{}", cells.join("  "));
    }
}
