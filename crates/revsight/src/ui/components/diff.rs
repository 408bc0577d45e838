//! Unified diff rendering for the terminal.

use std::fmt::Write as _;

use crossterm::style::{Stylize, style};
use similar::{ChangeTag, TextDiff};

/// Render a unified diff of `original` against `modified`.
///
/// Returns an empty string when the inputs are identical.
pub fn render_unified(
    original: &str,
    modified: &str,
    original_label: &str,
    modified_label: &str,
    context_lines: usize,
) -> String {
    let diff = TextDiff::from_lines(original, modified);
    let groups = diff.grouped_ops(context_lines);
    if groups.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let _ = writeln!(out, "--- {original_label}");
    let _ = writeln!(out, "+++ {modified_label}");

    for group in groups {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        let old_start = first.old_range().start;
        let old_len = last.old_range().end - old_start;
        let new_start = first.new_range().start;
        let new_len = last.new_range().end - new_start;
        let _ = writeln!(
            out,
            "@@ -{},{} +{},{} @@",
            hunk_start(old_start, old_len),
            old_len,
            hunk_start(new_start, new_len),
            new_len
        );

        for op in &group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => '-',
                    ChangeTag::Insert => '+',
                    ChangeTag::Equal => ' ',
                };
                let value = change.value().trim_end_matches(['\n', '\r']);
                let _ = writeln!(out, "{sign}{value}");
            }
        }
    }
    out
}

fn hunk_start(start: usize, len: usize) -> usize {
    if len == 0 { start } else { start + 1 }
}

/// Color diff lines for display on a terminal.
pub fn colorize(diff: &str) -> String {
    let mut out = String::with_capacity(diff.len());
    for line in diff.lines() {
        let styled = if line.starts_with("+++") || line.starts_with("---") {
            style(line).bold().to_string()
        } else if line.starts_with("@@") {
            style(line).cyan().to_string()
        } else if line.starts_with('+') {
            style(line).green().to_string()
        } else if line.starts_with('-') {
            style(line).red().to_string()
        } else {
            line.to_owned()
        };
        out.push_str(&styled);
        out.push('\n');
    }
    out
}
