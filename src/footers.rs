//! Commit-description footer handling
//!
//! A description's footer block is its last paragraph, and only when every
//! line in that paragraph parses as a `Key: value` footer. A one-paragraph
//! description has no footers.

use regex::Regex;
use std::sync::OnceLock;

fn is_footer_line(line: &str) -> bool {
    static FOOTER_RE: OnceLock<Regex> = OnceLock::new();
    FOOTER_RE
        .get_or_init(|| Regex::new(r"^\s*[A-Za-z0-9-]+: *.*$").expect("hardcoded regex is valid"))
        .is_match(line)
}

/// Split a description into (message lines, footer lines).
///
/// The blank separator line stays at the end of the message lines, so
/// joining `message + footers` with newlines reconstructs the original.
#[must_use]
pub fn split_footers(description: &str) -> (Vec<String>, Vec<String>) {
    let lines: Vec<String> = description.lines().map(str::to_string).collect();
    let Some(last_blank) = lines.iter().rposition(|l| l.trim().is_empty()) else {
        return (lines, Vec::new());
    };
    let candidate = &lines[last_blank + 1..];
    if candidate.is_empty() || !candidate.iter().all(|l| is_footer_line(l)) {
        return (lines, Vec::new());
    }
    (lines[..=last_blank].to_vec(), candidate.to_vec())
}

/// Append `line` to `description`, before any trailing footer block.
///
/// A blank line is inserted ahead of `line` unless the message already
/// ends with one.
#[must_use]
pub fn append_attribution(description: &str, line: &str) -> String {
    let (mut lines, footers) = split_footers(description);
    if lines.last().is_some_and(|l| !l.trim().is_empty()) {
        lines.push(String::new());
    }
    lines.push(line.to_string());
    if !footers.is_empty() {
        lines.push(String::new());
        lines.extend(footers);
    }
    lines.join("\n")
}
