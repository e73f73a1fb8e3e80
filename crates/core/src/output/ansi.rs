//! ANSI colored output formatter
//!
//! This module provides colorful terminal output for breadcrumb trails.

use crate::models::{BreadcrumbOutput, Crumb};

// ANSI escape codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const UNDERLINE: &str = "\x1b[4m";

const CYAN: &str = "\x1b[36m";
const BRIGHT_WHITE: &str = "\x1b[97m";
const BRIGHT_BLUE: &str = "\x1b[94m";

/// Format a single crumb; linked crumbs are cyan, the current page bold
fn format_crumb(crumb: &Crumb, is_last: bool) -> String {
    if is_last {
        format!("{}{}{}{}", BOLD, BRIGHT_WHITE, crumb.label, RESET)
    } else if crumb.is_linked() {
        format!("{}{}{}", CYAN, crumb.label, RESET)
    } else {
        crumb.label.clone()
    }
}

/// Format a trail on one line, joined with a dim `>`
pub fn format_trail_ansi(crumbs: &[Crumb]) -> String {
    let separator = format!(" {}>{} ", DIM, RESET);
    let last = crumbs.len().saturating_sub(1);

    crumbs
        .iter()
        .enumerate()
        .map(|(idx, crumb)| format_crumb(crumb, idx == last))
        .collect::<Vec<_>>()
        .join(&separator)
}

/// Format a bundle: the trail line followed by the link of each crumb
pub fn format_ansi(data: &BreadcrumbOutput) -> String {
    let mut output = String::new();

    output.push_str(&format_trail_ansi(data.breadcrumb.crumbs()));
    output.push('\n');

    for crumb in data.breadcrumb.crumbs() {
        if let Some(link) = &crumb.link {
            output.push_str(&format!(
                "  {}{}{} {}{}{}{}\n",
                DIM, crumb.label, RESET, UNDERLINE, BRIGHT_BLUE, link, RESET
            ));
        }
    }

    output
}
