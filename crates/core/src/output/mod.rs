//! Output formatting module
//!
//! This module provides formatters for JSON, YAML, ANSI, plain summary and
//! HTML output of breadcrumb bundles.

pub mod ansi;
mod html;
mod json;
mod yaml;

pub use ansi::{format_ansi, format_trail_ansi};
pub use html::render_html;
pub use json::format_json;
pub use yaml::format_yaml;

use crate::models::{BreadcrumbOutput, NamedLink};
use thiserror::Error;

/// Output format errors
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Formatting error: {0}")]
    FormattingError(String),
}

/// Available output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// JSON format
    #[default]
    Json,
    /// YAML format
    Yaml,
    /// ANSI colored text
    Ansi,
    /// Plain text summary
    Summary,
    /// Rendered HTML markup
    Html,
}

/// Format a breadcrumb bundle in the specified format
pub fn format_output(data: &BreadcrumbOutput, format: OutputFormat) -> Result<String, FormatError> {
    match format {
        OutputFormat::Json => format_json(data),
        OutputFormat::Yaml => format_yaml(data),
        OutputFormat::Ansi => Ok(format_ansi(data)),
        OutputFormat::Summary => Ok(format_summary(data)),
        OutputFormat::Html => Ok(render_html(data)),
    }
}

/// Format several bundles, as a single document for JSON / YAML and one
/// entry per line otherwise
pub fn format_output_batch(
    data: &[BreadcrumbOutput],
    format: OutputFormat,
) -> Result<String, FormatError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(data).map_err(FormatError::from),
        OutputFormat::Yaml => serde_yaml::to_string(data).map_err(FormatError::from),
        OutputFormat::Ansi => Ok(data
            .iter()
            .map(|d| format_trail_ansi(d.breadcrumb.crumbs()))
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Summary => Ok(data
            .iter()
            .map(|d| d.breadcrumb.path())
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Html => Ok(data.iter().map(render_html).collect::<Vec<_>>().join("\n")),
    }
}

/// Format a list of ancestors (no markup settings involved)
pub fn format_ancestors(data: &[NamedLink], format: OutputFormat) -> Result<String, FormatError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(data).map_err(FormatError::from),
        OutputFormat::Yaml => serde_yaml::to_string(data).map_err(FormatError::from),
        OutputFormat::Html => Err(FormatError::FormattingError(
            "HTML output needs a full breadcrumb bundle".to_string(),
        )),
        OutputFormat::Ansi | OutputFormat::Summary => Ok(data
            .iter()
            .map(|a| match &a.link {
                Some(link) => format!("{} ({})", a.name, link),
                None => a.name.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Format as plain text summary
fn format_summary(data: &BreadcrumbOutput) -> String {
    let mut output = String::new();

    output.push_str("Breadcrumb Trail\n");
    output.push_str("================\n\n");
    output.push_str(&format!("Path: {}\n", data.breadcrumb.path()));
    output.push_str(&format!("Crumbs: {}\n\n", data.breadcrumb.len()));

    for (idx, crumb) in data.breadcrumb.crumbs().iter().enumerate() {
        match &crumb.link {
            Some(link) => output.push_str(&format!("  {}. {} -> {}\n", idx + 1, crumb.label, link)),
            None => output.push_str(&format!("  {}. {}\n", idx + 1, crumb.label)),
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_output;

    #[test]
    fn test_format_summary() {
        let summary = format_summary(&sample_output());
        assert!(summary.contains("Path: Home > News > Storm Warning"));
        assert!(summary.contains("1. Home -> https://example.com/"));
        assert!(summary.contains("3. Storm Warning\n"));
    }

    #[test]
    fn test_batch_summary_one_line_each() {
        let data = vec![sample_output(), sample_output()];
        let text = format_output_batch(&data, OutputFormat::Summary).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_ancestors_reject_html() {
        let ancestors = vec![NamedLink::linked("News", "/news/")];
        assert!(format_ancestors(&ancestors, OutputFormat::Html).is_err());
        assert_eq!(
            format_ancestors(&ancestors, OutputFormat::Summary).unwrap(),
            "News (/news/)"
        );
    }
}
