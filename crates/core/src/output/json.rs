//! JSON output formatter

use crate::models::BreadcrumbOutput;
use crate::output::FormatError;

/// Format a breadcrumb bundle as pretty-printed JSON
pub fn format_json(data: &BreadcrumbOutput) -> Result<String, FormatError> {
    serde_json::to_string_pretty(data).map_err(FormatError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_output;

    #[test]
    fn test_format_json() {
        let json = format_json(&sample_output()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["breadcrumb"][0]["label"], "Home");
        assert_eq!(value["breadcrumb"][2]["label"], "Storm Warning");
        // Linkless crumbs carry no link key at all
        assert!(value["breadcrumb"][2].get("link").is_none());
        assert_eq!(value["delimiter"], " / ");
    }
}
