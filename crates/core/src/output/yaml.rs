//! YAML output formatter

use crate::models::BreadcrumbOutput;
use crate::output::FormatError;

/// Format a breadcrumb bundle as YAML
pub fn format_yaml(data: &BreadcrumbOutput) -> Result<String, FormatError> {
    serde_yaml::to_string(data).map_err(FormatError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_output;

    #[test]
    fn test_format_yaml() {
        let result = format_yaml(&sample_output());
        assert!(result.is_ok());
        let yaml = result.unwrap();
        assert!(yaml.contains("breadcrumb:"));
        assert!(yaml.contains("wrap_before:"));
        assert!(yaml.contains("Storm Warning"));
    }
}
