//! Configuration module for breadcrumb generation
//!
//! This module provides the site settings the rules consult, the markup
//! settings that are passed through to renderers, and loading of site files
//! (settings plus a content snapshot) from YAML or JSON.

use crate::models::{ItemId, NamedLink};
use crate::store::{ContentSnapshot, InMemoryStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Unsupported site file extension: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Site-wide settings consulted by the trail rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    /// Root URL of the site, used for the home crumb and date links
    pub home_url: String,

    /// Page shown as the static front page
    pub page_on_front: Option<ItemId>,

    /// Page acting as the blog posts index
    pub posts_page: Option<ItemId>,

    /// Page acting as the shop listing
    pub shop_page: Option<ItemId>,

    /// Post type whose archive is the shop
    pub shop_post_type: String,

    pub product_category_taxonomy: String,

    pub product_tag_taxonomy: String,

    /// Taxonomy of plain post categories
    pub category_taxonomy: String,

    pub tag_taxonomy: String,

    /// Post type that gets category crumbs instead of an archive crumb
    pub default_post_type: String,

    /// Query parameter carrying the page number
    pub pagination_param: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            home_url: "/".to_string(),
            page_on_front: None,
            posts_page: None,
            shop_page: None,
            shop_post_type: "product".to_string(),
            product_category_taxonomy: "product_cat".to_string(),
            product_tag_taxonomy: "product_tag".to_string(),
            category_taxonomy: "category".to_string(),
            tag_taxonomy: "post_tag".to_string(),
            default_post_type: "post".to_string(),
            pagination_param: "paged".to_string(),
        }
    }
}

impl SiteSettings {
    /// Set home URL (builder pattern)
    pub fn with_home_url(mut self, url: impl Into<String>) -> Self {
        self.home_url = url.into();
        self
    }

    /// Set front page (builder pattern)
    pub fn with_page_on_front(mut self, page: Option<ItemId>) -> Self {
        self.page_on_front = page;
        self
    }

    /// Set posts page (builder pattern)
    pub fn with_posts_page(mut self, page: Option<ItemId>) -> Self {
        self.posts_page = page;
        self
    }

    /// Set shop page (builder pattern)
    pub fn with_shop_page(mut self, page: Option<ItemId>) -> Self {
        self.shop_page = page;
        self
    }

    /// Check if the shop listing is also the front page
    pub fn shop_is_front_page(&self) -> bool {
        matches!((self.shop_page, self.page_on_front), (Some(s), Some(f)) if s == f)
    }

    /// Home URL without a trailing slash, for building child links
    pub fn home_base(&self) -> &str {
        self.home_url.trim_end_matches('/')
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        let keys = [
            ("shop_post_type", &self.shop_post_type),
            ("product_category_taxonomy", &self.product_category_taxonomy),
            ("product_tag_taxonomy", &self.product_tag_taxonomy),
            ("category_taxonomy", &self.category_taxonomy),
            ("tag_taxonomy", &self.tag_taxonomy),
            ("default_post_type", &self.default_post_type),
            ("pagination_param", &self.pagination_param),
        ];

        for (name, value) in keys {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidConfig(format!("{name} must not be empty")));
            }
        }

        Ok(())
    }
}

/// Markup settings forwarded untouched to the output bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    pub delimiter: String,

    /// Opening wrapper; when unset, a `<nav>` is chosen per request
    pub wrap_before: Option<String>,

    pub wrap_after: String,

    pub before: String,

    pub after: String,

    /// Label of the home crumb; `None` or empty disables it
    pub home: Option<String>,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            delimiter: "&nbsp;&#47;&nbsp;".to_string(),
            wrap_before: None,
            wrap_after: "</nav>".to_string(),
            before: String::new(),
            after: String::new(),
            home: Some("Home".to_string()),
        }
    }
}

impl MarkupConfig {
    /// Set home label (builder pattern)
    pub fn with_home(mut self, home: Option<String>) -> Self {
        self.home = home;
        self
    }

    /// Set delimiter (builder pattern)
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Set both wrappers (builder pattern)
    pub fn with_wrap(mut self, before: impl Into<String>, after: impl Into<String>) -> Self {
        self.wrap_before = Some(before.into());
        self.wrap_after = after.into();
        self
    }

    /// Home label, if one is configured and non-empty
    pub fn home_label(&self) -> Option<&str> {
        self.home.as_deref().filter(|h| !h.trim().is_empty())
    }

    /// Opening wrapper for a request; single items get breadcrumb microdata
    pub fn wrap_before_for(&self, single: bool) -> String {
        match &self.wrap_before {
            Some(wrap) => wrap.clone(),
            None if single => r#"<nav class="breadcrumb" itemprop="breadcrumb">"#.to_string(),
            None => r#"<nav class="breadcrumb">"#.to_string(),
        }
    }
}

/// A site file: settings, markup, static generators and content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteFile {
    #[serde(default)]
    pub settings: SiteSettings,

    #[serde(default)]
    pub markup: MarkupConfig,

    /// Fixed crumb lists that replace the default logic per post type
    #[serde(default)]
    pub generators: BTreeMap<String, Vec<NamedLink>>,

    #[serde(flatten)]
    pub content: ContentSnapshot,
}

impl SiteFile {
    /// Load a site file, choosing the parser by extension
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let parse_error = |message: String| ConfigError::ParseError {
            path: path.to_path_buf(),
            message,
        };

        let site: SiteFile = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&raw).map_err(|e| parse_error(e.to_string()))?,
            "json" => serde_json::from_str(&raw).map_err(|e| parse_error(e.to_string()))?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        site.settings.validate()?;
        tracing::debug!(
            ?path,
            items = site.content.items.len(),
            terms = site.content.terms.len(),
            "loaded site file"
        );

        Ok(site)
    }

    /// Build the in-memory store for this site, warning about dangling term parents
    pub fn build_store(&self) -> InMemoryStore {
        let store = InMemoryStore::from_snapshot(self.content.clone());

        let dangling = store.dangling_term_parents();
        if !dangling.is_empty() {
            tracing::warn!(?dangling, "terms reference parents missing from the site file");
        }

        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ContentStore;
    use std::io::Write;
    use tempfile::TempDir;

    const SITE_YAML: &str = r#"
settings:
  home_url: https://example.com/
  shop_page: 2
markup:
  home: Start
generators:
  event:
    - name: Events
      link: /events
items:
  - id: 2
    title: Shop
    permalink: https://example.com/shop/
    post_type: page
terms:
  - id: 5
    taxonomy: category
    name: News
    link: https://example.com/category/news/
"#;

    #[test]
    fn test_settings_defaults() {
        let settings = SiteSettings::default();
        assert_eq!(settings.shop_post_type, "product");
        assert_eq!(settings.pagination_param, "paged");
        assert!(!settings.shop_is_front_page());
    }

    #[test]
    fn test_shop_is_front_page() {
        let settings = SiteSettings::default()
            .with_shop_page(Some(4))
            .with_page_on_front(Some(4));
        assert!(settings.shop_is_front_page());
    }

    #[test]
    fn test_home_label_blank_disables() {
        let markup = MarkupConfig::default().with_home(Some("  ".to_string()));
        assert_eq!(markup.home_label(), None);
        assert_eq!(MarkupConfig::default().home_label(), Some("Home"));
    }

    #[test]
    fn test_wrap_before_defaults() {
        let markup = MarkupConfig::default();
        assert!(markup.wrap_before_for(true).contains("itemprop"));
        assert!(!markup.wrap_before_for(false).contains("itemprop"));

        let custom = markup.with_wrap("<ol>", "</ol>");
        assert_eq!(custom.wrap_before_for(true), "<ol>");
    }

    #[test]
    fn test_load_yaml_site_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site.yaml");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, "{}", SITE_YAML).unwrap();

        let site = SiteFile::load(&path).unwrap();
        assert_eq!(site.settings.home_url, "https://example.com/");
        assert_eq!(site.settings.shop_page, Some(2));
        assert_eq!(site.markup.home_label(), Some("Start"));
        assert_eq!(site.generators["event"][0].name, "Events");

        let store = site.build_store();
        assert_eq!(store.item(2).map(|i| i.title), Some("Shop".to_string()));
        assert!(store.term(5, "category").is_ok());
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site.ini");
        fs::write(&path, "x").unwrap();

        assert!(matches!(
            SiteFile::load(&path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_load_rejects_empty_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site.json");
        fs::write(&path, r#"{"settings": {"tag_taxonomy": ""}}"#).unwrap();

        assert!(matches!(
            SiteFile::load(&path),
            Err(ConfigError::InvalidConfig(_))
        ));
    }
}
