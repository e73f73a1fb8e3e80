//! Data models for site breadcrumbs
//!
//! This module defines the core data structures used throughout the breadcrumbs
//! library: crumbs and trails, the page context a request resolves to, and the
//! content records the store hands back.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Identifier of a post, page, attachment or any other content item
pub type ItemId = u64;

/// Identifier of a taxonomy term
pub type TermId = u64;

/// Identifier of a user (author)
pub type UserId = u64;

/// A single entry in a breadcrumb trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crumb {
    /// Plain-text label (markup stripped)
    pub label: String,

    /// Target URL, absent for crumbs that are not navigable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Crumb {
    /// Create a crumb, stripping markup from the label.
    ///
    /// Returns `None` when the label is empty once stripped. An empty link is
    /// treated as no link.
    pub fn new(label: &str, link: Option<&str>) -> Option<Self> {
        let label = strip_tags(label);
        if label.is_empty() {
            return None;
        }

        Some(Self {
            label,
            link: link.filter(|l| !l.is_empty()).map(str::to_string),
        })
    }

    /// Whether this crumb points somewhere
    pub fn is_linked(&self) -> bool {
        self.link.is_some()
    }
}

/// An ordered, root-first breadcrumb trail
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trail {
    crumbs: Vec<Crumb>,
}

impl Trail {
    /// Create an empty trail
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a crumb built from a label and optional link.
    ///
    /// Labels that are empty after markup stripping are skipped.
    pub fn push(&mut self, label: &str, link: Option<&str>) -> bool {
        match Crumb::new(label, link) {
            Some(crumb) => {
                self.crumbs.push(crumb);
                true
            }
            None => {
                tracing::debug!(label, "skipping crumb with empty label");
                false
            }
        }
    }

    /// Append a `{name, link}` pair as produced by generators and the ancestor walk
    pub fn push_named(&mut self, named: &NamedLink) -> bool {
        self.push(&named.name, named.link.as_deref())
    }

    /// The crumbs, root first
    pub fn crumbs(&self) -> &[Crumb] {
        &self.crumbs
    }

    /// Consume the trail, returning its crumbs
    pub fn into_crumbs(self) -> Vec<Crumb> {
        self.crumbs
    }

    /// Number of crumbs
    pub fn len(&self) -> usize {
        self.crumbs.len()
    }

    /// Whether the trail has no crumbs
    pub fn is_empty(&self) -> bool {
        self.crumbs.is_empty()
    }

    /// The innermost (current) crumb
    pub fn last(&self) -> Option<&Crumb> {
        self.crumbs.last()
    }

    /// Get the formatted path string
    pub fn path(&self) -> String {
        self.crumbs
            .iter()
            .map(|c| c.label.as_str())
            .collect::<Vec<_>>()
            .join(" > ")
    }
}

impl From<Vec<Crumb>> for Trail {
    /// Re-applies the non-empty label rule, so hook output cannot smuggle in
    /// blank crumbs.
    fn from(crumbs: Vec<Crumb>) -> Self {
        let mut trail = Trail::new();
        for crumb in crumbs {
            trail.push(&crumb.label, crumb.link.as_deref());
        }
        trail
    }
}

/// Markup settings bundled with a generated trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreadcrumbOutput {
    pub delimiter: String,
    pub wrap_before: String,
    pub wrap_after: String,
    pub before: String,
    pub after: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<String>,

    pub breadcrumb: Trail,
}

/// A `{name, link}` pair, the unit exchanged with generators and ancestor walks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedLink {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl NamedLink {
    pub fn new(name: impl Into<String>, link: Option<String>) -> Self {
        Self {
            name: name.into(),
            link,
        }
    }

    /// Shorthand for a pair that always has a link
    pub fn linked(name: impl Into<String>, link: impl Into<String>) -> Self {
        Self::new(name, Some(link.into()))
    }
}

/// Kinds of shop archive listings that get dedicated rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveKind {
    ProductCategory,
    ProductTag,
}

/// What the current request is showing.
///
/// Exactly one variant applies per request; the request router picks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageContext {
    /// The blog posts index
    Home,
    NotFound,
    Attachment {
        id: ItemId,
    },
    SinglePost {
        id: ItemId,
        post_type: String,
    },
    Page {
        id: ItemId,
    },
    ArchiveListing {
        archive: ArchiveKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        term_id: Option<TermId>,
    },
    Category {
        term_id: TermId,
    },
    Tag {
        term_id: TermId,
    },
    Taxonomy {
        term_id: TermId,
        taxonomy: String,
    },
    Author {
        user_id: UserId,
    },
    Date {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        year: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        month: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        day: Option<u32>,
    },
    PostTypeArchive {
        post_type: String,
    },
}

impl PageContext {
    /// Get human-readable label for the context kind
    pub fn label(&self) -> &'static str {
        match self {
            PageContext::Home => "home",
            PageContext::NotFound => "404",
            PageContext::Attachment { .. } => "attachment",
            PageContext::SinglePost { .. } => "single",
            PageContext::Page { .. } => "page",
            PageContext::ArchiveListing {
                archive: ArchiveKind::ProductCategory,
                ..
            } => "product category",
            PageContext::ArchiveListing {
                archive: ArchiveKind::ProductTag,
                ..
            } => "product tag",
            PageContext::Category { .. } => "category",
            PageContext::Tag { .. } => "tag",
            PageContext::Taxonomy { .. } => "taxonomy",
            PageContext::Author { .. } => "author",
            PageContext::Date { .. } => "date",
            PageContext::PostTypeArchive { .. } => "post type archive",
        }
    }

    /// Check if this context shows a single post
    pub fn is_single(&self) -> bool {
        matches!(self, PageContext::SinglePost { .. })
    }
}

/// Everything about the current request the trail depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestState {
    pub context: PageContext,

    /// The request is for the site's front page
    #[serde(default)]
    pub is_front_page: bool,

    /// Requested page number of a paginated view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paged: Option<u32>,

    /// Search query, present only on search requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,

    /// Full URL of the current request
    #[serde(default)]
    pub current_url: String,

    /// Endpoint slug (account sub-pages and the like)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl RequestState {
    /// Create a request for the given context
    pub fn new(context: PageContext) -> Self {
        Self {
            context,
            is_front_page: false,
            paged: None,
            search_query: None,
            current_url: String::new(),
            endpoint: None,
        }
    }

    /// Mark the request as the front page (builder pattern)
    pub fn with_front_page(mut self, front: bool) -> Self {
        self.is_front_page = front;
        self
    }

    /// Set page number (builder pattern)
    pub fn with_paged(mut self, page: u32) -> Self {
        self.paged = Some(page);
        self
    }

    /// Set search query (builder pattern)
    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    /// Set current URL (builder pattern)
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.current_url = url.into();
        self
    }

    /// Set endpoint slug (builder pattern)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Page number when the request is past the first page
    pub fn page_number(&self) -> Option<u32> {
        self.paged.filter(|&p| p > 1)
    }

    /// Check if the request is paginated
    pub fn is_paged(&self) -> bool {
        self.page_number().is_some()
    }

    /// Check if the request is a search
    pub fn is_search(&self) -> bool {
        self.search_query.is_some()
    }
}

/// A post, page, attachment or custom item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ItemId,
    pub title: String,
    pub permalink: String,
    pub post_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ItemId>,
}

/// A taxonomy term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    pub taxonomy: String,
    pub name: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TermId>,
}

impl Term {
    /// Check if the term sits below another term
    pub fn has_parent(&self) -> bool {
        self.parent_id.is_some_and(|p| p != 0)
    }

    pub fn as_named_link(&self) -> NamedLink {
        NamedLink::linked(&self.name, &self.link)
    }
}

/// Taxonomy metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyInfo {
    pub key: String,
    pub plural_label: String,
    #[serde(default)]
    pub hierarchical: bool,
}

/// Post type metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTypeInfo {
    pub key: String,
    pub singular_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_link: Option<String>,
}

/// A content author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    pub display_name: String,
}

/// Remove markup tags and trim surrounding whitespace
pub fn strip_tags(text: &str) -> String {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    let tags = TAGS.get_or_init(|| Regex::new(r"<[^\s>][^>]*>").expect("static tag pattern"));
    tags.replace_all(text, "").trim().to_string()
}
