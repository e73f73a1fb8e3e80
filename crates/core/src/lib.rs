//! mta_site_breadcrumbs_core - Core library for site breadcrumb trails
//!
//! This crate turns a resolved page request (what kind of page is shown, which
//! item or term, which page of results) into an ordered breadcrumb trail,
//! looking up titles, links and term hierarchies in a content store.
//!
//! # Features
//!
//! - **Rule Dispatch**: Exactly one rule per request, chosen by a fixed
//!   priority order; search and pagination crumbs are appended after it.
//! - **Term Hierarchies**: Ancestor chains for hierarchical taxonomies and
//!   page trees, tolerant of missing or cyclic parents.
//! - **Extension Points**: Per-post-type crumb generators plus hooks for the
//!   home URL, the main product term, endpoints and post-processing.
//! - **Multiple Output Formats**: JSON, YAML, ANSI, plain summary and HTML.
//!
//! # Example
//!
//! ```rust,no_run
//! use mta_site_breadcrumbs_core::{format_output, OutputFormat, PageContext, RequestState, SiteFile, TrailBuilder};
//! use std::path::Path;
//!
//! let site = SiteFile::load(Path::new("site.yaml")).unwrap();
//! let store = site.build_store();
//! let builder = TrailBuilder::new(&store, site.settings.clone()).with_markup(site.markup.clone());
//!
//! let request = RequestState::new(PageContext::Page { id: 42 });
//! let output = builder.breadcrumbs(&request);
//! println!("{}", format_output(&output, OutputFormat::Summary).unwrap());
//! ```

pub mod ancestors;
pub mod config;
pub mod engine;
pub mod generators;
pub mod models;
pub mod output;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenience
pub use ancestors::AncestorResolver;
pub use config::{ConfigError, MarkupConfig, SiteFile, SiteSettings};
pub use engine::{
    select_rule, strip_query_param, BatchError, EndpointResolver, HomeUrlFilter, Hooks,
    MainTermFilter, PostProcessFilter, Rule, TrailBuilder, RULE_PRIORITY,
};
pub use generators::{CrumbGenerator, GeneratorContext, GeneratorRegistry, StaticGenerator};
pub use models::{
    ArchiveKind, Author, BreadcrumbOutput, ContentItem, Crumb, ItemId, NamedLink, PageContext,
    PostTypeInfo, RequestState, TaxonomyInfo, Term, TermId, Trail, UserId,
};
pub use output::{
    format_ancestors, format_output, format_output_batch, render_html, FormatError, OutputFormat,
};
pub use store::{ContentSnapshot, ContentStore, InMemoryStore, StoreError, TermAssignment};
