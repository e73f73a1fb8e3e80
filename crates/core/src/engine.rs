//! Breadcrumb engine module
//!
//! This module provides [`TrailBuilder`], which turns a resolved request into a
//! breadcrumb trail. Exactly one rule runs per request, picked from
//! [`RULE_PRIORITY`] first-match-wins; search and pagination crumbs are
//! appended after it.

use crate::ancestors::AncestorResolver;
use crate::config::{MarkupConfig, SiteSettings};
use crate::generators::{CrumbGenerator, GeneratorContext, GeneratorRegistry};
use crate::models::{
    ArchiveKind, BreadcrumbOutput, ContentItem, Crumb, ItemId, PageContext, RequestState, Term,
    TermId, Trail, UserId,
};
use crate::store::ContentStore;
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

/// Batch resolution errors
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),
}

/// Transforms the configured home URL before it is used as a link
pub type HomeUrlFilter = dyn Fn(&str) -> String + Send + Sync;

/// Transforms the finished crumb list
pub type PostProcessFilter = dyn Fn(Vec<Crumb>, &RequestState) -> Vec<Crumb> + Send + Sync;

/// Picks the main category among a product's terms
pub type MainTermFilter = dyn Fn(&[Term]) -> Option<Term> + Send + Sync;

/// Resolves the title of the endpoint shown on a page, if any
pub type EndpointResolver = dyn Fn(&RequestState) -> Option<String> + Send + Sync;

/// Optional extension points; every unset hook behaves as identity / no-op
#[derive(Clone, Default)]
pub struct Hooks {
    pub home_url: Option<Arc<HomeUrlFilter>>,
    pub post_process: Option<Arc<PostProcessFilter>>,
    pub main_term: Option<Arc<MainTermFilter>>,
    pub endpoint: Option<Arc<EndpointResolver>>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("home_url", &self.home_url.is_some())
            .field("post_process", &self.post_process.is_some())
            .field("main_term", &self.main_term.is_some())
            .field("endpoint", &self.endpoint.is_some())
            .finish()
    }
}

/// Crumb-generation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Home,
    NotFound,
    Attachment,
    Single,
    ProductCategory,
    ProductTag,
    Shop,
    Page,
    PostTypeArchive,
    Category,
    Tag,
    Author,
    Date,
    Taxonomy,
}

/// Rule evaluation order; the first rule whose predicate holds wins
pub const RULE_PRIORITY: [Rule; 14] = [
    Rule::Home,
    Rule::NotFound,
    Rule::Attachment,
    Rule::Single,
    Rule::ProductCategory,
    Rule::ProductTag,
    Rule::Shop,
    Rule::Page,
    Rule::PostTypeArchive,
    Rule::Category,
    Rule::Tag,
    Rule::Author,
    Rule::Date,
    Rule::Taxonomy,
];

impl Rule {
    /// Check whether this rule applies to a context
    pub fn matches(self, context: &PageContext, settings: &SiteSettings) -> bool {
        match (self, context) {
            (Rule::Home, PageContext::Home) => true,
            (Rule::NotFound, PageContext::NotFound) => true,
            (Rule::Attachment, PageContext::Attachment { .. }) => true,
            (Rule::Single, PageContext::SinglePost { .. }) => true,
            (
                Rule::ProductCategory,
                PageContext::ArchiveListing {
                    archive: ArchiveKind::ProductCategory,
                    ..
                },
            ) => true,
            (
                Rule::ProductTag,
                PageContext::ArchiveListing {
                    archive: ArchiveKind::ProductTag,
                    ..
                },
            ) => true,
            (Rule::Shop, PageContext::PostTypeArchive { post_type }) => {
                *post_type == settings.shop_post_type
            }
            (Rule::Page, PageContext::Page { .. }) => true,
            (Rule::PostTypeArchive, PageContext::PostTypeArchive { .. }) => true,
            (Rule::Category, PageContext::Category { .. }) => true,
            (Rule::Tag, PageContext::Tag { .. }) => true,
            (Rule::Author, PageContext::Author { .. }) => true,
            (Rule::Date, PageContext::Date { .. }) => true,
            (Rule::Taxonomy, PageContext::Taxonomy { .. }) => true,
            _ => false,
        }
    }
}

/// Pick the rule for a context
pub fn select_rule(context: &PageContext, settings: &SiteSettings) -> Option<Rule> {
    RULE_PRIORITY
        .into_iter()
        .find(|rule| rule.matches(context, settings))
}

/// Builds breadcrumb trails for requests against one content store
pub struct TrailBuilder<'a> {
    store: &'a dyn ContentStore,
    settings: SiteSettings,
    markup: MarkupConfig,
    generators: GeneratorRegistry,
    hooks: Hooks,
}

impl<'a> TrailBuilder<'a> {
    /// Create a builder with default markup and no hooks
    pub fn new(store: &'a dyn ContentStore, settings: SiteSettings) -> Self {
        Self {
            store,
            settings,
            markup: MarkupConfig::default(),
            generators: GeneratorRegistry::new(),
            hooks: Hooks::default(),
        }
    }

    /// Set markup config (builder pattern)
    pub fn with_markup(mut self, markup: MarkupConfig) -> Self {
        self.markup = markup;
        self
    }

    /// Set all hooks at once (builder pattern)
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Set home URL filter (builder pattern)
    pub fn with_home_url_filter(
        mut self,
        filter: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.hooks.home_url = Some(Arc::new(filter));
        self
    }

    /// Set post-processing filter (builder pattern)
    pub fn with_post_process(
        mut self,
        filter: impl Fn(Vec<Crumb>, &RequestState) -> Vec<Crumb> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.post_process = Some(Arc::new(filter));
        self
    }

    /// Set main product term filter (builder pattern)
    pub fn with_main_term_filter(
        mut self,
        filter: impl Fn(&[Term]) -> Option<Term> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.main_term = Some(Arc::new(filter));
        self
    }

    /// Set endpoint resolver (builder pattern)
    pub fn with_endpoint_resolver(
        mut self,
        resolver: impl Fn(&RequestState) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.endpoint = Some(Arc::new(resolver));
        self
    }

    /// Register a generator for a post type; the last one registered wins
    pub fn register_generator(
        &mut self,
        post_type: impl Into<String>,
        generator: Arc<dyn CrumbGenerator>,
    ) -> &mut Self {
        self.generators.register(post_type, generator);
        self
    }

    pub fn settings(&self) -> &SiteSettings {
        &self.settings
    }

    pub fn markup(&self) -> &MarkupConfig {
        &self.markup
    }

    pub fn generators(&self) -> &GeneratorRegistry {
        &self.generators
    }

    /// Home link after the home URL filter
    pub fn home_url(&self) -> String {
        match &self.hooks.home_url {
            Some(filter) => filter(&self.settings.home_url),
            None => self.settings.home_url.clone(),
        }
    }

    /// Generate the breadcrumb trail for a request
    #[instrument(skip_all, fields(context = request.context.label()))]
    pub fn generate(&self, request: &RequestState) -> Trail {
        let mut run = TrailRun {
            builder: self,
            request,
            trail: Trail::new(),
        };

        if let Some(home) = self.markup.home_label() {
            let link = self.home_url();
            run.trail.push(home, Some(&link));
        }

        if request.is_front_page && !request.is_paged() {
            debug!("front page, skipping rule dispatch");
            return self.finish(run.trail, request);
        }

        match select_rule(&request.context, &self.settings) {
            Some(rule) => {
                debug!(?rule, "dispatching rule");
                run.apply(rule);
            }
            None => debug!("no rule matched"),
        }

        run.search_trail();
        run.paged_trail();

        self.finish(run.trail, request)
    }

    /// Generate the trail and bundle it with the markup settings
    pub fn breadcrumbs(&self, request: &RequestState) -> BreadcrumbOutput {
        BreadcrumbOutput {
            delimiter: self.markup.delimiter.clone(),
            wrap_before: self.markup.wrap_before_for(request.context.is_single()),
            wrap_after: self.markup.wrap_after.clone(),
            before: self.markup.before.clone(),
            after: self.markup.after.clone(),
            home: self.markup.home_label().map(str::to_string),
            breadcrumb: self.generate(request),
        }
    }

    /// Resolve many independent requests, in parallel unless `threads == 1`.
    ///
    /// Results keep the order of `requests`.
    pub fn breadcrumbs_batch(
        &self,
        requests: &[RequestState],
        threads: usize,
    ) -> Result<Vec<BreadcrumbOutput>, BatchError> {
        if threads == 1 {
            return Ok(requests.iter().map(|r| self.breadcrumbs(r)).collect());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| BatchError::ThreadPoolError(e.to_string()))?;

        Ok(pool.install(|| requests.par_iter().map(|r| self.breadcrumbs(r)).collect()))
    }

    fn finish(&self, trail: Trail, request: &RequestState) -> Trail {
        match &self.hooks.post_process {
            Some(filter) => Trail::from(filter(trail.into_crumbs(), request)),
            None => trail,
        }
    }

    fn main_term(&self, terms: &[Term]) -> Option<Term> {
        match &self.hooks.main_term {
            Some(filter) => filter(terms),
            None => terms.first().cloned(),
        }
    }
}

impl fmt::Debug for TrailBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrailBuilder")
            .field("settings", &self.settings)
            .field("markup", &self.markup)
            .field("generators", &self.generators)
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// Per-request accumulator
struct TrailRun<'b, 'a> {
    builder: &'b TrailBuilder<'a>,
    request: &'b RequestState,
    trail: Trail,
}

impl<'b, 'a> TrailRun<'b, 'a> {
    fn store(&self) -> &'a dyn ContentStore {
        self.builder.store
    }

    fn settings(&self) -> &'b SiteSettings {
        &self.builder.settings
    }

    fn apply(&mut self, rule: Rule) {
        let request = self.request;
        match (rule, &request.context) {
            (Rule::Home, _) => self.add_home(),
            (Rule::NotFound, _) => {
                self.trail.push("Error 404", None);
            }
            (Rule::Attachment, PageContext::Attachment { id }) => self.add_attachment(*id),
            (Rule::Single, PageContext::SinglePost { id, post_type }) => {
                self.add_single_post(*id, post_type)
            }
            (Rule::ProductCategory, PageContext::ArchiveListing { term_id, .. }) => {
                self.add_product_category(*term_id)
            }
            (Rule::ProductTag, PageContext::ArchiveListing { term_id, .. }) => {
                self.add_product_tag(*term_id)
            }
            (Rule::Shop, _) => self.add_shop(),
            (Rule::Page, PageContext::Page { id }) => self.add_page(*id),
            (Rule::PostTypeArchive, PageContext::PostTypeArchive { post_type }) => {
                self.add_post_type_archive(post_type)
            }
            (Rule::Category, PageContext::Category { term_id }) => self.add_category(*term_id),
            (Rule::Tag, PageContext::Tag { term_id }) => self.add_tag(*term_id),
            (Rule::Author, PageContext::Author { user_id }) => self.add_author(*user_id),
            (Rule::Date, PageContext::Date { year, month, day }) => {
                self.add_date(*year, *month, *day)
            }
            (Rule::Taxonomy, PageContext::Taxonomy { term_id, taxonomy }) => {
                self.add_taxonomy(*term_id, taxonomy)
            }
            (rule, context) => {
                warn!(?rule, context = context.label(), "rule does not fit context");
            }
        }
    }

    fn push_ancestors(&mut self, term_id: TermId, taxonomy: &str) {
        let ancestors = AncestorResolver::new(self.store()).ancestors(term_id, taxonomy);
        for ancestor in &ancestors {
            self.trail.push_named(ancestor);
        }
    }

    /// Run the registered generator for a post type, if any
    fn apply_generator(&mut self, post_type: &str, item: Option<&ContentItem>) -> bool {
        let builder = self.builder;
        let Some(generator) = builder.generators.get(post_type) else {
            return false;
        };

        let ctx = GeneratorContext {
            post_type,
            item,
            request: self.request,
            store: self.store(),
        };

        let crumbs = generator.generate(&ctx);
        debug!(post_type, count = crumbs.len(), "using registered generator");
        for crumb in &crumbs {
            self.trail.push_named(crumb);
        }
        true
    }

    fn add_home(&mut self) {
        let title = self
            .settings()
            .posts_page
            .and_then(|id| self.store().item(id))
            .map(|page| page.title);

        if let Some(title) = title {
            self.trail.push(&title, None);
        }
    }

    fn add_attachment(&mut self, id: ItemId) {
        let Some(attachment) = self.store().item(id) else {
            debug!(id, "attachment not found");
            return;
        };

        let parent = attachment
            .parent_id
            .filter(|&p| p != 0)
            .and_then(|p| self.store().item(p));

        if let Some(parent) = parent {
            let link = parent.permalink.clone();
            self.add_single(&parent, &parent.post_type, Some(&link));
        }

        self.trail.push(&attachment.title, Some(&attachment.permalink));
    }

    fn add_single_post(&mut self, id: ItemId, post_type: &str) {
        match self.store().item(id) {
            Some(item) => {
                let link = item.permalink.clone();
                self.add_single(&item, &item.post_type, Some(&link));
            }
            None => {
                // The item is gone, but a generator can still speak for its type
                debug!(id, post_type, "single item not found");
                self.apply_generator(post_type, None);
            }
        }
    }

    fn add_single(&mut self, item: &ContentItem, post_type: &str, permalink: Option<&str>) {
        if self.apply_generator(post_type, Some(item)) {
            return;
        }

        let settings = self.settings();
        if post_type == settings.shop_post_type {
            let taxonomy = settings.product_category_taxonomy.clone();
            let terms = self.store().item_terms(item.id, &taxonomy);
            if let Some(main) = self.builder.main_term(&terms) {
                self.push_ancestors(main.id, &taxonomy);
                self.trail.push(&main.name, Some(&main.link));
            }
        } else if post_type != settings.default_post_type {
            if let Some(info) = self.store().post_type(post_type) {
                self.trail.push(&info.singular_label, info.archive_link.as_deref());
            }
        } else {
            let taxonomy = settings.category_taxonomy.clone();
            if let Some(category) = self.store().item_terms(item.id, &taxonomy).into_iter().next() {
                self.push_ancestors(category.id, &taxonomy);
                self.trail.push(&category.name, Some(&category.link));
            }
        }

        self.trail.push(&item.title, permalink);
    }

    fn add_page(&mut self, id: ItemId) {
        let Some(page) = self.store().item(id) else {
            debug!(id, "page not found");
            return;
        };

        let ancestors =
            AncestorResolver::new(self.store()).page_ancestors(page.id, page.parent_id);
        for ancestor in &ancestors {
            self.trail.push_named(ancestor);
        }

        self.trail.push(&page.title, Some(&page.permalink));
        self.endpoint_trail();
    }

    fn endpoint_trail(&mut self) {
        let title = self
            .builder
            .hooks
            .endpoint
            .as_ref()
            .and_then(|resolve| resolve(self.request));

        if let Some(title) = title {
            self.trail.push(&title, None);
        }
    }

    fn queried_term(&self, term_id: Option<TermId>, taxonomy: &str) -> Option<Term> {
        let term_id = term_id?;
        match self.store().term(term_id, taxonomy) {
            Ok(term) => Some(term),
            Err(e) => {
                debug!(term_id, taxonomy, error = %e, "queried term not found");
                None
            }
        }
    }

    fn add_product_category(&mut self, term_id: Option<TermId>) {
        let taxonomy = self.settings().product_category_taxonomy.clone();
        let Some(term) = self.queried_term(term_id, &taxonomy) else {
            return;
        };

        self.push_ancestors(term.id, &taxonomy);
        self.trail.push(&term.name, None);
    }

    fn add_product_tag(&mut self, term_id: Option<TermId>) {
        let taxonomy = self.settings().product_tag_taxonomy.clone();
        if let Some(term) = self.queried_term(term_id, &taxonomy) {
            self.trail
                .push(&format!("Products tagged \"{}\"", term.name), None);
        }
    }

    fn add_shop(&mut self) {
        let post_type = self.settings().shop_post_type.clone();
        if self.apply_generator(&post_type, None) {
            return;
        }

        if self.settings().shop_is_front_page() {
            debug!("shop is the front page, no shop crumb");
            return;
        }

        let info = self.store().post_type(&post_type);
        let name = self
            .settings()
            .shop_page
            .and_then(|id| self.store().item(id))
            .map(|page| page.title)
            .filter(|title| !title.trim().is_empty())
            .or_else(|| info.as_ref().map(|i| i.singular_label.clone()));

        if let Some(name) = name {
            let link = info.and_then(|i| i.archive_link);
            self.trail.push(&name, link.as_deref());
        }
    }

    fn add_post_type_archive(&mut self, post_type: &str) {
        if self.apply_generator(post_type, None) {
            return;
        }

        if let Some(info) = self.store().post_type(post_type) {
            self.trail.push(&info.singular_label, info.archive_link.as_deref());
        }
    }

    fn add_category(&mut self, term_id: TermId) {
        let taxonomy = self.settings().category_taxonomy.clone();
        let Some(category) = self.queried_term(Some(term_id), &taxonomy) else {
            return;
        };

        // A child category is listed after its parent's ancestors and then
        // once more as the archive title, as storefront trails do
        if let Some(parent_id) = category.parent_id.filter(|_| category.has_parent()) {
            self.push_ancestors(parent_id, &taxonomy);
            self.trail.push(&category.name, Some(&category.link));
        }

        self.trail.push(&category.name, Some(&category.link));
    }

    fn add_tag(&mut self, term_id: TermId) {
        let taxonomy = self.settings().tag_taxonomy.clone();
        if let Some(tag) = self.queried_term(Some(term_id), &taxonomy) {
            self.trail
                .push(&format!("Posts tagged \"{}\"", tag.name), Some(&tag.link));
        }
    }

    fn add_author(&mut self, user_id: UserId) {
        match self.store().author(user_id) {
            Some(author) => {
                self.trail
                    .push(&format!("Author: {}", author.display_name), None);
            }
            None => debug!(user_id, "author not found"),
        }
    }

    fn add_date(&mut self, year: Option<i32>, month: Option<u32>, day: Option<u32>) {
        let Some(year) = year else {
            return;
        };

        let base = self.settings().home_base().to_string();
        self.trail
            .push(&year.to_string(), Some(&format!("{base}/{year}/")));

        let Some(month) = month else {
            return;
        };

        let Some(month_name) = month_name(month) else {
            debug!(month, "invalid month in date archive");
            return;
        };

        self.trail
            .push(month_name, Some(&format!("{base}/{year}/{month:02}/")));

        if let Some(day) = day {
            self.trail.push(&format!("{day:02}"), None);
        }
    }

    fn add_taxonomy(&mut self, term_id: TermId, taxonomy: &str) {
        if let Some(info) = self.store().taxonomy(taxonomy) {
            self.trail.push(&info.plural_label, None);
        }

        let Some(term) = self.queried_term(Some(term_id), taxonomy) else {
            return;
        };

        if term.has_parent() {
            self.push_ancestors(term.id, taxonomy);
        }

        self.trail.push(&term.name, Some(&term.link));
    }

    fn search_trail(&mut self) {
        let request = self.request;
        let Some(query) = &request.search_query else {
            return;
        };

        let label = format!("Search results for \"{query}\"");
        let link = if request.current_url.is_empty() {
            None
        } else {
            Some(strip_query_param(
                &request.current_url,
                &self.settings().pagination_param,
            ))
        };

        self.trail.push(&label, link.as_deref());
    }

    fn paged_trail(&mut self) {
        if let Some(page) = self.request.page_number() {
            self.trail.push(&format!("Page {page}"), None);
        }
    }
}

/// English month name for a 1-based month number
fn month_name(month: u32) -> Option<&'static str> {
    let month = u8::try_from(month).ok()?;
    chrono::Month::try_from(month).ok().map(|m| m.name())
}

/// Remove a query parameter from a URL, keeping the rest of the query.
///
/// Other pairs keep their original encoding. Relative URLs stay relative;
/// anything unparsable comes back unchanged.
pub fn strip_query_param(raw: &str, param: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            let query = url.query().map(|q| without_param(q, param));
            url.set_query(query.as_deref().filter(|q| !q.is_empty()));
            url.to_string()
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let (rest, fragment) = match raw.split_once('#') {
                Some((rest, fragment)) => (rest, Some(fragment)),
                None => (raw, None),
            };

            let mut stripped = match rest.split_once('?') {
                Some((path, query)) => {
                    let query = without_param(query, param);
                    if query.is_empty() {
                        path.to_string()
                    } else {
                        format!("{path}?{query}")
                    }
                }
                None => rest.to_string(),
            };

            if let Some(fragment) = fragment {
                stripped.push('#');
                stripped.push_str(fragment);
            }
            stripped
        }
        Err(e) => {
            warn!(url = raw, error = %e, "unparsable current URL");
            raw.to_string()
        }
    }
}

/// Drop the pairs of a raw query string whose decoded key is `param`
fn without_param(query: &str, param: &str) -> String {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            url::form_urlencoded::parse(pair.as_bytes())
                .next()
                .map_or(true, |(key, _)| key != param)
        })
        .collect::<Vec<_>>()
        .join("&")
}
