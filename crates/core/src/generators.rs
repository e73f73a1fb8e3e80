//! Per-post-type crumb generators
//!
//! A generator registered for a post type replaces the default crumbs of that
//! type's single items and archive listings.

use crate::models::{ContentItem, NamedLink, RequestState};
use crate::store::ContentStore;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Inputs handed to a generator
pub struct GeneratorContext<'a> {
    /// Post type the generator was looked up for
    pub post_type: &'a str,

    /// The item being shown, absent on archive listings
    pub item: Option<&'a ContentItem>,

    pub request: &'a RequestState,

    pub store: &'a dyn ContentStore,
}

/// Produces the `{name, link}` pairs for a post type
pub trait CrumbGenerator: Send + Sync {
    fn generate(&self, ctx: &GeneratorContext<'_>) -> Vec<NamedLink>;
}

impl<F> CrumbGenerator for F
where
    F: Fn(&GeneratorContext<'_>) -> Vec<NamedLink> + Send + Sync,
{
    fn generate(&self, ctx: &GeneratorContext<'_>) -> Vec<NamedLink> {
        self(ctx)
    }
}

/// Generator returning a fixed list of crumbs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticGenerator {
    crumbs: Vec<NamedLink>,
}

impl StaticGenerator {
    pub fn new(crumbs: Vec<NamedLink>) -> Self {
        Self { crumbs }
    }
}

impl CrumbGenerator for StaticGenerator {
    fn generate(&self, _ctx: &GeneratorContext<'_>) -> Vec<NamedLink> {
        self.crumbs.clone()
    }
}

/// Post type key to generator mapping
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    generators: HashMap<String, Arc<dyn CrumbGenerator>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a generator; a later registration for the same key replaces it
    pub fn register(&mut self, post_type: impl Into<String>, generator: Arc<dyn CrumbGenerator>) {
        let post_type = post_type.into();
        if self.generators.insert(post_type.clone(), generator).is_some() {
            tracing::debug!(%post_type, "replaced crumb generator");
        }
    }

    pub fn get(&self, post_type: &str) -> Option<&Arc<dyn CrumbGenerator>> {
        self.generators.get(post_type)
    }

    pub fn contains(&self, post_type: &str) -> bool {
        self.generators.contains_key(post_type)
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.generators.keys().collect();
        keys.sort();
        f.debug_struct("GeneratorRegistry").field("post_types", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PageContext;
    use crate::test_support::fixture_store;

    #[test]
    fn test_last_registration_wins() {
        let store = fixture_store();
        let request = RequestState::new(PageContext::NotFound);
        let ctx = GeneratorContext {
            post_type: "event",
            item: None,
            request: &request,
            store: &store,
        };

        let mut registry = GeneratorRegistry::new();
        registry.register(
            "event",
            Arc::new(StaticGenerator::new(vec![NamedLink::linked("Old", "/old")])),
        );
        registry.register(
            "event",
            Arc::new(StaticGenerator::new(vec![NamedLink::linked("Events", "/events")])),
        );

        assert_eq!(registry.len(), 1);
        let crumbs = registry.get("event").unwrap().generate(&ctx);
        assert_eq!(crumbs, vec![NamedLink::linked("Events", "/events")]);
    }

    #[test]
    fn test_fn_generator_sees_item() {
        let store = fixture_store();
        let request = RequestState::new(PageContext::NotFound);
        let item = store_item(&store, 300);
        let ctx = GeneratorContext {
            post_type: "event",
            item: Some(&item),
            request: &request,
            store: &store,
        };

        let generator: Arc<dyn CrumbGenerator> = Arc::new(title_only);
        assert_eq!(generator.generate(&ctx)[0].name, "Rust Meetup");
    }

    fn title_only(ctx: &GeneratorContext<'_>) -> Vec<NamedLink> {
        vec![NamedLink::new(
            ctx.item.map(|i| i.title.clone()).unwrap_or_default(),
            None,
        )]
    }

    fn store_item(store: &dyn ContentStore, id: u64) -> ContentItem {
        store.item(id).unwrap()
    }
}
