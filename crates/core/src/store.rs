//! Content store access
//!
//! The breadcrumb engine only reads content. Everything it needs goes through
//! the [`ContentStore`] trait; [`InMemoryStore`] is the reference
//! implementation backed by a site snapshot.

use crate::models::{
    Author, ContentItem, ItemId, PostTypeInfo, TaxonomyInfo, Term, TermId, UserId,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Store lookup errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Term {id} not found in taxonomy '{taxonomy}'")]
    TermNotFound { id: TermId, taxonomy: String },

    #[error("Unknown taxonomy: {0}")]
    UnknownTaxonomy(String),

    #[error("Term {id} belongs to '{actual}', not '{expected}'")]
    TaxonomyMismatch {
        id: TermId,
        expected: String,
        actual: String,
    },

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Read-only lookups against the content store
///
/// Lookups that can legitimately miss return `Option`; term lookups return a
/// `Result` so callers can tell a backend failure from a plain miss when they
/// care to.
pub trait ContentStore: Send + Sync {
    /// Resolve a post, page or attachment by id
    fn item(&self, id: ItemId) -> Option<ContentItem>;

    /// Resolve a term within a taxonomy
    fn term(&self, id: TermId, taxonomy: &str) -> Result<Term, StoreError>;

    /// Raw ancestor ids of a term, immediate parent first, root last
    fn term_ancestor_ids(&self, id: TermId, taxonomy: &str) -> Result<Vec<TermId>, StoreError>;

    /// Terms of an item in a taxonomy, ordered by parent id descending
    fn item_terms(&self, item: ItemId, taxonomy: &str) -> Vec<Term>;

    /// Taxonomy metadata
    fn taxonomy(&self, key: &str) -> Option<TaxonomyInfo>;

    /// Post type metadata
    fn post_type(&self, key: &str) -> Option<PostTypeInfo>;

    /// Resolve an author by user id
    fn author(&self, id: UserId) -> Option<Author>;
}

/// Assignment of terms to a content item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermAssignment {
    pub item_id: ItemId,
    pub term_ids: Vec<TermId>,
}

/// Serializable snapshot of site content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSnapshot {
    #[serde(default)]
    pub items: Vec<ContentItem>,

    #[serde(default)]
    pub terms: Vec<Term>,

    #[serde(default)]
    pub taxonomies: Vec<TaxonomyInfo>,

    #[serde(default)]
    pub post_types: Vec<PostTypeInfo>,

    #[serde(default)]
    pub authors: Vec<Author>,

    #[serde(default)]
    pub item_terms: Vec<TermAssignment>,
}

/// Content store held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    items: HashMap<ItemId, ContentItem>,
    terms: HashMap<TermId, Term>,
    taxonomies: HashMap<String, TaxonomyInfo>,
    post_types: HashMap<String, PostTypeInfo>,
    authors: HashMap<UserId, Author>,
    item_terms: HashMap<ItemId, Vec<TermId>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a snapshot. Later entries win on duplicate ids.
    pub fn from_snapshot(snapshot: ContentSnapshot) -> Self {
        let mut store = Self::new();
        for item in snapshot.items {
            if store.items.contains_key(&item.id) {
                tracing::warn!(id = item.id, "duplicate item id, keeping the later entry");
            }
            store.insert_item(item);
        }
        for term in snapshot.terms {
            if store.terms.contains_key(&term.id) {
                tracing::warn!(id = term.id, "duplicate term id, keeping the later entry");
            }
            store.insert_term(term);
        }
        for taxonomy in snapshot.taxonomies {
            store.insert_taxonomy(taxonomy);
        }
        for post_type in snapshot.post_types {
            store.insert_post_type(post_type);
        }
        for author in snapshot.authors {
            store.insert_author(author);
        }
        for assignment in snapshot.item_terms {
            store.assign_terms(assignment.item_id, assignment.term_ids);
        }
        store
    }

    pub fn insert_item(&mut self, item: ContentItem) {
        self.items.insert(item.id, item);
    }

    pub fn insert_term(&mut self, term: Term) {
        self.terms.insert(term.id, term);
    }

    pub fn insert_taxonomy(&mut self, taxonomy: TaxonomyInfo) {
        self.taxonomies.insert(taxonomy.key.clone(), taxonomy);
    }

    pub fn insert_post_type(&mut self, post_type: PostTypeInfo) {
        self.post_types.insert(post_type.key.clone(), post_type);
    }

    pub fn insert_author(&mut self, author: Author) {
        self.authors.insert(author.id, author);
    }

    /// Attach terms to an item, appending to any existing assignment
    pub fn assign_terms(&mut self, item: ItemId, terms: Vec<TermId>) {
        self.item_terms.entry(item).or_default().extend(terms);
    }

    /// Remove a term, leaving references to it dangling
    pub fn remove_term(&mut self, id: TermId) -> Option<Term> {
        self.terms.remove(&id)
    }

    /// Number of items in the store
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Number of terms in the store
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Terms whose parent id points at a term the store does not hold
    pub fn dangling_term_parents(&self) -> Vec<TermId> {
        let mut ids: Vec<TermId> = self
            .terms
            .values()
            .filter(|t| t.has_parent())
            .filter(|t| t.parent_id.is_some_and(|p| !self.terms.contains_key(&p)))
            .map(|t| t.id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl ContentStore for InMemoryStore {
    fn item(&self, id: ItemId) -> Option<ContentItem> {
        self.items.get(&id).cloned()
    }

    fn term(&self, id: TermId, taxonomy: &str) -> Result<Term, StoreError> {
        let term = self.terms.get(&id).ok_or_else(|| StoreError::TermNotFound {
            id,
            taxonomy: taxonomy.to_string(),
        })?;

        if term.taxonomy != taxonomy {
            return Err(StoreError::TaxonomyMismatch {
                id,
                expected: taxonomy.to_string(),
                actual: term.taxonomy.clone(),
            });
        }

        Ok(term.clone())
    }

    fn term_ancestor_ids(&self, id: TermId, taxonomy: &str) -> Result<Vec<TermId>, StoreError> {
        let term = self.term(id, taxonomy)?;

        // Parents may be missing from the store; the id is still reported so
        // the caller decides what to do with an unresolvable ancestor.
        let mut ancestors = Vec::new();
        let mut seen = HashSet::from([term.id]);
        let mut next = term.parent_id.filter(|&p| p != 0);

        while let Some(parent) = next {
            if !seen.insert(parent) {
                break;
            }
            ancestors.push(parent);
            next = self
                .terms
                .get(&parent)
                .and_then(|t| t.parent_id)
                .filter(|&p| p != 0);
        }

        Ok(ancestors)
    }

    fn item_terms(&self, item: ItemId, taxonomy: &str) -> Vec<Term> {
        let Some(ids) = self.item_terms.get(&item) else {
            return Vec::new();
        };

        let mut terms: Vec<Term> = ids
            .iter()
            .filter_map(|id| self.terms.get(id))
            .filter(|t| t.taxonomy == taxonomy)
            .cloned()
            .collect();

        // Deepest-parented first; stable so ties keep assignment order
        terms.sort_by(|a, b| b.parent_id.unwrap_or(0).cmp(&a.parent_id.unwrap_or(0)));
        terms
    }

    fn taxonomy(&self, key: &str) -> Option<TaxonomyInfo> {
        self.taxonomies.get(key).cloned()
    }

    fn post_type(&self, key: &str) -> Option<PostTypeInfo> {
        self.post_types.get(key).cloned()
    }

    fn author(&self, id: UserId) -> Option<Author> {
        self.authors.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_store;

    #[test]
    fn test_term_lookup_checks_taxonomy() {
        let store = fixture_store();

        assert!(store.term(11, "product_cat").is_ok());
        assert!(matches!(
            store.term(11, "category"),
            Err(StoreError::TaxonomyMismatch { .. })
        ));
        assert!(matches!(
            store.term(999, "category"),
            Err(StoreError::TermNotFound { .. })
        ));
    }

    #[test]
    fn test_ancestor_ids_are_leaf_to_root() {
        let store = fixture_store();

        // Running Shoes (12) -> Shoes (11) -> Clothing (10)
        assert_eq!(store.term_ancestor_ids(12, "product_cat").unwrap(), vec![11, 10]);
        assert!(store.term_ancestor_ids(10, "product_cat").unwrap().is_empty());
    }

    #[test]
    fn test_ancestor_ids_stop_on_cycle() {
        let mut store = InMemoryStore::new();
        for (id, parent) in [(1, 2), (2, 1)] {
            store.insert_term(Term {
                id,
                taxonomy: "category".to_string(),
                name: format!("T{id}"),
                link: format!("/t{id}"),
                parent_id: Some(parent),
            });
        }

        assert_eq!(store.term_ancestor_ids(1, "category").unwrap(), vec![2]);
    }

    #[test]
    fn test_item_terms_ordered_by_parent_desc() {
        let store = fixture_store();
        let terms = store.item_terms(100, "product_cat");

        assert_eq!(terms.first().map(|t| t.id), Some(12));
        assert!(store.item_terms(100, "category").is_empty());
    }

    #[test]
    fn test_dangling_parents() {
        let mut store = fixture_store();
        assert!(store.dangling_term_parents().is_empty());

        store.remove_term(11);
        assert_eq!(store.dangling_term_parents(), vec![12]);
    }
}
