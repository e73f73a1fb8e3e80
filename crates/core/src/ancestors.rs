//! Ancestor resolution for hierarchical terms and page trees

use crate::models::{ItemId, NamedLink, TermId};
use crate::store::ContentStore;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Resolves the chain of ancestors of a term or page, root first
pub struct AncestorResolver<'a> {
    store: &'a dyn ContentStore,
}

impl<'a> AncestorResolver<'a> {
    pub fn new(store: &'a dyn ContentStore) -> Self {
        Self { store }
    }

    /// Ancestors of a term from the root down to its immediate parent.
    ///
    /// The term itself is never included. Ancestors the store cannot resolve
    /// are dropped and the walk carries on with the rest.
    pub fn ancestors(&self, term_id: TermId, taxonomy: &str) -> Vec<NamedLink> {
        let ids = match self.store.term_ancestor_ids(term_id, taxonomy) {
            Ok(ids) => ids,
            Err(e) => {
                warn!(term_id, taxonomy, error = %e, "ancestor lookup failed");
                return Vec::new();
            }
        };

        ids.into_iter()
            .rev()
            .filter_map(|id| match self.store.term(id, taxonomy) {
                Ok(term) => Some(term.as_named_link()),
                Err(e) => {
                    warn!(ancestor = id, taxonomy, error = %e, "skipping unresolvable ancestor");
                    None
                }
            })
            .collect()
    }

    /// Ancestor pages of `page`, root first.
    ///
    /// Walks parent links until a page has no parent, a parent fails to
    /// resolve, or a page repeats. The page itself is never part of the chain.
    pub fn page_ancestors(&self, page: ItemId, parent: Option<ItemId>) -> Vec<NamedLink> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([page]);
        let mut next = parent.filter(|&p| p != 0);

        while let Some(id) = next {
            if !seen.insert(id) {
                warn!(page = id, "page parent cycle, stopping walk");
                break;
            }

            let Some(page) = self.store.item(id) else {
                debug!(page = id, "parent page not found, stopping walk");
                break;
            };

            next = page.parent_id.filter(|&p| p != 0);
            chain.push(NamedLink::linked(page.title, page.permalink));
        }

        chain.reverse();
        chain
    }
}
