//! Shared fixture site for unit tests

use crate::config::SiteSettings;
use crate::models::{
    Author, BreadcrumbOutput, ContentItem, PostTypeInfo, TaxonomyInfo, Term, TermId, Trail,
};
use crate::store::InMemoryStore;

fn item(id: u64, title: &str, permalink: &str, post_type: &str, parent: Option<u64>) -> ContentItem {
    ContentItem {
        id,
        title: title.to_string(),
        permalink: permalink.to_string(),
        post_type: post_type.to_string(),
        parent_id: parent,
    }
}

fn term(id: TermId, taxonomy: &str, name: &str, link: &str, parent: Option<TermId>) -> Term {
    Term {
        id,
        taxonomy: taxonomy.to_string(),
        name: name.to_string(),
        link: link.to_string(),
        parent_id: parent,
    }
}

fn post_type(key: &str, label: &str, archive: Option<&str>) -> PostTypeInfo {
    PostTypeInfo {
        key: key.to_string(),
        singular_label: label.to_string(),
        archive_link: archive.map(str::to_string),
    }
}

fn taxonomy(key: &str, label: &str, hierarchical: bool) -> TaxonomyInfo {
    TaxonomyInfo {
        key: key.to_string(),
        plural_label: label.to_string(),
        hierarchical,
    }
}

/// Settings matching [`fixture_store`]: page 3 is the front page, page 1 the
/// posts page and page 2 the shop page.
pub(crate) fn fixture_settings() -> SiteSettings {
    SiteSettings::default()
        .with_home_url("https://example.com")
        .with_page_on_front(Some(3))
        .with_posts_page(Some(1))
        .with_shop_page(Some(2))
}

/// A small shop-plus-blog site.
///
/// Product categories: Clothing (10) > Shoes (11) > Running Shoes (12).
/// Post categories: News (30) > Local (31) > Weather (32).
/// Genres: Fiction (50) > Sci-Fi (51).
/// Pages: About (500) > Team (501) > Alice (502).
pub(crate) fn fixture_store() -> InMemoryStore {
    let mut store = InMemoryStore::new();

    for pt in [
        post_type("post", "Post", Some("https://example.com/blog/")),
        post_type("page", "Page", None),
        post_type("attachment", "Media", None),
        post_type("product", "Product", Some("https://example.com/shop/")),
        post_type("event", "Event", Some("https://example.com/events/")),
        post_type("book", "Book", Some("https://example.com/books/")),
    ] {
        store.insert_post_type(pt);
    }

    for tax in [
        taxonomy("category", "Categories", true),
        taxonomy("post_tag", "Tags", false),
        taxonomy("product_cat", "Product categories", true),
        taxonomy("product_tag", "Product tags", false),
        taxonomy("genre", "Genres", true),
    ] {
        store.insert_taxonomy(tax);
    }

    for t in [
        term(10, "product_cat", "Clothing", "https://example.com/shop/clothing/", None),
        term(11, "product_cat", "Shoes", "https://example.com/shop/clothing/shoes/", Some(10)),
        term(
            12,
            "product_cat",
            "Running Shoes",
            "https://example.com/shop/clothing/shoes/running/",
            Some(11),
        ),
        term(20, "product_tag", "Sale", "https://example.com/product-tag/sale/", None),
        term(30, "category", "News", "https://example.com/category/news/", None),
        term(31, "category", "Local", "https://example.com/category/news/local/", Some(30)),
        term(
            32,
            "category",
            "Weather",
            "https://example.com/category/news/local/weather/",
            Some(31),
        ),
        term(40, "post_tag", "rust", "https://example.com/tag/rust/", None),
        term(50, "genre", "Fiction", "https://example.com/genre/fiction/", None),
        term(51, "genre", "Sci-Fi", "https://example.com/genre/fiction/sci-fi/", Some(50)),
    ] {
        store.insert_term(t);
    }

    for i in [
        item(1, "Blog", "https://example.com/blog/", "page", None),
        item(2, "Shop", "https://example.com/shop/", "page", None),
        item(3, "Welcome", "https://example.com/", "page", None),
        item(100, "Trail Runner", "https://example.com/product/trail-runner/", "product", None),
        item(101, "Plain Tee", "https://example.com/product/plain-tee/", "product", None),
        item(200, "Storm Warning", "https://example.com/news/storm-warning/", "post", None),
        item(201, "Loose Note", "https://example.com/loose-note/", "post", None),
        item(300, "Rust Meetup", "https://example.com/events/rust-meetup/", "event", None),
        item(
            400,
            "storm.jpg",
            "https://example.com/news/storm-warning/storm-jpg/",
            "attachment",
            Some(200),
        ),
        item(401, "logo.png", "https://example.com/logo-png/", "attachment", None),
        item(500, "About", "https://example.com/about/", "page", None),
        item(501, "Team", "https://example.com/about/team/", "page", Some(500)),
        item(502, "Alice", "https://example.com/about/team/alice/", "page", Some(501)),
        item(600, "Dune", "https://example.com/books/dune/", "book", None),
    ] {
        store.insert_item(i);
    }

    store.assign_terms(100, vec![11, 12]);
    store.assign_terms(200, vec![32]);

    store.insert_author(Author {
        id: 7,
        display_name: "Ada Lovelace".to_string(),
    });

    store
}

/// A finished bundle for renderer tests: Home > News > Storm Warning
pub(crate) fn sample_output() -> BreadcrumbOutput {
    let mut trail = Trail::new();
    trail.push("Home", Some("https://example.com/"));
    trail.push("News", Some("https://example.com/category/news/"));
    trail.push("Storm Warning", None);

    BreadcrumbOutput {
        delimiter: " / ".to_string(),
        wrap_before: r#"<nav class="breadcrumb">"#.to_string(),
        wrap_after: "</nav>".to_string(),
        before: String::new(),
        after: String::new(),
        home: Some("Home".to_string()),
        breadcrumb: trail,
    }
}
