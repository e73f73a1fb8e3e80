//! HTML rendering of a breadcrumb bundle
//!
//! Wrappers, `before`/`after` and the delimiter are trusted markup and emitted
//! as-is; labels and links are escaped. The last crumb is the current page and
//! is never linked.

use crate::models::BreadcrumbOutput;
use maud::{html, PreEscaped};

/// Render the trail as HTML markup
pub fn render_html(data: &BreadcrumbOutput) -> String {
    let crumbs = data.breadcrumb.crumbs();
    let last = crumbs.len().saturating_sub(1);

    html! {
        (PreEscaped(data.wrap_before.as_str()))
        @for (idx, crumb) in crumbs.iter().enumerate() {
            (PreEscaped(data.before.as_str()))
            @let link = if idx == last { None } else { crumb.link.as_deref() };
            @if let Some(link) = link {
                a href=(link) { (crumb.label) }
            } @else {
                (crumb.label)
            }
            (PreEscaped(data.after.as_str()))
            @if idx < last {
                (PreEscaped(data.delimiter.as_str()))
            }
        }
        (PreEscaped(data.wrap_after.as_str()))
    }
    .into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Trail;
    use crate::test_support::sample_output;

    #[test]
    fn test_render_sample() {
        let html = render_html(&sample_output());
        assert_eq!(
            html,
            concat!(
                r#"<nav class="breadcrumb">"#,
                r#"<a href="https://example.com/">Home</a> / "#,
                r#"<a href="https://example.com/category/news/">News</a> / "#,
                "Storm Warning</nav>"
            )
        );
    }

    #[test]
    fn test_last_crumb_unlinked_and_wrapped_items() {
        let mut data = sample_output();
        let mut trail = Trail::new();
        trail.push("Home", Some("/"));
        trail.push("Shop", Some("/shop/"));
        data.breadcrumb = trail;
        data.before = "<li>".to_string();
        data.after = "</li>".to_string();
        data.delimiter = String::new();

        let html = render_html(&data);
        assert!(html.contains(r#"<li><a href="/">Home</a></li><li>Shop</li>"#));
        assert!(!html.contains("/shop/"));
    }

    #[test]
    fn test_labels_are_escaped() {
        let mut data = sample_output();
        let mut trail = Trail::new();
        trail.push("Fish & Chips", Some("/?a=1&b=2"));
        trail.push("Now", None);
        data.breadcrumb = trail;

        let html = render_html(&data);
        assert!(html.contains("Fish &amp; Chips"));
        assert!(html.contains(r#"href="/?a=1&amp;b=2""#));
    }

    #[test]
    fn test_empty_trail_keeps_wrappers() {
        let mut data = sample_output();
        data.breadcrumb = Trail::new();
        assert_eq!(render_html(&data), r#"<nav class="breadcrumb"></nav>"#);
    }
}
