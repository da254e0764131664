//! The per-document rewrite pipeline.
//!
//! Passes run in a fixed order:
//!
//! 1. **Sidebar cleanup** - drop the generator's navigation dropdowns
//! 2. **Event extraction** - claim and detach event pseudo-fields
//! 3. **Section building** - insert "Events" / "Inherited Events" sections
//! 4. **Availability rewriting** - normalize target annotations
//!
//! Extraction must run before section building; availability rewriting is
//! independent of the other passes.

pub mod availability;
pub mod events;

use crate::dom::Dom;
use crate::error::Result;

/// Rewrite one documentation page, returning the transformed markup.
pub fn rewrite_html(html: &str) -> Result<String> {
    let mut dom = Dom::parse(html);

    strip_sidebar_dropdowns(&mut dom);

    let extracted = events::extract_event_fields(&mut dom)?;
    events::build_event_sections(&mut dom, extracted)?;

    availability::rewrite_inline(&mut dom);
    availability::rewrite_sections(&mut dom);

    Ok(dom.to_html())
}

/// Remove every `.dropdown` child of a `.sidebar-nav` element.
fn strip_sidebar_dropdowns(dom: &mut Dom) {
    let navs = dom.select(dom.document(), |d, id| d.has_class(id, "sidebar-nav"));
    for nav in navs {
        let dropdowns: Vec<_> = dom
            .children(nav)
            .filter(|&child| dom.has_class(child, "dropdown"))
            .collect();
        for dropdown in dropdowns {
            dom.detach(dropdown);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropdowns_removed_from_sidebar() {
        let mut dom = Dom::parse(
            r#"<nav class="sidebar-nav"><div class="dropdown">Menu</div><a href="a.html">A</a></nav>"#,
        );
        strip_sidebar_dropdowns(&mut dom);
        let out = dom.to_html();
        assert!(!out.contains("dropdown"));
        assert!(out.contains(r#"<a href="a.html">A</a>"#));
    }

    #[test]
    fn test_only_direct_children_removed() {
        let mut dom = Dom::parse(
            r#"<nav class="sidebar-nav"><section><div class="dropdown">Nested</div></section></nav>"#,
        );
        strip_sidebar_dropdowns(&mut dom);
        assert!(dom.to_html().contains("Nested"));
    }
}
