//! Event pseudo-field extraction and section building.
//!
//! dox has no native notion of events, so the generator documents them as
//! fields whose identifier carries the reserved `_dox_event_` prefix. This
//! pass claims those fields, detaches them from the normal field listing,
//! and rebuilds them into dedicated "Events" / "Inherited Events" sections.

use indexmap::IndexMap;

use crate::dom::{Dom, NodeId};
use crate::error::{Error, Result};

/// Reserved identifier prefix marking an event pseudo-field.
pub const EVENT_MARKER: &str = "_dox_event_";

/// Event fields inherited from one base type, in encounter order.
pub struct InheritedGroup {
    /// Inner markup of the heading that introduced the base type, captured
    /// on first encounter and reproduced above the group.
    pub heading_html: String,
    pub fields: Vec<NodeId>,
}

/// Extractor output.
///
/// `own` holds the page's own event fields; `inherited` maps the full name
/// of each base type to its group, in first-encounter order. All listed
/// fields are detached from the tree.
pub struct ExtractedEvents {
    pub own: Vec<NodeId>,
    pub inherited: IndexMap<String, InheritedGroup>,
}

impl ExtractedEvents {
    pub fn is_empty(&self) -> bool {
        self.own.is_empty() && self.inherited.is_empty()
    }
}

fn is_event_marker(dom: &Dom, id: NodeId) -> bool {
    dom.tag(id) == Some("span")
        && dom.has_class(id, "identifier")
        && dom.text(id).trim().starts_with(EVENT_MARKER)
}

/// Resolve a marker's enclosing field: the nearest ancestor carrying the
/// `field` class.
fn enclosing_field(dom: &Dom, marker: NodeId) -> Result<NodeId> {
    dom.ancestor_matching(marker, |d, id| d.has_class(id, "field"))
        .ok_or_else(|| {
            Error::MalformedField(format!(
                "event identifier '{}' has no enclosing .field element",
                dom.text(marker).trim()
            ))
        })
}

/// Read the originating type's full name from a group heading: the `title`
/// attribute of its `.type` element, not the shortened label text.
fn heading_type_name(dom: &Dom, heading: NodeId) -> Result<String> {
    let type_el = dom
        .descendants(heading)
        .find(|&id| dom.has_class(id, "type"))
        .ok_or_else(|| Error::MissingElement("'.type' indicator in inherited-fields heading".into()))?;
    let title = dom
        .attr(type_el, "title")
        .ok_or_else(|| Error::MissingElement("'title' attribute on heading '.type' element".into()))?;
    Ok(title.trim().to_string())
}

/// Scan the document for event pseudo-fields and detach them.
///
/// Pass 1 walks the `.inherited-fields` container in document order,
/// tracking the nearest preceding `h4` heading; each marker's field is
/// appended to that heading's type group. Pass 2 claims the remaining
/// markers (the page's own events) from the rest of the document. A field
/// is claimed at most once, so a field with several markers moves whole.
pub fn extract_event_fields(dom: &mut Dom) -> Result<ExtractedEvents> {
    let mut inherited: IndexMap<String, InheritedGroup> = IndexMap::new();

    if let Some(container) = dom.find(|d, id| d.has_class(id, "inherited-fields")) {
        let scan: Vec<NodeId> = dom.descendants(container).collect();
        let mut heading: Option<NodeId> = None;
        for id in scan {
            if dom.tag(id) == Some("h4") {
                heading = Some(id);
            } else if is_event_marker(dom, id) {
                let field = enclosing_field(dom, id)?;
                if dom.is_detached(field) {
                    continue;
                }
                let heading = heading.ok_or_else(|| {
                    Error::MissingElement(format!(
                        "heading before inherited event '{}'",
                        dom.text(id).trim()
                    ))
                })?;
                let type_name = heading_type_name(dom, heading)?;
                let group = inherited.entry(type_name).or_insert_with(|| InheritedGroup {
                    heading_html: dom.inner_html(heading),
                    fields: Vec::new(),
                });
                group.fields.push(field);
                dom.detach(field);
            }
        }
    }

    // Fields claimed above are detached and no longer reachable from the
    // document root, so this pass only sees the page's own events.
    let mut own: Vec<NodeId> = Vec::new();
    let markers = dom.select(dom.document(), is_event_marker);
    for marker in markers {
        let field = enclosing_field(dom, marker)?;
        if dom.is_detached(field) {
            continue;
        }
        dom.detach(field);
        own.push(field);
    }

    Ok(ExtractedEvents { own, inherited })
}

/// Insert the "Events" / "Inherited Events" sections built from extracted
/// fields. A page with no extracted fields is left unmodified.
pub fn build_event_sections(dom: &mut Dom, events: ExtractedEvents) -> Result<()> {
    if !events.inherited.is_empty() {
        let container = dom
            .find(|d, id| d.has_class(id, "inherited-fields"))
            .ok_or_else(|| Error::MissingElement("'.inherited-fields' container".into()))?;

        let mut html =
            String::from(r#"<h3 class="section">Inherited Events</h3><div class="fields">"#);
        for group in events.inherited.values() {
            html.push_str("<h4>");
            html.push_str(&group.heading_html);
            html.push_str("</h4>");
            for &field in &group.fields {
                html.push_str(&dom.subtree_html(field));
            }
        }
        html.push_str("</div>");

        let html = strip_event_markers(&html);
        dom.prepend_fragment(container, &html);
    }

    if !events.own.is_empty() {
        let anchor = dom
            .find(|d, id| d.has_class(id, "doc") && d.has_class(id, "doc-main"))
            .ok_or_else(|| Error::MissingElement("'.doc.doc-main' anchor".into()))?;

        let mut html = String::from(r#"<h3 class="section">Events</h3><div class="fields">"#);
        for &field in &events.own {
            html.push_str(&dom.subtree_html(field));
        }
        html.push_str("</div>");

        let html = strip_event_markers(&html);
        dom.insert_fragment_after(anchor, &html);
    }

    Ok(())
}

/// Strip every occurrence of the reserved marker from assembled markup.
///
/// A single textual pass over the serialized fragment catches the marker
/// wherever it appears in a field's reconstructed markup (identifier text,
/// anchors, ids). Looped so occurrences formed by adjacent removals cannot
/// survive.
pub fn strip_event_markers(html: &str) -> String {
    let mut out = html.to_string();
    while out.contains(EVENT_MARKER) {
        out = out.replace(EVENT_MARKER, "");
    }
    out
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_strip_removes_all_occurrences() {
        let input = r##"<a href="#_dox_event_open"><span>_dox_event_open</span></a>"##;
        let out = strip_event_markers(input);
        assert_eq!(out, r##"<a href="#open"><span>open</span></a>"##);
    }

    #[test]
    fn test_strip_handles_recombined_marker() {
        // Removing the inner occurrence re-forms the marker around it
        let input = "_dox__dox_event_event_open";
        assert_eq!(strip_event_markers(input), "open");
    }

    #[test]
    fn test_strip_leaves_clean_input_alone() {
        let input = "<span class=\"identifier\">width</span>";
        assert_eq!(strip_event_markers(input), input);
    }

    proptest! {
        #[test]
        fn stripped_markup_never_contains_marker(
            parts in proptest::collection::vec("[a-z_]{0,12}", 0..8)
        ) {
            let input = parts.join(EVENT_MARKER);
            prop_assert!(!strip_event_markers(&input).contains(EVENT_MARKER));
        }
    }

    #[test]
    fn test_extract_empty_document() {
        let mut dom = Dom::parse("<html><body><p>No events here.</p></body></html>");
        let events = extract_event_fields(&mut dom).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_build_noop_on_empty() {
        let html = "<html><body><div class=\"doc doc-main\"><p>x</p></div></body></html>";
        let mut dom = Dom::parse(html);
        let before = dom.to_html();
        let events = extract_event_fields(&mut dom).unwrap();
        build_event_sections(&mut dom, events).unwrap();
        assert_eq!(dom.to_html(), before);
    }

    #[test]
    fn test_field_with_two_markers_claimed_once() {
        let mut dom = Dom::parse(
            r#"<body><div class="doc doc-main"></div><div class="field"><code>
            <span class="identifier">_dox_event_a</span>
            <span class="identifier">_dox_event_b</span>
            </code></div></body>"#,
        );
        let events = extract_event_fields(&mut dom).unwrap();
        assert_eq!(events.own.len(), 1);
    }
}
