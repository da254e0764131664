//! HTML serialization for `Dom` subtrees.
//!
//! Implements `html5ever::serialize::Serialize` for a `(dom, node)` wrapper
//! so whole documents and detached subtrees both go through the standard
//! HTML serializer.

use std::io;

use html5ever::serialize::{
    Serialize, SerializeOpts, Serializer, TraversalScope, serialize,
};

use super::{Dom, NodeData, NodeId};

/// Ties a node id to its arena for the serializer.
struct SerializeNode<'a> {
    dom: &'a Dom,
    node: NodeId,
}

impl Serialize for SerializeNode<'_> {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        match traversal_scope {
            TraversalScope::IncludeNode => write_node(self.dom, self.node, serializer),
            TraversalScope::ChildrenOnly(_) => {
                for child in self.dom.children(self.node) {
                    write_node(self.dom, child, serializer)?;
                }
                Ok(())
            }
        }
    }
}

fn write_node<S>(dom: &Dom, id: NodeId, serializer: &mut S) -> io::Result<()>
where
    S: Serializer,
{
    let Some(node) = dom.get(id) else {
        return Ok(());
    };
    match &node.data {
        NodeData::Document => {
            for child in dom.children(id) {
                write_node(dom, child, serializer)?;
            }
            Ok(())
        }
        NodeData::Element { name, attrs, .. } => {
            serializer.start_elem(
                name.clone(),
                attrs.iter().map(|a| (&a.name, a.value.as_str())),
            )?;
            for child in dom.children(id) {
                write_node(dom, child, serializer)?;
            }
            serializer.end_elem(name.clone())
        }
        NodeData::Text(text) => serializer.write_text(text),
        NodeData::Comment(text) => serializer.write_comment(text),
        NodeData::Doctype { name, .. } => serializer.write_doctype(name),
    }
}

impl Dom {
    /// Serialize the whole document back to markup.
    pub fn to_html(&self) -> String {
        self.serialize_with(self.document(), SerializeOpts::default())
    }

    /// Serialize one subtree, including the node itself.
    pub fn subtree_html(&self, node: NodeId) -> String {
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::IncludeNode,
            ..Default::default()
        };
        self.serialize_with(node, opts)
    }

    /// Serialize only a node's children (its inner markup).
    pub fn inner_html(&self, node: NodeId) -> String {
        self.serialize_with(node, SerializeOpts::default())
    }

    fn serialize_with(&self, node: NodeId, opts: SerializeOpts) -> String {
        let mut bytes = Vec::new();
        let wrapper = SerializeNode { dom: self, node };
        serialize(&mut bytes, &wrapper, opts).expect("serialization failed");
        String::from_utf8(bytes).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_round_trip() {
        let html = "<!DOCTYPE html><html><head><title>T</title></head><body><p>Hello</p></body></html>";
        let dom = Dom::parse(html);
        let out = dom.to_html();
        assert!(out.starts_with("<!DOCTYPE html>"));
        assert!(out.contains("<p>Hello</p>"));
    }

    #[test]
    fn test_subtree_html() {
        let dom = Dom::parse(r#"<div class="field"><span title="a&amp;b">x</span></div>"#);
        let field = dom.find(|d, id| d.has_class(id, "field")).unwrap();
        let out = dom.subtree_html(field);
        assert_eq!(out, r#"<div class="field"><span title="a&amp;b">x</span></div>"#);
    }

    #[test]
    fn test_inner_html() {
        let dom = Dom::parse("<h4>Inherited from <span class=\"type\">Foo</span></h4>");
        let h4 = dom.find(|d, id| d.tag(id) == Some("h4")).unwrap();
        assert_eq!(
            dom.inner_html(h4),
            "Inherited from <span class=\"type\">Foo</span>"
        );
    }

    #[test]
    fn test_detached_subtree_serializes() {
        let mut dom = Dom::parse("<ul><li>keep</li><li>move</li></ul>");
        let items = dom.select(dom.document(), |d, id| d.tag(id) == Some("li"));
        dom.detach(items[1]);
        assert_eq!(dom.subtree_html(items[1]), "<li>move</li>");
    }
}
