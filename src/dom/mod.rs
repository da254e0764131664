//! Arena-based document model for the generator's HTML pages.
//!
//! Pages are parsed into a contiguous node arena with id-linked
//! parent/child/sibling pointers. The rewrite passes query the tree through
//! structural predicates (tag, class, attribute) and mutate it in place;
//! detached subtrees stay in the arena and can still be serialized, which is
//! how relocated event fields travel between their old and new positions.

mod serialize;
mod tree_sink;

use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{ParseOpts, QualName, parse_document};

use tree_sink::DomSink;

/// Identifier of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Sentinel value for no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_some(self) -> bool {
        self.0 != u32::MAX
    }

    pub fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

/// Node payload.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root.
    Document,
    /// Element with name and attributes.
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Pre-split class list for fast predicate matching.
        classes: Vec<String>,
    },
    /// Text content.
    Text(String),
    /// Comment (kept so pages round-trip).
    Comment(String),
    /// Document type declaration.
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

/// HTML attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

/// A node in the arena.
#[derive(Debug)]
struct Node {
    data: NodeData,
    parent: NodeId,
    first_child: NodeId,
    last_child: NodeId,
    prev_sibling: NodeId,
    next_sibling: NodeId,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

/// Arena document tree.
///
/// All nodes live in one contiguous vector; links between them are indices
/// into that vector. Detaching a node only unhooks its links, so a detached
/// subtree remains addressable until the whole document is dropped.
pub struct Dom {
    nodes: Vec<Node>,
    document: NodeId,
}

impl Dom {
    /// Create an empty tree holding only the document root.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: NodeId::NONE,
        };
        dom.document = dom.alloc(Node::new(NodeData::Document));
        dom
    }

    /// Parse a complete HTML document.
    pub fn parse(html: &str) -> Dom {
        let opts = ParseOpts {
            tree_builder: TreeBuilderOpts {
                drop_doctype: false,
                ..Default::default()
            },
            ..Default::default()
        };
        parse_document(DomSink::new(), opts)
            .from_utf8()
            .one(html.as_bytes())
            .into_dom()
    }

    /// Parse a markup fragment by wrapping it in a minimal document.
    ///
    /// The fragment's nodes end up as children of the result's `body`.
    pub fn parse_fragment(html: &str) -> Dom {
        let wrapped = format!("<!DOCTYPE html><html><head></head><body>{html}</body></html>");
        Dom::parse(&wrapped)
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the document root ID.
    pub fn document(&self) -> NodeId {
        self.document
    }

    fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Create an element node, pre-splitting its class list.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        let classes = attrs
            .iter()
            .find(|a| a.name.local.as_ref() == "class")
            .map(|a| a.value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        self.alloc(Node::new(NodeData::Element {
            name,
            attrs,
            classes,
        }))
    }

    /// Create a text node.
    pub fn create_text(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text)))
    }

    /// Create a comment node.
    pub fn create_comment(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text)))
    }

    /// Create a doctype node.
    pub fn create_doctype(&mut self, name: String, public_id: String, system_id: String) -> NodeId {
        self.alloc(Node::new(NodeData::Doctype {
            name,
            public_id,
            system_id,
        }))
    }

    /// Append a child as the last child of a parent.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(NodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
            child_node.next_sibling = NodeId::NONE;
        }
        if let Some(last) = self.get_mut(last_child) {
            last.next_sibling = child;
        }
        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert a node as the first child of a parent.
    pub fn prepend(&mut self, parent: NodeId, child: NodeId) {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(NodeId::NONE);
        if first.is_some() {
            self.insert_before(first, child);
        } else {
            self.append(parent, child);
        }
    }

    /// Insert a node before a sibling.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        let (parent, prev) = match self.get(sibling) {
            Some(n) => (n.parent, n.prev_sibling),
            None => return,
        };

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }
        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }
        if let Some(p) = self.get_mut(prev) {
            p.next_sibling = new_node;
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Insert a node immediately after a sibling.
    pub fn insert_after(&mut self, sibling: NodeId, new_node: NodeId) {
        let next = self
            .get(sibling)
            .map(|n| n.next_sibling)
            .unwrap_or(NodeId::NONE);
        if next.is_some() {
            self.insert_before(next, new_node);
        } else {
            let parent = self.get(sibling).map(|n| n.parent).unwrap_or(NodeId::NONE);
            self.append(parent, new_node);
        }
    }

    /// Append text, merging into the parent's last child when it is a text node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(NodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let NodeData::Text(existing) = &mut last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    /// Remove a node from its parent, leaving its subtree intact.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = match self.get(id) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if let Some(p) = self.get_mut(prev) {
            p.next_sibling = next;
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = next;
        }
        if let Some(n) = self.get_mut(next) {
            n.prev_sibling = prev;
        } else if let Some(par) = self.get_mut(parent) {
            par.last_child = prev;
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Whether a node currently has no parent.
    pub fn is_detached(&self, id: NodeId) -> bool {
        self.get(id).is_none_or(|n| n.parent.is_none())
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: NodeId) -> ChildrenIter<'_> {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(NodeId::NONE);
        ChildrenIter {
            dom: self,
            current: first,
        }
    }

    /// Preorder traversal of `root` and everything beneath it.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        let stack = if root.is_none() { Vec::new() } else { vec![root] };
        Descendants { dom: self, stack }
    }

    /// First node in the document matching a predicate, in document order.
    pub fn find<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Dom, NodeId) -> bool,
    {
        self.descendants(self.document).find(|&id| predicate(self, id))
    }

    /// Every node under `root` matching a predicate, in document order.
    pub fn select<F>(&self, root: NodeId, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&Dom, NodeId) -> bool,
    {
        self.descendants(root)
            .filter(|&id| predicate(self, id))
            .collect()
    }

    /// Nearest ancestor matching a predicate, not counting the node itself.
    pub fn ancestor_matching<F>(&self, id: NodeId, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Dom, NodeId) -> bool,
    {
        let mut current = self.get(id)?.parent;
        while current.is_some() {
            if predicate(self, current) {
                return Some(current);
            }
            current = self.get(current)?.parent;
        }
        None
    }

    /// The document's `body` element, if any.
    pub fn body(&self) -> Option<NodeId> {
        self.find(|dom, id| dom.tag(id) == Some("body"))
    }

    /// Element tag name (local part).
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.get(id)?.data {
            NodeData::Element { name, .. } => Some(name.local.as_ref()),
            _ => None,
        }
    }

    /// Whether an element carries a class.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Element { classes, .. }) => classes.iter().any(|c| c == class),
            _ => false,
        }
    }

    /// Get an attribute value.
    pub fn attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        match &self.get(id)?.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        }
    }

    /// Concatenated text content of a subtree.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(NodeData::Text(s)) = self.get(node).map(|n| &n.data) {
                out.push_str(s);
            }
        }
        out
    }

    /// Replace an element's children with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        let children: Vec<NodeId> = self.children(id).collect();
        for child in children {
            self.detach(child);
        }
        let text_node = self.create_text(text.to_string());
        self.append(id, text_node);
    }

    /// Deep-copy a subtree from another document into this arena.
    ///
    /// The copy is created detached; hook it up with `append`, `prepend`, or
    /// `insert_after`.
    pub fn adopt(&mut self, src: &Dom, node: NodeId) -> NodeId {
        let copy = match src.get(node) {
            Some(n) => self.alloc(Node::new(n.data.clone())),
            None => return NodeId::NONE,
        };
        let children: Vec<NodeId> = src.children(node).collect();
        for child in children {
            let adopted = self.adopt(src, child);
            if adopted.is_some() {
                self.append(copy, adopted);
            }
        }
        copy
    }

    /// Parse a fragment and insert its nodes at the front of `target`'s children.
    pub fn prepend_fragment(&mut self, target: NodeId, html: &str) {
        let frag = Dom::parse_fragment(html);
        let Some(body) = frag.body() else { return };
        let mut anchor = NodeId::NONE;
        for child in frag.children(body).collect::<Vec<_>>() {
            let adopted = self.adopt(&frag, child);
            if adopted.is_none() {
                continue;
            }
            if anchor.is_none() {
                self.prepend(target, adopted);
            } else {
                self.insert_after(anchor, adopted);
            }
            anchor = adopted;
        }
    }

    /// Parse a fragment and insert its nodes immediately after `anchor`.
    pub fn insert_fragment_after(&mut self, anchor: NodeId, html: &str) {
        let frag = Dom::parse_fragment(html);
        let Some(body) = frag.body() else { return };
        let mut anchor = anchor;
        for child in frag.children(body).collect::<Vec<_>>() {
            let adopted = self.adopt(&frag, child);
            if adopted.is_some() {
                self.insert_after(anchor, adopted);
                anchor = adopted;
            }
        }
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over children of a node.
pub struct ChildrenIter<'a> {
    dom: &'a Dom,
    current: NodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .dom
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(NodeId::NONE);
        Some(id)
    }
}

/// Preorder document-order iterator.
pub struct Descendants<'a> {
    dom: &'a Dom,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        let mut children: Vec<NodeId> = self.dom.children(id).collect();
        children.reverse();
        self.stack.extend(children);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_query() {
        let dom = Dom::parse(
            r#"<html><body><div class="doc doc-main"><p id="intro">Hello</p></div></body></html>"#,
        );

        let div = dom
            .find(|d, id| d.has_class(id, "doc-main"))
            .expect("should find div");
        assert_eq!(dom.tag(div), Some("div"));
        assert!(dom.has_class(div, "doc"));

        let p = dom.find(|d, id| d.tag(id) == Some("p")).unwrap();
        assert_eq!(dom.attr(p, "id"), Some("intro"));
        assert_eq!(dom.text(p), "Hello");
    }

    #[test]
    fn test_select_document_order() {
        let dom = Dom::parse("<body><i>a</i><div><i>b</i></div><i>c</i></body>");
        let italics = dom.select(dom.document(), |d, id| d.tag(id) == Some("i"));
        let texts: Vec<String> = italics.iter().map(|&id| dom.text(id)).collect();
        assert_eq!(texts, ["a", "b", "c"]);
    }

    #[test]
    fn test_ancestor_matching() {
        let dom = Dom::parse(
            r#"<div class="field"><div><code><span class="identifier">x</span></code></div></div>"#,
        );
        let span = dom.find(|d, id| d.tag(id) == Some("span")).unwrap();
        let field = dom
            .ancestor_matching(span, |d, id| d.has_class(id, "field"))
            .expect("should resolve field");
        assert_eq!(dom.tag(field), Some("div"));
        assert!(dom.has_class(field, "field"));
    }

    #[test]
    fn test_detach() {
        let mut dom = Dom::parse("<ul><li>one</li><li>two</li><li>three</li></ul>");
        let items = dom.select(dom.document(), |d, id| d.tag(id) == Some("li"));
        assert_eq!(items.len(), 3);

        dom.detach(items[1]);
        assert!(dom.is_detached(items[1]));

        let ul = dom.find(|d, id| d.tag(id) == Some("ul")).unwrap();
        let remaining: Vec<String> = dom.children(ul).map(|id| dom.text(id)).collect();
        assert_eq!(remaining, ["one", "three"]);

        // Detached subtree keeps its contents
        assert_eq!(dom.text(items[1]), "two");
    }

    #[test]
    fn test_set_text() {
        let mut dom = Dom::parse("<p><em>old <b>markup</b></em></p>");
        let em = dom.find(|d, id| d.tag(id) == Some("em")).unwrap();
        dom.set_text(em, "new text");
        assert_eq!(dom.text(em), "new text");
        assert_eq!(dom.children(em).count(), 1);
    }

    #[test]
    fn test_adopt_deep_copy() {
        let src = Dom::parse(r#"<div class="field"><span title="t">content</span></div>"#);
        let field = src.find(|d, id| d.has_class(id, "field")).unwrap();

        let mut dst = Dom::parse("<body></body>");
        let body = dst.body().unwrap();
        let copy = dst.adopt(&src, field);
        dst.append(body, copy);

        assert!(dst.has_class(copy, "field"));
        let span = dst
            .select(copy, |d, id| d.tag(id) == Some("span"))
            .into_iter()
            .next()
            .unwrap();
        assert_eq!(dst.attr(span, "title"), Some("t"));
        assert_eq!(dst.text(copy), "content");
    }

    #[test]
    fn test_prepend_fragment() {
        let mut dom = Dom::parse(r#"<div class="box"><p>native</p></div>"#);
        let target = dom.find(|d, id| d.has_class(id, "box")).unwrap();

        dom.prepend_fragment(target, "<h3>label</h3><p>added</p>");

        let texts: Vec<String> = dom
            .children(target)
            .filter(|&id| dom.tag(id).is_some())
            .map(|id| dom.text(id))
            .collect();
        assert_eq!(texts, ["label", "added", "native"]);
    }

    #[test]
    fn test_insert_fragment_after() {
        let mut dom = Dom::parse(r#"<body><div class="main">main</div><p>tail</p></body>"#);
        let anchor = dom.find(|d, id| d.has_class(id, "main")).unwrap();

        dom.insert_fragment_after(anchor, "<h3>label</h3><div>section</div>");

        let body = dom.body().unwrap();
        let texts: Vec<String> = dom
            .children(body)
            .filter(|&id| dom.tag(id).is_some())
            .map(|id| dom.text(id))
            .collect();
        assert_eq!(texts, ["main", "label", "section", "tail"]);
    }
}
