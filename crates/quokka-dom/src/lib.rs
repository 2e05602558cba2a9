//! Document tree for the quokka HTML/XML toolkit.
//!
//! This crate provides an arena-based node tree loosely following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/), with the node
//! variants needed for lenient HTML and XML processing.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all
//! relationships, providing O(1) access and traversal without borrow checker
//! issues. Parent links are non-owning back-pointers; a node is owned by its
//! position in the arena and reachable through its parent's children list.

use std::mem;

use strum_macros::Display;

pub mod escape;
pub mod serialize;

pub use escape::{xml_escape, xml_unescape};
pub use serialize::{is_void_element, render, render_children};

/// A type-safe index into the document tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root container node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);
}

/// The node type discriminator, using the original `nodeType` string forms
/// (`#element`, `#text`, ...) for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum NodeKind {
    /// A document root container.
    #[strum(serialize = "#document")]
    Document,
    /// A fragment root container.
    #[strum(serialize = "#fragment")]
    Fragment,
    /// An element with a tag name and attributes.
    #[strum(serialize = "#element")]
    Element,
    /// A run of character data.
    #[strum(serialize = "#text")]
    Text,
    /// A comment.
    #[strum(serialize = "#comment")]
    Comment,
    /// A CDATA section.
    #[strum(serialize = "#cdata")]
    Cdata,
    /// A processing instruction.
    #[strum(serialize = "#pi")]
    ProcessingInstruction,
    /// A document type declaration.
    #[strum(serialize = "#doctype")]
    Doctype,
}

/// Document compatibility mode, carried for round-trip fidelity.
///
/// [§ 13.2 Parsing HTML documents](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum QuirksMode {
    /// Standards mode.
    #[default]
    #[strum(serialize = "no-quirks")]
    NoQuirks,
    /// Quirks mode.
    #[strum(serialize = "quirks")]
    Quirks,
    /// Limited-quirks mode.
    #[strum(serialize = "limited-quirks")]
    LimitedQuirks,
}

/// Insertion-ordered, unique-keyed attribute map for an element.
///
/// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
/// "An element has an associated attribute list."
///
/// Serialization order equals insertion order; setting an existing name
/// replaces the value in place and keeps the original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    /// Create an empty attribute map.
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Get an attribute value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Check whether an attribute with the given name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Set an attribute, returning the replaced value if the name was
    /// already present.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        for entry in &mut self.entries {
            if entry.0 == name {
                return Some(mem::replace(&mut entry.1, value));
            }
        }
        self.entries.push((name, value));
        None
    }

    /// Remove an attribute by name, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(idx).1)
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Iterate over attribute names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Element-specific data.
///
/// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
/// "Elements have an associated namespace, namespace prefix, local name..."
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    /// "An element's local name" (lowercased by the HTML tree builder).
    pub tag_name: String,
    /// The element's namespace URI; empty means none.
    pub namespace_uri: String,
    /// "An element has an associated attribute list."
    pub attrs: Attributes,
    /// [§ 4.12.3 The template element](https://html.spec.whatwg.org/multipage/scripting.html#the-template-element)
    /// "The template contents must be a DocumentFragment node..."
    ///
    /// Only ever set for `template` elements; points at a Fragment node in
    /// the same arena that is not reachable through any children list.
    pub template_content: Option<NodeId>,
}

impl ElementData {
    /// Create element data with a tag name and no attributes.
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Self::default()
        }
    }
}

/// The data payload of a node, one variant per node type.
///
/// A closed enum with exhaustive matches in the builder, serializer, and
/// selector matcher.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// A document root container.
    Document {
        /// Compatibility mode, unused by the selector engine.
        quirks: QuirksMode,
    },
    /// A fragment root container (also used for template contents).
    Fragment,
    /// An element.
    Element(ElementData),
    /// A run of character data.
    Text {
        /// The decoded text content.
        content: String,
        /// Trusted text (raw-text capture output) is not re-escaped on
        /// serialization.
        raw: bool,
    },
    /// A comment; the payload excludes the `<!--`/`-->` markers.
    Comment(String),
    /// A CDATA section; the payload excludes the `<![CDATA[`/`]]>` markers.
    Cdata(String),
    /// A processing instruction; the payload excludes the `<?`/`?>` markers.
    ProcessingInstruction(String),
    /// A document type declaration.
    Doctype {
        /// The declaration body (HTML mode stores the raw body here).
        name: String,
        /// Public identifier; empty when absent.
        public_id: String,
        /// System identifier; empty when absent.
        system_id: String,
    },
}

impl NodeData {
    /// The node type discriminator for this payload.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Document { .. } => NodeKind::Document,
            Self::Fragment => NodeKind::Fragment,
            Self::Element(_) => NodeKind::Element,
            Self::Text { .. } => NodeKind::Text,
            Self::Comment(_) => NodeKind::Comment,
            Self::Cdata(_) => NodeKind::Cdata,
            Self::ProcessingInstruction(_) => NodeKind::ProcessingInstruction,
            Self::Doctype { .. } => NodeKind::Doctype,
        }
    }
}

/// A node in the tree: payload plus parent/child/sibling relationships.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
#[derive(Debug, Clone)]
pub struct Node {
    /// The node's payload.
    pub data: NodeData,
    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,
    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children."
    pub children: Vec<NodeId>,
    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    pub next_sibling: Option<NodeId>,
    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    pub prev_sibling: Option<NodeId>,
}

/// Arena-based document tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
/// "The DOM represents a document as a tree."
///
/// All nodes live in a contiguous vector and reference each other by
/// [`NodeId`]. Detached subtrees (and template contents) stay in the arena
/// until the tree is dropped; they are simply unreachable from the root.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Create a new tree with the given root container at [`NodeId::ROOT`].
    #[must_use]
    pub fn new(root: NodeData) -> Self {
        Self {
            nodes: vec![Node {
                data: root,
                parent: None,
                children: Vec::new(),
                next_sibling: None,
                prev_sibling: None,
            }],
        }
    }

    /// Create a new tree rooted at a Document node.
    #[must_use]
    pub fn new_document() -> Self {
        Self::new(NodeData::Document {
            quirks: QuirksMode::NoQuirks,
        })
    }

    /// Create a new tree rooted at a Fragment node.
    #[must_use]
    pub fn new_fragment() -> Self {
        Self::new(NodeData::Fragment)
    }

    /// The root container node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Number of nodes in the arena (including detached ones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the arena is empty (it never is; the root is always present).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    ///
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        });
        id
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// Append `child` as the last child of `parent`, updating all
    /// relationships. The child must be detached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.nodes[child.0].parent.is_none());
        let prev_last = self.nodes[parent.0].children.last().copied();

        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[child.0].prev_sibling = prev_last;
        self.nodes[child.0].next_sibling = None;

        if let Some(prev_id) = prev_last {
            self.nodes[prev_id.0].next_sibling = Some(child);
        }
    }

    /// Prepend `child` as the first child of `parent`. The child must be
    /// detached.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.nodes[child.0].parent.is_none());
        let next_first = self.nodes[parent.0].children.first().copied();

        self.nodes[parent.0].children.insert(0, child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[child.0].prev_sibling = None;
        self.nodes[child.0].next_sibling = next_first;

        if let Some(next_id) = next_first {
            self.nodes[next_id.0].prev_sibling = Some(child);
        }
    }

    /// [§ 4.2.3 Insert](https://dom.spec.whatwg.org/#concept-node-insert)
    ///
    /// Insert `node` into `parent`'s children immediately before
    /// `reference`. The node must be detached and the reference must be a
    /// child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: NodeId) {
        self.insert_at(parent, node, reference, 0);
    }

    /// Insert `node` into `parent`'s children immediately after `reference`.
    pub fn insert_after(&mut self, parent: NodeId, node: NodeId, reference: NodeId) {
        self.insert_at(parent, node, reference, 1);
    }

    fn insert_at(&mut self, parent: NodeId, node: NodeId, reference: NodeId, offset: usize) {
        debug_assert!(self.nodes[node.0].parent.is_none());
        debug_assert_eq!(self.nodes[reference.0].parent, Some(parent));
        let idx = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == reference)
            .expect("reference node is not a child of parent")
            + offset;

        let prev = idx.checked_sub(1).map(|i| self.nodes[parent.0].children[i]);
        let next = self.nodes[parent.0].children.get(idx).copied();

        self.nodes[parent.0].children.insert(idx, node);
        self.nodes[node.0].parent = Some(parent);
        self.nodes[node.0].prev_sibling = prev;
        self.nodes[node.0].next_sibling = next;

        if let Some(prev_id) = prev {
            self.nodes[prev_id.0].next_sibling = Some(node);
        }
        if let Some(next_id) = next {
            self.nodes[next_id.0].prev_sibling = Some(node);
        }
    }

    /// [§ 4.2.4 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Remove `child` from `parent`'s children, clearing its parent and
    /// sibling links.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert_eq!(self.nodes[child.0].parent, Some(parent));
        if let Some(idx) = self.nodes[parent.0].children.iter().position(|&c| c == child) {
            let _ = self.nodes[parent.0].children.remove(idx);
        }

        let prev = self.nodes[child.0].prev_sibling;
        let next = self.nodes[child.0].next_sibling;
        if let Some(prev_id) = prev {
            self.nodes[prev_id.0].next_sibling = next;
        }
        if let Some(next_id) = next {
            self.nodes[next_id.0].prev_sibling = prev;
        }

        self.nodes[child.0].parent = None;
        self.nodes[child.0].prev_sibling = None;
        self.nodes[child.0].next_sibling = None;
    }

    /// Remove a node from its parent, if it has one.
    ///
    /// Atomically removes the child from the parent's children list and
    /// clears the back-pointer; a detached node keeps its own children.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent {
            self.remove_child(parent, id);
        }
    }

    /// Insert text as the last child of `parent`, coalescing with a
    /// trailing Text sibling so that no two consecutive Text siblings exist.
    pub fn insert_text(&mut self, parent: NodeId, text: &str) {
        self.insert_text_raw(parent, text, false);
    }

    /// Insert text as the last child of `parent`, with an explicit trusted
    /// flag (see [`NodeData::Text`]).
    pub fn insert_text_raw(&mut self, parent: NodeId, text: &str, raw: bool) {
        if text.is_empty() {
            return;
        }
        if let Some(&last) = self.nodes[parent.0].children.last()
            && let NodeData::Text { content, .. } = &mut self.nodes[last.0].data
        {
            content.push_str(text);
            return;
        }
        let node = self.alloc(NodeData::Text {
            content: text.to_string(),
            raw,
        });
        self.append_child(parent, node);
    }

    /// Move every child of `from` to the end of `to`'s children, keeping
    /// their order. Used for template content extraction and `strip`.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        let moved = mem::take(&mut self.nodes[from.0].children);
        let boundary = self.nodes[to.0].children.last().copied();
        if let Some(&first) = moved.first() {
            self.nodes[first.0].prev_sibling = boundary;
            if let Some(last) = boundary {
                self.nodes[last.0].next_sibling = Some(first);
            }
        }
        for &child in &moved {
            self.nodes[child.0].parent = Some(to);
        }
        self.nodes[to.0].children.extend(moved);
    }

    /// Deep-copy a subtree from another tree into this arena, returning the
    /// detached root of the copy. Template contents are copied along.
    pub fn import_subtree(&mut self, src: &Tree, src_id: NodeId) -> NodeId {
        let mut data = src.nodes[src_id.0].data.clone();
        if let NodeData::Element(el) = &mut data
            && let Some(content) = el.template_content
        {
            el.template_content = Some(self.import_subtree(src, content));
        }
        let new_id = self.alloc(data);
        for &child in &src.nodes[src_id.0].children {
            let copy = self.import_subtree(src, child);
            self.append_child(new_id, copy);
        }
        new_id
    }

    /// Deep-copy a subtree within this arena, returning the detached root
    /// of the copy.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let mut data = self.nodes[id.0].data.clone();
        if let NodeData::Element(el) = &mut data
            && let Some(content) = el.template_content
        {
            el.template_content = Some(self.clone_subtree(content));
        }
        let new_id = self.alloc(data);
        let children = self.nodes[id.0].children.clone();
        for child in children {
            let copy = self.clone_subtree(child);
            self.append_child(new_id, copy);
        }
        new_id
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// The node type discriminator for a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get(id).map(|n| n.data.kind())
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get mutable element data if this node is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.data {
            NodeData::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }

    /// Check if this node is an element.
    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.as_element(id).is_some()
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over preceding siblings, from immediately-before to first.
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> PrecedingSiblings<'_> {
        PrecedingSiblings {
            tree: self,
            current: self.prev_sibling(id),
        }
    }

    /// Iterate over all descendants of a node in pre-order (parent before
    /// children, children in document order). The start node itself is not
    /// yielded.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack = Vec::new();
        stack.extend(self.children(id).iter().rev().copied());
        Descendants { tree: self, stack }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new_fragment()
    }
}

/// Iterator over ancestors of a node.
pub struct Ancestors<'a> {
    tree: &'a Tree,
    current: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over preceding siblings of a node.
pub struct PrecedingSiblings<'a> {
    tree: &'a Tree,
    current: Option<NodeId>,
}

impl Iterator for PrecedingSiblings<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.prev_sibling(id);
        Some(id)
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct Descendants<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Render an indented one-node-per-line dump of a subtree, for debugging.
#[must_use]
pub fn debug_tree(tree: &Tree, id: NodeId) -> String {
    fn walk(tree: &Tree, id: NodeId, depth: usize, out: &mut String) {
        let Some(node) = tree.get(id) else { return };
        for _ in 0..depth {
            out.push_str("  ");
        }
        match &node.data {
            NodeData::Element(el) => {
                out.push_str("#element ");
                out.push_str(&el.tag_name);
            }
            NodeData::Text { content, .. } => {
                out.push_str("#text ");
                out.push_str(&format!("{content:?}"));
            }
            other => out.push_str(&other.kind().to_string()),
        }
        out.push('\n');
        for &child in tree.children(id) {
            walk(tree, child, depth + 1, out);
        }
    }

    let mut out = String::new();
    walk(tree, id, 0, &mut out);
    out
}
