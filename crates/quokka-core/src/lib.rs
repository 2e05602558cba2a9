//! High-level DOM API: parse markup, query it with CSS selectors, extract
//! text and form values, and rewrite the tree.
//!
//! [`Dom`] owns a [`Tree`] and a render mode; nodes are addressed by
//! [`NodeId`] handles obtained from queries.
//!
//! ```
//! use quokka_core::Dom;
//!
//! let dom = Dom::fragment("<div><p id=\"a\">Test</p><p id=\"b\">123</p></div>");
//! let p = dom.at(dom.root(), "p#b").unwrap().unwrap();
//! assert_eq!(dom.text(p), "123");
//! ```

pub use quokka_css::{Selector, SelectorError};
pub use quokka_dom::{Attributes, NodeData, NodeId, NodeKind, Tree, render, render_children};
pub use quokka_html::{parse_html, parse_html_fragment, parse_xml};

use quokka_dom::ElementData;

/// How [`Dom::parse`] interprets its input.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Parse as XML: case preserved, every `/>` honored, no HTML rules.
    pub xml: bool,
    /// Root the tree at a Fragment instead of a Document.
    pub fragment: bool,
}

/// A form control value extracted by [`Dom::val`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    /// A single value.
    Single(String),
    /// All selected values of a `select multiple`.
    Multiple(Vec<String>),
}

/// A parsed document with query and mutation helpers.
#[derive(Debug, Clone)]
pub struct Dom {
    tree: Tree,
    xml: bool,
}

impl Dom {
    /// Parse markup.
    #[must_use]
    pub fn parse(input: &str, options: ParseOptions) -> Self {
        let tree = match (options.xml, options.fragment) {
            (true, _) => parse_xml(input),
            (false, false) => parse_html(input),
            (false, true) => parse_html_fragment(input),
        };
        Self {
            tree,
            xml: options.xml,
        }
    }

    /// Parse an HTML document.
    #[must_use]
    pub fn html(input: &str) -> Self {
        Self::parse(input, ParseOptions::default())
    }

    /// Parse an HTML fragment.
    #[must_use]
    pub fn fragment(input: &str) -> Self {
        Self::parse(
            input,
            ParseOptions {
                fragment: true,
                ..ParseOptions::default()
            },
        )
    }

    /// Parse an XML document.
    #[must_use]
    pub fn xml(input: &str) -> Self {
        Self::parse(
            input,
            ParseOptions {
                xml: true,
                ..ParseOptions::default()
            },
        )
    }

    /// Build a fragment holding a single element with the given attributes
    /// and inner markup.
    #[must_use]
    pub fn new_tag(name: &str, attrs: &[(&str, &str)], content: &str) -> Self {
        let mut dom = Self::fragment("");
        let mut element = ElementData::new(name);
        for &(attr_name, value) in attrs {
            let _ = element.attrs.set(attr_name, value);
        }
        let id = dom.tree.alloc(NodeData::Element(element));
        let root = dom.tree.root();
        dom.tree.append_child(root, id);
        dom.replace_content(id, content);
        dom
    }

    /// The underlying tree.
    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The root container node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// Whether this document renders as XML.
    #[must_use]
    pub const fn is_xml(&self) -> bool {
        self.xml
    }

    // Queries

    /// The first descendant of `scope` matching the selector.
    ///
    /// # Errors
    ///
    /// Fails when the selector does not compile.
    pub fn at(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        Ok(Selector::new(selector)?.find_first(&self.tree, scope))
    }

    /// All descendants of `scope` matching the selector, in document order.
    ///
    /// # Errors
    ///
    /// Fails when the selector does not compile.
    pub fn find(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        Ok(Selector::new(selector)?.find_all(&self.tree, scope))
    }

    /// Check this element against a selector.
    ///
    /// # Errors
    ///
    /// Fails when the selector does not compile.
    pub fn matches(&self, id: NodeId, selector: &str) -> Result<bool, SelectorError> {
        Ok(Selector::new(selector)?.matches(&self.tree, id))
    }

    /// Element ancestors of a node, closest first, optionally filtered by
    /// a selector.
    ///
    /// # Errors
    ///
    /// Fails when the selector does not compile.
    pub fn ancestors(
        &self,
        id: NodeId,
        selector: Option<&str>,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let elements = self
            .tree
            .ancestors(id)
            .filter(|&a| self.tree.is_element(a))
            .collect();
        self.filter(elements, selector)
    }

    /// Element children of a node (the content fragment for templates),
    /// optionally filtered by a selector.
    ///
    /// # Errors
    ///
    /// Fails when the selector does not compile.
    pub fn children(
        &self,
        id: NodeId,
        selector: Option<&str>,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let target = self.content_target(id);
        let elements = self
            .tree
            .children(target)
            .iter()
            .copied()
            .filter(|&c| self.tree.is_element(c))
            .collect();
        self.filter(elements, selector)
    }

    /// Element siblings after a node, in document order, optionally
    /// filtered by a selector.
    ///
    /// # Errors
    ///
    /// Fails when the selector does not compile.
    pub fn following(
        &self,
        id: NodeId,
        selector: Option<&str>,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let mut elements = Vec::new();
        let mut current = self.tree.next_sibling(id);
        while let Some(sibling) = current {
            if self.tree.is_element(sibling) {
                elements.push(sibling);
            }
            current = self.tree.next_sibling(sibling);
        }
        self.filter(elements, selector)
    }

    /// Element siblings before a node, in document order, optionally
    /// filtered by a selector.
    ///
    /// # Errors
    ///
    /// Fails when the selector does not compile.
    pub fn preceding(
        &self,
        id: NodeId,
        selector: Option<&str>,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let mut elements: Vec<NodeId> = self
            .tree
            .preceding_siblings(id)
            .filter(|&s| self.tree.is_element(s))
            .collect();
        elements.reverse();
        self.filter(elements, selector)
    }

    /// The next element sibling.
    #[must_use]
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.tree.next_sibling(id);
        while let Some(sibling) = current {
            if self.tree.is_element(sibling) {
                return Some(sibling);
            }
            current = self.tree.next_sibling(sibling);
        }
        None
    }

    /// The previous element sibling.
    #[must_use]
    pub fn previous(&self, id: NodeId) -> Option<NodeId> {
        self.tree
            .preceding_siblings(id)
            .find(|&s| self.tree.is_element(s))
    }

    /// The parent node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.parent(id)
    }

    // Accessors

    /// The tag name, for elements.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.tree.as_element(id).map(|el| el.tag_name.as_str())
    }

    /// Rename an element.
    pub fn set_tag(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.tree.as_element_mut(id) {
            el.tag_name = name.to_string();
        }
    }

    /// The attribute map, for elements.
    #[must_use]
    pub fn attr(&self, id: NodeId) -> Option<&Attributes> {
        self.tree.as_element(id).map(|el| &el.attrs)
    }

    /// The mutable attribute map, for elements.
    pub fn attr_mut(&mut self, id: NodeId) -> Option<&mut Attributes> {
        self.tree.as_element_mut(id).map(|el| &mut el.attrs)
    }

    /// Text content from the direct Text and CDATA children of a node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.tree.children(self.content_target(id)) {
            self.collect_text(child, &mut out, false);
        }
        out
    }

    /// Text content from all Text and CDATA descendants of a node.
    #[must_use]
    pub fn all_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.tree.children(self.content_target(id)) {
            self.collect_text(child, &mut out, true);
        }
        out
    }

    /// The children of a node rendered back to markup (the content
    /// fragment for templates).
    #[must_use]
    pub fn content(&self, id: NodeId) -> String {
        render_children(&self.tree, self.content_target(id), self.xml)
    }

    /// A node and its subtree rendered back to markup.
    #[must_use]
    pub fn render(&self, id: NodeId) -> String {
        render(&self.tree, id, self.xml)
    }

    // Mutation

    /// Insert markup as siblings right after this node.
    pub fn append(&mut self, id: NodeId, content: &str) {
        let Some(parent) = self.tree.parent(id) else { return };
        let mut reference = id;
        for node in self.parse_content(content) {
            self.tree.insert_after(parent, node, reference);
            reference = node;
        }
    }

    /// Insert markup as siblings right before this node.
    pub fn prepend(&mut self, id: NodeId, content: &str) {
        let Some(parent) = self.tree.parent(id) else { return };
        for node in self.parse_content(content) {
            self.tree.insert_before(parent, node, id);
        }
    }

    /// Append markup to this node's children.
    pub fn append_content(&mut self, id: NodeId, content: &str) {
        let target = self.content_target(id);
        for node in self.parse_content(content) {
            self.tree.append_child(target, node);
        }
    }

    /// Prepend markup to this node's children.
    pub fn prepend_content(&mut self, id: NodeId, content: &str) {
        let target = self.content_target(id);
        for (offset, node) in self.parse_content(content).into_iter().enumerate() {
            match self.tree.children(target).get(offset).copied() {
                Some(reference) => self.tree.insert_before(target, node, reference),
                None => self.tree.append_child(target, node),
            }
        }
    }

    /// Replace this node with markup.
    pub fn replace(&mut self, id: NodeId, content: &str) {
        let Some(parent) = self.tree.parent(id) else { return };
        let mut reference = id;
        for node in self.parse_content(content) {
            self.tree.insert_after(parent, node, reference);
            reference = node;
        }
        self.tree.detach(id);
    }

    /// Replace this node's children with markup.
    pub fn replace_content(&mut self, id: NodeId, content: &str) {
        let target = self.content_target(id);
        for child in self.tree.children(target).to_vec() {
            self.tree.detach(child);
        }
        for node in self.parse_content(content) {
            self.tree.append_child(target, node);
        }
    }

    /// Remove this node but keep its children in place.
    pub fn strip(&mut self, id: NodeId) {
        let Some(parent) = self.tree.parent(id) else { return };
        for child in self.tree.children(id).to_vec() {
            self.tree.detach(child);
            self.tree.insert_before(parent, child, id);
        }
        self.tree.detach(id);
    }

    /// Remove this node and its subtree.
    pub fn remove(&mut self, id: NodeId) {
        self.tree.detach(id);
    }

    /// Wrap markup around this node: the parsed fragment takes the node's
    /// place and the node moves inside its innermost element. Content
    /// without an element is ignored.
    pub fn wrap(&mut self, id: NodeId, content: &str) {
        if self.tree.parent(id).is_none() {
            return;
        }
        let nodes = self.parse_content(content);
        let Some(inner) = self.innermost_element(&nodes) else {
            return;
        };
        let Some(parent) = self.tree.parent(id) else { return };
        for &node in &nodes {
            self.tree.insert_before(parent, node, id);
        }
        self.tree.detach(id);
        self.tree.append_child(inner, id);
    }

    /// Wrap markup around this node's children: they move into the
    /// fragment's innermost element, and the fragment becomes the new
    /// content. Content without an element is ignored.
    pub fn wrap_content(&mut self, id: NodeId, content: &str) {
        let target = self.content_target(id);
        let nodes = self.parse_content(content);
        let Some(inner) = self.innermost_element(&nodes) else {
            return;
        };
        for child in self.tree.children(target).to_vec() {
            self.tree.detach(child);
            self.tree.append_child(inner, child);
        }
        for node in nodes {
            self.tree.append_child(target, node);
        }
    }

    // Extraction

    /// Extract the value of a form element.
    ///
    /// [§ 4.10.5](https://html.spec.whatwg.org/multipage/input.html)
    ///
    /// `option` falls back from its `value` attribute to its text;
    /// `input` checkboxes and radio buttons default to `on`; `select`
    /// honors `:checked`, skips disabled options and disabled option
    /// groups, and returns every value when `multiple`; `textarea` yields
    /// its text.
    #[must_use]
    pub fn val(&self, id: NodeId) -> Option<FormValue> {
        let el = self.tree.as_element(id)?;
        match el.tag_name.as_str() {
            "option" => Some(FormValue::Single(self.option_value(id)?)),
            "input" => {
                let value = el.attrs.get("value");
                let kind = el.attrs.get("type").unwrap_or("");
                if kind == "radio" || kind == "checkbox" {
                    Some(FormValue::Single(value.unwrap_or("on").to_string()))
                } else {
                    value.map(|v| FormValue::Single(v.to_string()))
                }
            }
            "select" => self.select_value(id, el.attrs.contains("multiple")),
            "textarea" => Some(FormValue::Single(self.text(id))),
            _ => el
                .attrs
                .get("value")
                .map(|v| FormValue::Single(v.to_string())),
        }
    }

    /// The namespace of an element, resolved from `xmlns` and
    /// `xmlns:prefix` declarations on the element and its ancestors.
    #[must_use]
    pub fn namespace(&self, id: NodeId) -> Option<String> {
        let el = self.tree.as_element(id)?;
        let key = el.tag_name.split_once(':').map_or_else(
            || "xmlns".to_string(),
            |(prefix, _)| format!("xmlns:{prefix}"),
        );
        std::iter::once(id)
            .chain(self.tree.ancestors(id))
            .find_map(|node| {
                self.tree
                    .as_element(node)
                    .and_then(|e| e.attrs.get(&key))
                    .map(ToString::to_string)
            })
    }

    /// A CSS selector path that uniquely identifies this element, built
    /// from `tag:nth-child(n)` segments.
    #[must_use]
    pub fn selector(&self, id: NodeId) -> Option<String> {
        if !self.tree.is_element(id) {
            return None;
        }
        let mut segments: Vec<String> = std::iter::once(id)
            .chain(self.tree.ancestors(id))
            .filter(|&node| self.tree.is_element(node))
            .map(|node| self.selector_segment(node))
            .collect();
        segments.reverse();
        Some(segments.join(" > "))
    }

    // Internals

    fn selector_segment(&self, id: NodeId) -> String {
        let tag = self.tag(id).unwrap_or_default();
        let position = self
            .tree
            .parent(id)
            .map_or(1, |parent| {
                self.tree
                    .children(parent)
                    .iter()
                    .filter(|&&c| self.tree.is_element(c))
                    .position(|&c| c == id)
                    .map_or(1, |index| index + 1)
            });
        format!("{tag}:nth-child({position})")
    }

    fn option_value(&self, id: NodeId) -> Option<String> {
        let el = self.tree.as_element(id)?;
        Some(
            el.attrs
                .get("value")
                .map_or_else(|| self.text(id), ToString::to_string),
        )
    }

    fn select_value(&self, id: NodeId, multiple: bool) -> Option<FormValue> {
        let selector = Selector::new("option:checked:not([disabled])").ok()?;
        let values: Vec<String> = selector
            .find_all(&self.tree, id)
            .into_iter()
            .filter(|&option| !self.in_disabled_group(option, id))
            .filter_map(|option| self.option_value(option))
            .collect();
        if multiple {
            if values.is_empty() {
                return None;
            }
            return Some(FormValue::Multiple(values));
        }
        values.into_iter().next_back().map(FormValue::Single)
    }

    fn in_disabled_group(&self, option: NodeId, select: NodeId) -> bool {
        self.tree
            .ancestors(option)
            .take_while(|&a| a != select)
            .any(|a| {
                self.tree
                    .as_element(a)
                    .is_some_and(|el| el.tag_name == "optgroup" && el.attrs.contains("disabled"))
            })
    }

    /// The node content operations target: the content fragment for a
    /// template element, the node itself otherwise.
    fn content_target(&self, id: NodeId) -> NodeId {
        self.tree
            .as_element(id)
            .and_then(|el| el.template_content)
            .unwrap_or(id)
    }

    fn collect_text(&self, id: NodeId, out: &mut String, recurse: bool) {
        let Some(node) = self.tree.get(id) else { return };
        match &node.data {
            NodeData::Text { content, .. } | NodeData::Cdata(content) => out.push_str(content),
            NodeData::Element(_) if recurse => {
                for &child in self.tree.children(self.content_target(id)) {
                    self.collect_text(child, out, true);
                }
            }
            _ => {}
        }
    }

    /// Parse markup with this document's own mode and import the resulting
    /// top-level nodes as detached members of this arena.
    fn parse_content(&mut self, content: &str) -> Vec<NodeId> {
        let parsed = if self.xml {
            parse_xml(content)
        } else {
            parse_html_fragment(content)
        };
        parsed
            .children(parsed.root())
            .iter()
            .map(|&child| self.tree.import_subtree(&parsed, child))
            .collect()
    }

    /// Descend through first element children to the deepest element of a
    /// freshly parsed fragment.
    fn innermost_element(&self, nodes: &[NodeId]) -> Option<NodeId> {
        let mut current = nodes.iter().copied().find(|&n| self.tree.is_element(n))?;
        loop {
            let next = self
                .tree
                .children(current)
                .iter()
                .copied()
                .find(|&c| self.tree.is_element(c));
            match next {
                Some(child) => current = child,
                None => return Some(current),
            }
        }
    }

    fn filter(
        &self,
        elements: Vec<NodeId>,
        selector: Option<&str>,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let Some(selector) = selector else {
            return Ok(elements);
        };
        let compiled = Selector::new(selector)?;
        Ok(elements
            .into_iter()
            .filter(|&id| compiled.matches(&self.tree, id))
            .collect())
    }
}

impl std::fmt::Display for Dom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&render_children(&self.tree, self.tree.root(), self.xml))
    }
}
