//! The tree builder.
//!
//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//! "The input to the tree construction stage is a sequence of tokens from
//! the tokenization stage."
//!
//! Instead of the WHATWG insertion modes and stack of open elements, this
//! builder keeps a single insertion point and derives the open-element
//! chain from the tree itself: the ancestors of the insertion point. The
//! auto-close rules in [`tags`] approximate the standard's implied end
//! tags well enough for real-world lenient parsing.

use quokka_dom::{ElementData, NodeData, NodeId, Tree, xml_unescape};

use super::tags;
use crate::tokenizer::Token;

/// Consumes tokens and grows a [`Tree`].
#[derive(Debug)]
pub struct TreeBuilder {
    tree: Tree,
    current: NodeId,
    xml: bool,
}

impl TreeBuilder {
    /// Create a builder rooted at a Document (or, for fragment parsing, a
    /// Fragment) node.
    #[must_use]
    pub fn new(xml: bool, fragment: bool) -> Self {
        let tree = if fragment {
            Tree::new_fragment()
        } else {
            Tree::new_document()
        };
        let current = tree.root();
        Self { tree, current, xml }
    }

    /// Dispatch one token.
    pub fn process(&mut self, token: Token) {
        match token {
            Token::Text(text) => self.tree.insert_text(self.current, &xml_unescape(&text)),
            Token::Doctype(body) => self.append(NodeData::Doctype {
                name: body,
                public_id: String::new(),
                system_id: String::new(),
            }),
            Token::Comment(body) => self.append(NodeData::Comment(body)),
            Token::Cdata(body) => self.append(NodeData::Cdata(body)),
            Token::ProcessingInstruction(body) => {
                self.append(NodeData::ProcessingInstruction(body));
            }
            Token::StartTag {
                name,
                attrs,
                self_closing,
            } => self.start_tag(&name, attrs, self_closing),
            Token::EndTag(name) => self.end_tag(&name),
        }
    }

    /// Handle a start tag: run the auto-close rules, create the element,
    /// and descend into it unless it is void or effectively self-closing.
    pub fn start_tag(&mut self, name: &str, attrs: Vec<(String, String)>, self_closing: bool) {
        // Treat the ancient "image" tag as an alias.
        let name = if !self.xml && name == "image" { "img" } else { name };

        if !self.xml {
            if let Some(before) = tags::ends_before(name) {
                self.end(before);
            } else if let Some((closeable, scope)) = tags::auto_closes(name) {
                let mut node = self.current;
                while let Some(el) = self.tree.as_element(node) {
                    if scope.iter().any(|&t| el.tag_name == t) {
                        break;
                    }
                    if closeable.iter().any(|&t| el.tag_name == t) {
                        let tag = el.tag_name.clone();
                        self.end(&tag);
                    }
                    let Some(parent) = self.tree.parent(node) else { break };
                    node = parent;
                }
            }
        }

        let mut element = ElementData::new(name);
        for (attr_name, value) in attrs {
            let _ = element.attrs.set(attr_name, value);
        }
        let id = self.tree.alloc(NodeData::Element(element));
        self.tree.append_child(self.current, id);

        // Void elements never take content; an explicit slash is honored
        // in XML and on HTML elements not expected to have content.
        let stays_closed = (!self.xml && tags::is_void(name))
            || (self_closing && (self.xml || !tags::is_block(name)));
        if !stays_closed {
            self.current = id;
        }
    }

    /// Handle an end tag.
    pub fn end_tag(&mut self, name: &str) {
        if !self.xml {
            for tag in tags::closes_first(name) {
                self.end(tag);
            }
        }
        self.end(name);
    }

    /// Insert captured raw-text content into the current element and close
    /// it. The content arrives with its end tag already consumed by the
    /// tokenizer, so `name` is always the current element.
    pub fn raw_text(&mut self, name: &str, content: &str) {
        self.tree.insert_text_raw(self.current, content, true);
        self.end(name);
    }

    /// Finish parsing and hand over the tree.
    #[must_use]
    pub fn finish(self) -> Tree {
        self.tree
    }

    fn append(&mut self, data: NodeData) {
        let id = self.tree.alloc(data);
        self.tree.append_child(self.current, id);
    }

    /// Find the nearest open element named `name` and make its parent the
    /// insertion point, implicitly closing everything below it.
    ///
    /// The search never crosses a scope boundary, and in HTML it never
    /// lets a phrasing end tag close a non-phrasing ancestor. When the
    /// search fails the end tag is ignored.
    fn end(&mut self, name: &str) {
        let mut node = self.current;
        loop {
            let Some(el) = self.tree.as_element(node) else { return };
            if el.tag_name == name {
                if name == "template" {
                    self.extract_template_content(node);
                }
                self.current = self.tree.parent(node).unwrap_or(self.tree.root());
                return;
            }
            if tags::is_scope(&el.tag_name) {
                return;
            }
            if !self.xml && tags::is_phrasing(name) && !tags::is_phrasing(&el.tag_name) {
                return;
            }
            let Some(parent) = self.tree.parent(node) else { return };
            node = parent;
        }
    }

    /// [§ 4.12.3](https://html.spec.whatwg.org/multipage/scripting.html#the-template-element)
    /// "The template contents must be a DocumentFragment node..."
    ///
    /// Children parsed into the template move into a detached content
    /// fragment when the template closes.
    fn extract_template_content(&mut self, template: NodeId) {
        let content = self.tree.alloc(NodeData::Fragment);
        self.tree.move_children(template, content);
        if let Some(el) = self.tree.as_element_mut(template) {
            el.template_content = Some(content);
        }
    }
}
