//! Tree serialization back to markup.
//!
//! [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)
//!
//! One serializer handles both syntaxes; the `xml` flag selects empty-tag
//! and empty-attribute forms. Output is lossless for what the parser keeps:
//! attribute insertion order, comment and CDATA payloads, and raw text.

use crate::{NodeData, NodeId, Tree, xml_escape};

/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
/// "Void elements can't have any contents."
///
/// Includes the obsolete `keygen` and `menuitem` for leniency.
#[must_use]
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "keygen"
            | "link"
            | "menuitem"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Serialize a node and its subtree to markup.
#[must_use]
pub fn render(tree: &Tree, id: NodeId, xml: bool) -> String {
    let mut out = String::new();
    render_node(tree, id, xml, &mut out);
    out
}

/// Serialize only the children of a node, in order.
///
/// This is the "inner HTML" form; container nodes (Document, Fragment)
/// serialize to exactly this.
#[must_use]
pub fn render_children(tree: &Tree, id: NodeId, xml: bool) -> String {
    let mut out = String::new();
    for &child in tree.children(id) {
        render_node(tree, child, xml, &mut out);
    }
    out
}

fn render_node(tree: &Tree, id: NodeId, xml: bool, out: &mut String) {
    let Some(node) = tree.get(id) else { return };
    match &node.data {
        NodeData::Document { .. } | NodeData::Fragment => {
            for &child in &node.children {
                render_node(tree, child, xml, out);
            }
        }
        NodeData::Element(_) => render_element(tree, id, xml, out),
        NodeData::Text { content, raw } => {
            if *raw {
                out.push_str(content);
            } else {
                out.push_str(&xml_escape(content));
            }
        }
        NodeData::Comment(content) => {
            out.push_str("<!--");
            out.push_str(content);
            out.push_str("-->");
        }
        NodeData::Cdata(content) => {
            out.push_str("<![CDATA[");
            out.push_str(content);
            out.push_str("]]>");
        }
        NodeData::ProcessingInstruction(content) => {
            out.push_str("<?");
            out.push_str(content);
            out.push_str("?>");
        }
        NodeData::Doctype { name, .. } => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
    }
}

fn render_element(tree: &Tree, id: NodeId, xml: bool, out: &mut String) {
    let Some(el) = tree.as_element(id) else { return };
    out.push('<');
    out.push_str(&el.tag_name);

    for (name, value) in el.attrs.iter() {
        out.push(' ');
        out.push_str(name);
        if value.is_empty() && !xml {
            continue;
        }
        out.push_str("=\"");
        if value.is_empty() {
            // "Attribute minimization" is forbidden in XML; repeat the name.
            out.push_str(name);
        } else {
            out.push_str(&xml_escape(value));
        }
        out.push('"');
    }

    // An extracted template keeps its children in a separate content
    // fragment; serialize that fragment inline so the markup round-trips.
    let content = el
        .template_content
        .filter(|_| el.tag_name == "template" && !xml);

    let children = content.map_or_else(|| tree.children(id), |c| tree.children(c));

    if !xml && is_void_element(&el.tag_name) {
        out.push('>');
        return;
    }
    if xml && children.is_empty() {
        out.push_str(" />");
        return;
    }

    out.push('>');
    for &child in children {
        render_node(tree, child, xml, out);
    }
    out.push_str("</");
    out.push_str(&el.tag_name);
    out.push('>');
}
