//! Selector matching against a document tree.
//!
//! [Selectors Level 3 § 3](https://www.w3.org/TR/selectors-3/#selector-syntax)
//!
//! Complex selectors are evaluated right to left: the rightmost compound
//! must match the candidate element, then each combinator constrains where
//! the next compound to the left may match.

use quokka_dom::{NodeData, NodeId, Tree};

use super::{
    AttrOp, AttributeSelector, Combinator, ComplexSelector, Part, PseudoClass, SimpleSelector,
};

pub(crate) fn match_complex(tree: &Tree, id: NodeId, complex: &ComplexSelector) -> bool {
    match_parts(tree, id, &complex.parts, complex.parts.len() - 1)
}

/// Match `parts[index]` (always a compound) against `id`, then recurse
/// leftward through the preceding combinator.
fn match_parts(tree: &Tree, id: NodeId, parts: &[Part], index: usize) -> bool {
    let Some(Part::Compound(simples)) = parts.get(index) else {
        return false;
    };
    if !simples.iter().all(|simple| match_simple(tree, id, simple)) {
        return false;
    }
    if index == 0 {
        return true;
    }
    let Some(Part::Combinator(combinator)) = parts.get(index - 1) else {
        return false;
    };
    match combinator {
        Combinator::Child => tree
            .parent(id)
            .filter(|&p| tree.is_element(p))
            .is_some_and(|p| match_parts(tree, p, parts, index - 2)),
        Combinator::Descendant => tree
            .ancestors(id)
            .filter(|&a| tree.is_element(a))
            .any(|a| match_parts(tree, a, parts, index - 2)),
        Combinator::NextSibling => tree
            .preceding_siblings(id)
            .find(|&s| tree.is_element(s))
            .is_some_and(|s| match_parts(tree, s, parts, index - 2)),
        Combinator::FollowingSibling => tree
            .preceding_siblings(id)
            .filter(|&s| tree.is_element(s))
            .any(|s| match_parts(tree, s, parts, index - 2)),
    }
}

fn match_simple(tree: &Tree, id: NodeId, simple: &SimpleSelector) -> bool {
    let Some(el) = tree.as_element(id) else {
        return false;
    };
    match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Tag(name) => name_matches(&el.tag_name, name),
        SimpleSelector::Attribute(attr) => match_attribute(el.attrs.iter(), attr),
        SimpleSelector::PseudoClass(pseudo) => match_pseudo(tree, id, pseudo),
    }
}

/// [Selectors Level 3 § 6.1](https://www.w3.org/TR/selectors-3/#type-selectors)
///
/// A test without a namespace prefix also matches names carrying one, so
/// `circle` finds `svg:circle`.
fn name_matches(name: &str, test: &str) -> bool {
    name == test
        || name
            .strip_suffix(test)
            .is_some_and(|prefix| prefix.ends_with(':'))
}

fn match_attribute<'a>(
    mut attrs: impl Iterator<Item = (&'a str, &'a str)>,
    attr: &AttributeSelector,
) -> bool {
    attrs.any(|(name, value)| name_matches(name, &attr.name) && attr_value_matches(value, attr))
}

fn attr_value_matches(value: &str, attr: &AttributeSelector) -> bool {
    let Some(op) = attr.op else {
        return true;
    };
    let (value, expected) = if attr.insensitive {
        (value.to_lowercase(), attr.value.to_lowercase())
    } else {
        (value.to_string(), attr.value.clone())
    };
    match op {
        AttrOp::Equals => value == expected,
        AttrOp::Includes => value.split_whitespace().any(|word| word == expected),
        AttrOp::DashMatch => {
            value == expected
                || value
                    .strip_prefix(&expected)
                    .is_some_and(|rest| rest.starts_with('-'))
        }
        AttrOp::Prefix => value.starts_with(&expected),
        AttrOp::Suffix => value.ends_with(&expected),
        AttrOp::Substring => value.contains(&expected),
    }
}

fn match_pseudo(tree: &Tree, id: NodeId, pseudo: &PseudoClass) -> bool {
    match pseudo {
        PseudoClass::Not(group) => !group
            .iter()
            .any(|complex| match_complex(tree, id, complex)),
        PseudoClass::Is(group) => group
            .iter()
            .any(|complex| match_complex(tree, id, complex)),
        PseudoClass::Nth {
            a,
            b,
            of_type,
            last,
        } => match_nth(tree, id, *a, *b, *of_type, *last),
        PseudoClass::Empty => tree.children(id).iter().all(|&child| {
            matches!(
                tree.get(child).map(|n| &n.data),
                Some(NodeData::Comment(_) | NodeData::ProcessingInstruction(_))
            )
        }),
        // Directly under the tree root (or a template content fragment).
        PseudoClass::Root => tree
            .parent(id)
            .is_some_and(|parent| !tree.is_element(parent)),
        PseudoClass::Checked => tree
            .as_element(id)
            .is_some_and(|el| el.attrs.contains("checked") || el.attrs.contains("selected")),
        PseudoClass::Link => tree.as_element(id).is_some_and(|el| {
            matches!(el.tag_name.as_str(), "a" | "area" | "link") && el.attrs.contains("href")
        }),
        PseudoClass::Text(pattern) => tree.children(id).iter().any(|&child| {
            tree.as_text(child)
                .is_some_and(|content| pattern.is_match(content))
        }),
    }
}

/// [§ 6.6.5.2](https://www.w3.org/TR/selectors-3/#nth-child-pseudo)
///
/// The element's 1-based position among its element siblings (optionally
/// restricted to its own type, optionally counted from the end) must be
/// expressible as `an+b` for a non-negative `n`.
fn match_nth(tree: &Tree, id: NodeId, a: i64, b: i64, of_type: bool, last: bool) -> bool {
    let Some(parent) = tree.parent(id) else {
        return false;
    };
    let tag = tree.as_element(id).map(|el| el.tag_name.clone());
    let siblings: Vec<NodeId> = tree
        .children(parent)
        .iter()
        .copied()
        .filter(|&child| {
            tree.as_element(child).is_some_and(|el| {
                !of_type || Some(&el.tag_name) == tag.as_ref()
            })
        })
        .collect();
    let Some(mut index) = siblings.iter().position(|&s| s == id) else {
        return false;
    };
    if last {
        index = siblings.len() - index - 1;
    }
    // An `an+b` offset near the i64 boundary can never produce a real
    // sibling position.
    let Some(delta) = index_to_i64(index)
        .checked_add(1)
        .and_then(|position| position.checked_sub(b))
    else {
        return false;
    };
    delta == 0 || (a != 0 && (delta < 0) == (a < 0) && delta % a == 0)
}

#[allow(clippy::cast_possible_wrap)]
fn index_to_i64(index: usize) -> i64 {
    index as i64
}
