//! Compiled selectors.
//!
//! [Selectors Level 3 § 4](https://www.w3.org/TR/selectors-3/#selector-syntax)
//! "A selector represents a structure... consists of one or more sequences
//! of simple selectors separated by combinators."
//!
//! A selector string compiles once into an AST; matching never reparses.

mod matches;
mod parse;

use regex::Regex;
use thiserror::Error;

use quokka_dom::{NodeId, Tree};

/// Selector compilation failure.
#[derive(Debug, Error)]
pub enum SelectorError {
    /// The input contains a construct the compiler does not recognize.
    #[error("unknown CSS selector: {0}")]
    UnknownSelector(String),
    /// A `:text` pattern failed to compile.
    #[error("invalid text pattern: {0}")]
    InvalidTextPattern(#[from] regex::Error),
}

/// [§ 8 Combinators](https://www.w3.org/TR/selectors-3/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: any element ancestor.
    Descendant,
    /// `>`: the element parent.
    Child,
    /// `+`: the immediately preceding element sibling.
    NextSibling,
    /// `~`: any preceding element sibling.
    FollowingSibling,
}

/// [§ 6.3 Attribute selectors](https://www.w3.org/TR/selectors-3/#attribute-selectors)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    /// `=`: exact value.
    Equals,
    /// `~=`: one of a whitespace-separated list of words.
    Includes,
    /// `|=`: exactly the value or the value followed by `-`.
    DashMatch,
    /// `^=`: value prefix.
    Prefix,
    /// `$=`: value suffix.
    Suffix,
    /// `*=`: value substring.
    Substring,
}

/// An attribute test, also the compiled form of `.class` and `#id`.
#[derive(Debug, Clone)]
pub struct AttributeSelector {
    /// Attribute name test (namespace prefixes on the element side are
    /// accepted).
    pub name: String,
    /// Value operator; `None` tests for presence only.
    pub op: Option<AttrOp>,
    /// Expected value.
    pub value: String,
    /// [Selectors Level 4 § 6.3](https://www.w3.org/TR/selectors-4/#attribute-case)
    /// "identifier `i`... causes the value... to be compared
    /// case-insensitively."
    pub insensitive: bool,
}

/// A structural or stateful element test.
#[derive(Debug, Clone)]
pub enum PseudoClass {
    /// `:not(...)`: none of the inner selectors match.
    Not(Vec<ComplexSelector>),
    /// `:is(...)`: any of the inner selectors match.
    Is(Vec<ComplexSelector>),
    /// The `An+B` family. `first-child` is `(0, 1)`; unknown pseudo-classes
    /// compile to the always-false `(0, 0)`.
    Nth {
        /// Step.
        a: i64,
        /// Offset.
        b: i64,
        /// Count only siblings with the same tag name.
        of_type: bool,
        /// Count from the end.
        last: bool,
    },
    /// `:empty`: no children other than comments and processing
    /// instructions.
    Empty,
    /// `:root`: the element sits directly under the tree root.
    Root,
    /// `:checked`: carries a `checked` or `selected` attribute.
    Checked,
    /// `:link`, `:any-link`, `:visited`: an `a`, `area` or `link` element
    /// with an `href` attribute.
    Link,
    /// `:text(...)`: a direct text child matches the pattern
    /// (case-insensitive substring by default).
    Text(Regex),
}

/// [§ 4](https://www.w3.org/TR/selectors-3/#simple-selectors-dfn)
/// "A simple selector is either a type selector, universal selector,
/// attribute selector, class selector, ID selector, or pseudo-class."
#[derive(Debug, Clone)]
pub enum SimpleSelector {
    /// `*`.
    Universal,
    /// A type selector; matches the tag name with or without a namespace
    /// prefix on the element.
    Tag(String),
    /// An attribute, class, or ID test.
    Attribute(AttributeSelector),
    /// A pseudo-class.
    PseudoClass(PseudoClass),
}

/// One alternating step of a complex selector.
#[derive(Debug, Clone)]
pub enum Part {
    /// A compound selector: simple selectors that must all match one
    /// element.
    Compound(Vec<SimpleSelector>),
    /// A combinator between two compounds.
    Combinator(Combinator),
}

/// A full combinator chain, stored in source order and evaluated from the
/// rightmost compound inward.
#[derive(Debug, Clone)]
pub struct ComplexSelector {
    pub(crate) parts: Vec<Part>,
}

/// A compiled selector group.
///
/// ```
/// use quokka_css::Selector;
///
/// let selector = Selector::new("div > p.intro, h1").unwrap();
/// assert!(Selector::new("p[").is_err());
/// let _ = selector;
/// ```
#[derive(Debug, Clone)]
pub struct Selector {
    group: Vec<ComplexSelector>,
    source: String,
}

impl Selector {
    /// Compile a selector group.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError`] when the input contains an unrecognized
    /// construct. Unknown pseudo-class *names* are not an error; they
    /// compile to a selector that matches nothing.
    pub fn new(input: &str) -> Result<Self, SelectorError> {
        Ok(Self {
            group: parse::parse_group(input)?,
            source: input.to_string(),
        })
    }

    /// The selector source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Check whether the element `id` matches any selector in the group.
    /// Non-element nodes never match.
    #[must_use]
    pub fn matches(&self, tree: &Tree, id: NodeId) -> bool {
        tree.is_element(id)
            && self
                .group
                .iter()
                .any(|complex| matches::match_complex(tree, id, complex))
    }

    /// All matching elements among the strict descendants of `scope`, in
    /// document order.
    #[must_use]
    pub fn find_all(&self, tree: &Tree, scope: NodeId) -> Vec<NodeId> {
        tree.descendants(scope)
            .filter(|&id| self.matches(tree, id))
            .collect()
    }

    /// The first matching element among the strict descendants of `scope`,
    /// in document order.
    #[must_use]
    pub fn find_first(&self, tree: &Tree, scope: NodeId) -> Option<NodeId> {
        tree.descendants(scope).find(|&id| self.matches(tree, id))
    }
}
