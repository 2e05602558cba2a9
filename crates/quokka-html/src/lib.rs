//! Lenient HTML and XML parsing for the quokka toolkit.
//!
//! [§ 13.2 Parsing HTML documents](https://html.spec.whatwg.org/multipage/parsing.html)
//! "This section only applies to user agents, data mining tools, and
//! conformance checkers."
//!
//! The parser is a scraper-grade approximation of the standard: a
//! priority-ordered tokenizer feeding a single-insertion-point tree
//! builder with auto-close tables. It never fails; malformed markup
//! degrades to literal text.

pub mod parser;
pub mod tokenizer;

pub use parser::TreeBuilder;
pub use tokenizer::{Token, Tokenizer};

use quokka_dom::Tree;

use parser::tags;

/// Parse an HTML document into a tree rooted at a Document node.
#[must_use]
pub fn parse_html(input: &str) -> Tree {
    parse(input, false, false)
}

/// Parse an HTML fragment into a tree rooted at a Fragment node.
#[must_use]
pub fn parse_html_fragment(input: &str) -> Tree {
    parse(input, false, true)
}

/// Parse an XML document into a tree rooted at a Document node.
///
/// XML mode keeps tag and attribute case, honors every `/>`, and applies
/// none of the HTML auto-close or raw-text rules.
#[must_use]
pub fn parse_xml(input: &str) -> Tree {
    parse(input, true, false)
}

fn parse(input: &str, xml: bool, fragment: bool) -> Tree {
    let mut tokenizer = Tokenizer::new(input, xml);
    let mut builder = TreeBuilder::new(xml, fragment);
    while let Some(token) = tokenizer.next_token() {
        if let Token::StartTag { name, .. } = &token {
            let raw = !xml && tags::is_raw_text(name);
            let rcdata = !xml && tags::is_rcdata(name);
            if raw || rcdata {
                let name = name.clone();
                builder.process(token);
                // Raw content runs to the end tag; if there is none the
                // element stays open and its content tokenizes normally.
                if let Some(content) = tokenizer.raw_text(&name, rcdata) {
                    builder.raw_text(&name, &content);
                }
                continue;
            }
        }
        builder.process(token);
    }
    builder.finish()
}
