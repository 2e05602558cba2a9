//! Selector compilation and matching tests.

use quokka_css::{Selector, SelectorError};
use quokka_dom::{NodeId, Tree, render};
use quokka_html::parse_html_fragment;

fn find(input: &str, selector: &str) -> Vec<String> {
    let tree = parse_html_fragment(input);
    let selector = Selector::new(selector).unwrap();
    selector
        .find_all(&tree, tree.root())
        .into_iter()
        .map(|id| render(&tree, id, false))
        .collect()
}

fn first(tree: &Tree, selector: &str) -> Option<NodeId> {
    Selector::new(selector).unwrap().find_first(tree, tree.root())
}

#[test]
fn type_class_and_id() {
    let doc = r##"<div id="a" class="x y">1</div><p class="x">2</p>"##;
    assert_eq!(find(doc, "p"), vec![r#"<p class="x">2</p>"#]);
    assert_eq!(find(doc, ".x").len(), 2);
    assert_eq!(find(doc, "div.y").len(), 1);
    assert_eq!(find(doc, "#a").len(), 1);
    assert_eq!(find(doc, "*").len(), 2);
    assert_eq!(find(doc, "#b"), Vec::<String>::new());
}

#[test]
fn class_is_word_matched_not_substring() {
    let doc = r#"<p class="foo foobar">x</p>"#;
    assert_eq!(find(doc, ".foo").len(), 1);
    assert_eq!(find(doc, ".oo"), Vec::<String>::new());
}

#[test]
fn attribute_operators() {
    let doc = r#"<a href="https://mojolicious.org/perldoc">doc</a><a href="ftp://x">ftp</a>"#;
    assert_eq!(find(doc, "[href]").len(), 2);
    assert_eq!(find(doc, r#"[href^="https"]"#).len(), 1);
    assert_eq!(find(doc, r#"[href$="perldoc"]"#).len(), 1);
    assert_eq!(find(doc, r#"[href*="mojolicious"]"#).len(), 1);
    assert_eq!(find(doc, r#"[href="ftp://x"]"#).len(), 1);
    assert_eq!(find(doc, r#"[href~="ftp://x"]"#).len(), 1);
}

#[test]
fn attribute_dash_match_and_case_flag() {
    let doc = r#"<p lang="en-US">a</p><p lang="en">b</p><p lang="de">c</p>"#;
    assert_eq!(find(doc, r#"[lang|="en"]"#).len(), 2);
    assert_eq!(find(doc, r#"[lang="EN-us" i]"#).len(), 1);
    assert_eq!(find(doc, r#"[lang="EN-us" s]"#), Vec::<String>::new());
    assert_eq!(find(doc, r#"[lang="EN-us"]"#), Vec::<String>::new());
}

#[test]
fn attribute_names_accept_namespace_prefixes() {
    let doc = r#"<item xlink:href="x">a</item>"#;
    assert_eq!(find(doc, "[href]").len(), 1);
    // So do type selectors.
    let tree = parse_html_fragment("<svg:circle r=\"1\"></svg:circle>");
    assert!(first(&tree, "circle").is_some());
}

#[test]
fn combinators() {
    let doc = "<div><p>1</p><section><p>2</p></section></div><p>3</p>";
    assert_eq!(find(doc, "div p").len(), 2);
    assert_eq!(find(doc, "div > p").len(), 1);
    assert_eq!(find(doc, "section > p"), vec!["<p>2</p>"]);
}

#[test]
fn sibling_combinators() {
    let doc = "<h1>t</h1><p>1</p><p>2</p><ul><li>x</li></ul><p>3</p>";
    assert_eq!(find(doc, "h1 + p"), vec!["<p>1</p>"]);
    assert_eq!(find(doc, "h1 ~ p").len(), 3);
    // Non-element siblings are skipped.
    let doc = "<h1>t</h1>text<!-- c --><p>1</p>";
    assert_eq!(find(doc, "h1 + p"), vec!["<p>1</p>"]);
    // The `ul` breaks immediate adjacency.
    let doc = "<h1>t</h1><ul></ul><p>1</p>";
    assert_eq!(find(doc, "h1 + p"), Vec::<String>::new());
}

#[test]
fn selector_groups() {
    let doc = "<h1>a</h1><h2>b</h2><h3>c</h3>";
    assert_eq!(find(doc, "h1, h3").len(), 2);
    assert_eq!(find(doc, "h1 , h2, .missing").len(), 2);
}

#[test]
fn nth_child() {
    let doc = "<ul><li>1</li><li>2</li><li>3</li><li>4</li><li>5</li><li>6</li><li>7</li><li>8</li></ul>";
    assert_eq!(
        find(doc, "li:nth-child(odd)"),
        vec!["<li>1</li>", "<li>3</li>", "<li>5</li>", "<li>7</li>"]
    );
    assert_eq!(
        find(doc, "li:nth-child(2n)"),
        vec!["<li>2</li>", "<li>4</li>", "<li>6</li>", "<li>8</li>"]
    );
    assert_eq!(
        find(doc, "li:nth-child(-n+3)"),
        vec!["<li>1</li>", "<li>2</li>", "<li>3</li>"]
    );
    assert_eq!(find(doc, "li:nth-child(4)"), vec!["<li>4</li>"]);
    // `0` and a bogus equation match nothing, without a compile error.
    assert_eq!(find(doc, "li:nth-child(0)"), Vec::<String>::new());
    assert_eq!(find(doc, "li:nth-child(bogus)"), Vec::<String>::new());
}

#[test]
fn nth_last_child() {
    let doc = "<ul><li>1</li><li>2</li><li>3</li><li>4</li></ul>";
    assert_eq!(find(doc, "li:nth-last-child(1)"), vec!["<li>4</li>"]);
    assert_eq!(
        find(doc, "li:nth-last-child(odd)"),
        vec!["<li>2</li>", "<li>4</li>"]
    );
}

#[test]
fn first_and_last_of_type() {
    let doc = "<section><h1>h</h1><p>1</p><p>2</p><span>s</span></section>";
    assert_eq!(find(doc, "p:first-of-type"), vec!["<p>1</p>"]);
    assert_eq!(find(doc, "p:last-of-type"), vec!["<p>2</p>"]);
    assert_eq!(find(doc, "p:first-child"), Vec::<String>::new());
    assert_eq!(find(doc, "h1:first-child"), vec!["<h1>h</h1>"]);
    assert_eq!(find(doc, "span:last-child"), vec!["<span>s</span>"]);
}

#[test]
fn nth_of_type_counts_only_same_tag() {
    let doc = "<div><h1>a</h1><p>1</p><h2>b</h2><p>2</p></div>";
    assert_eq!(find(doc, "p:nth-of-type(2)"), vec!["<p>2</p>"]);
    assert_eq!(find(doc, "p:nth-child(2)"), vec!["<p>1</p>"]);
}

#[test]
fn not_and_is() {
    let doc = r#"<p class="a">1</p><p class="b">2</p><div class="a">3</div>"#;
    assert_eq!(find(doc, "p:not(.a)"), vec![r#"<p class="b">2</p>"#]);
    assert_eq!(find(doc, ":is(p, div).a").len(), 2);
    assert_eq!(find(doc, ":not(p):not(.b)"), vec![r#"<div class="a">3</div>"#]);
}

#[test]
fn structural_pseudo_classes() {
    let doc = "<div><p></p><p><!-- c --></p><p>x</p></div>";
    assert_eq!(find(doc, "p:empty").len(), 2);

    let tree = parse_html_fragment("<div><p>x</p></div>");
    assert!(first(&tree, "div:root").is_some());
    assert!(first(&tree, "p:root").is_none());
}

#[test]
fn form_pseudo_classes() {
    let doc = r#"<form><input type="checkbox" checked><input type="checkbox"><option selected>o</option></form>"#;
    assert_eq!(find(doc, ":checked").len(), 2);

    let doc = r#"<a href="/x">l</a><a name="n">no</a><area href="/y"><div href="/z"></div>"#;
    assert_eq!(find(doc, ":link").len(), 2);
    assert_eq!(find(doc, ":any-link").len(), 2);
}

#[test]
fn text_pseudo_class() {
    let doc = "<p>Hello World</p><p><b>Hello</b></p><p>other</p>";
    // Case-insensitive substring match over direct text children only.
    assert_eq!(find(doc, "p:text(hello)"), vec!["<p>Hello World</p>"]);
    assert_eq!(find(doc, "b:text(HELLO)"), vec!["<b>Hello</b>"]);
}

#[test]
fn text_pseudo_class_regex_form() {
    let doc = "<p>Hello World</p><p>bye</p>";
    // Delimited patterns are real regexes, case-sensitive by default.
    assert_eq!(find(doc, "p:text(/^Hello/)"), vec!["<p>Hello World</p>"]);
    assert_eq!(find(doc, "p:text(/^hello/)"), Vec::<String>::new());
    assert_eq!(find(doc, "p:text(/^hello/i)"), vec!["<p>Hello World</p>"]);
    assert_eq!(find(doc, "p:text(/world$/i)"), vec!["<p>Hello World</p>"]);
    // An unterminated delimiter is a literal argument, not a pattern.
    assert_eq!(find("<p>a/b</p>", "p:text(/b)"), vec!["<p>a/b</p>"]);
}

#[test]
fn invalid_text_pattern_is_an_error() {
    assert!(matches!(
        Selector::new(":text(/[/)").unwrap_err(),
        SelectorError::InvalidTextPattern(_)
    ));
}

#[test]
fn extreme_nth_arguments_match_nothing() {
    let doc = "<ul><li>a</li><li>b</li></ul>";
    assert_eq!(
        find(doc, "li:nth-child(-9223372036854775808)"),
        Vec::<String>::new()
    );
    assert_eq!(
        find(doc, "li:nth-last-child(9223372036854775807)"),
        Vec::<String>::new()
    );
}

#[test]
fn unknown_pseudo_class_matches_nothing() {
    let doc = "<p>x</p>";
    assert_eq!(find(doc, "p:hover"), Vec::<String>::new());
    assert_eq!(find(doc, "p:nth-unknown(2)"), Vec::<String>::new());
}

#[test]
fn css_escapes_in_identifiers() {
    let doc = r##"<p class="foo:bar">1</p><p id="a.b">2</p>"##;
    assert_eq!(find(doc, r".foo\:bar").len(), 1);
    assert_eq!(find(doc, r"#a\.b").len(), 1);
    // Hex escape with terminating space.
    assert_eq!(find(doc, r".foo\3A bar").len(), 1);
}

#[test]
fn compile_errors() {
    assert!(Selector::new("p[").is_err());
    assert!(Selector::new("[]").is_err());
    assert!(Selector::new("[a~b]").is_err());
    assert!(Selector::new(":not(p").is_err());
    assert!(Selector::new("p:").is_err());
}

#[test]
fn trailing_whitespace_is_not_a_combinator() {
    let doc = "<div><p>x</p></div>";
    assert_eq!(find(doc, "  div p  ").len(), 1);
}

#[test]
fn find_scope_excludes_the_scope_element() {
    let tree = parse_html_fragment("<div class=\"x\"><div class=\"x\">inner</div></div>");
    let selector = Selector::new(".x").unwrap();
    let outer = tree.children(tree.root())[0];
    assert_eq!(selector.find_all(&tree, outer).len(), 1);
    assert!(selector.matches(&tree, outer));
}
