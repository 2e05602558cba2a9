//! Token-level tests for the anchored-scan tokenizer.

use quokka_html::{Token, Tokenizer};

fn tokenize(input: &str, xml: bool) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new(input, xml);
    let mut tokens = Vec::new();
    while let Some(token) = tokenizer.next_token() {
        tokens.push(token);
    }
    tokens
}

fn start_tag(name: &str, attrs: &[(&str, &str)], self_closing: bool) -> Token {
    Token::StartTag {
        name: name.to_string(),
        attrs: attrs
            .iter()
            .map(|(n, v)| ((*n).to_string(), (*v).to_string()))
            .collect(),
        self_closing,
    }
}

#[test]
fn text_and_tags() {
    assert_eq!(
        tokenize("Hello <b>World</b>!", false),
        vec![
            Token::Text("Hello ".to_string()),
            start_tag("b", &[], false),
            Token::Text("World".to_string()),
            Token::EndTag("b".to_string()),
            Token::Text("!".to_string()),
        ]
    );
}

#[test]
fn attribute_forms() {
    assert_eq!(
        tokenize(r#"<a href="/a b" title='x' checked empty= bare=c>"#, false),
        vec![start_tag(
            "a",
            &[
                ("href", "/a b"),
                ("title", "x"),
                ("checked", ""),
                ("empty", ""),
                ("bare", "c"),
            ],
            false
        )]
    );
}

#[test]
fn attribute_values_are_decoded() {
    assert_eq!(
        tokenize(r#"<a title="a &amp; b &lt;c&gt;">"#, false),
        vec![start_tag("a", &[("title", "a & b <c>")], false)]
    );
}

#[test]
fn duplicate_attributes_keep_first_position_last_value() {
    assert_eq!(
        tokenize(r#"<a b="1" c="2" b="3">"#, false),
        vec![start_tag("a", &[("b", "3"), ("c", "2")], false)]
    );
}

#[test]
fn names_are_lowercased_only_in_html_mode() {
    assert_eq!(
        tokenize(r#"<DIV CLASS="x">"#, false),
        vec![start_tag("div", &[("class", "x")], false)]
    );
    assert_eq!(
        tokenize(r#"<Link HREF="x"/>"#, true),
        vec![start_tag("Link", &[("HREF", "x")], true)]
    );
}

#[test]
fn self_closing_slash_positions() {
    assert_eq!(
        tokenize("<br/>", false),
        vec![start_tag("br", &[], true)]
    );
    assert_eq!(
        tokenize("<br />", false),
        vec![start_tag("br", &[], true)]
    );
    assert_eq!(
        tokenize(r#"<img / src="x">"#, false),
        vec![start_tag("img", &[("src", "x")], true)]
    );
}

#[test]
fn runaway_less_than_is_literal_text() {
    assert_eq!(
        tokenize("1 < 2", false),
        vec![
            Token::Text("1 ".to_string()),
            Token::Text("<".to_string()),
            Token::Text(" 2".to_string()),
        ]
    );
}

#[test]
fn tag_names_must_be_xml_names() {
    // `<2` cannot start a tag, so comparison prose stays text.
    assert_eq!(
        tokenize("1 < 2 > 3", false),
        vec![
            Token::Text("1 ".to_string()),
            Token::Text("<".to_string()),
            Token::Text(" 2 > 3".to_string()),
        ]
    );
    // Digits are fine after the first character.
    assert_eq!(
        tokenize("<h1>x</h1>", false),
        vec![
            start_tag("h1", &[], false),
            Token::Text("x".to_string()),
            Token::EndTag("h1".to_string()),
        ]
    );
    // An attribute name that is not an XML name fails the whole tag scan.
    let tokens = tokenize(r#"<a 1="x">"#, false);
    assert_eq!(tokens[0], Token::Text("<".to_string()));
}

#[test]
fn incomplete_tag_fails_and_degrades_to_text() {
    // Unterminated quote: the whole tag scan fails.
    let tokens = tokenize(r#"<a href="x"#, false);
    assert_eq!(tokens[0], Token::Text("<".to_string()));
    // No closing angle bracket at all.
    let tokens = tokenize("<div class", false);
    assert_eq!(tokens[0], Token::Text("<".to_string()));
}

#[test]
fn doctype_forms() {
    assert_eq!(
        tokenize("<!DOCTYPE html>", false),
        vec![Token::Doctype("html".to_string())]
    );
    assert_eq!(
        tokenize("<!doctype HTML>", false),
        vec![Token::Doctype("HTML".to_string())]
    );
    // Quoted identifiers and internal subsets may contain `>`.
    assert_eq!(
        tokenize(
            r#"<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">"#,
            false
        ),
        vec![Token::Doctype(
            r#"svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd""#
                .to_string()
        )]
    );
    assert_eq!(
        tokenize("<!DOCTYPE doc [<!ELEMENT doc (#PCDATA)>]>", false),
        vec![Token::Doctype("doc [<!ELEMENT doc (#PCDATA)>]".to_string())]
    );
}

#[test]
fn comment_allows_whitespace_before_close() {
    assert_eq!(
        tokenize("<!-- a -- b --\t>", false),
        vec![Token::Comment(" a -- b ".to_string())]
    );
}

#[test]
fn cdata_and_processing_instructions() {
    assert_eq!(
        tokenize("<![CDATA[a < b]]><?php echo 1 ?>x", false),
        vec![
            Token::Cdata("a < b".to_string()),
            Token::ProcessingInstruction("php echo 1 ".to_string()),
            Token::Text("x".to_string()),
        ]
    );
}

#[test]
fn raw_text_capture() {
    let mut tokenizer = Tokenizer::new("if (a<b) { x() }</script><p>", false);
    assert_eq!(
        tokenizer.raw_text("script", false),
        Some("if (a<b) { x() }".to_string())
    );
    assert_eq!(tokenizer.next_token(), Some(start_tag("p", &[], false)));
}

#[test]
fn raw_text_end_tag_is_case_insensitive_and_may_have_junk() {
    let mut tokenizer = Tokenizer::new("x</SCRIPT  bogus>y", false);
    assert_eq!(tokenizer.raw_text("script", false), Some("x".to_string()));
    assert_eq!(tokenizer.next_token(), Some(Token::Text("y".to_string())));
}

#[test]
fn raw_text_decodes_when_asked() {
    let mut tokenizer = Tokenizer::new("a &amp; b</title>", false);
    assert_eq!(tokenizer.raw_text("title", true), Some("a & b".to_string()));
}

#[test]
fn raw_text_without_end_tag_leaves_cursor_alone() {
    let mut tokenizer = Tokenizer::new("no end tag here", false);
    assert_eq!(tokenizer.raw_text("script", false), None);
    assert_eq!(
        tokenizer.next_token(),
        Some(Token::Text("no end tag here".to_string()))
    );
}
