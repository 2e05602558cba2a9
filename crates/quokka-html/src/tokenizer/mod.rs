//! Markup tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! Unlike the WHATWG state machine, this tokenizer recognizes whole
//! constructs with anchored scans at the current position, trying each
//! construct in a fixed priority order: text, doctype, comment, CDATA,
//! processing instruction, tag. A `<` that opens none of them is emitted
//! as a one-character text token, so the cursor always advances and
//! malformed input degrades to literal text instead of an error.

mod token;

pub use token::Token;

use quokka_dom::xml_unescape;

/// A cursor over markup source that yields [`Token`]s.
#[derive(Debug)]
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    xml: bool,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer over `input`. In XML mode tag and attribute
    /// names keep their case.
    #[must_use]
    pub const fn new(input: &'a str, xml: bool) -> Self {
        Self { input, pos: 0, xml }
    }

    /// Produce the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<Token> {
        if self.pos >= self.input.len() {
            return None;
        }
        let rest = &self.input[self.pos..];
        if !rest.starts_with('<') {
            let end = rest.find('<').unwrap_or(rest.len());
            self.pos += end;
            return Some(Token::Text(rest[..end].to_string()));
        }
        if let Some(token) = self.scan_doctype() {
            return Some(token);
        }
        if let Some(token) = self.scan_comment() {
            return Some(token);
        }
        if let Some(token) = self.scan_cdata() {
            return Some(token);
        }
        if let Some(token) = self.scan_pi() {
            return Some(token);
        }
        if let Some(token) = self.scan_tag() {
            return Some(token);
        }
        // Runaway `<`: consume a single character as text so that parsing
        // always makes forward progress.
        self.pos += 1;
        Some(Token::Text("<".to_string()))
    }

    /// Capture the raw content of the element `tag` up to its end tag.
    ///
    /// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#raw-text-elements)
    /// "Raw text elements can have text, though it has restrictions..."
    ///
    /// Scans for a case-insensitive `</tag` followed by whitespace or `>`,
    /// consuming through the closing `>`. Returns `None` (without moving
    /// the cursor) when no end tag exists, in which case the content
    /// tokenizes normally. With `decode` the captured text has its
    /// character references resolved (RCDATA); without, it is returned
    /// verbatim (raw text).
    pub fn raw_text(&mut self, tag: &str, decode: bool) -> Option<String> {
        let bytes = self.input.as_bytes();
        let tag_bytes = tag.as_bytes();
        let mut i = self.pos;
        while i + 2 + tag_bytes.len() <= bytes.len() {
            if bytes[i] == b'<'
                && bytes[i + 1] == b'/'
                && bytes[i + 2..i + 2 + tag_bytes.len()].eq_ignore_ascii_case(tag_bytes)
            {
                let after = i + 2 + tag_bytes.len();
                let next = bytes.get(after).copied();
                if next == Some(b'>') || next.is_some_and(|c| c.is_ascii_whitespace()) {
                    let content = &self.input[self.pos..i];
                    let mut j = after;
                    while j < bytes.len() && bytes[j] != b'>' {
                        j += 1;
                    }
                    self.pos = if j < bytes.len() { j + 1 } else { bytes.len() };
                    return Some(if decode {
                        xml_unescape(content)
                    } else {
                        content.to_string()
                    });
                }
            }
            i += 1;
        }
        None
    }

    /// [§ 13.1.1 The DOCTYPE](https://html.spec.whatwg.org/multipage/syntax.html#the-doctype)
    ///
    /// The declaration body runs to the first `>` outside of quoted strings
    /// and `[...]` internal subsets. The body must start with a word
    /// character after at least one space.
    fn scan_doctype(&mut self) -> Option<Token> {
        let bytes = self.input.as_bytes();
        if !starts_with_ci(&bytes[self.pos..], b"<!DOCTYPE") {
            return None;
        }
        let mut i = self.pos + 9;
        let ws_start = i;
        i = skip_ws(bytes, i);
        if i == ws_start {
            return None;
        }
        if !bytes
            .get(i)
            .copied()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            return None;
        }
        let body_start = i;
        while i < bytes.len() {
            match bytes[i] {
                b'>' => {
                    let body = self.input[body_start..i].to_string();
                    self.pos = i + 1;
                    return Some(Token::Doctype(body));
                }
                quote @ (b'"' | b'\'') => {
                    i += 1;
                    while i < bytes.len() && bytes[i] != quote {
                        i += 1;
                    }
                    if i >= bytes.len() {
                        return None;
                    }
                    i += 1;
                }
                b'[' => {
                    while i < bytes.len() && bytes[i] != b']' {
                        i += 1;
                    }
                    if i >= bytes.len() {
                        return None;
                    }
                    i += 1;
                }
                _ => i += 1,
            }
        }
        None
    }

    /// [§ 13.1.6 Comments](https://html.spec.whatwg.org/multipage/syntax.html#comments)
    ///
    /// Leniently terminated by the first `--` that is followed by optional
    /// whitespace and `>`.
    fn scan_comment(&mut self) -> Option<Token> {
        if !self.input[self.pos..].starts_with("<!--") {
            return None;
        }
        let bytes = self.input.as_bytes();
        let body_start = self.pos + 4;
        let mut i = body_start;
        while i + 1 < bytes.len() {
            if bytes[i] == b'-' && bytes[i + 1] == b'-' {
                let j = skip_ws(bytes, i + 2);
                if bytes.get(j) == Some(&b'>') {
                    let body = self.input[body_start..i].to_string();
                    self.pos = j + 1;
                    return Some(Token::Comment(body));
                }
            }
            i += 1;
        }
        None
    }

    fn scan_cdata(&mut self) -> Option<Token> {
        let bytes = self.input.as_bytes();
        if !starts_with_ci(&bytes[self.pos..], b"<![CDATA[") {
            return None;
        }
        let body_start = self.pos + 9;
        let end = self.input[body_start..].find("]]>")?;
        let body = self.input[body_start..body_start + end].to_string();
        self.pos = body_start + end + 3;
        Some(Token::Cdata(body))
    }

    fn scan_pi(&mut self) -> Option<Token> {
        if !self.input[self.pos..].starts_with("<?") {
            return None;
        }
        let body_start = self.pos + 2;
        let end = self.input[body_start..].find("?>")?;
        let body = self.input[body_start..body_start + end].to_string();
        self.pos = body_start + end + 2;
        Some(Token::ProcessingInstruction(body))
    }

    /// Speculatively parse a tag. Commits (moves the cursor) only when a
    /// closing `>` is reached; an incomplete tag, a name that is not an XML
    /// name, or an unterminated quoted attribute value fails the whole scan.
    fn scan_tag(&mut self) -> Option<Token> {
        let bytes = self.input.as_bytes();
        let mut i = skip_ws(bytes, self.pos + 1);
        let closing = if bytes.get(i) == Some(&b'/') {
            i = skip_ws(bytes, i + 1);
            true
        } else {
            false
        };

        let name_end = scan_name(self.input, i)?;
        let mut name = self.input[i..name_end].to_string();
        if !self.xml {
            name.make_ascii_lowercase();
        }
        i = name_end;

        let mut attrs: Vec<(String, String)> = Vec::new();
        let mut self_closing = false;
        loop {
            i = skip_ws(bytes, i);
            match bytes.get(i).copied() {
                None | Some(b'<') => return None,
                Some(b'>') => {
                    i += 1;
                    break;
                }
                Some(b'/') => {
                    // A stray slash marks the tag self-closing; a value
                    // attached to it is discarded.
                    self_closing = true;
                    let j = skip_ws(bytes, i + 1);
                    if bytes.get(j) == Some(&b'=') {
                        let (k, _value) = self.scan_attr_value(bytes, j)?;
                        i = k;
                    } else {
                        i += 1;
                    }
                }
                Some(b'=') => {
                    // An equals sign with no attribute name; discard it and
                    // its value.
                    let (k, _value) = self.scan_attr_value(bytes, i)?;
                    i = k;
                }
                Some(_) => {
                    let attr_end = scan_name(self.input, i)?;
                    let mut attr_name = self.input[i..attr_end].to_string();
                    if !self.xml {
                        attr_name.make_ascii_lowercase();
                    }
                    i = attr_end;
                    let j = skip_ws(bytes, i);
                    let value = if bytes.get(j) == Some(&b'=') {
                        let (k, value) = self.scan_attr_value(bytes, j)?;
                        i = k;
                        value
                    } else {
                        String::new()
                    };
                    // Duplicates keep the first position but the last value.
                    if let Some(entry) = attrs.iter_mut().find(|(n, _)| *n == attr_name) {
                        entry.1 = value;
                    } else {
                        attrs.push((attr_name, value));
                    }
                }
            }
        }

        self.pos = i;
        if closing {
            return Some(Token::EndTag(name));
        }
        Some(Token::StartTag {
            name,
            attrs,
            self_closing,
        })
    }

    /// Scan an attribute value with `i` pointing at the `=`. Returns the
    /// position after the value and the decoded value. Quoted values run to
    /// the matching quote; bare values run to whitespace or `>` and may be
    /// empty.
    fn scan_attr_value(&self, bytes: &[u8], i: usize) -> Option<(usize, String)> {
        let mut i = skip_ws(bytes, i + 1);
        if let Some(quote @ (b'"' | b'\'')) = bytes.get(i).copied() {
            i += 1;
            let start = i;
            while i < bytes.len() && bytes[i] != quote {
                i += 1;
            }
            if i >= bytes.len() {
                return None;
            }
            return Some((i + 1, xml_unescape(&self.input[start..i])));
        }
        let start = i;
        while i < bytes.len() && bytes[i] != b'>' && !bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        Some((i, xml_unescape(&self.input[start..i])))
    }
}

/// Scan an XML name at byte offset `i`, returning the offset past its last
/// character, or `None` when the first character cannot start a name. A
/// `<` followed by anything else (a digit, punctuation, another `<`) is
/// not a tag and falls through to the runaway-text path.
fn scan_name(input: &str, i: usize) -> Option<usize> {
    let mut end = i;
    for (offset, c) in input[i..].char_indices() {
        let valid = if offset == 0 {
            is_name_start_char(c)
        } else {
            is_name_char(c)
        };
        if !valid {
            break;
        }
        end = i + offset + c.len_utf8();
    }
    (end > i).then_some(end)
}

/// [Extensible Markup Language § 2.3](https://www.w3.org/TR/xml/#NT-NameStartChar)
/// `NameStartChar ::= ":" | [A-Z] | "_" | [a-z] | [#xC0-#xD6] | ...`
fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | '_'
        | 'A'..='Z'
        | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

/// [Extensible Markup Language § 2.3](https://www.w3.org/TR/xml/#NT-NameChar)
/// `NameChar ::= NameStartChar | "-" | "." | [0-9] | #xB7 | ...`
fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.'
            | '0'..='9'
            | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

fn starts_with_ci(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.len() >= needle.len() && haystack[..needle.len()].eq_ignore_ascii_case(needle)
}
