//! Selector compilation.
//!
//! [Selectors Level 3 § 10 Grammar](https://www.w3.org/TR/selectors-3/#w3cselgrammar)
//!
//! A single anchored scan over the trimmed input, trying constructs in a
//! fixed order at each position: separator, combinator, class or ID,
//! attribute, pseudo-class, type selector. Pseudo-class arguments are
//! extracted by paren counting and compiled recursively.

use std::mem;

use regex::{Regex, RegexBuilder};

use super::{
    AttrOp, AttributeSelector, Combinator, ComplexSelector, Part, PseudoClass, SelectorError,
    SimpleSelector,
};

pub(crate) fn parse_group(input: &str) -> Result<Vec<ComplexSelector>, SelectorError> {
    let mut parser = Parser {
        chars: input.trim().chars().collect(),
        pos: 0,
        source: input,
    };
    parser.parse_group()
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    source: &'a str,
}

impl Parser<'_> {
    fn parse_group(&mut self) -> Result<Vec<ComplexSelector>, SelectorError> {
        let mut group = Vec::new();
        let mut parts: Vec<Part> = Vec::new();
        let mut compound: Vec<SimpleSelector> = Vec::new();

        while self.pos < self.chars.len() {
            let ws_end = self.skip_ws_from(self.pos);
            match self.chars.get(ws_end).copied() {
                None => break,
                Some(',') => {
                    self.pos = self.skip_ws_from(ws_end + 1);
                    parts.push(Part::Compound(mem::take(&mut compound)));
                    group.push(ComplexSelector {
                        parts: mem::take(&mut parts),
                    });
                }
                Some(c @ ('>' | '+' | '~')) => {
                    self.pos = self.skip_ws_from(ws_end + 1);
                    parts.push(Part::Compound(mem::take(&mut compound)));
                    parts.push(Part::Combinator(match c {
                        '>' => Combinator::Child,
                        '+' => Combinator::NextSibling,
                        _ => Combinator::FollowingSibling,
                    }));
                }
                Some(_) if ws_end > self.pos => {
                    self.pos = ws_end;
                    parts.push(Part::Compound(mem::take(&mut compound)));
                    parts.push(Part::Combinator(Combinator::Descendant));
                }
                Some(c) => compound.push(self.parse_simple(c)?),
            }
        }

        parts.push(Part::Compound(compound));
        group.push(ComplexSelector { parts });
        Ok(group)
    }

    fn parse_simple(&mut self, first: char) -> Result<SimpleSelector, SelectorError> {
        match first {
            '.' => {
                self.pos += 1;
                Ok(SimpleSelector::Attribute(AttributeSelector {
                    name: "class".to_string(),
                    op: Some(AttrOp::Includes),
                    value: self.parse_identifier()?,
                    insensitive: false,
                }))
            }
            '#' => {
                self.pos += 1;
                Ok(SimpleSelector::Attribute(AttributeSelector {
                    name: "id".to_string(),
                    op: Some(AttrOp::Equals),
                    value: self.parse_identifier()?,
                    insensitive: false,
                }))
            }
            '[' => self.parse_attribute(),
            ':' => self.parse_pseudo_class(),
            '*' => {
                self.pos += 1;
                Ok(SimpleSelector::Universal)
            }
            _ => Ok(SimpleSelector::Tag(self.parse_identifier()?)),
        }
    }

    /// An identifier with CSS escape sequences, bounded by the characters
    /// that open other constructs.
    fn parse_identifier(&mut self) -> Result<String, SelectorError> {
        let mut out = String::new();
        while let Some(c) = self.chars.get(self.pos).copied() {
            if c == '\\' {
                out.push(self.parse_escape()?);
            } else if c.is_whitespace()
                || matches!(c, ',' | '.' | '#' | ':' | '[' | ']' | '>' | '~' | '+' | '(' | ')')
            {
                break;
            } else {
                out.push(c);
                self.pos += 1;
            }
        }
        if out.is_empty() {
            return Err(self.error());
        }
        Ok(out)
    }

    /// [CSS Syntax § 4.3.7](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    /// "Consume as many hex digits as possible, but no more than 5... If
    /// the next input code point is whitespace, consume it as well."
    fn parse_escape(&mut self) -> Result<char, SelectorError> {
        self.pos += 1;
        let Some(c) = self.chars.get(self.pos).copied() else {
            return Err(self.error());
        };
        if !c.is_ascii_hexdigit() {
            self.pos += 1;
            return Ok(c);
        }
        let mut value = 0u32;
        let mut digits = 0;
        while digits < 6
            && let Some(d) = self.chars.get(self.pos).and_then(|c| c.to_digit(16))
        {
            value = value * 16 + d;
            self.pos += 1;
            digits += 1;
        }
        if self.chars.get(self.pos).is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
        Ok(char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn parse_attribute(&mut self) -> Result<SimpleSelector, SelectorError> {
        self.pos += 1;
        self.skip_ws();

        let mut name = String::new();
        loop {
            let Some(c) = self.chars.get(self.pos).copied() else {
                return Err(self.error());
            };
            if c == '\\' {
                name.push(self.parse_escape()?);
            } else if c.is_whitespace() || matches!(c, ']' | '=' | '~' | '^' | '$' | '*' | '|') {
                break;
            } else {
                name.push(c);
                self.pos += 1;
            }
        }
        if name.is_empty() {
            return Err(self.error());
        }
        self.skip_ws();

        let op = match self.chars.get(self.pos).copied() {
            Some(']') => {
                self.pos += 1;
                return Ok(SimpleSelector::Attribute(AttributeSelector {
                    name,
                    op: None,
                    value: String::new(),
                    insensitive: false,
                }));
            }
            Some('=') => {
                self.pos += 1;
                AttrOp::Equals
            }
            Some(c @ ('~' | '^' | '$' | '*' | '|'))
                if self.chars.get(self.pos + 1) == Some(&'=') =>
            {
                self.pos += 2;
                match c {
                    '~' => AttrOp::Includes,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    '*' => AttrOp::Substring,
                    _ => AttrOp::DashMatch,
                }
            }
            _ => return Err(self.error()),
        };
        self.skip_ws();

        let value = self.parse_attribute_value()?;
        self.skip_ws();

        let mut insensitive = false;
        if let Some(flag @ ('i' | 'I' | 's' | 'S')) = self.chars.get(self.pos).copied() {
            let after = self.skip_ws_from(self.pos + 1);
            if self.chars.get(after) == Some(&']') {
                insensitive = matches!(flag, 'i' | 'I');
                self.pos = after;
            }
        }

        if self.chars.get(self.pos) != Some(&']') {
            return Err(self.error());
        }
        self.pos += 1;

        Ok(SimpleSelector::Attribute(AttributeSelector {
            name,
            op: Some(op),
            value,
            insensitive,
        }))
    }

    fn parse_attribute_value(&mut self) -> Result<String, SelectorError> {
        let mut out = String::new();
        if let Some(quote @ ('"' | '\'')) = self.chars.get(self.pos).copied() {
            self.pos += 1;
            loop {
                let Some(c) = self.chars.get(self.pos).copied() else {
                    return Err(self.error());
                };
                if c == quote {
                    self.pos += 1;
                    return Ok(out);
                }
                if c == '\\' {
                    out.push(self.parse_escape()?);
                } else {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
        while let Some(c) = self.chars.get(self.pos).copied() {
            if c == ']' || c.is_whitespace() {
                break;
            }
            if c == '\\' {
                out.push(self.parse_escape()?);
            } else {
                out.push(c);
                self.pos += 1;
            }
        }
        Ok(out)
    }

    fn parse_pseudo_class(&mut self) -> Result<SimpleSelector, SelectorError> {
        self.pos += 1;
        let mut name = String::new();
        while let Some(c) = self.chars.get(self.pos).copied() {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                name.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(self.error());
        }

        let args = if self.chars.get(self.pos) == Some(&'(') {
            self.pos += 1;
            let start = self.pos;
            let mut depth = 1_usize;
            while let Some(c) = self.chars.get(self.pos).copied() {
                match c {
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
                self.pos += 1;
            }
            if depth != 0 {
                return Err(self.error());
            }
            let args: String = self.chars[start..self.pos].iter().collect();
            self.pos += 1;
            Some(args)
        } else {
            None
        };

        let pseudo = match name.to_ascii_lowercase().as_str() {
            "not" => PseudoClass::Not(parse_group(&args.ok_or_else(|| self.error())?)?),
            "is" => PseudoClass::Is(parse_group(&args.ok_or_else(|| self.error())?)?),
            "nth-child" => nth(args.as_deref(), false, false),
            "nth-last-child" => nth(args.as_deref(), false, true),
            "nth-of-type" => nth(args.as_deref(), true, false),
            "nth-last-of-type" => nth(args.as_deref(), true, true),
            "first-child" => first(false, false),
            "last-child" => first(false, true),
            "first-of-type" => first(true, false),
            "last-of-type" => first(true, true),
            "empty" => PseudoClass::Empty,
            "root" => PseudoClass::Root,
            "checked" => PseudoClass::Checked,
            "link" | "any-link" | "visited" => PseudoClass::Link,
            "text" => match args {
                Some(pattern) => PseudoClass::Text(text_pattern(&pattern)?),
                None => never(),
            },
            // Unknown pseudo-classes compile but match nothing.
            _ => never(),
        };
        Ok(SimpleSelector::PseudoClass(pseudo))
    }

    fn skip_ws(&mut self) {
        self.pos = self.skip_ws_from(self.pos);
    }

    fn skip_ws_from(&self, mut i: usize) -> usize {
        while self.chars.get(i).is_some_and(|c| c.is_whitespace()) {
            i += 1;
        }
        i
    }

    fn error(&self) -> SelectorError {
        SelectorError::UnknownSelector(self.source.to_string())
    }
}

/// A `:text` argument delimited as `/pat/` or `/pat/i` compiles as a real
/// pattern with the given case flag; anything else is an escaped literal
/// matched case-insensitively.
fn text_pattern(args: &str) -> Result<Regex, SelectorError> {
    if let Some(rest) = args.strip_prefix('/') {
        let (pattern, insensitive) = match rest.strip_suffix("/i") {
            Some(pattern) => (pattern, true),
            None => (rest.strip_suffix('/').unwrap_or(""), false),
        };
        if !pattern.is_empty() {
            return RegexBuilder::new(pattern)
                .case_insensitive(insensitive)
                .build()
                .map_err(SelectorError::InvalidTextPattern);
        }
    }
    RegexBuilder::new(&regex::escape(args))
        .case_insensitive(true)
        .build()
        .map_err(SelectorError::InvalidTextPattern)
}

fn never() -> PseudoClass {
    PseudoClass::Nth {
        a: 0,
        b: 0,
        of_type: false,
        last: false,
    }
}

fn first(of_type: bool, last: bool) -> PseudoClass {
    PseudoClass::Nth {
        a: 0,
        b: 1,
        of_type,
        last,
    }
}

fn nth(args: Option<&str>, of_type: bool, last: bool) -> PseudoClass {
    let (a, b) = args.map_or((0, 0), parse_equation);
    PseudoClass::Nth {
        a,
        b,
        of_type,
        last,
    }
}

/// [§ 6.6.5.2](https://www.w3.org/TR/selectors-3/#nth-child-pseudo)
/// "The nth-child pseudo-class notation represents an element that has
/// an+b-1 siblings before it..."
///
/// Arguments the grammar rejects become `(0, 0)`, a selector that matches
/// nothing, rather than an error.
fn parse_equation(args: &str) -> (i64, i64) {
    let expr = args.trim().to_ascii_lowercase();
    if expr == "even" {
        return (2, 0);
    }
    if expr == "odd" {
        return (2, 1);
    }
    if let Ok(b) = expr.parse::<i64>() {
        return (0, b);
    }

    let Some(n_pos) = expr.find('n') else {
        return (0, 0);
    };
    let a = match expr[..n_pos].trim() {
        "" | "+" => 1,
        "-" => -1,
        digits => match digits.parse::<i64>() {
            Ok(a) => a,
            Err(_) => return (0, 0),
        },
    };
    let offset: String = expr[n_pos + 1..].split_whitespace().collect();
    if offset.is_empty() {
        return (a, 0);
    }
    if !offset.starts_with('+') && !offset.starts_with('-') {
        return (0, 0);
    }
    offset.parse::<i64>().map_or((0, 0), |b| (a, b))
}
