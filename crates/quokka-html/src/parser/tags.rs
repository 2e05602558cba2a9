//! Tag categories driving the lenient HTML tree-construction rules.
//!
//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//!
//! Category membership is a plain `match` per predicate; the lists lean
//! lenient and include obsolete elements (`font`, `big`, `keygen`, ...)
//! that still occur in real-world markup.

pub use quokka_dom::is_void_element as is_void;

/// [§ 13.1.2](https://html.spec.whatwg.org/multipage/syntax.html#raw-text-elements)
/// "Raw text elements: script, style."
#[must_use]
pub fn is_raw_text(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

/// [§ 13.1.2](https://html.spec.whatwg.org/multipage/syntax.html#escapable-raw-text-elements)
/// "Escapable raw text elements: textarea, title."
#[must_use]
pub fn is_rcdata(tag: &str) -> bool {
    matches!(tag, "title" | "textarea")
}

/// Elements that bound end-tag searches: stray end tags inside them cannot
/// close anything outside. `svg` and `math` embed foreign content;
/// `template` contents are a separate tree.
#[must_use]
pub fn is_scope(tag: &str) -> bool {
    matches!(tag, "svg" | "math" | "template")
}

/// [§ 3.2.5.2.5 Phrasing content](https://html.spec.whatwg.org/multipage/dom.html#phrasing-content)
///
/// A phrasing end tag never closes a non-phrasing ancestor.
#[must_use]
pub fn is_phrasing(tag: &str) -> bool {
    matches!(
        tag,
        "a" | "abbr"
            | "area"
            | "audio"
            | "b"
            | "bdi"
            | "bdo"
            | "br"
            | "button"
            | "canvas"
            | "cite"
            | "code"
            | "data"
            | "datalist"
            | "del"
            | "dfn"
            | "em"
            | "embed"
            | "i"
            | "iframe"
            | "img"
            | "input"
            | "ins"
            | "kbd"
            | "keygen"
            | "label"
            | "link"
            | "map"
            | "mark"
            | "math"
            | "meta"
            | "meter"
            | "noscript"
            | "object"
            | "output"
            | "picture"
            | "progress"
            | "q"
            | "ruby"
            | "s"
            | "samp"
            | "script"
            | "select"
            | "slot"
            | "small"
            | "span"
            | "strong"
            | "sub"
            | "sup"
            | "svg"
            | "template"
            | "textarea"
            | "time"
            | "u"
            | "var"
            | "video"
            | "wbr"
            // Obsolete phrasing elements.
            | "acronym"
            | "applet"
            | "basefont"
            | "big"
            | "font"
            | "strike"
            | "tt"
    )
}

/// Elements on which an explicit `/` in the start tag is ignored: these
/// are expected to contain content, so `<div/>` stays open.
#[must_use]
pub fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "a" | "address"
            | "applet"
            | "article"
            | "aside"
            | "b"
            | "big"
            | "blockquote"
            | "body"
            | "button"
            | "caption"
            | "center"
            | "code"
            | "col"
            | "colgroup"
            | "dd"
            | "details"
            | "dialog"
            | "dir"
            | "div"
            | "dl"
            | "dt"
            | "em"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "font"
            | "footer"
            | "form"
            | "frameset"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "head"
            | "header"
            | "hgroup"
            | "html"
            | "i"
            | "iframe"
            | "li"
            | "listing"
            | "main"
            | "marquee"
            | "menu"
            | "nav"
            | "nobr"
            | "noembed"
            | "noframes"
            | "noscript"
            | "object"
            | "ol"
            | "optgroup"
            | "option"
            | "p"
            | "plaintext"
            | "pre"
            | "rp"
            | "rt"
            | "s"
            | "script"
            | "section"
            | "select"
            | "small"
            | "strike"
            | "strong"
            | "style"
            | "summary"
            | "table"
            | "tbody"
            | "td"
            | "template"
            | "textarea"
            | "tfoot"
            | "th"
            | "thead"
            | "title"
            | "tr"
            | "tt"
            | "u"
            | "ul"
            | "xmp"
    )
}

/// A start tag whose appearance ends one specific open element first.
///
/// [§ 4.4.1 The p element](https://html.spec.whatwg.org/multipage/grouping-content.html#the-p-element)
/// "A p element's end tag can be omitted if the p element is immediately
/// followed by an address, article, aside, blockquote, details, div, dl,
/// fieldset, figcaption, figure, footer, form, h1, h2, h3, h4, h5, h6,
/// header, hgroup, hr, main, menu, nav, ol, p, pre, section, table, or ul
/// element..."
#[must_use]
pub fn ends_before(tag: &str) -> Option<&'static str> {
    match tag {
        "body" => Some("head"),
        "address" | "article" | "aside" | "blockquote" | "details" | "dialog" | "div" | "dl"
        | "fieldset" | "figcaption" | "figure" | "footer" | "form" | "h1" | "h2" | "h3" | "h4"
        | "h5" | "h6" | "header" | "hgroup" | "hr" | "main" | "menu" | "nav" | "ol" | "p"
        | "pre" | "section" | "table" | "ul" => Some("p"),
        _ => None,
    }
}

/// A start tag that implicitly closes certain open ancestors, but never
/// past a scope boundary.
///
/// [§ 4.4.8 The li element](https://html.spec.whatwg.org/multipage/grouping-content.html#the-li-element)
/// "An li element's end tag can be omitted if the li element is
/// immediately followed by another li element..."
///
/// Returns `(closeable, scope)`: walking up from the insertion point,
/// every open element in `closeable` is ended until an element in `scope`
/// is reached.
#[must_use]
pub fn auto_closes(tag: &str) -> Option<(&'static [&'static str], &'static [&'static str])> {
    match tag {
        "li" => Some((&["li"], &["ul", "ol"])),
        "tr" => Some((&["tr"], &["table"])),
        "td" | "th" => Some((&["td", "th"], &["table"])),
        "tbody" | "tfoot" | "thead" => Some((&["tbody", "tfoot", "thead"], &["table"])),
        "dd" | "dt" => Some((&["dd", "dt"], &["dl"])),
        "rp" | "rt" => Some((&["rp", "rt"], &["ruby"])),
        "colgroup" => Some((&["colgroup"], &["table"])),
        "caption" => Some((&["caption"], &["table"])),
        "option" => Some((&["option"], &["select"])),
        "optgroup" => Some((&["option", "optgroup"], &["select"])),
        _ => None,
    }
}

/// Elements an end tag implicitly closes first: `</select>` ends an open
/// `option` and `</head>` ends an open `title` before closing themselves.
#[must_use]
pub fn closes_first(tag: &str) -> &'static [&'static str] {
    match tag {
        "head" => &["title"],
        "select" => &["option"],
        _ => &[],
    }
}
