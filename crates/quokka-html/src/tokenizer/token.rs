//! Tokens produced by the markup tokenizer.

/// A single markup construct.
///
/// Text payloads are the raw source slices; character references are
/// resolved by the tree builder. Attribute values are already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A run of character data between constructs (may be a lone `<` that
    /// failed to open a tag).
    Text(String),
    /// A document type declaration; the payload is the declaration body.
    Doctype(String),
    /// A comment; the payload excludes the `<!--`/`-->` markers.
    Comment(String),
    /// A CDATA section; the payload excludes the `<![CDATA[`/`]]>` markers.
    Cdata(String),
    /// A processing instruction; the payload excludes the `<?`/`?>` markers.
    ProcessingInstruction(String),
    /// A start tag.
    StartTag {
        /// Tag name, lowercased in HTML mode.
        name: String,
        /// Attributes in source order with duplicates collapsed.
        attrs: Vec<(String, String)>,
        /// Whether the tag carried a `/` before `>`.
        self_closing: bool,
    },
    /// An end tag; attributes on end tags are discarded.
    EndTag(String),
}
