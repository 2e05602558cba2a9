//! Character reference escaping and unescaping.
//!
//! Only the five predefined XML entities (plus the `&#39;` form for the
//! apostrophe) are supported, in both directions. Unknown character
//! references pass through unchanged.

/// Escape the characters `&`, `<`, `>`, `"` and `'` for safe embedding in
/// markup.
///
/// [Extensible Markup Language § 4.6 Predefined Entities](https://www.w3.org/TR/xml/#sec-predefined-ent)
///
/// The apostrophe is written as `&#39;` rather than `&apos;` for
/// compatibility with HTML serializers.
#[must_use]
pub fn xml_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Replace the predefined character references (`&amp;`, `&lt;`, `&gt;`,
/// `&quot;`, `&apos;` and `&#39;`) with their characters.
///
/// Anything else that looks like a character reference is left as-is, so
/// malformed input survives a parse/serialize round trip.
#[must_use]
pub fn xml_unescape(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let mut matched = false;
        for (entity, ch) in [
            ("&amp;", '&'),
            ("&lt;", '<'),
            ("&gt;", '>'),
            ("&quot;", '"'),
            ("&apos;", '\''),
            ("&#39;", '\''),
        ] {
            if rest.starts_with(entity) {
                out.push(ch);
                rest = &rest[entity.len()..];
                matched = true;
                break;
            }
        }
        if !matched {
            out.push('&');
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_all_special_characters() {
        assert_eq!(
            xml_escape(r#"<b>"&'</b>"#),
            "&lt;b&gt;&quot;&amp;&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn unescape_both_apostrophe_forms() {
        assert_eq!(xml_unescape("&apos;x&#39;"), "'x'");
    }

    #[test]
    fn unknown_references_pass_through() {
        assert_eq!(xml_unescape("&nbsp; & &ampx"), "&nbsp; & &ampx");
    }

    #[test]
    fn round_trip() {
        let original = "1 < 2 && 3 > 2";
        assert_eq!(xml_unescape(&xml_escape(original)), original);
    }
}
