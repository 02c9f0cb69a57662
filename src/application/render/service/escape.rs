use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

/// Escape `& < > " '` so text is safe both as element content and inside a
/// quoted attribute.
pub(crate) fn escape_html(text: &str) -> Cow<'_, str> {
    html_escape::encode_quoted_attribute(text)
}

/// A tag-like run: `<` followed by anything but a line break up to `>`.
static TAG_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^<>\n]*>").expect("tag pattern is valid"));

/// Remove tag-like runs and decode entities, yielding plain text.
pub(crate) fn strip_tags(text: &str) -> String {
    let without_tags = TAG_LIKE.replace_all(text, "");
    html_escape::decode_html_entities(&without_tags)
        .trim()
        .to_string()
}
