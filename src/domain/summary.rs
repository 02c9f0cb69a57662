//! Plain-text summaries of writeup bodies for listings and previews.

use once_cell::sync::Lazy;
use regex::Regex;

use super::writeup::FENCED_BLOCK;

/// Summary length used when callers do not configure one.
pub const DEFAULT_SUMMARY_LENGTH: usize = 200;

static INLINE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`]+)`").expect("inline code pattern is valid"));
static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+(.+)$").expect("heading pattern is valid"));
static MARKDOWN_PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[*_~`#>\[\]!|]").expect("punctuation class is valid"));
static PAREN_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(https?:[^)]+\)").expect("url pattern is valid"));

/// Extract a plain-text summary of at most `max_length` characters.
///
/// Fenced code is dropped, inline code and headings keep their text, Markdown
/// punctuation and parenthesised URLs are removed and whitespace collapses to
/// single spaces. Longer text is cut at the last word boundary and suffixed
/// with `...`.
pub fn extract_summary(content: &str, max_length: usize) -> String {
    let text = FENCED_BLOCK.replace_all(content, "");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = HEADING.replace_all(&text, "$1");
    let text = MARKDOWN_PUNCTUATION.replace_all(&text, "");
    let text = PAREN_URL.replace_all(&text, "");

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_length {
        return collapsed;
    }

    let cut: String = collapsed.chars().take(max_length).collect();
    let head = match cut.rfind(' ') {
        Some(idx) => &cut[..idx],
        None => cut.as_str(),
    };
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_and_code() {
        let content = "# Recon\n\nWe ran **nmap** with `-sV` against [the box](https://example.com).\n\n```bash\nnmap -sV 10.0.0.1\n```\n> done";
        assert_eq!(
            extract_summary(content, DEFAULT_SUMMARY_LENGTH),
            "Recon We ran nmap with -sV against the box. done"
        );
    }

    #[test]
    fn truncates_on_word_boundary() {
        let content = "alpha beta gamma delta";
        assert_eq!(extract_summary(content, 13), "alpha beta...");
    }

    #[test]
    fn short_content_is_returned_whole() {
        assert_eq!(extract_summary("just a line", 200), "just a line");
    }
}
