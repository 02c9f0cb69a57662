use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::application::render::types::TocItem;
use crate::domain::slug::AnchorSlugger;

use super::escape::strip_tags;

/// ATX heading: one to six `#`, whitespace, text, optional closing `#` run.
static HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(#{1,6})[ \t]+(.+?)(?:[ \t]+#+)?[ \t]*\r?$").expect("heading pattern is valid")
});

/// Give every heading a unique anchor id and collect the flat TOC.
///
/// The heading text stays Markdown for the inline pass; the TOC text and slug
/// are derived from the text with any earlier markup removed.
pub(crate) fn expand_headings(content: &str) -> (String, Vec<TocItem>) {
    let mut slugger = AnchorSlugger::new();
    let mut toc = Vec::new();

    let html = HEADING.replace_all(content, |caps: &Captures<'_>| {
        let level = caps[1].len();
        let text = caps[2].trim();
        let plain = strip_tags(text);
        let id = slugger.anchor_for(&plain);

        toc.push(TocItem::new(id.clone(), plain, level as u8));

        format!(
            "<h{level} id=\"{id}\" class=\"writeup-heading\">{text}<a href=\"#{id}\" class=\"header-anchor\" aria-hidden=\"true\">#</a></h{level}>"
        )
    });

    (html.into_owned(), toc)
}
