use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::autolink::AUTOLINK_MARKUP;
use super::escape::escape_html;

/// Spans that are rendered in one piece and never re-entered by emphasis:
/// inline code, images, links, markup from the autolink pass and any other
/// tag-like run. Images come before links so `![alt](url)` is not read as
/// `!` + link, and autolink markup comes before plain tags so it is kept whole
/// in escaped contexts.
static INLINE_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"`([^`\n]+)`|!\[([^\]\n]*)\]\(([^)\s]+)\)|\[([^\]\n]+)\]\(([^)\s]+)\)|({AUTOLINK_MARKUP})|<[^<>\n]*>"
    ))
    .expect("inline span pattern is valid")
});
/// Inline code, images and links: text the autolink pass must not touch.
static VERBATIM_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"`[^`\n]+`|!?\[[^\]\n]*\]\([^)\s]+\)").expect("verbatim span pattern is valid")
});

static BOLD_STARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(\S(?:.*?\S)?)\*\*").expect("bold pattern is valid"));
static BOLD_UNDERSCORES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|\W)__(\S(?:.*?\S)?)__").expect("bold pattern is valid"));
static ITALIC_STAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*([^\s*](?:[^*\n]*[^\s*])?)\*").expect("italic pattern is valid")
});
static ITALIC_UNDERSCORE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|\W)_([^\s_](?:[^_\n]*[^\s_])?)_").expect("italic pattern is valid")
});
static STRIKETHROUGH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"~~(\S(?:.*?\S)?)~~").expect("strikethrough pattern is valid"));

const SLOT_OPEN: char = '\u{E000}';
const SLOT_CLOSE: char = '\u{E001}';
static SLOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x{E000}(\d+)\x{E001}").expect("slot pattern is valid"));

/// How text outside rendered spans is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextMode {
    /// Text and tag-like runs pass through; the sanitizer has the last word.
    Raw,
    /// Everything the author wrote is escaped, tags included (table cells).
    Escaped,
}

/// Render inline Markdown on a single line.
///
/// Code spans, images, links and tags are cut out into numbered slots first,
/// emphasis runs over what is left, then the slots are filled back in. Emphasis
/// therefore never reaches into code or into markup emitted earlier.
pub(crate) fn render_inline(text: &str, mode: TextMode) -> String {
    let mut fragments: Vec<String> = Vec::new();
    let mut working = String::with_capacity(text.len());
    let mut last = 0;

    for caps in INLINE_SPAN.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        working.push_str(&plain_text(&text[last..whole.start()], mode));

        let fragment = if let Some(code) = caps.get(1) {
            format!(
                "<code class=\"inline-code\">{}</code>",
                escape_html(code.as_str())
            )
        } else if let Some(url) = caps.get(3) {
            let alt = caps.get(2).map_or("", |m| m.as_str());
            render_image(alt, url.as_str())
        } else if let Some(url) = caps.get(5) {
            let label = caps.get(4).map_or("", |m| m.as_str());
            render_link(label, url.as_str())
        } else if caps.get(6).is_some() {
            whole.as_str().to_string()
        } else {
            match mode {
                TextMode::Raw => whole.as_str().to_string(),
                TextMode::Escaped => escape_html(whole.as_str()).into_owned(),
            }
        };

        working.push(SLOT_OPEN);
        working.push_str(&fragments.len().to_string());
        working.push(SLOT_CLOSE);
        fragments.push(fragment);
        last = whole.end();
    }
    working.push_str(&plain_text(&text[last..], mode));

    let emphasized = apply_emphasis(&working);
    SLOT.replace_all(&emphasized, |caps: &Captures<'_>| {
        caps[1]
            .parse::<usize>()
            .ok()
            .and_then(|idx| fragments.get(idx))
            .cloned()
            .unwrap_or_default()
    })
    .into_owned()
}

/// Apply `f` to the text between inline code, image and link spans, copying
/// the spans as-is.
pub(crate) fn map_outside_verbatim_spans<F>(text: &str, mut f: F) -> String
where
    F: FnMut(&str) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in VERBATIM_SPAN.find_iter(text) {
        out.push_str(&f(&text[last..span.start()]));
        out.push_str(span.as_str());
        last = span.end();
    }
    out.push_str(&f(&text[last..]));
    out
}

fn apply_emphasis(text: &str) -> String {
    let text = BOLD_STARS.replace_all(text, "<strong>$1</strong>");
    let text = BOLD_UNDERSCORES.replace_all(&text, "$1<strong>$2</strong>");
    let text = ITALIC_STAR.replace_all(&text, "<em>$1</em>");
    let text = ITALIC_UNDERSCORE.replace_all(&text, "$1<em>$2</em>");
    let text = STRIKETHROUGH.replace_all(&text, "<del>$1</del>");
    text.into_owned()
}

fn plain_text(text: &str, mode: TextMode) -> Cow<'_, str> {
    // Slot markers are reserved; authored copies of them are neutralised.
    let text: Cow<'_, str> = if text.contains([SLOT_OPEN, SLOT_CLOSE]) {
        Cow::Owned(text.replace([SLOT_OPEN, SLOT_CLOSE], "\u{FFFD}"))
    } else {
        Cow::Borrowed(text)
    };

    match mode {
        TextMode::Raw => text,
        TextMode::Escaped => Cow::Owned(html_escape::encode_text(&text).into_owned()),
    }
}

fn render_link(label: &str, url: &str) -> String {
    format!(
        "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
        escape_html(url),
        escape_html(label)
    )
}

fn render_image(alt: &str, url: &str) -> String {
    let alt = escape_html(alt);
    let caption = if alt.is_empty() {
        String::new()
    } else {
        format!("<figcaption>{alt}</figcaption>")
    };
    format!(
        "<figure class=\"writeup-image\"><img src=\"{}\" alt=\"{alt}\" loading=\"lazy\" class=\"lightbox-trigger\">{caption}</figure>",
        escape_html(url)
    )
}
