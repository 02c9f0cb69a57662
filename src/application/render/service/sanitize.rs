use std::borrow::Cow;
use std::fmt::Write as _;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::warn;

/// Elements removed outright. Paired occurrences lose their content too.
pub(crate) const DENIED_ELEMENTS: &[&str] = &[
    "script", "iframe", "object", "embed", "form", "input", "button", "select", "textarea",
    "style", "link", "meta", "base", "applet", "frame", "frameset", "layer", "ilayer", "bgsound",
    "title", "head", "html", "body", "xml", "noscript", "template", "svg", "math",
];

const DENIED_ATTRIBUTES: &[&str] = &[
    "formaction", "action", "xlink:href", "data", "dynsrc", "lowsrc", "srcdoc",
];

const URL_ATTRIBUTES: &[&str] = &["href", "src", "background", "poster", "cite", "srcset"];

const MAX_PASSES: usize = 32;

static DENIED_PAIRS: Lazy<Vec<Regex>> = Lazy::new(|| {
    DENIED_ELEMENTS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>"))
                .expect("denied element pattern is valid")
        })
        .collect()
});

static DENIED_SINGLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)</?(?:{})\b[^>]*>", DENIED_ELEMENTS.join("|")))
        .expect("denied tag pattern is valid")
});

/// A well-formed start or end tag, or else a bare `<` + letter that opens a
/// tag we cannot delimit (unbalanced quotes), which gets escaped.
static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<(/?)([a-zA-Z][\w:-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>|<(/?[a-zA-Z])"#)
        .expect("tag pattern is valid")
});

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("attribute pattern is valid")
});

/// Numeric character reference. Browsers decode these inside attribute values
/// even without the closing `;`.
static NUMERIC_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&#(?:[xX]([0-9a-fA-F]+)|([0-9]+));?").expect("numeric reference pattern is valid")
});

/// Strip dangerous elements, event handlers and script-bearing URLs.
///
/// Runs until the output stops changing, so removing one element can never
/// stitch a new dangerous tag together from its neighbours, and sanitizing
/// sanitized output is a no-op.
pub fn sanitize_html(html: &str) -> String {
    let mut current = html.to_string();
    for _ in 0..MAX_PASSES {
        let next = sanitize_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }

    warn!(
        target = "application::render::sanitize",
        passes = MAX_PASSES,
        "sanitizer did not settle; escaping remaining markup"
    );
    html_escape::encode_text(&current).into_owned()
}

fn sanitize_pass(html: &str) -> String {
    let mut out = html.to_string();
    for pair in DENIED_PAIRS.iter() {
        if pair.is_match(&out) {
            out = pair.replace_all(&out, "").into_owned();
        }
    }
    let out = DENIED_SINGLE.replace_all(&out, "");
    TAG.replace_all(&out, rewrite_tag).into_owned()
}

fn rewrite_tag(caps: &Captures<'_>) -> String {
    if let Some(opening) = caps.get(4) {
        return format!("&lt;{}", opening.as_str());
    }

    let closing = &caps[1];
    let name = &caps[2];
    if !closing.is_empty() {
        return format!("</{name}>");
    }

    let raw_attrs = caps.get(3).map_or("", |m| m.as_str());
    let self_closing = raw_attrs.trim_end().ends_with('/');

    let mut tag = format!("<{name}");
    for attr in ATTRIBUTE.captures_iter(raw_attrs) {
        let attr_name = &attr[1];
        let lowered = attr_name.to_ascii_lowercase();
        if is_denied_attribute(&lowered) {
            continue;
        }

        let value = attr
            .get(2)
            .or_else(|| attr.get(3))
            .or_else(|| attr.get(4))
            .map(|m| m.as_str());

        match value {
            None => {
                let _ = write!(tag, " {attr_name}");
            }
            Some(value) => {
                let value = if is_dangerous_value(&lowered, value) {
                    String::new()
                } else {
                    value.replace('"', "&quot;")
                };
                let _ = write!(tag, " {attr_name}=\"{value}\"");
            }
        }
    }
    if self_closing {
        tag.push_str(" /");
    }
    tag.push('>');
    tag
}

fn is_denied_attribute(name: &str) -> bool {
    name.starts_with("on") || DENIED_ATTRIBUTES.contains(&name)
}

fn is_dangerous_value(name: &str, value: &str) -> bool {
    let normalized = normalize_value(value);
    if URL_ATTRIBUTES.contains(&name) {
        return is_dangerous_url(&normalized);
    }
    if name == "style" {
        return normalized.contains("expression(")
            || normalized.contains("javascript:")
            || normalized.contains("vbscript:");
    }
    false
}

/// Decode entities, drop whitespace and control characters, lowercase.
fn normalize_value(value: &str) -> String {
    let numeric = decode_numeric_references(value);
    html_escape::decode_html_entities(&numeric)
        .chars()
        .filter(|ch| !ch.is_whitespace() && !ch.is_control())
        .flat_map(char::to_lowercase)
        .collect()
}

fn decode_numeric_references(value: &str) -> Cow<'_, str> {
    if !value.contains("&#") {
        return Cow::Borrowed(value);
    }

    NUMERIC_REFERENCE.replace_all(value, |caps: &Captures<'_>| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (None, Some(decimal)) => decimal.as_str().parse::<u32>().ok(),
            (None, None) => None,
        };
        code.and_then(char::from_u32)
            .map_or_else(|| caps[0].to_string(), String::from)
    })
}

fn is_dangerous_url(normalized: &str) -> bool {
    // A scheme that still holds `&` after decoding is one the browser may
    // decode differently.
    let scheme_end = normalized
        .find([':', '/', '?', '#'])
        .unwrap_or(normalized.len());
    if normalized[..scheme_end].contains('&') {
        return true;
    }

    if normalized.starts_with("javascript:") || normalized.starts_with("vbscript:") {
        return true;
    }
    if let Some(data) = normalized.strip_prefix("data:") {
        return !data.starts_with("image/") || data.starts_with("image/svg");
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn removes_script_elements_with_content() {
        assert_eq!(
            sanitize_html("<p>hi</p><script>alert(1)</script><SCRIPT src=x></SCRIPT>"),
            "<p>hi</p>"
        );
    }

    #[test]
    fn removes_single_and_stray_denied_tags() {
        assert_eq!(
            sanitize_html("a<embed src=x.swf/>b</object>c<input type=text>d"),
            "abcd"
        );
        assert_eq!(sanitize_html("a<iframe src=x>b</iframe>c"), "ac");
    }

    #[test]
    fn drops_event_handlers() {
        assert_eq!(
            sanitize_html("<img src=\"a.png\" onerror=\"alert(1)\" OnLoad=x alt='shot'>"),
            "<img src=\"a.png\" alt=\"shot\">"
        );
    }

    #[test]
    fn neutralises_script_urls() {
        assert_eq!(
            sanitize_html("<a href=\"javascript:alert(1)\">x</a>"),
            "<a href=\"\">x</a>"
        );
        assert_eq!(
            sanitize_html("<a href=\" JaVa&#x09;Script:alert(1)\">x</a>"),
            "<a href=\"\">x</a>"
        );
        assert_eq!(
            sanitize_html("<a href='vbscript:msgbox'>x</a>"),
            "<a href=\"\">x</a>"
        );
    }

    #[test]
    fn references_without_semicolons_are_decoded() {
        assert_eq!(
            sanitize_html("<a href=\"&#106avascript:alert(1)\">x</a>"),
            "<a href=\"\">x</a>"
        );
        assert_eq!(
            sanitize_html("<a href=\"javascript&#58alert(1)\">x</a>"),
            "<a href=\"\">x</a>"
        );
        assert_eq!(
            sanitize_html("<a href=\"&#x6A;avascript&#x3a;alert(1)\">x</a>"),
            "<a href=\"\">x</a>"
        );
    }

    #[test]
    fn ampersand_in_scheme_is_refused() {
        assert_eq!(
            sanitize_html("<a href=\"java&Tab;script&colon;alert(1)\">x</a>"),
            "<a href=\"\">x</a>"
        );
        assert_eq!(
            sanitize_html("<a href=\"jav&unknown;ascript:alert(1)\">x</a>"),
            "<a href=\"\">x</a>"
        );
        assert_eq!(
            sanitize_html("<a href=\"/search?q=a&amp;b=c\">x</a>"),
            "<a href=\"/search?q=a&amp;b=c\">x</a>"
        );
    }

    #[test]
    fn only_image_data_urls_survive() {
        assert_eq!(
            sanitize_html("<img src=\"data:text/html;base64,PHNjcmlwdD4=\">"),
            "<img src=\"\">"
        );
        assert_eq!(
            sanitize_html("<img src=\"data:image/png;base64,AAAA\">"),
            "<img src=\"data:image/png;base64,AAAA\">"
        );
    }

    #[test]
    fn removal_cannot_stitch_a_new_tag() {
        let html = sanitize_html("<<script>x</script>img src=x onerror=alert(1)>");
        assert_eq!(html, "<img src=\"x\">");

        let html = sanitize_html("<scr<script>x</script>ipt>alert(1)</script>");
        assert!(!html.to_lowercase().contains("<script"));
    }

    #[test]
    fn escapes_tags_with_unbalanced_quotes() {
        let html = sanitize_html("<img src=x onerror=\"alert(1)>");
        assert!(html.starts_with("&lt;img"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn keeps_rendered_markup() {
        let html = "<div class=\"code-block\" data-language=\"rust\"><pre><code class=\"language-rust\">fn main() {}</code></pre></div>\n<hr class=\"writeup-hr\">\n<a href=\"#intro\" class=\"header-anchor\" aria-hidden=\"true\">#</a>";
        assert_eq!(sanitize_html(html), html);
    }

    #[test]
    fn normalises_self_closing_tags() {
        assert_eq!(sanitize_html("a<br/>b<br />"), "a<br />b<br />");
    }

    #[test]
    fn is_idempotent() {
        let inputs = [
            "<a href='x' title='say \"hi\"'>x</a>",
            "<<script>x</script>img src=x onerror=alert(1)>",
            "<div onclick=x style=\"color: red\">t</div>",
        ];
        for input in inputs {
            let once = sanitize_html(input);
            assert_eq!(sanitize_html(&once), once, "input: {input}");
        }
    }
}
