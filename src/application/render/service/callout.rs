use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::domain::callout::{CalloutKind, default_title, style_for};

use super::escape::escape_html;

/// `:::kind optional title`, body lines, then a line holding only `:::`.
///
/// Callouts do not nest: the first bare `:::` line closes the open block.
static CALLOUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^:::[ \t]*(\w+)[ \t]*([^\n]*?)[ \t]*\r?\n((?s:.*?))^:::[ \t]*\r?$")
        .expect("callout pattern is valid")
});

/// Rewrite callout blocks into styled containers.
///
/// The title is escaped here; the body is left as Markdown so the inline pass
/// still renders emphasis, links and lists inside it.
pub(crate) fn expand_callouts(content: &str) -> String {
    CALLOUT
        .replace_all(content, |caps: &Captures<'_>| {
            let kind = &caps[1];
            let title = caps[2].trim();
            let body = caps[3].trim();

            if CalloutKind::parse(kind).is_none() {
                debug!(
                    target = "application::render::callout",
                    kind, "unknown callout kind rendered with fallback style"
                );
            }

            let style = style_for(kind);
            let title = if title.is_empty() {
                default_title(kind)
            } else {
                title.to_string()
            };

            format!(
                "<div class=\"callout {class}\" data-callout=\"{kind}\">\n\
<div class=\"callout-header\"><span class=\"callout-icon\">{icon}</span><span class=\"callout-title\">{title}</span></div>\n\
<div class=\"callout-body\">\n{body}\n</div>\n</div>",
                class = style.css_class,
                kind = escape_html(&kind.to_lowercase()),
                icon = style.icon,
                title = escape_html(&title),
            )
        })
        .into_owned()
}
