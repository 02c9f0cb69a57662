use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::escape::escape_html;
use super::inline::map_outside_verbatim_spans;

static CTF_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[\[ctf:([a-f0-9-]+)\]\]").expect("ctf link pattern is valid"));
static WRITEUP_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[\[writeup:([a-f0-9-]+)\]\]").expect("writeup link pattern is valid")
});
/// `@word` at the start of a line or after a character that cannot be part of
/// an address or URL, so `admin@example.com` and `medium.com/@user` stay put.
static MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)(^|[^\w@/.:])@(\w+)").expect("mention pattern is valid"));

/// Markup emitted by this pass, as a regex. Later passes that escape author
/// text use it to keep these fragments intact.
pub(crate) const AUTOLINK_MARKUP: &str = r#"<a href="[^"<>]*" class="autolink autolink-(?:ctf|writeup)">[^<>]*</a>|<span class="user-mention">@\w+</span>"#;

/// Expand `[[ctf:id]]`, `[[writeup:id]]` and `@user` references.
///
/// Targets are not resolved; a link to a missing challenge is the caller's
/// concern. Inline code, link and image spans are left alone.
pub(crate) fn expand_autolinks(content: &str, base_url: &str) -> String {
    let base = escape_html(base_url);

    map_outside_verbatim_spans(content, |text| {
        let text = CTF_LINK.replace_all(text, |caps: &Captures<'_>| {
            format!(
                "<a href=\"{base}/ctf/{id}\" class=\"autolink autolink-ctf\">🎯 CTF</a>",
                id = escape_html(&caps[1]),
            )
        });
        let text = WRITEUP_LINK.replace_all(&text, |caps: &Captures<'_>| {
            format!(
                "<a href=\"{base}/writeups/{id}\" class=\"autolink autolink-writeup\">📝 Writeup</a>",
                id = escape_html(&caps[1]),
            )
        });
        MENTION
            .replace_all(&text, |caps: &Captures<'_>| {
                format!(
                    "{prefix}<span class=\"user-mention\">@{user}</span>",
                    prefix = &caps[1],
                    user = escape_html(&caps[2]),
                )
            })
            .into_owned()
    })
}
