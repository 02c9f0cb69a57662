use once_cell::sync::Lazy;
use regex::Regex;

use super::inline::{TextMode, render_inline};
use super::table::parse_table;

static RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:-{3,}|\*{3,}|_{3,})$").expect("rule pattern is valid"));
static QUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^>[ \t]*(.*)$").expect("quote pattern is valid"));
static TASK_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-*+][ \t]+\[([ xX])\](?:[ \t]+(.*))?$").expect("task item pattern is valid")
});
static BULLET_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-*+][ \t]+(.+)$").expect("bullet item pattern is valid"));
static STANDALONE_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^!\[[^\]\n]*\]\([^)\s]+\)$").expect("standalone image pattern is valid")
});
static ORDERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,9})\.[ \t]+(.+)$").expect("ordered item pattern is valid"));

/// Turn the remaining Markdown into HTML line by line.
///
/// Tables span several lines and are detected first; every other line is
/// classified on its own. Lines that already start with markup are rendered
/// inline but not wrapped in a paragraph. List items are emitted flat,
/// without an enclosing list element.
pub(crate) fn transform_blocks(content: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());

    let mut idx = 0;
    while idx < lines.len() {
        if let Some((table, used)) = parse_table(&lines[idx..]) {
            out.push(table);
            idx += used;
            continue;
        }
        out.push(render_line(lines[idx]));
        idx += 1;
    }

    out.join("\n")
}

fn render_line(line: &str) -> String {
    let line = line.trim();
    if line.is_empty() {
        return String::new();
    }

    if RULE.is_match(line) {
        return "<hr class=\"writeup-hr\">".to_string();
    }

    if let Some(caps) = QUOTE.captures(line) {
        let body = caps[1].trim();
        if body.is_empty() {
            return String::new();
        }
        return format!(
            "<blockquote class=\"writeup-quote\">{}</blockquote>",
            inline(body)
        );
    }

    if let Some(caps) = TASK_ITEM.captures(line) {
        let checked = !caps[1].trim().is_empty();
        let body = caps.get(2).map_or("", |m| m.as_str().trim());
        return format!(
            "<li class=\"checkbox-item{extra}\"><span class=\"task-checkbox\" role=\"checkbox\" aria-checked=\"{checked}\" aria-disabled=\"true\"></span> {body}</li>",
            extra = if checked { " checked" } else { "" },
            body = inline(body),
        );
    }

    if let Some(caps) = BULLET_ITEM.captures(line) {
        return format!("<li class=\"list-item\">{}</li>", inline(caps[1].trim()));
    }

    if let Some(caps) = ORDERED_ITEM.captures(line) {
        return format!(
            "<li class=\"list-item ordered\" value=\"{}\">{}</li>",
            &caps[1],
            inline(caps[2].trim())
        );
    }

    if line.starts_with('<') || STANDALONE_IMAGE.is_match(line) {
        return inline(line);
    }

    format!("<p>{}</p>", inline(line))
}

fn inline(text: &str) -> String {
    render_inline(text, TextMode::Raw)
}
